//! Aggregation queries as data
//!
//! Every query is an [`AggregationSpec`]: a filter, a grouping key, the
//! fields summed into each group's accumulator, and the output columns
//! derived from the merged totals. The engine knows nothing about trips; the
//! four built-in queries in [`builtin`] and any user-defined ones loaded by
//! [`loader`] all run through the same path.
//!
//! # Missing fields
//!
//! An absent field reads as the default named in the query (`0.0` for sums,
//! `-1` for integer group keys, `""` for text) and the record is still
//! counted. Such records are not reported separately.

pub mod aggregate;
pub mod builtin;
pub mod derive;
pub mod error;
pub mod loader;
pub mod registry;

use crate::record::{CoercionTable, ConversionError, Record, Scalar};
use serde::{Deserialize, Serialize};

pub use aggregate::{Accumulator, Aggregate, GroupKey, LineStats};
pub use derive::{derive, Cell, ResultRow, ResultTable};
pub use error::QueryError;
pub use registry::QueryRegistry;

/// One filter condition; all of a query's conditions must hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Numeric field strictly greater than `value`
    GreaterThan {
        field: String,
        value: f64,
        #[serde(default)]
        default: f64,
    },
    /// Field is a string equal to `value`. Missing or numeric never matches.
    Equals { field: String, value: String },
    /// Text field starts with `prefix`
    Prefix { field: String, prefix: String },
}

impl Predicate {
    pub fn field(&self) -> &str {
        match self {
            Predicate::GreaterThan { field, .. }
            | Predicate::Equals { field, .. }
            | Predicate::Prefix { field, .. } => field,
        }
    }

    pub fn holds(&self, record: &Record, table: &CoercionTable) -> Result<bool, ConversionError> {
        match self {
            Predicate::GreaterThan {
                field,
                value,
                default,
            } => Ok(table.number(record, field, *default)? > *value),
            Predicate::Equals { field, value } => {
                Ok(matches!(record.get(field), Some(Scalar::Str(s)) if s == value))
            }
            Predicate::Prefix { field, prefix } => {
                Ok(table.text(record, field, "")?.starts_with(prefix.as_str()))
            }
        }
    }
}

/// How records are grouped
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupBy {
    /// Every matching record lands in one group
    #[default]
    All,
    Integer {
        field: String,
        #[serde(default = "default_integer_key")]
        default: i64,
    },
    /// Text key, optionally cut to its first `chars` characters
    Text {
        field: String,
        #[serde(default)]
        chars: Option<usize>,
        #[serde(default)]
        default: String,
    },
}

fn default_integer_key() -> i64 {
    -1
}

impl GroupBy {
    pub fn key(&self, record: &Record, table: &CoercionTable) -> Result<GroupKey, ConversionError> {
        match self {
            GroupBy::All => Ok(GroupKey::All),
            GroupBy::Integer { field, default } => {
                table.integer(record, field, *default).map(GroupKey::Int)
            }
            GroupBy::Text {
                field,
                chars,
                default,
            } => {
                let text = table.text(record, field, default)?;
                let key = match chars {
                    Some(n) => text.chars().take(*n).collect(),
                    None => text.to_string(),
                };
                Ok(GroupKey::Text(key))
            }
        }
    }
}

/// A summed field; its position in `sums` is its accumulator slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SumField {
    pub field: String,
    #[serde(default)]
    pub default: f64,
}

impl SumField {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            default: 0.0,
        }
    }
}

/// One output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Column {
    /// The group key itself
    Key { header: String },
    /// Records in the group
    Count { header: String },
    /// Record count divided by `divisor`
    ScaledCount {
        header: String,
        divisor: f64,
        #[serde(default = "default_precision")]
        precision: usize,
    },
    /// Summed field divided by the record count
    Average {
        header: String,
        sum: String,
        #[serde(default = "default_precision")]
        precision: usize,
    },
    /// Summed field as-is
    Total {
        header: String,
        sum: String,
        #[serde(default = "default_precision")]
        precision: usize,
    },
}

/// Most decimal places a column may render with
pub const MAX_PRECISION: usize = 17;

fn default_precision() -> usize {
    2
}

impl Column {
    pub fn header(&self) -> &str {
        match self {
            Column::Key { header }
            | Column::Count { header }
            | Column::ScaledCount { header, .. }
            | Column::Average { header, .. }
            | Column::Total { header, .. } => header,
        }
    }

    /// Decimal places, for the columns that render a decimal
    pub fn precision(&self) -> Option<usize> {
        match self {
            Column::ScaledCount { precision, .. }
            | Column::Average { precision, .. }
            | Column::Total { precision, .. } => Some(*precision),
            _ => None,
        }
    }

    fn sum_ref(&self) -> Option<&str> {
        match self {
            Column::Average { sum, .. } | Column::Total { sum, .. } => Some(sum),
            _ => None,
        }
    }
}

/// Declarative definition of one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub filter: Vec<Predicate>,
    #[serde(default)]
    pub group_by: GroupBy,
    #[serde(default)]
    pub sums: Vec<SumField>,
    pub columns: Vec<Column>,
    #[serde(default = "CoercionTable::trip_records")]
    pub coercion: CoercionTable,
}

impl AggregationSpec {
    /// Whether lines need parsing at all. A bare count does not.
    pub fn needs_record(&self) -> bool {
        !self.filter.is_empty() || !self.sums.is_empty() || self.group_by != GroupBy::All
    }

    pub fn width(&self) -> usize {
        self.sums.len()
    }

    pub fn sum_index(&self, field: &str) -> Option<usize> {
        self.sums.iter().position(|s| s.field == field)
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.header().to_string()).collect()
    }

    /// Apply filter, key and value extraction to one record
    ///
    /// `Ok(None)` means the filter rejected the record; `Err` means a field
    /// could not be read as the required type and the line should be dropped.
    pub fn evaluate(
        &self,
        record: &Record,
    ) -> Result<Option<(GroupKey, Vec<f64>)>, ConversionError> {
        for predicate in &self.filter {
            if !predicate.holds(record, &self.coercion)? {
                return Ok(None);
            }
        }

        let key = self.group_by.key(record, &self.coercion)?;
        let values = self
            .sums
            .iter()
            .map(|s| self.coercion.number(record, &s.field, s.default))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some((key, values)))
    }

    /// Check internal consistency before the query is used
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.name.trim().is_empty() {
            return Err(QueryError::invalid("<unnamed>", "name must not be empty"));
        }
        if self.columns.is_empty() {
            return Err(QueryError::invalid(&self.name, "at least one column is required"));
        }

        for (i, sum) in self.sums.iter().enumerate() {
            if self.sums[..i].iter().any(|s| s.field == sum.field) {
                return Err(QueryError::invalid(
                    &self.name,
                    format!("field '{}' is summed twice", sum.field),
                ));
            }
        }

        for column in &self.columns {
            if let Some(sum) = column.sum_ref() {
                if self.sum_index(sum).is_none() {
                    return Err(QueryError::invalid(
                        &self.name,
                        format!(
                            "column '{}' refers to '{}', which is not in sums",
                            column.header(),
                            sum
                        ),
                    ));
                }
            }
            if let Column::ScaledCount { divisor, .. } = column {
                if *divisor == 0.0 || !divisor.is_finite() {
                    return Err(QueryError::invalid(
                        &self.name,
                        format!("column '{}' has an unusable divisor", column.header()),
                    ));
                }
            }
            if let Some(precision) = column.precision() {
                if precision > MAX_PRECISION {
                    return Err(QueryError::invalid(
                        &self.name,
                        format!(
                            "column '{}' asks for {} decimal places; at most {} are supported",
                            column.header(),
                            precision,
                            MAX_PRECISION
                        ),
                    ));
                }
            }
        }

        if matches!(self.group_by, GroupBy::All)
            && self.columns.iter().any(|c| matches!(c, Column::Key { .. }))
        {
            return Err(QueryError::invalid(
                &self.name,
                "a key column needs a group_by",
            ));
        }

        Ok(())
    }
}

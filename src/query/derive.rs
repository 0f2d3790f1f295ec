//! Final derivation: merged accumulators to an output table

use super::aggregate::{Aggregate, GroupKey};
use super::{AggregationSpec, Column, GroupBy, QueryError, MAX_PRECISION};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One derived output value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Key(GroupKey),
    Count(u64),
    Decimal { value: f64, precision: usize },
}

impl Cell {
    /// Text form used by the CSV writer
    pub fn render(&self) -> String {
        match self {
            Cell::Key(key) => key.to_string(),
            Cell::Count(n) => n.to_string(),
            Cell::Decimal { value, precision } => format!("{:.*}", precision, value),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Key(key) => key.serialize(serializer),
            Cell::Count(n) => serializer.serialize_u64(*n),
            Cell::Decimal { value, precision } => {
                let scale = 10f64.powi((*precision).min(MAX_PRECISION) as i32);
                serializer.serialize_f64((value * scale).round() / scale)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub key: GroupKey,
    pub cells: Vec<Cell>,
}

/// Derived result, rows sorted by group key ascending
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub query: String,
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Rendered cells of the row for `key`, if present
    pub fn row(&self, key: &GroupKey) -> Option<Vec<String>> {
        self.rows
            .iter()
            .find(|r| &r.key == key)
            .map(|r| r.cells.iter().map(Cell::render).collect())
    }
}

impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Row<'a>(&'a [String], &'a ResultRow);

        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (header, cell) in self.0.iter().zip(&self.1.cells) {
                    map.serialize_entry(header, cell)?;
                }
                map.end()
            }
        }

        let rows: Vec<Row<'_>> = self.rows.iter().map(|r| Row(&self.columns, r)).collect();
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("query", &self.query)?;
        map.serialize_entry("columns", &self.columns)?;
        map.serialize_entry("rows", &rows)?;
        map.end()
    }
}

/// Turn the global aggregate into the query's output table
///
/// Averages over an empty group are zero. An ungrouped query always yields
/// exactly one row, even over empty input.
pub fn derive(spec: &AggregationSpec, mut aggregate: Aggregate) -> Result<ResultTable, QueryError> {
    if spec.group_by == GroupBy::All {
        aggregate.ensure_group(GroupKey::All, spec.width());
    }

    let mut rows = Vec::with_capacity(aggregate.len());
    for (key, acc) in aggregate.into_sorted() {
        let mut cells = Vec::with_capacity(spec.columns.len());
        for column in &spec.columns {
            let cell = match column {
                Column::Key { .. } => Cell::Key(key.clone()),
                Column::Count { .. } => Cell::Count(acc.count),
                Column::ScaledCount {
                    divisor, precision, ..
                } => Cell::Decimal {
                    value: acc.count as f64 / divisor,
                    precision: *precision,
                },
                Column::Average {
                    sum, precision, ..
                } => Cell::Decimal {
                    value: acc.average(resolve(spec, sum)?),
                    precision: *precision,
                },
                Column::Total {
                    sum, precision, ..
                } => Cell::Decimal {
                    value: acc.sum(resolve(spec, sum)?),
                    precision: *precision,
                },
            };
            cells.push(cell);
        }
        rows.push(ResultRow { key, cells });
    }

    Ok(ResultTable {
        query: spec.name.clone(),
        columns: spec.headers(),
        rows,
    })
}

fn resolve(spec: &AggregationSpec, sum: &str) -> Result<usize, QueryError> {
    spec.sum_index(sum).ok_or_else(|| {
        QueryError::invalid(&spec.name, format!("'{}' is not a summed field", sum))
    })
}

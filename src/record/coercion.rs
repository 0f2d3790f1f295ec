//! Field-name typing policy
//!
//! The parser infers types from token shape alone. Aggregations need a
//! stronger contract for a handful of well-known fields, so each query
//! carries a [`CoercionTable`] naming the fields that must read as integers
//! and those that must read as floats. Fields not named keep whatever type
//! the parser inferred.

use super::{ConversionError, Record, Scalar};
use serde::{Deserialize, Serialize};

/// How a field is typed when an aggregation reads it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    Inferred,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionTable {
    #[serde(default)]
    pub integers: Vec<String>,
    #[serde(default)]
    pub floats: Vec<String>,
}

impl CoercionTable {
    /// Typing used by the trip-record queries
    pub fn trip_records() -> Self {
        Self {
            integers: vec![
                "VendorID".to_string(),
                "passenger_count".to_string(),
                "payment_type".to_string(),
            ],
            floats: vec![
                "trip_distance".to_string(),
                "fare_amount".to_string(),
                "tip_amount".to_string(),
            ],
        }
    }

    pub fn kind_of(&self, field: &str) -> FieldKind {
        if self.integers.iter().any(|f| f == field) {
            FieldKind::Integer
        } else if self.floats.iter().any(|f| f == field) {
            FieldKind::Float
        } else {
            FieldKind::Inferred
        }
    }

    /// Numeric read for sums and comparisons; `default` when the field is absent
    ///
    /// Integer-listed fields are read as floats here too, so a fractional
    /// `passenger_count` keeps its fraction.
    pub fn number(
        &self,
        record: &Record,
        field: &str,
        default: f64,
    ) -> Result<f64, ConversionError> {
        match record.get(field) {
            None => Ok(default),
            Some(value) => value.as_f64(field),
        }
    }

    /// Integer read; `default` when the field is absent
    pub fn integer(
        &self,
        record: &Record,
        field: &str,
        default: i64,
    ) -> Result<i64, ConversionError> {
        match record.get(field) {
            None => Ok(default),
            Some(value) => value.as_i64(field),
        }
    }

    /// Text read; `default` when the field is absent
    pub fn text<'r>(
        &self,
        record: &'r Record,
        field: &str,
        default: &'r str,
    ) -> Result<&'r str, ConversionError> {
        match record.get(field) {
            None => Ok(default),
            Some(value) => value.as_text(field),
        }
    }

    /// Type a raw string the way the fast parser does: named fields fall back
    /// to zero on a bad value, everything else stays a string.
    pub(crate) fn coerce_raw(&self, field: &str, raw: &str) -> Scalar {
        match self.kind_of(field) {
            FieldKind::Integer => Scalar::Int(raw.parse::<i64>().unwrap_or(0)),
            FieldKind::Float => Scalar::Float(raw.parse::<f64>().unwrap_or(0.0)),
            FieldKind::Inferred => Scalar::Str(raw.to_string()),
        }
    }
}

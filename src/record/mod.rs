//! Typed records parsed from single lines of flat JSON
//!
//! A [`Record`] is the field map produced from one input line. Values are
//! [`Scalar`]s inferred by the parser; aggregation code reads them through
//! the conversion helpers here, which never panic and report failures as
//! [`ConversionError`] so the caller can drop the line.

pub mod coercion;
pub mod fast;
pub mod parser;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use coercion::{CoercionTable, FieldKind};
pub use fast::parse_line_fast;
pub use parser::parse_line;

/// A typed scalar value read from a line
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
}

/// Failure to read a field as the type an aggregation asked for
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("field '{field}' value {value:?} is not numeric")]
    NotNumeric { field: String, value: String },

    #[error("field '{field}' value {value:?} is not an integer")]
    NotInteger { field: String, value: String },

    #[error("field '{field}' holds a number where text was expected")]
    NotText { field: String },
}

impl Scalar {
    /// Read as a float. Strings are accepted when their trimmed contents parse.
    pub fn as_f64(&self, field: &str) -> Result<f64, ConversionError> {
        match self {
            Scalar::Int(n) => Ok(*n as f64),
            Scalar::Float(f) => Ok(*f),
            Scalar::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ConversionError::NotNumeric {
                    field: field.to_string(),
                    value: s.clone(),
                }),
        }
    }

    /// Read as an integer. Floats truncate toward zero; non-finite floats fail.
    pub fn as_i64(&self, field: &str) -> Result<i64, ConversionError> {
        match self {
            Scalar::Int(n) => Ok(*n),
            Scalar::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
            Scalar::Float(f) => Err(ConversionError::NotInteger {
                field: field.to_string(),
                value: f.to_string(),
            }),
            Scalar::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ConversionError::NotInteger {
                    field: field.to_string(),
                    value: s.clone(),
                }),
        }
    }

    /// Borrow as text. Numbers are not rendered back into strings.
    pub fn as_text(&self, field: &str) -> Result<&str, ConversionError> {
        match self {
            Scalar::Str(s) => Ok(s),
            _ => Err(ConversionError::NotText {
                field: field.to_string(),
            }),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// Field map for one parsed line
///
/// Each field name appears at most once; a repeated key in the input
/// overwrites the earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, Scalar>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: &str, value: Scalar) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Scalar)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Which line parser a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// State-machine scanner; the reference for correctness
    #[default]
    Strict,
    /// Split on `,` and `:`; wrong for string values containing either
    Fast,
}

impl ParserKind {
    pub fn parse(self, line: &str, table: &CoercionTable) -> Record {
        match self {
            ParserKind::Strict => parse_line(line),
            ParserKind::Fast => parse_line_fast(line, table),
        }
    }
}

impl FromStr for ParserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ParserKind::Strict),
            "fast" => Ok(ParserKind::Fast),
            other => Err(format!(
                "unknown parser '{}' (expected 'strict' or 'fast')",
                other
            )),
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserKind::Strict => f.write_str("strict"),
            ParserKind::Fast => f.write_str("fast"),
        }
    }
}

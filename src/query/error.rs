//! Errors raised while defining, loading or deriving aggregation queries

use crate::error::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown query '{name}' (available: {available})")]
    UnknownQuery { name: String, available: String },

    #[error("query '{name}' is defined more than once")]
    Duplicate { name: String },

    #[error("query '{name}' is invalid: {reason}")]
    InvalidDefinition { name: String, reason: String },

    #[error("failed to load queries from {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl QueryError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::UnknownQuery { .. } => ErrorCode::QUERY_UNKNOWN,
            Self::Duplicate { .. } => ErrorCode::QUERY_DUPLICATE,
            Self::InvalidDefinition { .. } => ErrorCode::QUERY_INVALID,
            Self::Load { .. } => ErrorCode::QUERY_LOAD_FAILED,
        }
    }
}

//! Run-level errors
//!
//! Anything here aborts the whole run. Per-line problems never reach this
//! type; workers drop those lines and count them.

use crate::config::ConfigError;
use crate::error::ErrorCode;
use crate::query::QueryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open input {path}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input {source_label} after {lines_read} lines")]
    SourceRead {
        source_label: String,
        lines_read: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("worker for chunk {seq} terminated abnormally: {reason}")]
    WorkerFailed { seq: usize, reason: String },

    #[error("line reader terminated abnormally: {reason}")]
    ReaderFailed { reason: String },

    #[error("result for chunk {seq} never arrived")]
    MissingChunk { seq: usize },

    #[error("invalid engine settings: {0}")]
    InvalidSettings(#[from] ConfigError),

    #[error("final derivation failed: {0}")]
    Derivation(#[from] QueryError),
}

impl EngineError {
    pub fn code(&self) -> u16 {
        match self {
            Self::SourceOpen { .. } => ErrorCode::SOURCE_OPEN_FAILED,
            Self::SourceRead { .. } => ErrorCode::SOURCE_READ_FAILED,
            Self::WorkerFailed { .. } => ErrorCode::WORKER_FAILED,
            Self::ReaderFailed { .. } => ErrorCode::READER_FAILED,
            Self::MissingChunk { .. } => ErrorCode::CHUNK_MISSING,
            Self::InvalidSettings(_) => ErrorCode::INVALID_SETTINGS,
            Self::Derivation(e) => e.code(),
        }
    }
}

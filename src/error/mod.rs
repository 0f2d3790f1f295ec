use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::query::QueryError;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// The unified error type for the tripagg application
#[derive(Error, Debug)]
pub enum TripAggError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<ConfigError>,
    },

    #[error("[E{code:04}] Query error: {message}")]
    Query {
        code: u16,
        message: String,
        #[source]
        source: Option<QueryError>,
    },

    #[error("[E{code:04}] Run failed: {message}")]
    Engine {
        code: u16,
        message: String,
        #[source]
        source: Option<EngineError>,
    },

    #[error("[E{code:04}] Output error: {message}")]
    Output {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TripAggError {
    /// Create an output error with a specific code
    pub fn output(
        code: u16,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Output {
            code,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Query { code, .. }
            | Self::Engine { code, .. }
            | Self::Output { code, .. } => *code,
        }
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Query { .. } => 3,
            Self::Engine { .. } => 4,
            Self::Output { .. } => 5,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Config { message, .. }
            | Self::Query { message, .. }
            | Self::Engine { message, .. }
            | Self::Output { message, .. } => message,
        };
        format!("{} ({})", message, describe_error_code(self.code()))
    }
}

impl From<ConfigError> for TripAggError {
    fn from(error: ConfigError) -> Self {
        Self::Config {
            code: error.code(),
            message: error.to_string(),
            source: Some(error),
        }
    }
}

impl From<QueryError> for TripAggError {
    fn from(error: QueryError) -> Self {
        Self::Query {
            code: error.code(),
            message: error.to_string(),
            source: Some(error),
        }
    }
}

impl From<EngineError> for TripAggError {
    fn from(error: EngineError) -> Self {
        Self::Engine {
            code: error.code(),
            message: error.to_string(),
            source: Some(error),
        }
    }
}

pub type Result<T> = std::result::Result<T, TripAggError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_conversion_keeps_code() {
        let err: TripAggError = QueryError::UnknownQuery {
            name: "nope".into(),
            available: "count".into(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::QUERY_UNKNOWN);
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().starts_with("[E2001] Query error: unknown query 'nope'"));
    }

    #[test]
    fn test_engine_error_conversion() {
        let err: TripAggError = EngineError::WorkerFailed {
            seq: 4,
            reason: "panicked".into(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::WORKER_FAILED);
        assert_eq!(err.exit_code(), 4);
        assert!(err.user_message().contains("A worker terminated abnormally"));
    }

    #[test]
    fn test_output_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = TripAggError::output(ErrorCode::OUTPUT_WRITE_FAILED, "write failed", io);
        assert_eq!(err.to_string(), "[E4001] Output error: write failed");
        assert!(std::error::Error::source(&err).is_some());
    }
}

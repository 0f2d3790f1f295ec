//! Engine settings
//!
//! Settings are layered, lowest priority first:
//!
//! 1. Hardcoded defaults
//! 2. A TOML file (`--config`, or `tripagg.toml` in the user config dir)
//! 3. Environment variables (`TRIPAGG_*`)
//! 4. Command-line flags, applied by the CLI on top of the loaded value

pub mod loader;

use crate::error::ErrorCode;
use crate::record::ParserKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Semaphore;

pub use loader::{default_config_path, ConfigLoader};

/// Lines per chunk unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Worker count used when the platform cannot report its parallelism
pub const FALLBACK_WORKERS: usize = 12;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file {path} not found")]
    NotFound { path: PathBuf },

    #[error("failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => ErrorCode::CONFIG_NOT_FOUND,
            Self::Read { .. } => ErrorCode::CONFIG_GENERIC,
            Self::Parse { .. } => ErrorCode::CONFIG_PARSE_ERROR,
            Self::InvalidValue { .. } => ErrorCode::CONFIG_INVALID_VALUE,
        }
    }
}

/// Settings for one engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Lines per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunks processed concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default)]
    pub parser: ParserKind,

    /// Show a progress spinner while chunks are merged
    #[serde(default = "default_progress")]
    pub progress: bool,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// Available parallelism of the host
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKERS)
}

fn default_progress() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            workers: default_workers(),
            parser: ParserKind::default(),
            progress: default_progress(),
        }
    }
}

impl EngineConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_parser(mut self, parser: ParserKind) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::invalid("chunk_size", "must be at least 1"));
        }
        if self.workers == 0 {
            return Err(ConfigError::invalid("workers", "must be at least 1"));
        }
        if self.workers > Semaphore::MAX_PERMITS {
            return Err(ConfigError::invalid(
                "workers",
                format!("must be at most {}", Semaphore::MAX_PERMITS),
            ));
        }
        Ok(())
    }
}

/// Everything read from the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(flatten)]
    pub engine: EngineConfig,

    /// YAML file with extra query definitions
    #[serde(default)]
    pub queries: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.chunk_size, 50_000);
        assert!(config.workers >= 1);
        assert_eq!(config.parser, ParserKind::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let err = EngineConfig::default().with_chunk_size(0).validate().unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);

        assert!(EngineConfig::default().with_workers(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unschedulable_workers() {
        let err = EngineConfig::default()
            .with_workers(usize::MAX)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("workers"));

        let limit = EngineConfig::default().with_workers(Semaphore::MAX_PERMITS);
        assert!(limit.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_huge_chunk_size() {
        assert!(EngineConfig::default()
            .with_chunk_size(usize::MAX)
            .validate()
            .is_ok());
    }
}

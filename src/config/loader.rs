use super::{ConfigError, Settings};
use crate::record::ParserKind;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ENV_PREFIX: &str = "TRIPAGG_";

/// Default settings file location, e.g. `~/.config/tripagg/tripagg.toml`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "tripagg", "tripagg")
        .map(|dirs| dirs.config_dir().join("tripagg.toml"))
}

/// Builds [`Settings`] from file and environment layers
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    default_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            explicit_path: None,
            default_path: default_config_path(),
        }
    }

    /// Use this file instead of the default location. It must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// Ignore the per-user default location
    pub fn without_default_file(mut self) -> Self {
        self.default_path = None;
        self
    }

    /// Load from files and the process environment
    pub fn load(&self) -> Result<Settings, ConfigError> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Load with a custom environment lookup
    pub fn load_with_env<F>(&self, env: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match (&self.explicit_path, &self.default_path) {
            (Some(path), _) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path: path.clone() });
                }
                read_settings(path)?
            }
            (None, Some(path)) if path.exists() => read_settings(path)?,
            _ => {
                debug!("No settings file, using defaults");
                Settings::default()
            }
        };

        apply_env_overrides(&mut settings, env)?;
        settings.engine.validate()?;
        Ok(settings)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse settings from TOML text
pub fn parse_settings(content: &str, path: &Path) -> Result<Settings, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = parse_settings(&content, path)?;
    info!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn apply_env_overrides<F>(settings: &mut Settings, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| env(&format!("{}{}", ENV_PREFIX, name));

    if let Some(value) = var("CHUNK_SIZE") {
        settings.engine.chunk_size = parse_count("TRIPAGG_CHUNK_SIZE", &value)?;
    }
    if let Some(value) = var("WORKERS") {
        settings.engine.workers = parse_count("TRIPAGG_WORKERS", &value)?;
    }
    if let Some(value) = var("PARSER") {
        settings.engine.parser = value
            .parse::<ParserKind>()
            .map_err(|reason| ConfigError::invalid("TRIPAGG_PARSER", reason))?;
    }
    if let Some(value) = var("PROGRESS") {
        settings.engine.progress = match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => {
                return Err(ConfigError::invalid(
                    "TRIPAGG_PROGRESS",
                    format!("expected a boolean, got '{}'", other),
                ))
            }
        };
    }
    if let Some(value) = var("QUERIES") {
        settings.queries = Some(PathBuf::from(value));
    }
    Ok(())
}

fn parse_count(field: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::invalid(field, format!("'{}': {}", value, e)))
}

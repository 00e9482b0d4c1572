use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;

/// Application configuration, loaded once before the store and renderer
/// are constructed.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub templates: TemplateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateConfig {
    /// Directory holding the site's template files.
    pub root: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    /// `RUST_LOG` takes precedence over the configured level.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        fmt().with_env_filter(filter).init();
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&raw)
    }

    /// Parse configuration from TOML text.
    pub fn parse_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(ConfigError::Parse)
    }

    /// Path of a template file under the configured template root.
    pub fn template(&self, name: &str) -> PathBuf {
        self.templates.root.join(name)
    }
}

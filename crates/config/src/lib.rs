//! Chute Configuration
//!
//! TOML-based configuration loading with sensible defaults. Only the target
//! table and its columns are required.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use chute_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(r#"
//! [clickhouse]
//! table = "logs"
//! columns = [{ name = "id", type = "Int32" }]
//! "#).unwrap();
//! assert_eq!(config.clickhouse.table, "logs");
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "console"
//!
//! [clickhouse]
//! url = "http://localhost:8123"
//! database = "default"
//! table = "logs"
//! batch_size = 10000
//! flush_interval = "5s"
//! on_error = "skip"
//! columns = [
//!   { name = "id", type = "Int32" },
//!   { name = "name", type = "Nullable(String)" },
//! ]
//!
//! [loki]
//! tenant_id = "tenant"
//! labels = [{ label = "app", value = "chute" }]
//! ```

mod clickhouse;
mod error;
mod logging;
mod loki;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use clickhouse::{ClickHouseOutputConfig, ColumnConfig, OnError};
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use loki::{LabelConfig, LokiConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with defaults, but validation requires a
/// `[clickhouse]` table and at least one column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// ClickHouse destination and column layout
    pub clickhouse: ClickHouseOutputConfig,

    /// Loki connection settings
    pub loki: Option<LokiConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

//! ClickHouse output configuration
//!
//! Destination, batching, retry, and the column layout of the target table.

use std::time::Duration;

use chute_columns::ColumnSpec;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// What to do with a record that a column refuses
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Drop the record, count it, keep going (default)
    #[default]
    Skip,
    /// Flush what was committed and stop
    Fail,
}

/// One destination column
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ColumnConfig {
    /// Column name, also the JSON field it is read from
    pub name: String,

    /// ClickHouse type, e.g. `Nullable(String)` or `Enum8('a' = 1)`
    #[serde(rename = "type")]
    pub type_name: String,
}

/// ClickHouse output configuration
///
/// # Example
///
/// ```toml
/// [clickhouse]
/// url = "http://localhost:8123"
/// table = "logs"
/// columns = [
///   { name = "id", type = "Int32" },
///   { name = "name", type = "Nullable(String)" },
/// ]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClickHouseOutputConfig {
    /// HTTP interface URL
    /// Default: "http://localhost:8123"
    pub url: String,

    /// Database name
    /// Default: "default"
    pub database: String,

    /// Target table
    /// Required
    pub table: String,

    /// Username for basic authentication
    pub username: Option<String>,

    /// Password for basic authentication
    pub password: Option<String>,

    /// Rows per insert
    /// Default: 10000
    pub batch_size: usize,

    /// Flush interval for partially filled batches
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,

    /// HTTP request timeout
    /// Default: 30s
    #[serde(with = "humantime_serde")]
    pub connection_timeout: Duration,

    /// Insert attempts per block
    /// Default: 3
    pub retry_attempts: usize,

    /// First backoff delay, doubled after each failed attempt
    /// Default: 100ms
    #[serde(with = "humantime_serde")]
    pub retry_base_delay: Duration,

    /// Record channel capacity
    /// Default: 1000
    pub queue_size: usize,

    /// Policy for rejected records
    /// Default: skip
    pub on_error: OnError,

    /// Table columns, in insert order
    pub columns: Vec<ColumnConfig>,
}

impl Default for ClickHouseOutputConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".into(),
            database: "default".into(),
            table: String::new(),
            username: None,
            password: None,
            batch_size: 10_000,
            flush_interval: Duration::from_secs(5),
            connection_timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(100),
            queue_size: 1000,
            on_error: OnError::Skip,
            columns: Vec::new(),
        }
    }
}

impl ClickHouseOutputConfig {
    /// Parse every column definition
    ///
    /// # Errors
    ///
    /// Returns the first column whose type does not parse.
    pub fn column_specs(&self) -> Result<Vec<ColumnSpec>> {
        self.columns
            .iter()
            .map(|c| {
                ColumnSpec::parse(&c.name, &c.type_name).map_err(|source| ConfigError::ColumnType {
                    column: c.name.clone(),
                    source,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: ClickHouseOutputConfig = toml::from_str("").unwrap();
        assert_eq!(config.url, "http://localhost:8123");
        assert_eq!(config.database, "default");
        assert!(config.table.is_empty());
        assert!(config.username.is_none());
        assert_eq!(config.batch_size, 10_000);
        assert_eq!(config.flush_interval, Duration::from_secs(5));
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_base_delay, Duration::from_millis(100));
        assert_eq!(config.on_error, OnError::Skip);
        assert!(config.columns.is_empty());
    }

    #[test]
    fn test_durations_and_policy() {
        let toml = r#"
table = "events"
flush_interval = "250ms"
retry_base_delay = "1s"
on_error = "fail"
"#;
        let config: ClickHouseOutputConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.flush_interval, Duration::from_millis(250));
        assert_eq!(config.retry_base_delay, Duration::from_secs(1));
        assert_eq!(config.on_error, OnError::Fail);
    }

    #[test]
    fn test_column_specs() {
        let toml = r#"
columns = [
  { name = "id", type = "Int32" },
  { name = "name", type = "Nullable(String)" },
]
"#;
        let config: ClickHouseOutputConfig = toml::from_str(toml).unwrap();
        let specs = config.column_specs().unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "id");
        assert!(!specs[0].nullable);
        assert!(specs[1].nullable);
    }

    #[test]
    fn test_column_specs_reports_bad_column() {
        let config = ClickHouseOutputConfig {
            columns: vec![ColumnConfig {
                name: "ts".into(),
                type_name: "DateTime64(3)".into(),
            }],
            ..Default::default()
        };
        match config.column_specs() {
            Err(ConfigError::ColumnType { column, .. }) => assert_eq!(column, "ts"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

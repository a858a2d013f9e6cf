//! Configuration validation
//!
//! Validates config consistency:
//! - Required ClickHouse fields are present
//! - Batching and retry settings are usable
//! - Columns exist, have unique names, and have supported types

use std::collections::HashSet;

use crate::Config;
use crate::clickhouse::ClickHouseOutputConfig;
use crate::error::{ConfigError, Result};

const SECTION: &str = "clickhouse";

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_clickhouse(&config.clickhouse)?;
    validate_columns(&config.clickhouse)?;
    Ok(())
}

/// Validate destination, batching and retry settings
fn validate_clickhouse(ch: &ClickHouseOutputConfig) -> Result<()> {
    if ch.url.trim().is_empty() {
        return Err(ConfigError::missing_field(SECTION, "url"));
    }

    if ch.table.trim().is_empty() {
        return Err(ConfigError::missing_field(SECTION, "table"));
    }

    if ch.batch_size == 0 {
        return Err(ConfigError::invalid_value(
            SECTION,
            "batch_size",
            "must be greater than 0",
        ));
    }

    if ch.retry_attempts == 0 {
        return Err(ConfigError::invalid_value(
            SECTION,
            "retry_attempts",
            "must be greater than 0",
        ));
    }

    if ch.queue_size == 0 {
        return Err(ConfigError::invalid_value(
            SECTION,
            "queue_size",
            "must be greater than 0",
        ));
    }

    if ch.flush_interval.is_zero() {
        return Err(ConfigError::invalid_value(
            SECTION,
            "flush_interval",
            "must be greater than 0",
        ));
    }

    Ok(())
}

/// Validate the column list
fn validate_columns(ch: &ClickHouseOutputConfig) -> Result<()> {
    if ch.columns.is_empty() {
        return Err(ConfigError::NoColumns);
    }

    let mut seen = HashSet::new();
    for column in &ch.columns {
        if column.name.is_empty() {
            return Err(ConfigError::invalid_value(
                SECTION,
                "columns",
                "column name must not be empty",
            ));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(ConfigError::duplicate_column(&column.name));
        }
    }

    ch.column_specs().map(|_| ())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clickhouse::ColumnConfig;

    fn column(name: &str, type_name: &str) -> ColumnConfig {
        ColumnConfig {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    fn valid() -> Config {
        let mut config = Config::default();
        config.clickhouse.table = "logs".into();
        config.clickhouse.columns = vec![column("id", "Int32")];
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_missing_table() {
        let mut config = valid();
        config.clickhouse.table = " ".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field: "table", .. })
        ));
    }

    #[test]
    fn test_missing_url() {
        let mut config = valid();
        config.clickhouse.url = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field: "url", .. })
        ));
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = valid();
        config.clickhouse.batch_size = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidValue { field: "batch_size", .. })
        ));

        let mut config = valid();
        config.clickhouse.retry_attempts = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidValue { field: "retry_attempts", .. })
        ));

        let mut config = valid();
        config.clickhouse.queue_size = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidValue { field: "queue_size", .. })
        ));

        let mut config = valid();
        config.clickhouse.flush_interval = Duration::ZERO;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidValue { field: "flush_interval", .. })
        ));
    }

    #[test]
    fn test_no_columns() {
        let mut config = valid();
        config.clickhouse.columns.clear();
        assert!(matches!(validate_config(&config), Err(ConfigError::NoColumns)));
    }

    #[test]
    fn test_duplicate_column() {
        let mut config = valid();
        config.clickhouse.columns.push(column("id", "String"));
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::DuplicateColumn { name }) if name == "id"
        ));
    }

    #[test]
    fn test_empty_column_name() {
        let mut config = valid();
        config.clickhouse.columns.push(column("", "String"));
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidValue { field: "columns", .. })
        ));
    }

    #[test]
    fn test_unsupported_column_type() {
        let mut config = valid();
        config.clickhouse.columns.push(column("level", "Nullable(Enum8('a' = 1))"));
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ColumnType { column, .. }) if column == "level"
        ));
    }
}

//! ClickHouse sink errors

use chute_columns::RecordError;

/// Errors from ClickHouse sink
#[derive(Debug, thiserror::Error)]
pub enum ClickHouseSinkError {
    /// HTTP transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// ClickHouse answered with a non-success status
    #[error("clickhouse returned {status}: {body}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body, usually the exception text
        body: String,
    },

    /// Insert error after all attempts
    #[error("insert into '{table}' failed after {attempts} attempts: {message}")]
    InsertFailed {
        table: String,
        attempts: usize,
        message: String,
    },

    /// A record was refused under the `fail` policy
    #[error("record rejected: {0}")]
    RecordRejected(#[from] RecordError),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}

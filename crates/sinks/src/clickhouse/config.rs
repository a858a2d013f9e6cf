//! ClickHouse sink configuration
//!
//! Connection, batching, retry, and the target table's column layout.

use std::time::Duration;

use chute_columns::ColumnSpec;

// =============================================================================
// Constants
// =============================================================================

/// Default rows per block
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default flush interval
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Default insert attempts per block
pub const DEFAULT_RETRY_ATTEMPTS: usize = 3;

/// Default connection timeout
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Configuration
// =============================================================================

/// Handling of records a column refuses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RejectPolicy {
    /// Drop the record and continue
    #[default]
    Skip,
    /// Flush committed rows and stop the sink with the error
    Fail,
}

/// Configuration for ClickHouse sink
#[derive(Debug, Clone)]
pub struct ClickHouseConfig {
    /// ClickHouse HTTP URL (e.g., "http://localhost:8123")
    pub url: String,

    /// Database name
    pub database: String,

    /// Target table
    pub table: String,

    /// Username for authentication (optional)
    pub username: Option<String>,

    /// Password for authentication (optional)
    pub password: Option<String>,

    /// Columns in insert order
    pub columns: Vec<ColumnSpec>,

    /// Rows per block
    pub batch_size: usize,

    /// Flush interval
    pub flush_interval: Duration,

    /// Connection timeout
    pub connection_timeout: Duration,

    /// Insert attempts per block, including the first
    pub retry_attempts: usize,

    /// Base delay for exponential backoff
    pub retry_base_delay: Duration,

    /// Maximum retry delay
    pub retry_max_delay: Duration,

    /// Handling of rejected records
    pub on_reject: RejectPolicy,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".into(),
            database: "default".into(),
            table: String::new(),
            username: None,
            password: None,
            columns: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay: Duration::from_millis(100),
            retry_max_delay: Duration::from_secs(10),
            on_reject: RejectPolicy::Skip,
        }
    }
}

impl ClickHouseConfig {
    /// Set the ClickHouse URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the database name
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the target table and its columns
    pub fn with_table(mut self, table: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        self.table = table.into();
        self.columns = columns;
        self
    }

    /// Set authentication credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the flush interval
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Set the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the number of insert attempts and the first backoff delay
    pub fn with_retry(mut self, attempts: usize, base_delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_base_delay = base_delay;
        self
    }

    /// Set the rejected record policy
    pub fn with_reject_policy(mut self, policy: RejectPolicy) -> Self {
        self.on_reject = policy;
        self
    }

    /// Backoff before retry number `retry` (1-based)
    pub fn retry_delay(&self, retry: usize) -> Duration {
        let shift = retry.saturating_sub(1).min(31) as u32;
        self.retry_base_delay
            .saturating_mul(1u32 << shift)
            .min(self.retry_max_delay)
    }
}

//! ClickHouse Sink
//!
//! Batches loosely typed JSON records into one table through typed column
//! adapters and inserts them over HTTP in `Native` format.
//!
//! # Features
//!
//! - **Schema from config**: column names and ClickHouse types, parsed once
//! - **Row alignment**: a rejected record leaves no partial row behind
//! - **Reject policy**: skip and count, or stop the sink
//! - **Batching**: flush on size, on interval, and on shutdown
//! - **Retry logic**: exponential backoff on failed inserts

mod config;
mod error;
mod metrics;
mod sink;
mod writer;

// Re-export public API
pub use config::{
    ClickHouseConfig, DEFAULT_BATCH_SIZE, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_FLUSH_INTERVAL,
    DEFAULT_RETRY_ATTEMPTS, RejectPolicy,
};
pub use error::ClickHouseSinkError;
pub use metrics::{ClickHouseMetrics, MetricsSnapshot};
pub use sink::ClickHouseSink;
pub use writer::{BlockWriter, HttpBlockWriter, insert_query};

#[cfg(test)]
#[path = "clickhouse_test.rs"]
mod clickhouse_test;

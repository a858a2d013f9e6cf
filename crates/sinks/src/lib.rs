//! Chute - Sinks
//!
//! Output side of chute: JSON records in, typed column blocks out.
//!
//! # Architecture
//!
//! The ClickHouse sink receives `serde_json::Value` records over a tokio
//! channel, appends them to a column set, and ships `Native` blocks through a
//! [`clickhouse::BlockWriter`].
//!
//! ```text
//! [stdin reader] --Value--> [Sink Channel] --> [ClickHouseSink] --Native--> [BlockWriter]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use chute_sinks::clickhouse::{ClickHouseConfig, ClickHouseSink};
//! use tokio::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel(1000);
//! let sink = ClickHouseSink::new(config, rx)?;
//! let task = tokio::spawn(sink.run());
//!
//! tx.send(serde_json::json!({"id": 1})).await?;
//! drop(tx);
//! let snapshot = task.await??;
//! ```

// =============================================================================
// Sink implementations
// =============================================================================

/// ClickHouse sink - batched inserts in Native format
pub mod clickhouse;

/// Loki request helpers - labels, authentication, timestamps
pub mod loki;

// =============================================================================
// Shared utilities
// =============================================================================

/// Shared utilities (rate-limited logging)
pub mod util;

// =============================================================================
// Public re-exports
// =============================================================================

pub use clickhouse::{ClickHouseSink, ClickHouseSinkError, MetricsSnapshot};

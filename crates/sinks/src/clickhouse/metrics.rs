//! ClickHouse sink metrics
//!
//! Atomic counters for tracking sink throughput and health.

use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Metrics
// =============================================================================

/// Metrics for ClickHouse sink
#[derive(Debug, Default)]
pub struct ClickHouseMetrics {
    /// Records taken off the channel
    pub records_received: AtomicU64,

    /// Records refused by a column
    pub records_rejected: AtomicU64,

    /// Rows inserted
    pub rows_written: AtomicU64,

    /// Blocks inserted
    pub blocks_written: AtomicU64,

    /// Blocks dropped after the last attempt failed
    pub write_errors: AtomicU64,

    /// Retry attempts
    pub retry_count: AtomicU64,
}

impl ClickHouseMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            records_received: AtomicU64::new(0),
            records_rejected: AtomicU64::new(0),
            rows_written: AtomicU64::new(0),
            blocks_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            retry_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.records_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejected(&self) {
        self.records_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a block and its rows written
    #[inline]
    pub fn record_block_written(&self, rows: u64) {
        self.blocks_written.fetch_add(1, Ordering::Relaxed);
        self.rows_written.fetch_add(rows, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_retry(&self) {
        self.retry_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_received: self.records_received.load(Ordering::Relaxed),
            records_rejected: self.records_rejected.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            retry_count: self.retry_count.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_received: u64,
    pub records_rejected: u64,
    pub rows_written: u64,
    pub blocks_written: u64,
    pub write_errors: u64,
    pub retry_count: u64,
}

//! ClickHouse sink implementation
//!
//! Receives JSON records, appends them to the table's column set, and inserts
//! full blocks in `Native` format.

use std::sync::Arc;

use bytes::Bytes;
use chute_columns::ColumnSet;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::util::RateLimitedLogger;

use super::config::{ClickHouseConfig, RejectPolicy};
use super::error::ClickHouseSinkError;
use super::metrics::{ClickHouseMetrics, MetricsSnapshot};
use super::writer::{BlockWriter, HttpBlockWriter};

/// ClickHouse sink for one table
///
/// Flushes when the buffered rows reach `batch_size`, on every flush interval
/// tick with rows pending, and when the channel closes.
pub struct ClickHouseSink {
    /// Channel receiver for records
    receiver: mpsc::Receiver<Value>,

    /// Configuration
    config: ClickHouseConfig,

    /// Buffered rows of the current block
    columns: ColumnSet,

    /// Block transport
    writer: Box<dyn BlockWriter>,

    /// Metrics (Arc for sharing with reporters)
    metrics: Arc<ClickHouseMetrics>,

    /// Rejected record logging
    rejections: RateLimitedLogger,

    /// Failed insert logging
    write_failures: RateLimitedLogger,

    /// Sink name for identification
    name: String,
}

impl ClickHouseSink {
    /// Create a sink that inserts over HTTP
    pub fn new(
        config: ClickHouseConfig,
        receiver: mpsc::Receiver<Value>,
    ) -> Result<Self, ClickHouseSinkError> {
        let writer = HttpBlockWriter::new(&config)?;
        Self::with_writer(config, receiver, writer)
    }

    /// Create a sink with a custom block writer
    pub fn with_writer(
        config: ClickHouseConfig,
        receiver: mpsc::Receiver<Value>,
        writer: impl BlockWriter + 'static,
    ) -> Result<Self, ClickHouseSinkError> {
        if config.table.is_empty() {
            return Err(ClickHouseSinkError::ConfigError("table is not set".into()));
        }
        if config.columns.is_empty() {
            return Err(ClickHouseSinkError::ConfigError(format!(
                "table '{}' has no columns",
                config.table
            )));
        }
        if config.flush_interval.is_zero() {
            return Err(ClickHouseSinkError::ConfigError(
                "flush interval must be non-zero".into(),
            ));
        }

        Ok(Self {
            receiver,
            columns: ColumnSet::new(&config.columns),
            writer: Box::new(writer),
            metrics: Arc::new(ClickHouseMetrics::new()),
            rejections: RateLimitedLogger::default(),
            write_failures: RateLimitedLogger::default(),
            name: "clickhouse".into(),
            config,
        })
    }

    /// Set the sink name used in logs
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Shared handle to the metrics
    pub fn metrics(&self) -> Arc<ClickHouseMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Get the sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get reference to config
    pub fn config(&self) -> &ClickHouseConfig {
        &self.config
    }

    /// Run the sink until the channel closes
    ///
    /// Under [`RejectPolicy::Fail`] the first rejected record ends the run
    /// with an error, after the rows committed before it are flushed.
    pub async fn run(mut self) -> Result<MetricsSnapshot, ClickHouseSinkError> {
        tracing::info!(
            sink = %self.name,
            url = %self.config.url,
            database = %self.config.database,
            table = %self.config.table,
            columns = self.columns.len(),
            "clickhouse sink starting"
        );

        let period = self.config.flush_interval;
        let mut flush_interval = interval_at(Instant::now() + period, period);
        flush_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                record = self.receiver.recv() => {
                    match record {
                        Some(record) => {
                            self.metrics.record_received();
                            if let Err(e) = self.append(&record) {
                                self.flush().await;
                                tracing::error!(sink = %self.name, error = %e, "stopping on rejected record");
                                return Err(e);
                            }

                            if self.columns.rows() >= self.config.batch_size {
                                self.flush().await;
                            }
                        }
                        None => {
                            tracing::info!(sink = %self.name, "channel closed, performing final flush");
                            self.flush().await;
                            break;
                        }
                    }
                }

                _ = flush_interval.tick() => {
                    self.flush().await;
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            sink = %self.name,
            received = snapshot.records_received,
            rejected = snapshot.records_rejected,
            rows = snapshot.rows_written,
            blocks = snapshot.blocks_written,
            errors = snapshot.write_errors,
            "clickhouse sink shutting down"
        );

        Ok(snapshot)
    }

    /// Append one record, applying the reject policy on failure
    fn append(&mut self, record: &Value) -> Result<(), ClickHouseSinkError> {
        let Err(e) = self.columns.append_record(record) else {
            return Ok(());
        };

        self.metrics.record_rejected();
        match self.config.on_reject {
            RejectPolicy::Skip => {
                self.rejections
                    .warn_with_data("record rejected", &e, &record.to_string());
                Ok(())
            }
            RejectPolicy::Fail => Err(e.into()),
        }
    }

    /// Encode and insert the buffered rows, if any
    ///
    /// A block that still fails after the last attempt is dropped and
    /// counted as a write error.
    async fn flush(&mut self) {
        if self.columns.rows() == 0 {
            return;
        }

        let block = self.columns.flush();
        let rows = block.rows;
        let body = block.to_native();

        match self.write_with_retry(body).await {
            Ok(()) => {
                self.metrics.record_block_written(rows as u64);
                tracing::debug!(sink = %self.name, table = %self.config.table, rows, "flushed block");
            }
            Err(e) => {
                self.metrics.record_error();
                self.write_failures.error("dropping block", &e);
            }
        }
    }

    /// Insert one body with exponential backoff between attempts
    async fn write_with_retry(&self, body: Bytes) -> Result<(), ClickHouseSinkError> {
        let table = &self.config.table;
        let attempts = self.config.retry_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.config.retry_delay(attempt);
                self.metrics.record_retry();
                tracing::warn!(
                    table = %table,
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "retrying insert"
                );
                tokio::time::sleep(delay).await;
            }

            match self.writer.write(table, body.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(error = %e, table = %table, attempt, "insert failed");
                    last_error = Some(e);
                }
            }
        }

        Err(ClickHouseSinkError::InsertFailed {
            table: table.clone(),
            attempts,
            message: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}

//! Rate-limited logging utility
//!
//! Prevents log spam when many records or blocks fail the same way: logs at
//! most once per interval and reports how many events were suppressed in
//! between.
//!
//! # Example
//!
//! ```ignore
//! use chute_sinks::util::RateLimitedLogger;
//! use std::time::Duration;
//!
//! let logger = RateLimitedLogger::new(Duration::from_secs(10));
//!
//! // Only logs once per 10 seconds, even if called frequently
//! for record in rejected {
//!     logger.warn("record rejected", &err);
//! }
//! ```

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between log lines
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Maximum data length included in a log line
pub const MAX_DATA_LOG_LENGTH: usize = 256;

/// Rate-limited logger
///
/// Thread-safe: atomic counters plus a mutex for the last log time.
#[derive(Debug)]
pub struct RateLimitedLogger {
    /// Minimum interval between log messages
    min_interval: Duration,

    /// Last time we logged
    last_log_time: Mutex<Option<Instant>>,

    /// Events since last log
    pending: AtomicU64,

    /// Events ever recorded
    total: AtomicU64,
}

impl RateLimitedLogger {
    /// Create a new rate-limited logger with the specified interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_log_time: Mutex::new(None),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Record a warning and log it if enough time has passed
    ///
    /// Returns true if logged, false if suppressed.
    pub fn warn(&self, message: &str, error: &dyn Display) -> bool {
        let Some((suppressed, total)) = self.admit() else {
            return false;
        };
        tracing::warn!(
            message = %message,
            error = %error,
            suppressed_count = suppressed,
            total,
            "warning (rate-limited)"
        );
        true
    }

    /// Record a warning with the offending input, truncated
    pub fn warn_with_data(&self, message: &str, error: &dyn Display, data: &str) -> bool {
        let Some((suppressed, total)) = self.admit() else {
            return false;
        };
        tracing::warn!(
            message = %message,
            error = %error,
            data = %truncate(data),
            suppressed_count = suppressed,
            total,
            "warning with data (rate-limited)"
        );
        true
    }

    /// Record an error and log it if enough time has passed
    pub fn error(&self, message: &str, error: &dyn Display) -> bool {
        let Some((suppressed, total)) = self.admit() else {
            return false;
        };
        tracing::error!(
            message = %message,
            error = %error,
            suppressed_count = suppressed,
            total,
            "error (rate-limited)"
        );
        true
    }

    /// Count one event; when the interval has elapsed, returns the number
    /// suppressed since the last log line and the running total
    fn admit(&self) -> Option<(u64, u64)> {
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);

        {
            let mut last_time = self.last_log_time.lock();
            let now = Instant::now();
            match *last_time {
                Some(last) if now.duration_since(last) < self.min_interval => return None,
                _ => *last_time = Some(now),
            }
        }

        let count = self.pending.swap(0, Ordering::Relaxed);
        Some((count.saturating_sub(1), self.total.load(Ordering::Relaxed)))
    }

    /// Events counted since the last log line
    pub fn pending_count(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Events ever counted
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.pending.store(0, Ordering::Relaxed);
        self.total.store(0, Ordering::Relaxed);
        *self.last_log_time.lock() = None;
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL)
    }
}

/// Cut `data` to [`MAX_DATA_LOG_LENGTH`] bytes on a char boundary
fn truncate(data: &str) -> String {
    if data.len() <= MAX_DATA_LOG_LENGTH {
        return data.to_string();
    }
    let mut end = MAX_DATA_LOG_LENGTH;
    while !data.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated from {} bytes)", &data[..end], data.len())
}

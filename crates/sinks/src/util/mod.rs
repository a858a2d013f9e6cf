//! Sink utilities
//!
//! - **rate_limited_logger**: keeps repeated failures from flooding the log

pub mod rate_limited_logger;

pub use rate_limited_logger::{DEFAULT_LOG_INTERVAL, MAX_DATA_LOG_LENGTH, RateLimitedLogger};

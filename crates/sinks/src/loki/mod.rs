//! Loki request helpers
//!
//! Static stream labels, push request authentication, and detection of
//! Unix-nanosecond timestamps in log fields.
//!
//! # Authentication
//!
//! | Setting | Header |
//! |---------|--------|
//! | `tenant_id` | `X-Scope-OrgID: <tenant>` |
//! | `bearer_token` | `Authorization: Bearer <token>` |
//! | `username` (+ `password`) | `Authorization: Basic base64(<user>:<password>)` |
//!
//! A bearer token takes precedence over basic credentials.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};

/// Tenant header understood by Loki
pub const TENANT_HEADER: HeaderName = HeaderName::from_static("x-scope-orgid");

/// Nanoseconds at 2000-01-01T00:00:00Z
const MIN_UNIX_NANO: i64 = 946_684_800_000_000_000;

/// Nanoseconds at 2200-01-01T00:00:00Z
const MAX_UNIX_NANO: i64 = 7_258_118_400_000_000_000;

/// Errors building Loki request headers
#[derive(Debug, thiserror::Error)]
pub enum LokiError {
    /// A configured value cannot be sent as a header
    #[error("invalid value for header '{header}': {source}")]
    InvalidHeader {
        header: &'static str,
        #[source]
        source: InvalidHeaderValue,
    },
}

// =============================================================================
// Labels
// =============================================================================

/// One static stream label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub label: String,
    pub value: String,
}

impl Label {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Labels keyed by name; a repeated name keeps its last value
pub fn effective_labels(labels: &[Label]) -> HashMap<String, String> {
    labels
        .iter()
        .map(|l| (l.label.clone(), l.value.clone()))
        .collect()
}

// =============================================================================
// Authentication
// =============================================================================

/// Tenant and credentials for push requests
///
/// Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LokiAuth {
    pub tenant_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bearer_token: Option<String>,
}

impl LokiAuth {
    /// Headers for a push request
    pub fn headers(&self) -> Result<HeaderMap, LokiError> {
        let mut headers = HeaderMap::new();
        self.apply_to(&mut headers)?;
        Ok(headers)
    }

    /// Set tenant and authorization headers, replacing existing values
    pub fn apply_to(&self, headers: &mut HeaderMap) -> Result<(), LokiError> {
        if let Some(tenant) = non_empty(&self.tenant_id) {
            headers.insert(TENANT_HEADER, header_value("X-Scope-OrgID", tenant)?);
        }

        if let Some(authorization) = self.authorization() {
            let mut value = header_value("Authorization", &authorization)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(())
    }

    /// `Authorization` value, if any credentials are set
    fn authorization(&self) -> Option<String> {
        if let Some(token) = non_empty(&self.bearer_token) {
            return Some(format!("Bearer {token}"));
        }

        let username = non_empty(&self.username)?;
        let password = self.password.as_deref().unwrap_or_default();
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        Some(format!("Basic {encoded}"))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn header_value(header: &'static str, value: &str) -> Result<HeaderValue, LokiError> {
    HeaderValue::from_str(value).map_err(|source| LokiError::InvalidHeader { header, source })
}

// =============================================================================
// Timestamps
// =============================================================================

/// Whether `ts` is a Unix timestamp in nanoseconds
///
/// Accepts only ASCII digits that fit in an `i64` and fall within
/// [2000-01-01, 2200-01-01) UTC.
pub fn is_unix_nano_format(ts: &str) -> bool {
    if ts.is_empty() || !ts.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    match ts.parse::<i64>() {
        Ok(nanos) => (MIN_UNIX_NANO..MAX_UNIX_NANO).contains(&nanos),
        Err(_) => false,
    }
}

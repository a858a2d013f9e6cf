//! Loki connection settings
//!
//! Tenant, credentials, and static stream labels.

use serde::Deserialize;

/// One static stream label
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LabelConfig {
    pub label: String,
    pub value: String,
}

/// Loki configuration
///
/// # Example
///
/// ```toml
/// [loki]
/// tenant_id = "team-a"
/// bearer_token = "secret"
/// labels = [{ label = "app", value = "chute" }]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LokiConfig {
    /// Sent as `X-Scope-OrgID`
    pub tenant_id: Option<String>,

    /// Basic authentication user
    pub auth_username: Option<String>,

    /// Basic authentication password
    pub auth_password: Option<String>,

    /// Takes precedence over basic authentication
    pub bearer_token: Option<String>,

    /// Static labels; a repeated label keeps its last value
    pub labels: Vec<LabelConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty() {
        let config: LokiConfig = toml::from_str("").unwrap();
        assert!(config.tenant_id.is_none());
        assert!(config.bearer_token.is_none());
        assert!(config.labels.is_empty());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
tenant_id = "tenant"
auth_username = "u"
auth_password = "p"
bearer_token = "t"
labels = [{ label = "app", value = "chute" }, { label = "app", value = "other" }]
"#;
        let config: LokiConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.tenant_id.as_deref(), Some("tenant"));
        assert_eq!(config.auth_username.as_deref(), Some("u"));
        assert_eq!(config.auth_password.as_deref(), Some("p"));
        assert_eq!(config.bearer_token.as_deref(), Some("t"));
        assert_eq!(config.labels.len(), 2);
        assert_eq!(config.labels[1].value, "other");
    }
}

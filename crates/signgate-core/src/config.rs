//! SignGate configuration.
//!
//! Provides [`SignGateConfig`] for configuring the signed-request gateway.
//! Values are loaded from environment variables; anything unset keeps its
//! default.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default bind address for the gateway.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Default upper bound on a buffered request body (10 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Gateway configuration.
///
/// # Examples
///
/// ```
/// use signgate_core::SignGateConfig;
///
/// let config = SignGateConfig::default();
/// assert_eq!(config.listen, "0.0.0.0:8080");
/// assert!(!config.require_authentication);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct SignGateConfig {
    /// Bind address (e.g. `"0.0.0.0:8080"`).
    #[builder(default = String::from(DEFAULT_LISTEN))]
    pub listen: String,

    /// Path of the JSON file holding the authorized clients.
    #[builder(default, setter(strip_option))]
    pub clients_file: Option<String>,

    /// Whether requests that carry no valid signature are rejected with 401
    /// instead of being forwarded unauthenticated.
    #[builder(default = false)]
    pub require_authentication: bool,

    /// Maximum request body size, in bytes, buffered for signature checks.
    #[builder(default = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_size: usize,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for SignGateConfig {
    fn default() -> Self {
        Self {
            listen: String::from(DEFAULT_LISTEN),
            clients_file: None,
            require_authentication: false,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            log_level: String::from("info"),
        }
    }
}

impl SignGateConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SIGNGATE_LISTEN` | `0.0.0.0:8080` |
    /// | `SIGNGATE_CLIENTS_FILE` | *(unset)* |
    /// | `SIGNGATE_REQUIRE_AUTH` | `false` |
    /// | `SIGNGATE_MAX_BODY_SIZE` | `10485760` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("SIGNGATE_LISTEN") {
            config.listen = v;
        }
        if let Ok(v) = std::env::var("SIGNGATE_CLIENTS_FILE") {
            if !v.trim().is_empty() {
                config.clients_file = Some(v);
            }
        }
        if let Ok(v) = std::env::var("SIGNGATE_REQUIRE_AUTH") {
            config.require_authentication = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("SIGNGATE_MAX_BODY_SIZE") {
            if let Ok(n) = v.parse::<usize>() {
                config.max_body_size = n;
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = SignGateConfig::default();
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert!(config.clients_file.is_none());
        assert!(!config.require_authentication);
        assert_eq!(config.max_body_size, 10_485_760);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_should_load_from_env() {
        let config = SignGateConfig::from_env();
        assert!(!config.listen.is_empty());
    }

    #[test]
    fn test_should_build_with_typed_builder() {
        let config = SignGateConfig::builder()
            .listen("127.0.0.1:9999".into())
            .clients_file("/etc/signgate/clients.json".into())
            .require_authentication(true)
            .max_body_size(1024)
            .log_level("debug".into())
            .build();

        assert_eq!(config.listen, "127.0.0.1:9999");
        assert_eq!(
            config.clients_file.as_deref(),
            Some("/etc/signgate/clients.json")
        );
        assert!(config.require_authentication);
        assert_eq!(config.max_body_size, 1024);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_should_serialize_to_camel_case_json() {
        let config = SignGateConfig::default();
        let json = serde_json::to_string(&config).expect("test serialization");
        assert!(json.contains("requireAuthentication"));
        assert!(json.contains("maxBodySize"));
    }

    #[test]
    fn test_should_parse_bool_values() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! server. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the template server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Content roots the server reads templates and data from.
    pub content: ContentConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Content root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory whose files are served as page templates.
    pub document_root: String,

    /// Directory of shared include templates, available to every page.
    pub include_root: Option<String>,

    /// Directory searched for JSON side files. Defaults to the
    /// document root when unset.
    pub data_root: Option<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            document_root: ".".to_string(),
            include_root: None,
            data_root: None,
        }
    }
}

impl ContentConfig {
    /// The directory searched for JSON side files.
    pub fn data_root(&self) -> &str {
        self.data_root.as_deref().unwrap_or(&self.document_root)
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.listener.tls.is_none());
        assert_eq!(config.content.document_root, ".");
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_data_root_falls_back_to_document_root() {
        let mut content = ContentConfig {
            document_root: "site".to_string(),
            ..Default::default()
        };
        assert_eq!(content.data_root(), "site");

        content.data_root = Some("data".to_string());
        assert_eq!(content.data_root(), "data");
    }

    #[test]
    fn test_minimal_toml_deserializes() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [content]
            document_root = "site"

            [listener]
            bind_address = "127.0.0.1:3000"
            "#,
        )
        .unwrap();
        assert_eq!(config.content.document_root, "site");
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.timeouts.request_secs, 30);
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that configured roots and TLS files exist
//! - Validate value ranges and address formats
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::paths;

/// A single rejected configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("bind address {0:?} is not a valid socket address")]
    BindAddress(String),
    #[error("metrics address {0:?} is not a valid socket address")]
    MetricsAddress(String),
    #[error("document root {0:?} is not a directory")]
    DocumentRoot(String),
    #[error("include root {0:?} is not a directory")]
    IncludeRoot(String),
    #[error("data root {0:?} is not a directory")]
    DataRoot(String),
    #[error("TLS certificate {0:?} does not exist")]
    TlsCertificate(String),
    #[error("TLS key {0:?} does not exist")]
    TlsKey(String),
    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate a parsed configuration, collecting every violation.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if !paths::is_directory(&config.content.document_root) {
        errors.push(ValidationError::DocumentRoot(
            config.content.document_root.clone(),
        ));
    }

    if let Some(include_root) = &config.content.include_root {
        if !paths::is_directory(include_root) {
            errors.push(ValidationError::IncludeRoot(include_root.clone()));
        }
    }

    if let Some(data_root) = &config.content.data_root {
        if !paths::is_directory(data_root) {
            errors.push(ValidationError::DataRoot(data_root.clone()));
        }
    }

    if let Some(tls) = &config.listener.tls {
        if !Path::new(&tls.cert_path).exists() {
            errors.push(ValidationError::TlsCertificate(tls.cert_path.clone()));
        }
        if !Path::new(&tls.key_path).exists() {
            errors.push(ValidationError::TlsKey(tls.key_path.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

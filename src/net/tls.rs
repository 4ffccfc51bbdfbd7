//! TLS configuration and certificate loading.

use std::io;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

use crate::config::TlsConfig;

/// Errors raised while loading TLS material.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("certificate file not found: {0:?}")]
    CertificateNotFound(PathBuf),
    #[error("private key file not found: {0:?}")]
    KeyNotFound(PathBuf),
    #[error("failed to load TLS material: {0}")]
    Load(#[from] io::Error),
}

/// Load TLS configuration from the certificate and key files named in
/// `config`.
pub async fn load_tls(config: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    let cert_path = Path::new(&config.cert_path);
    let key_path = Path::new(&config.key_path);

    if !cert_path.exists() {
        return Err(TlsError::CertificateNotFound(cert_path.to_path_buf()));
    }
    if !key_path.exists() {
        return Err(TlsError::KeyNotFound(key_path.to_path_buf()));
    }

    let config = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    tracing::info!(cert = %cert_path.display(), "TLS material loaded");
    Ok(config)
}

//! Template-driven page server.
//!
//! Serves a directory of HTML templates the way a static file server
//! serves files, with each page compiled on first request and rendered
//! per request against data from a pluggable source.
//!
//! # Architecture Overview
//!
//! ```text
//!     Request path
//!         │
//!         ▼
//!     ┌─────────┐    ┌───────────┐    ┌──────────────┐
//!     │  http   │───▶│   paths   │───▶│  templates   │
//!     │ server  │    │ normalize │    │ cache+compile│
//!     └─────────┘    └───────────┘    └──────┬───────┘
//!                                            │
//!                                            ▼
//!     ┌─────────┐    ┌───────────┐    ┌──────────────┐
//!     │response │◀───│  render   │◀───│ data sources │
//!     │  html   │    │           │    │broker / json │
//!     └─────────┘    └───────────┘    └──────────────┘
//!
//!     Cross-cutting: config, observability, lifecycle, net (TLS)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use template_server::config::{self, ServerConfig, TlsConfig};
use template_server::data::{DataSource, JsonFileSource};
use template_server::http::{HttpServer, TemplateServer};
use template_server::lifecycle::Shutdown;
use template_server::net;
use template_server::observability::{logging, metrics};

/// Serve a directory of HTML templates over HTTP.
#[derive(Parser, Debug)]
#[command(name = "template-server", version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory of page templates to serve
    #[arg(long, value_name = "DIR")]
    root: Option<String>,

    /// Directory of shared include templates
    #[arg(long, value_name = "DIR")]
    include: Option<String>,

    /// Directory of JSON side files (defaults to the document root)
    #[arg(long, value_name = "DIR")]
    data: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<String>,

    /// TLS certificate file (PEM); requires --key
    #[arg(long, value_name = "FILE")]
    cert: Option<String>,

    /// TLS private key file (PEM); requires --cert
    #[arg(long, value_name = "FILE")]
    key: Option<String>,
}

/// Fold CLI flags over the loaded configuration.
fn apply_flags(config: &mut ServerConfig, args: &Args) -> Result<(), String> {
    if let Some(root) = &args.root {
        config.content.document_root = root.clone();
    }
    if let Some(include) = &args.include {
        config.content.include_root = Some(include.clone());
    }
    if let Some(data) = &args.data {
        config.content.data_root = Some(data.clone());
    }
    if let Some(listen) = &args.listen {
        config.listener.bind_address = listen.clone();
    }
    match (&args.cert, &args.key) {
        (Some(cert), Some(key)) => {
            config.listener.tls = Some(TlsConfig {
                cert_path: cert.clone(),
                key_path: key.clone(),
            });
        }
        (None, None) => {}
        _ => return Err("TLS requires both --cert and --key".to_owned()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => ServerConfig::default(),
    };
    apply_flags(&mut config, &args)?;
    // Flags may introduce their own violations, so validate again.
    config::validate_config(&config).map_err(config::ConfigError::Validation)?;

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "template-server starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        document_root = %config.content.document_root,
        data_root = %config.content.data_root(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let source: Arc<dyn DataSource> = Arc::new(JsonFileSource::new(config.content.data_root()));
    let pages = match &config.content.include_root {
        Some(include_root) => {
            TemplateServer::with_includes(&config.content.document_root, include_root, Some(source))?
        }
        None => TemplateServer::new(&config.content.document_root, Some(source))?,
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(config.clone(), pages);
    match &config.listener.tls {
        Some(tls_config) => {
            let tls = net::load_tls(tls_config).await?;
            server.run_tls(tls, shutdown.signal()).await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            server.run(listener, shutdown.signal()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

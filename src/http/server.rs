//! HTTP server setup and page dispatch.
//!
//! # Responsibilities
//! - Resolve request paths to templates and serve rendered pages
//! - Create the Axum router and wire up middleware
//! - Bind the server to a listener, plain or TLS
//! - Observability (request metrics, correlation IDs)

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware,
    response::Response,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::data::DataSource;
use crate::http::request::{self, RequestId};
use crate::http::response;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::paths;
use crate::routing::Broker;
use crate::templates::{compile_page, IncludeError, IncludeSet, TemplateCache};

/// Errors raised while constructing a [`TemplateServer`].
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("document root {0:?} is not a directory")]
    DocumentRoot(PathBuf),
    #[error(transparent)]
    Includes(#[from] IncludeError),
}

/// Serves every file under a document root through the template
/// engine.
///
/// Works like a static file server except that files are templates:
/// each is compiled on first request, cached for the server lifetime,
/// and rendered per request with data supplied by the configured
/// [`DataSource`].
pub struct TemplateServer {
    root: PathBuf,
    includes: IncludeSet,
    cache: TemplateCache,
    source: Arc<dyn DataSource>,
}

impl TemplateServer {
    /// Creates a server over `root` with no shared includes.
    ///
    /// With no data source the server uses an empty [`Broker`], so
    /// every page renders without data until patterns are registered
    /// on a broker passed in here instead.
    pub fn new(
        root: impl Into<PathBuf>,
        source: Option<Arc<dyn DataSource>>,
    ) -> Result<Self, ServerError> {
        Self::build(root.into(), IncludeSet::empty(), source)
    }

    /// Creates a server over `root` with includes from `include_root`.
    pub fn with_includes(
        root: impl Into<PathBuf>,
        include_root: impl AsRef<Path>,
        source: Option<Arc<dyn DataSource>>,
    ) -> Result<Self, ServerError> {
        let includes = IncludeSet::load(include_root)?;
        Self::build(root.into(), includes, source)
    }

    fn build(
        root: PathBuf,
        includes: IncludeSet,
        source: Option<Arc<dyn DataSource>>,
    ) -> Result<Self, ServerError> {
        if !paths::is_directory(&root) {
            return Err(ServerError::DocumentRoot(root));
        }
        Ok(Self {
            root,
            includes,
            cache: TemplateCache::new(),
            source: source.unwrap_or_else(|| Arc::new(Broker::new())),
        })
    }

    /// Serves one request path to completion.
    ///
    /// The path is normalized, its template fetched from the cache or
    /// compiled, the data source consulted, and the page rendered in
    /// full before any byte of the response is decided. A template that
    /// cannot be compiled answers 404; a page that fails to render
    /// answers 500.
    pub async fn respond(&self, request_path: &str) -> Response {
        let path = paths::request_template_path(request_path);

        let compiled = self
            .cache
            .get_or_compile(&path, || {
                let result = compile_page(&self.root, &self.includes, &path);
                metrics::record_compile(result.is_ok());
                result
            })
            .await;
        let page = match compiled {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "template unavailable");
                return response::not_found();
            }
        };

        let data = self.source.produce(&path);
        match page.render(data.as_deref()) {
            Ok(html) => response::page(html),
            Err(err) => {
                tracing::error!(path = %path, error = %err, "template render failed");
                response::render_error(&err)
            }
        }
    }

    /// The document root pages are served from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Converts the server into an Axum router serving every path.
    pub fn into_router(self) -> Router {
        Router::new()
            .fallback(page_handler)
            .with_state(Arc::new(self))
    }
}

/// HTTP front for a [`TemplateServer`].
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Wraps `pages` with the middleware stack from `config`.
    pub fn new(config: ServerConfig, pages: TemplateServer) -> Self {
        let router = Self::build_router(&config, pages);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServerConfig, pages: TemplateServer) -> Router {
        pages
            .into_router()
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(middleware::from_fn(request::stamp_request_id))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on the configured bind address.
    pub async fn run_tls(self, tls: RustlsConfig, shutdown: ShutdownSignal) -> io::Result<()> {
        let addr: SocketAddr = self
            .config
            .listener
            .bind_address
            .parse()
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let watcher = handle.clone();
        tokio::spawn(async move {
            shutdown.recv().await;
            watcher.graceful_shutdown(Some(Duration::from_secs(5)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Catch-all handler; every path is a page lookup.
async fn page_handler(State(pages): State<Arc<TemplateServer>>, request: Request) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .copied()
        .unwrap_or_else(RequestId::generate);
    let path = request.uri().path().to_owned();

    tracing::debug!(request_id = %request_id, path = %path, "serving page");

    let response = pages.respond(&path).await;
    metrics::record_request(response.status().as_u16(), start_time);
    response
}

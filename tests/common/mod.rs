//! Shared utilities for integration tests.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use tokio::net::TcpListener;

use template_server::config::ServerConfig;
use template_server::http::{HttpServer, TemplateServer};
use template_server::lifecycle::Shutdown;

/// Write `contents` at `relative` under `root`, creating parent
/// directories as needed.
pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Run `pages` on an ephemeral local port.
///
/// The listener is bound before the server task spawns, so requests
/// can be issued immediately. Returns the bound address and the
/// shutdown coordinator that stops the server.
pub async fn spawn_server(pages: TemplateServer) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.signal();
    let server = HttpServer::new(ServerConfig::default(), pages);
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    (addr, shutdown)
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

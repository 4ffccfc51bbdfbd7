//! Template-Driven Page Server Library

pub mod config;
pub mod data;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod paths;
pub mod routing;
pub mod templates;

pub use config::ServerConfig;
pub use data::{DataMap, DataSource};
pub use http::{HttpServer, TemplateServer};
pub use lifecycle::Shutdown;
pub use routing::Broker;

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, page dispatch)
//!     → request.rs (request ID stamping)
//!     → [templates compile & render the page]
//!     → response.rs (HTML, 404, or 500 body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, X_REQUEST_ID};
pub use server::{HttpServer, ServerError, TemplateServer};

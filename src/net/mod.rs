//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → plain: tokio listener handed straight to the HTTP layer
//!     → TLS:   tls.rs loads certificate material, axum-server
//!              terminates the handshake before the HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional and handled transparently
//! - Certificate files are read once at startup; rotation requires a
//!   restart

pub mod tls;

pub use tls::{load_tls, TlsError};

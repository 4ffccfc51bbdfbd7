//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Initialize subsystems → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → Stop accepting → Drain connections → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then the listener
//! - One coordinator fans the shutdown signal out to every server task

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownSignal};

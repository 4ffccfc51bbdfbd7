//! Routing subsystem: maps request paths to data handlers.
//!
//! # Data Flow
//! ```text
//! Registration (any time, any thread):
//!     pattern + handler
//!     → broker.rs (validate, bucket by enclosing directory)
//!     → /docs/         → bucket "/docs/" entries "/docs/", "/docs/index.html"
//!     → /docs/faq.html → bucket "/docs/" entry  "/docs/faq.html"
//!
//! Lookup (per request):
//!     normalized path
//!     → broker.rs resolve (exact match, then directory backtracking)
//!     → Return: matched Entry or no match
//! ```
//!
//! # Design Decisions
//! - Patterns are grouped into per-directory buckets; lookup walks
//!   enclosing directories from the most specific outward
//! - The first directory with any registration decides the outcome;
//!   the walk never continues past it
//! - Registering a directory also claims its directory index page
//! - Invalid and duplicate registrations panic, mirroring the fail-fast
//!   contract of route tables that are wired up at startup

pub mod broker;
pub mod entry;

pub use broker::Broker;
pub use entry::{BrokerFn, Entry};

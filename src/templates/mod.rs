//! Template subsystem: loading, compilation, and caching.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     include root (optional)
//!     → includes.rs (walk, read all shared fragments)
//!     → IncludeSet (immutable for the server lifetime)
//!
//! Per request:
//!     template path
//!     → cache.rs (hit: reuse compiled page)
//!     → compiler.rs (miss: read file, parse with includes)
//!     → CompiledPage (rendered with the request's data map)
//! ```
//!
//! # Design Decisions
//! - Each template file is parsed at most once per server lifetime;
//!   the cache never evicts and never revalidates against disk
//! - Compilation failures are not cached, so a template created after
//!   a failed request is picked up on the next request
//! - Every page compiles into its own engine environment seeded with
//!   the shared includes, keeping pages isolated from each other

pub mod cache;
pub mod compiler;
pub mod includes;

pub use cache::TemplateCache;
pub use compiler::{compile_page, CompileError, CompiledPage};
pub use includes::{IncludeError, IncludeSet};

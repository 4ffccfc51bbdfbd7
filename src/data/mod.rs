//! Data sources that supply render data for pages.
//!
//! # Data Flow
//! ```text
//! request path (normalized)
//!     → DataSource::produce(path)
//!     → Some(map)  → template rendered with the map as context
//!     → None       → template rendered with no context
//! ```
//!
//! # Design Decisions
//! - Sources are shared immutably via `Arc` and must be safe to call
//!   from any worker thread
//! - Produced maps are `Arc`-wrapped so repeated requests for the same
//!   page never copy the data

use std::sync::Arc;

pub mod json;

pub use json::JsonFileSource;

/// JSON object handed to the template engine as the render context.
pub type DataMap = serde_json::Map<String, serde_json::Value>;

/// Supplies the render data for a page.
///
/// `path` is the normalized request path, starting with `/`. Returning
/// `None` means the page renders without data; templates that reference
/// fields then fail at render time.
pub trait DataSource: Send + Sync {
    fn produce(&self, path: &str) -> Option<Arc<DataMap>>;
}

impl<S: DataSource + ?Sized> DataSource for Arc<S> {
    fn produce(&self, path: &str) -> Option<Arc<DataMap>> {
        (**self).produce(path)
    }
}

//! Registered handler forms and their data production rules.

use std::fmt;
use std::sync::Arc;

use tower::BoxError;

use crate::data::{DataMap, DataSource};

/// Handler function registered for a pattern.
///
/// Receives the normalized request path and either produces a data map
/// or fails; failures surface to the page as an `error` field.
pub type BrokerFn = Box<dyn Fn(&str) -> Result<DataMap, BoxError> + Send + Sync>;

/// A handler registered under a pattern.
pub enum Entry {
    /// Marks the pattern as served with no data at all.
    Empty,
    /// The same fixed map for every request.
    Constant(Arc<DataMap>),
    /// A function invoked per request.
    Function(BrokerFn),
    /// Defers to another data source.
    Delegate(Arc<dyn DataSource>),
}

impl Entry {
    /// Produces the data for a request that resolved to this entry.
    ///
    /// Function failures are folded into a single-field map rather than
    /// propagated, so a broken handler shows up in the rendered page
    /// instead of tearing down the request.
    pub fn produce(&self, path: &str) -> Option<Arc<DataMap>> {
        match self {
            Entry::Empty => None,
            Entry::Constant(map) => Some(Arc::clone(map)),
            Entry::Function(handler) => Some(match handler(path) {
                Ok(map) => Arc::new(map),
                Err(err) => {
                    tracing::warn!(path, error = %err, "data handler failed");
                    Arc::new(error_map(&err))
                }
            }),
            Entry::Delegate(source) => source.produce(path),
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Empty => f.write_str("Empty"),
            Entry::Constant(map) => f.debug_tuple("Constant").field(map).finish(),
            Entry::Function(_) => f.write_str("Function(..)"),
            Entry::Delegate(_) => f.write_str("Delegate(..)"),
        }
    }
}

fn error_map(err: &BoxError) -> DataMap {
    let mut map = DataMap::new();
    map.insert(
        "error".to_owned(),
        serde_json::Value::String(err.to_string()),
    );
    map
}

//! Pattern registry with directory backtracking lookup.
//!
//! # Responsibilities
//! - Accept directory and file pattern registrations from any thread
//! - Resolve normalized request paths to the registered entry
//! - Act as the data source for pages when used directly
//!
//! # Design Decisions
//! - Entries are bucketed by their enclosing directory so lookup only
//!   inspects directories on the request path
//! - Lookup takes the read lock, registration the write lock; neither
//!   is ever held while a handler runs
//! - Registration failures panic before the registry is touched, so a
//!   caught panic leaves earlier registrations intact

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::data::{DataMap, DataSource};
use crate::paths;
use crate::routing::entry::Entry;

type Bucket = HashMap<String, Arc<Entry>>;

/// Thread-safe registry mapping path patterns to data handlers.
///
/// Patterns ending in `/` register a directory: the directory answers
/// for every path beneath it that has no more specific registration,
/// and claims its own index page. All other patterns register a single
/// file.
///
/// # Panics
///
/// Registration panics on an empty or relative pattern, on a pattern
/// naming a directory index file directly, and on a duplicate pattern.
#[derive(Default)]
pub struct Broker {
    registry: RwLock<HashMap<String, Bucket>>,
}

impl Broker {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a delegate data source for `pattern`.
    pub fn handle(&self, pattern: &str, source: Arc<dyn DataSource>) {
        self.register(pattern, Entry::Delegate(source));
    }

    /// Registers a per-request handler function for `pattern`.
    pub fn handle_fn<F>(&self, pattern: &str, handler: F)
    where
        F: Fn(&str) -> Result<DataMap, tower::BoxError> + Send + Sync + 'static,
    {
        self.register(pattern, Entry::Function(Box::new(handler)));
    }

    /// Registers a fixed data map for `pattern`.
    pub fn handle_data(&self, pattern: &str, data: DataMap) {
        self.register(pattern, Entry::Constant(Arc::new(data)));
    }

    /// Registers `pattern` as served without data.
    ///
    /// Useful to claim a directory so requests beneath it stop
    /// backtracking without binding any data.
    pub fn handle_empty(&self, pattern: &str) {
        self.register(pattern, Entry::Empty);
    }

    fn register(&self, pattern: &str, entry: Entry) {
        if pattern.is_empty() {
            panic!("broker: empty pattern");
        }
        if !pattern.starts_with('/') {
            panic!("broker: pattern {pattern:?} must start with /");
        }
        let entry = Arc::new(entry);
        if pattern.ends_with('/') {
            self.register_directory(pattern, entry);
        } else {
            self.register_file(pattern, entry);
        }
        tracing::debug!(pattern, "pattern registered");
    }

    fn register_directory(&self, pattern: &str, entry: Arc<Entry>) {
        let index = paths::index_path(pattern);
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        if let Some(bucket) = registry.get(pattern) {
            if bucket.contains_key(pattern) {
                drop(registry);
                panic!("broker: directory {pattern:?} registered twice");
            }
        }
        let bucket = registry.entry(pattern.to_owned()).or_default();
        // A standalone registration for the index page keeps precedence.
        let claim_index = !bucket.contains_key(&index);
        bucket.insert(pattern.to_owned(), Arc::clone(&entry));
        if claim_index {
            bucket.insert(index, entry);
        }
    }

    fn register_file(&self, pattern: &str, entry: Arc<Entry>) {
        if pattern.rsplit('/').next() == Some(paths::DIRECTORY_INDEX) {
            panic!("broker: {pattern:?} is a directory index, register the directory");
        }
        let dir = paths::parent_dir(pattern).to_owned();
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        if registry
            .get(&dir)
            .is_some_and(|bucket| bucket.contains_key(pattern))
        {
            drop(registry);
            panic!("broker: file {pattern:?} registered twice");
        }
        registry.entry(dir).or_default().insert(pattern.to_owned(), entry);
    }

    /// Resolves a normalized path to its registered entry.
    ///
    /// A path ending in `/` resolves as a directory: its own entry if
    /// present, otherwise its index entry. Any other path resolves as a
    /// file: the enclosing directories are walked from the innermost
    /// outward, and the first directory holding any registration
    /// decides the outcome. Within that directory an exact match wins;
    /// otherwise the directory resolves for itself. Directories further
    /// out are never consulted.
    pub fn resolve(&self, path: &str) -> Option<Arc<Entry>> {
        let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
        if path.ends_with('/') {
            return Self::resolve_directory(&registry, path);
        }
        let mut dir = paths::parent_dir(path);
        loop {
            if let Some(bucket) = registry.get(dir) {
                if let Some(entry) = bucket.get(path) {
                    return Some(Arc::clone(entry));
                }
                return Self::resolve_directory(&registry, dir);
            }
            if dir == "/" {
                return None;
            }
            dir = paths::parent_dir(dir);
        }
    }

    fn resolve_directory(registry: &HashMap<String, Bucket>, dir: &str) -> Option<Arc<Entry>> {
        let bucket = registry.get(dir)?;
        if let Some(entry) = bucket.get(dir) {
            return Some(Arc::clone(entry));
        }
        bucket.get(paths::index_path(dir).as_str()).cloned()
    }
}

impl DataSource for Broker {
    /// Resolves the path and lets the matched entry produce the data.
    ///
    /// The registry lock is released before the entry runs, so handlers
    /// may register further patterns or delegate back into the broker.
    fn produce(&self, path: &str) -> Option<Arc<DataMap>> {
        let entry = self.resolve(path)?;
        entry.produce(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn map_with(key: &str, value: &str) -> DataMap {
        let mut map = DataMap::new();
        map.insert(key.to_owned(), value.into());
        map
    }

    fn title_of(broker: &Broker, path: &str) -> Option<String> {
        broker
            .produce(path)
            .and_then(|map| map.get("title").cloned())
            .and_then(|value| value.as_str().map(str::to_owned))
    }

    #[test]
    fn test_directory_answers_for_paths_beneath_it() {
        let broker = Broker::new();
        broker.handle_data("/docs/", map_with("title", "Docs"));

        assert_eq!(title_of(&broker, "/docs/anything.html").unwrap(), "Docs");
        assert_eq!(title_of(&broker, "/docs/").unwrap(), "Docs");
        assert_eq!(title_of(&broker, "/docs/index.html").unwrap(), "Docs");
    }

    #[test]
    fn test_exact_file_beats_enclosing_directory() {
        let broker = Broker::new();
        broker.handle_data("/docs/", map_with("title", "Docs"));
        broker.handle_data("/docs/special.html", map_with("title", "Special"));

        assert_eq!(title_of(&broker, "/docs/special.html").unwrap(), "Special");
        assert_eq!(title_of(&broker, "/docs/other.html").unwrap(), "Docs");
    }

    #[test]
    fn test_unregistered_directory_has_no_match() {
        let broker = Broker::new();
        broker.handle_data("/docs/", map_with("title", "Docs"));

        assert!(broker.resolve("/unknown/").is_none());
    }

    #[test]
    fn test_walk_stops_at_first_registered_directory() {
        let broker = Broker::new();
        broker.handle_data("/", map_with("title", "Root"));
        broker.handle_data("/docs/special.html", map_with("title", "Special"));

        // "/docs/" holds a registration, so it decides for its other
        // files even though it cannot answer itself.
        assert!(broker.resolve("/docs/other.html").is_none());
        assert_eq!(title_of(&broker, "/docs/special.html").unwrap(), "Special");
        assert_eq!(title_of(&broker, "/elsewhere.html").unwrap(), "Root");
    }

    #[test]
    fn test_backtracks_to_nearest_registered_ancestor() {
        let broker = Broker::new();
        broker.handle_data("/", map_with("title", "Root"));
        broker.handle_data("/a/b/", map_with("title", "Deep"));

        assert_eq!(title_of(&broker, "/a/b/c/d.html").unwrap(), "Deep");
        assert_eq!(title_of(&broker, "/a/x.html").unwrap(), "Root");
    }

    #[test]
    fn test_directory_registration_claims_index() {
        let broker = Broker::new();
        broker.handle_data("/sub/", map_with("title", "Sub"));

        assert_eq!(title_of(&broker, "/sub/index.html").unwrap(), "Sub");
    }

    #[test]
    fn test_index_claims_are_per_directory() {
        let broker = Broker::new();
        broker.handle_data("/", map_with("title", "Front"));
        broker.handle_data("/other/", map_with("title", "Other"));

        assert_eq!(title_of(&broker, "/index.html").unwrap(), "Front");
        assert_eq!(title_of(&broker, "/other/index.html").unwrap(), "Other");
    }

    #[test]
    fn test_empty_entry_matches_without_data() {
        let broker = Broker::new();
        broker.handle_empty("/static/");

        assert!(broker.resolve("/static/style.css").is_some());
        assert!(broker.produce("/static/style.css").is_none());
    }

    #[test]
    fn test_delegate_and_function_registrations() {
        let broker = Broker::new();
        let inner = Broker::new();
        inner.handle_data("/wiki/", map_with("title", "Wiki"));
        broker.handle("/wiki/", Arc::new(inner));
        broker.handle_fn("/api.html", |path| Ok(map_with("title", path)));

        assert_eq!(title_of(&broker, "/wiki/page.html").unwrap(), "Wiki");
        assert_eq!(title_of(&broker, "/api.html").unwrap(), "/api.html");
    }

    #[test]
    #[should_panic(expected = "empty pattern")]
    fn test_empty_pattern_panics() {
        Broker::new().handle_empty("");
    }

    #[test]
    #[should_panic(expected = "must start with /")]
    fn test_relative_pattern_panics() {
        Broker::new().handle_empty("docs/");
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_directory_panics() {
        let broker = Broker::new();
        broker.handle_empty("/docs/");
        broker.handle_empty("/docs/");
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_file_panics() {
        let broker = Broker::new();
        broker.handle_empty("/docs/faq.html");
        broker.handle_empty("/docs/faq.html");
    }

    #[test]
    #[should_panic(expected = "register the directory")]
    fn test_index_file_pattern_panics() {
        Broker::new().handle_empty("/docs/index.html");
    }

    #[test]
    fn test_registry_survives_rejected_registration() {
        let broker = Broker::new();
        broker.handle_data("/docs/", map_with("title", "Docs"));

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            broker.handle_data("/docs/", map_with("title", "Again"));
        }));
        assert!(outcome.is_err());

        // The earlier registration still resolves and new ones land.
        assert_eq!(title_of(&broker, "/docs/page.html").unwrap(), "Docs");
        broker.handle_data("/fresh.html", map_with("title", "Fresh"));
        assert_eq!(title_of(&broker, "/fresh.html").unwrap(), "Fresh");
    }
}

//! Data source backed by JSON side files on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::data::{DataMap, DataSource};

/// Extension appended to a page path to locate its side file.
const SIDE_FILE_SUFFIX: &str = ".data";

/// Serves render data from JSON side files under a data root: for a
/// page at `/docs/page.html` the source reads
/// `<root>/docs/page.html.data` and parses it as a JSON object.
///
/// Parsed objects are cached for the lifetime of the source, so each
/// side file is read at most once. Missing or malformed files yield no
/// data rather than an error.
pub struct JsonFileSource {
    root: PathBuf,
    cache: DashMap<String, Arc<DataMap>>,
}

impl JsonFileSource {
    /// Creates a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: DashMap::new(),
        }
    }

    /// The directory searched for side files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn side_file(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches('/');
        self.root.join(format!("{relative}{SIDE_FILE_SUFFIX}"))
    }

    fn load(&self, path: &str) -> Option<Arc<DataMap>> {
        let file = self.side_file(path);
        let raw = match fs::read_to_string(&file) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(path, file = %file.display(), error = %err, "no side data");
                return None;
            }
        };
        match serde_json::from_str::<DataMap>(&raw) {
            Ok(map) => Some(Arc::new(map)),
            Err(err) => {
                tracing::warn!(path, file = %file.display(), error = %err, "malformed side data");
                None
            }
        }
    }
}

impl DataSource for JsonFileSource {
    fn produce(&self, path: &str) -> Option<Arc<DataMap>> {
        if let Some(hit) = self.cache.get(path) {
            return Some(Arc::clone(hit.value()));
        }
        let map = self.load(path)?;
        self.cache.insert(path.to_owned(), Arc::clone(&map));
        Some(map)
    }
}

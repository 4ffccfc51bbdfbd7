//! Shared template fragments loaded from an include root.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::paths;

/// Errors raised while loading an include root.
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("include root {0:?} is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to walk include root")]
    Walk(#[from] walkdir::Error),
    #[error("failed to read include {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Template sources shared with every page.
///
/// The include root is walked once at construction and every file
/// beneath it, at any depth, becomes available to pages under its
/// root-relative name with `/` separators.
#[derive(Default)]
pub struct IncludeSet {
    templates: Vec<(String, String)>,
}

impl IncludeSet {
    /// An include set with no templates.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads every file under `root` into the set.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, IncludeError> {
        let root = root.as_ref();
        if !paths::is_directory(root) {
            return Err(IncludeError::NotADirectory(root.to_path_buf()));
        }
        let mut templates = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let source =
                fs::read_to_string(entry.path()).map_err(|err| IncludeError::Read {
                    path: entry.path().to_path_buf(),
                    source: err,
                })?;
            templates.push((relative_name(root, entry.path()), source));
        }
        tracing::debug!(root = %root.display(), count = templates.len(), "includes loaded");
        Ok(Self { templates })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterates over `(name, source)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates
            .iter()
            .map(|(name, source)| (name.as_str(), source.as_str()))
    }
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

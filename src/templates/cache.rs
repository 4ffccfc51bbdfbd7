//! Lazily filled cache of compiled pages.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::templates::compiler::{CompileError, CompiledPage};

/// Concurrency-safe map from template path to compiled page.
///
/// The cache fills on first request per path and never evicts. When
/// several requests miss on the same path at once, exactly one of them
/// compiles while the rest wait on the write lock; the losers then find
/// the winner's entry and adopt it. Failed compilations leave no entry
/// behind, so later requests retry.
#[derive(Default)]
pub struct TemplateCache {
    pages: RwLock<HashMap<String, Arc<CompiledPage>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled page for `path`, invoking `compile` on a
    /// cache miss.
    ///
    /// `compile` runs with the write lock held so the parse-once
    /// guarantee holds across racing requests. Lookups in flight block
    /// for the duration of one compilation at most.
    pub async fn get_or_compile<F>(
        &self,
        path: &str,
        compile: F,
    ) -> Result<Arc<CompiledPage>, CompileError>
    where
        F: FnOnce() -> Result<CompiledPage, CompileError>,
    {
        if let Some(page) = self.pages.read().await.get(path) {
            return Ok(Arc::clone(page));
        }

        let mut pages = self.pages.write().await;
        if let Some(page) = pages.get(path) {
            // Lost the race; the winner already compiled this path.
            return Ok(Arc::clone(page));
        }
        let page = Arc::new(compile()?);
        pages.insert(path.to_owned(), Arc::clone(&page));
        Ok(page)
    }

    /// Number of compiled pages currently held.
    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }
}

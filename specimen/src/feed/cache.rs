//! Process-wide cache of loaded feed rows
//!
//! Entries are never evicted. When two callers load the same source concurrently both may run the
//! loader; the first insert wins and every caller gets that copy.

use std::sync::Arc;
use std::sync::LazyLock;

use dashmap::DashMap;
use tracing::debug;

use super::rows::Rows;
use super::rows::SourceKey;
use super::source::DataSource;
use crate::error::Result;

/// Cache shared by every call that does not inject its own
static GLOBAL_FEED_CACHE: LazyLock<Arc<FeedCache>> = LazyLock::new(|| Arc::new(FeedCache::new()));

/// Loaded rows by source key
#[derive(Debug, Default)]
pub struct FeedCache {
    entries: DashMap<SourceKey, Arc<Rows>>,
}

impl FeedCache {
    /// Empty cache, independent of the global one
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The process-wide instance
    pub fn global() -> Arc<Self> { Arc::clone(&GLOBAL_FEED_CACHE) }

    /// Rows already loaded for `key`
    pub fn get(&self, key: &SourceKey) -> Option<Arc<Rows>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Cached rows for `source`, loading them on first use
    pub fn get_or_load(&self, source: &dyn DataSource) -> Result<Arc<Rows>> {
        let key = source.key();
        if let Some(cached) = self.get(&key) {
            return Ok(cached);
        }

        let loaded = Arc::new(source.load()?);
        debug!(source = %key, rows = loaded.len(), "Loaded feed rows");
        let entry = self.entries.entry(key).or_insert(loaded);
        Ok(Arc::clone(entry.value()))
    }

    /// Number of cached sources
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether there is nothing
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

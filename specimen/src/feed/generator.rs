//! Leaf generator reading one property from feed rows

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use anyhow::anyhow;
use anyhow::bail;
use serde_json::Value as JsonValue;

use super::cache::FeedCache;
use super::source::DataSource;
use crate::generation::Generator;
use crate::generation::Random;

/// How a [`FeedGenerator`] walks its rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowSelection {
    /// In order, wrapping around at the end
    #[default]
    Sequential,
    /// Uniformly, with replacement
    Random,
}

/// Leaf generator reading one property from a cached data source
pub struct FeedGenerator {
    cache:     Arc<FeedCache>,
    source:    Arc<dyn DataSource>,
    property:  String,
    tag:       Option<String>,
    selection: RowSelection,
    cursor:    AtomicUsize,
}

impl FeedGenerator {
    /// Read `property` from `source` through the process-wide cache
    pub fn new(source: Arc<dyn DataSource>, property: impl Into<String>) -> Self {
        Self {
            cache: FeedCache::global(),
            source,
            property: property.into(),
            tag: None,
            selection: RowSelection::Sequential,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Use `cache` instead of the process-wide one
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<FeedCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Only use rows carrying this tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Row order; sequential by default
    #[must_use]
    pub const fn with_selection(mut self, selection: RowSelection) -> Self {
        self.selection = selection;
        self
    }
}

impl Generator for FeedGenerator {
    fn generate(&self, random: &mut Random) -> anyhow::Result<JsonValue> {
        let rows = self
            .cache
            .get_or_load(self.source.as_ref())
            .map_err(|report| anyhow!("{report:?}"))?;
        let Some(column) = rows.property_index(&self.property) else {
            bail!("feed {} has no property {}", self.source.key(), self.property);
        };
        let candidates: Vec<_> = rows.rows_for_tag(self.tag.as_deref()).collect();
        if candidates.is_empty() {
            bail!(
                "feed {} has no rows for tag {}",
                self.source.key(),
                self.tag.as_deref().unwrap_or("<any>")
            );
        }
        let index = match self.selection {
            RowSelection::Sequential => self.cursor.fetch_add(1, Ordering::Relaxed) % candidates.len(),
            RowSelection::Random => random.usize_range(0, candidates.len() - 1),
        };
        Ok(candidates[index]
            .values
            .get(column)
            .cloned()
            .unwrap_or(JsonValue::Null))
    }
}

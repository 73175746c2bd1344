//! Where feed rows come from

use super::rows::Rows;
use super::rows::SourceKey;
use crate::error::Result;

/// An external store of rows used as a leaf value source
pub trait DataSource: Send + Sync {
    /// Cache key; sources with equal keys share one cache entry
    fn key(&self) -> SourceKey;

    /// Read every row; called once per key per cache
    fn load(&self) -> Result<Rows>;
}

/// Rows held in memory
#[derive(Debug, Clone)]
pub struct StaticDataSource {
    key:  SourceKey,
    rows: Rows,
}

impl StaticDataSource {
    /// Source serving `rows` under `key`
    pub fn new(key: impl Into<SourceKey>, rows: Rows) -> Self {
        Self {
            key: key.into(),
            rows,
        }
    }
}

impl DataSource for StaticDataSource {
    fn key(&self) -> SourceKey { self.key.clone() }

    fn load(&self) -> Result<Rows> { Ok(self.rows.clone()) }
}

//! Feeds: rows from external data sources used as leaf values
//!
//! Loading goes through a [`FeedCache`], either the process-wide one or one injected by the
//! caller, so each source is loaded once per cache.

mod cache;
mod generator;
mod rows;
mod source;


pub use cache::FeedCache;
pub use generator::FeedGenerator;
pub use generator::RowSelection;
pub use rows::Row;
pub use rows::Rows;
pub use rows::SourceKey;
pub use source::DataSource;
pub use source::StaticDataSource;

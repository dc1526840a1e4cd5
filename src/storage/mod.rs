//! Storage abstractions for review persistence.
//!
//! One table per crawled category:
//!
//! ```text
//! output/
//! ├── 三体_刘慈欣_读过评论_20260118_142501.csv
//! └── 三体_刘慈欣_想读评论_20260118_142501.csv
//! ```

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::Result;
use crate::models::{Category, ItemInfo, Record};

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// File that was written
    pub path: PathBuf,
    /// Number of rows written
    pub count: usize,
    /// Timestamp encoded in the file name
    pub timestamp: DateTime<Local>,
}

/// Trait for review storage backends.
#[async_trait]
pub trait ReviewStorage: Send + Sync {
    /// Persist the records of one category.
    ///
    /// Returns `None` without touching the backend when `records` is empty.
    async fn write_reviews(
        &self,
        item: &ItemInfo,
        category: Category,
        records: &[Record],
    ) -> Result<Option<WriteMetadata>>;
}

//! Local filesystem storage implementation.
//!
//! Writes each category as a UTF-8 CSV file named after the item title,
//! author, category label and the write time.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{Category, ItemInfo, Record, RecordRow};
use crate::storage::{ReviewStorage, WriteMetadata};
use crate::utils::sanitize_filename;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// File name for one category export.
    pub fn file_name(item: &ItemInfo, category: Category, timestamp: &DateTime<Local>) -> String {
        format!(
            "{}_{}_{}评论_{}.csv",
            sanitize_filename(&item.title),
            sanitize_filename(&item.author),
            category.label(),
            timestamp.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

/// Serialize records as CSV with a header row.
pub fn to_csv(records: &[Record]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(RecordRow::from(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}

#[async_trait]
impl ReviewStorage for LocalStorage {
    async fn write_reviews(
        &self,
        item: &ItemInfo,
        category: Category,
        records: &[Record],
    ) -> Result<Option<WriteMetadata>> {
        if records.is_empty() {
            log::info!("[{}] No reviews to save", category);
            return Ok(None);
        }

        let timestamp = Local::now();
        let path = self
            .root_dir
            .join(Self::file_name(item, category, &timestamp));
        let bytes = to_csv(records)?;
        self.write_bytes(&path, &bytes).await?;

        log::info!(
            "[{}] Saved {} reviews to {}",
            category,
            records.len(),
            path.display()
        );

        Ok(Some(WriteMetadata {
            path,
            count: records.len(),
            timestamp,
        }))
    }
}

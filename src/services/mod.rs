//! Service layer for the review crawler.
//!
//! This module contains the business logic for:
//! - HTTP session handling (`SessionClient`)
//! - Item metadata and category totals (`MetadataFetcher`)
//! - Review markup extraction (`RecordExtractor`)
//! - The pagination loop (`ReviewCrawler`)

mod extractor;
mod metadata;
mod reviews;
mod session;

use scraper::Selector;

use crate::error::{AppError, Result};

pub use extractor::RecordExtractor;
pub use metadata::{MetadataFetcher, parse_category_counts, parse_item_info};
pub use reviews::{
    CrawlOutcome, CrawlState, PageResult, ReviewCrawler, StopReason, should_stop, stop_reason,
};
pub use session::{DelayRange, PageFetcher, SessionClient};

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

//! Pipeline entry points for crawler operations.
//!
//! - `fetch_metadata`: Item title/author and per-category totals
//! - `run_crawler`: Crawl each category and export the results

pub mod crawl;

pub use crawl::{CategoryReport, CrawlSummary, fetch_metadata, run_crawler};

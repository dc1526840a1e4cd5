// src/pipeline/crawl.rs

//! Review crawling pipeline.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Category, CategoryCounts, Config, ItemInfo};
use crate::services::{CrawlOutcome, MetadataFetcher, PageFetcher, ReviewCrawler, StopReason};
use crate::storage::{ReviewStorage, WriteMetadata};

/// Per-category result of a pipeline run.
#[derive(Debug)]
pub struct CategoryReport {
    pub category: Category,
    pub reported_total: usize,
    pub limit: usize,
    pub collected: usize,
    pub pages: usize,
    pub stop: StopReason,
    /// `None` when nothing was collected or the export failed
    pub written: Option<WriteMetadata>,
    pub export_failed: bool,
}

/// Summary of a crawl run.
#[derive(Debug)]
pub struct CrawlSummary {
    pub item: ItemInfo,
    pub counts: CategoryCounts,
    pub categories: Vec<CategoryReport>,
}

impl CrawlSummary {
    /// Total reviews collected across categories.
    pub fn collected(&self) -> usize {
        self.categories.iter().map(|c| c.collected).sum()
    }
}

/// Fetch item metadata and category totals.
///
/// Failures here are startup failures and propagate to the caller.
pub async fn fetch_metadata(
    config: &Config,
    fetcher: Arc<dyn PageFetcher>,
    item_id: &str,
) -> Result<(ItemInfo, CategoryCounts)> {
    let metadata = MetadataFetcher::new(fetcher, config.crawler.base());

    let item = metadata.fetch_item_info(item_id).await?;
    log::info!("Title: {}", item.title);
    log::info!("Author: {}", item.author);

    let counts = metadata.fetch_category_counts(item_id).await?;
    for (category, count) in &counts {
        log::info!("{} ({}): {} reviews", category, category.label(), count);
    }

    Ok((item, counts))
}

/// Crawl every requested category of `item_id` and export the results.
///
/// Categories are crawled once each, in crawl order; those missing from the
/// reported totals are skipped. Each category is exported as soon as its
/// crawl ends, and a failing category never aborts its siblings.
pub async fn run_crawler(
    config: &Config,
    fetcher: Arc<dyn PageFetcher>,
    storage: &dyn ReviewStorage,
    item_id: &str,
    categories: &[Category],
) -> Result<CrawlSummary> {
    let (item, counts) = fetch_metadata(config, Arc::clone(&fetcher), item_id).await?;
    let crawler = ReviewCrawler::new(fetcher, config.crawler.base())?;

    if config.is_authenticated() {
        log::info!("Authenticated: crawling every reported review");
    } else {
        log::info!(
            "Anonymous: at most {} reviews per category",
            config.crawler.unauthenticated_limit
        );
    }

    let requested: BTreeSet<Category> = categories.iter().copied().collect();
    let jobs: Vec<(Category, usize)> = requested
        .into_iter()
        .filter_map(|category| match counts.get(&category) {
            Some(&total) => Some((category, total)),
            None => {
                log::warn!("[{}] No reported total; skipping", category);
                None
            }
        })
        .collect();

    let concurrency = config.crawler.max_concurrent.max(1);
    let crawler = &crawler;
    let item = &item;
    let reports: Vec<CategoryReport> = stream::iter(jobs)
        .map(|(category, total)| async move {
            let limit = config.crawl_limit(total);
            log::info!("[{}] Crawling up to {} reviews", category, limit);
            let outcome = crawler.crawl(item_id, category, limit).await;
            export(storage, item, total, limit, outcome).await
        })
        .buffered(concurrency)
        .collect()
        .await;

    Ok(CrawlSummary {
        item: item.clone(),
        counts,
        categories: reports,
    })
}

/// Write one finished category and build its report.
///
/// Export failures are logged and reported, never propagated.
async fn export(
    storage: &dyn ReviewStorage,
    item: &ItemInfo,
    reported_total: usize,
    limit: usize,
    outcome: CrawlOutcome,
) -> CategoryReport {
    let (written, export_failed) = match storage
        .write_reviews(item, outcome.category, &outcome.records)
        .await
    {
        Ok(written) => (written, false),
        Err(e) => {
            log::error!("[{}] Failed to save reviews: {}", outcome.category, e);
            (None, true)
        }
    };

    CategoryReport {
        category: outcome.category,
        reported_total,
        limit,
        collected: outcome.records.len(),
        pages: outcome.pages,
        stop: outcome.stop,
        written,
        export_failed,
    }
}

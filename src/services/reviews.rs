// src/services/reviews.rs

//! Review crawl controller.
//!
//! Walks the paginated review listing of one item/category. Pages are
//! fetched strictly in order because each cursor depends on how many
//! records the previous page produced.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Category, PAGE_SIZE, Record};
use crate::services::{PageFetcher, RecordExtractor};

/// JSON envelope returned by the `comments_only=1` endpoint.
#[derive(Debug, Deserialize)]
struct CommentsEnvelope {
    r: i64,
    /// Missing or `null` once the listing is exhausted
    #[serde(default)]
    html: Option<String>,
}

/// Records extracted from one fetched page.
#[derive(Debug, Clone, Default)]
pub struct PageResult {
    pub records: Vec<Record>,
    pub success: bool,
}

impl PageResult {
    pub fn fetched(records: Vec<Record>) -> Self {
        Self {
            records,
            success: true,
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    /// Number of records the extractor produced for this page.
    pub fn extracted(&self) -> usize {
        self.records.len()
    }
}

/// Mutable state of one category crawl.
#[derive(Debug, Default)]
pub struct CrawlState {
    /// Value of the next `start` parameter
    pub offset: usize,
    /// Pages requested so far, failed ones included
    pub pages: usize,
    seen: HashSet<String>,
    records: Vec<Record>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct records kept.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Fold a page into the state and return how many records were new.
    ///
    /// Known ids are ignored and nothing is kept past `limit`, but the cursor
    /// always moves by the full extracted count so no source record is skipped.
    pub fn absorb(&mut self, page: &PageResult, limit: usize) -> usize {
        self.pages += 1;
        let mut inserted = 0;
        for record in &page.records {
            if self.records.len() >= limit {
                break;
            }
            if self.seen.insert(record.id.clone()) {
                self.records.push(record.clone());
                inserted += 1;
            }
        }
        self.offset += page.extracted();
        inserted
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Why a category crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Transport error, non-zero envelope status or malformed envelope
    FetchFailed,
    /// The page produced no records
    EmptyPage,
    /// The page produced fewer than `PAGE_SIZE` records
    ShortPage,
    /// `limit` records collected
    LimitReached,
}

/// Stop condition evaluated after a page has been absorbed.
pub fn stop_reason(page: &PageResult, state: &CrawlState, limit: usize) -> Option<StopReason> {
    if !page.success {
        Some(StopReason::FetchFailed)
    } else if page.extracted() == 0 {
        Some(StopReason::EmptyPage)
    } else if page.extracted() < PAGE_SIZE {
        Some(StopReason::ShortPage)
    } else if state.len() >= limit {
        Some(StopReason::LimitReached)
    } else {
        None
    }
}

/// Whether the crawl must end after `page`.
pub fn should_stop(page: &PageResult, state: &CrawlState, limit: usize) -> bool {
    stop_reason(page, state, limit).is_some()
}

/// Result of one category crawl.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub category: Category,
    pub records: Vec<Record>,
    pub pages: usize,
    pub offset: usize,
    pub stop: StopReason,
}

/// Service driving the pagination loop for one item.
pub struct ReviewCrawler {
    fetcher: Arc<dyn PageFetcher>,
    extractor: RecordExtractor,
    base_url: String,
}

impl ReviewCrawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            fetcher,
            extractor: RecordExtractor::new()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Collect up to `limit` distinct reviews of `item_id` in `category`.
    ///
    /// Failures end the loop but keep whatever was collected before them.
    pub async fn crawl(&self, item_id: &str, category: Category, limit: usize) -> CrawlOutcome {
        let mut state = CrawlState::new();

        let stop = loop {
            if state.len() >= limit {
                break StopReason::LimitReached;
            }

            let page_no = state.pages + 1;
            let start = state.offset;
            let page = match self.fetch_page(item_id, category, start).await {
                Ok(page) => page,
                Err(e) => {
                    log::warn!(
                        "[{}] Failed to fetch page {} (start={}): {}",
                        category,
                        page_no,
                        start,
                        e
                    );
                    PageResult::failed()
                }
            };

            let inserted = state.absorb(&page, limit);
            if page.success {
                log::info!(
                    "[{}] Page {} (start={}): {} reviews, {} new, {} total",
                    category,
                    page_no,
                    start,
                    page.extracted(),
                    inserted,
                    state.len()
                );
            }

            if let Some(reason) = stop_reason(&page, &state, limit) {
                break reason;
            }
        };

        log::info!(
            "[{}] Stopped after {} page(s): {:?}, {} reviews kept",
            category,
            state.pages,
            stop,
            state.len()
        );

        CrawlOutcome {
            category,
            pages: state.pages,
            offset: state.offset,
            stop,
            records: state.into_records(),
        }
    }

    /// Fetch and extract one page starting at `offset`.
    async fn fetch_page(
        &self,
        item_id: &str,
        category: Category,
        offset: usize,
    ) -> Result<PageResult> {
        let ck = self.fetcher.ck_token();
        let url = self.page_url(item_id, category, offset, ck.as_deref())?;
        let referer = self.referer_url(item_id, category, offset)?;

        let body = self.fetcher.get(url.as_str(), Some(referer.as_str())).await?;
        let envelope: CommentsEnvelope = serde_json::from_str(&body)
            .map_err(|e| AppError::parse(format!("{category} start={offset}"), e))?;

        if envelope.r != 0 {
            return Err(AppError::parse(
                format!("{category} start={offset}"),
                format!("source returned r={}", envelope.r),
            ));
        }
        let html = envelope.html.as_deref().unwrap_or("");
        if html.trim().is_empty() {
            log::debug!("[{}] Empty page at start={}", category, offset);
            return Ok(PageResult::fetched(Vec::new()));
        }

        Ok(PageResult::fetched(self.extractor.extract(html)))
    }

    fn comments_url(&self, item_id: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/subject/{}/comments/",
            self.base_url, item_id
        ))?)
    }

    /// URL of the JSON listing endpoint; the first page carries no `start`.
    pub fn page_url(
        &self,
        item_id: &str,
        category: Category,
        offset: usize,
        ck: Option<&str>,
    ) -> Result<Url> {
        let mut url = self.comments_url(item_id)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("percent_type", "");
            if offset > 0 {
                query.append_pair("start", &offset.to_string());
            }
            query
                .append_pair("limit", &PAGE_SIZE.to_string())
                .append_pair("status", category.status_code())
                .append_pair("sort", "score")
                .append_pair("comments_only", "1");
            if let Some(ck) = ck {
                query.append_pair("ck", ck);
            }
        }
        Ok(url)
    }

    /// Human-facing URL of the same page, sent as `Referer`.
    pub fn referer_url(&self, item_id: &str, category: Category, offset: usize) -> Result<Url> {
        let mut url = self.comments_url(item_id)?;
        {
            let mut query = url.query_pairs_mut();
            if offset > 0 {
                query.append_pair("start", &offset.to_string());
            }
            query
                .append_pair("limit", &PAGE_SIZE.to_string())
                .append_pair("status", category.status_code())
                .append_pair("sort", "score");
        }
        Ok(url)
    }
}

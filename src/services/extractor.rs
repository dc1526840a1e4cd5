// src/services/extractor.rs

//! Record extractor.
//!
//! Maps one page of review markup to an ordered list of [`Record`]s. The
//! extractor is pure: the same markup always yields the same records, and a
//! malformed review never aborts the rest of the page.

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::{Rating, Record};
use crate::services::parse_selector;

const TIME_LINK_CLASS: &str = "comment-time";

/// Compiled selectors for the review list markup.
pub struct RecordExtractor {
    item: Selector,
    info: Selector,
    link: Selector,
    rating: Selector,
    content_short: Selector,
    time: Selector,
    location: Selector,
    vote_count: Selector,
}

impl RecordExtractor {
    /// Compile the review selectors.
    pub fn new() -> Result<Self> {
        Ok(Self {
            item: parse_selector("li.comment-item")?,
            info: parse_selector("span.comment-info")?,
            link: parse_selector("a")?,
            rating: parse_selector("span.rating")?,
            content_short: parse_selector("p.comment-content span.short")?,
            time: parse_selector("a.comment-time")?,
            location: parse_selector("span.comment-location")?,
            vote_count: parse_selector("span.vote-count")?,
        })
    }

    /// Extract every review with an identifier from `html`, in document order.
    pub fn extract(&self, html: &str) -> Vec<Record> {
        let document = Html::parse_fragment(html);

        let mut records = Vec::new();
        for (index, item) in document.select(&self.item).enumerate() {
            match parse_item(&item, self) {
                Some(record) => records.push(record),
                None => log::debug!("Skipping review #{} without data-cid", index + 1),
            }
        }
        records
    }
}

fn parse_item(item: &ElementRef, sel: &RecordExtractor) -> Option<Record> {
    let id = item
        .value()
        .attr("data-cid")
        .map(str::trim)
        .filter(|id| !id.is_empty())?
        .to_string();

    let (author, author_profile_url) = match author_link(item, sel) {
        Some(link) => (
            Some(text_of(&link)),
            Some(link.value().attr("href").unwrap_or("").to_string()),
        ),
        None => (None, None),
    };

    let time_link = item.select(&sel.time).next();
    let posted_at = time_link.as_ref().map(text_of).unwrap_or_default();
    let permalink = time_link.map(|link| link.value().attr("href").unwrap_or("").to_string());

    let location = item
        .select(&sel.location)
        .next()
        .map(|el| text_of(&el))
        .filter(|text| !text.is_empty());

    let helpful_count = item
        .select(&sel.vote_count)
        .next()
        .and_then(|el| text_of(&el).parse().ok())
        .unwrap_or(0);

    Some(Record {
        id,
        author,
        author_profile_url,
        rating: rating_of(item, sel),
        body: item
            .select(&sel.content_short)
            .next()
            .map(|el| text_of(&el))
            .unwrap_or_default(),
        posted_at,
        permalink,
        location,
        helpful_count,
    })
}

/// First link in the info region that is not the timestamp.
fn author_link<'a>(item: &ElementRef<'a>, sel: &RecordExtractor) -> Option<ElementRef<'a>> {
    let info = item.select(&sel.info).next()?;
    info.select(&sel.link)
        .find(|link| !link.value().classes().any(|c| c == TIME_LINK_CLASS))
}

fn rating_of(item: &ElementRef, sel: &RecordExtractor) -> Rating {
    item.select(&sel.rating)
        .next()
        .and_then(|el| {
            el.value()
                .classes()
                .find(|c| c.starts_with(Rating::CLASS_PREFIX))
        })
        .and_then(Rating::from_class)
        .unwrap_or(Rating::Unrated)
}

fn text_of(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

// src/services/metadata.rs

//! Metadata fetcher.
//!
//! Reads the item title/author and the per-category review totals. Missing
//! data falls back to defaults; only transport failures are errors.

use std::sync::Arc;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::Result;
use crate::models::{Category, CategoryCounts, ItemInfo};
use crate::services::{PageFetcher, parse_selector};

/// Matches tab labels such as `读过(4916)`.
const TAB_LABEL_PATTERN: &str = r"(读过|在读|想读)\((\d+)\)";

/// Service for fetching item attributes and category totals.
pub struct MetadataFetcher {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl MetadataFetcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch title and author from the item detail page.
    pub async fn fetch_item_info(&self, item_id: &str) -> Result<ItemInfo> {
        let url = format!("{}/subject/{}/", self.base_url, item_id);
        let html = self.fetcher.get(&url, None).await?;
        let (title, author) = parse_item_info(&html)?;

        if title.is_empty() {
            log::warn!("No title found for item {}", item_id);
        }
        if author.is_empty() {
            log::warn!("No author found for item {}", item_id);
        }

        Ok(ItemInfo {
            item_id: item_id.to_string(),
            title,
            author,
        })
    }

    /// Fetch the total number of reviews per category.
    pub async fn fetch_category_counts(&self, item_id: &str) -> Result<CategoryCounts> {
        let url = format!("{}/subject/{}/comments/", self.base_url, item_id);
        let html = self.fetcher.get(&url, None).await?;
        let counts = parse_category_counts(&html)?;

        if counts.is_empty() {
            log::warn!("No category tabs found for item {}", item_id);
        }
        Ok(counts)
    }
}

/// Extract `(title, author)` from an item page, JSON-LD first, then meta tags.
pub fn parse_item_info(html: &str) -> Result<(String, String)> {
    let document = Html::parse_document(html);
    let json_ld_sel = parse_selector(r#"script[type="application/ld+json"]"#)?;
    let og_title_sel = parse_selector(r#"meta[property="og:title"]"#)?;
    let book_author_sel = parse_selector(r#"meta[property="book:author"]"#)?;

    let (mut title, mut author) = document
        .select(&json_ld_sel)
        .next()
        .map(|script| parse_json_ld(&script.text().collect::<String>()))
        .unwrap_or_default();

    if title.is_empty() {
        title = meta_content(&document, &og_title_sel);
    }
    if author.is_empty() {
        author = meta_content(&document, &book_author_sel);
    }

    Ok((title, author))
}

/// Extract category totals from the comments landing page.
pub fn parse_category_counts(html: &str) -> Result<CategoryCounts> {
    let document = Html::parse_document(html);
    let tab_sel = parse_selector("li.CommentTabs")?;
    let fallback_sel = parse_selector("ul.CommentTabs li")?;
    let tab_label = Regex::new(TAB_LABEL_PATTERN)?;

    let mut tabs: Vec<_> = document.select(&tab_sel).collect();
    if tabs.is_empty() {
        tabs = document.select(&fallback_sel).collect();
    }

    let mut counts = CategoryCounts::new();
    for tab in tabs {
        let text: String = tab.text().collect();
        let Some(caps) = tab_label.captures(&text) else {
            continue;
        };
        let category = Category::from_label(&caps[1]);
        let count = caps[2].parse::<usize>().ok();
        if let (Some(category), Some(count)) = (category, count) {
            counts.insert(category, count);
        }
    }
    Ok(counts)
}

fn parse_json_ld(raw: &str) -> (String, String) {
    let Ok(data) = serde_json::from_str::<Value>(raw.trim()) else {
        log::debug!("Ignoring malformed JSON-LD block");
        return Default::default();
    };

    let title = data
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    let author = data
        .get("author")
        .and_then(Value::as_array)
        .and_then(|authors| authors.first())
        .and_then(|first| first.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();

    (title, author)
}

fn meta_content(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .unwrap_or("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_info_from_json_ld() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            {"@context": "http://schema.org", "@type": "Book", "name": "三体",
             "author": [{"@type": "Person", "name": "刘慈欣"}]}
            </script>
            <meta property="og:title" content="ignored" />
        </head><body></body></html>"#;
        let (title, author) = parse_item_info(html).unwrap();
        assert_eq!(title, "三体");
        assert_eq!(author, "刘慈欣");
    }

    #[test]
    fn test_item_info_falls_back_to_meta() {
        let html = r#"<html><head>
            <script type="application/ld+json">{ not json </script>
            <meta property="og:title" content="Solaris" />
            <meta property="book:author" content="Stanisław Lem" />
        </head></html>"#;
        let (title, author) = parse_item_info(html).unwrap();
        assert_eq!(title, "Solaris");
        assert_eq!(author, "Stanisław Lem");
    }

    #[test]
    fn test_item_info_defaults_to_empty() {
        let (title, author) = parse_item_info("<html></html>").unwrap();
        assert!(title.is_empty());
        assert!(author.is_empty());
    }

    #[test]
    fn test_category_counts() {
        let html = r##"<ul class="fleft CommentTabs">
            <li class="is-active">读过(4916)</li>
            <li><a href="?status=N">在读(87)</a></li>
            <li><a href="?status=F">想读(1203)</a></li>
            <li><a href="#">热门(12)</a></li>
        </ul>"##;
        let counts = parse_category_counts(html).unwrap();
        assert_eq!(counts.get(&Category::Read), Some(&4916));
        assert_eq!(counts.get(&Category::Reading), Some(&87));
        assert_eq!(counts.get(&Category::WantToRead), Some(&1203));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_category_counts_direct_tabs() {
        let html = r#"<div><li class="CommentTabs">读过(5)</li><li class="CommentTabs">其他(9)</li></div>"#;
        let counts = parse_category_counts(html).unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&Category::Read], 5);
    }
}

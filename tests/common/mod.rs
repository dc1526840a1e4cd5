//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::ops::Range;
use std::path::Path;

use review_crawler::models::Config;
use serde_json::json;
use wiremock::{Request, Respond, ResponseTemplate};

/// Configuration pointing at a mock server, without request delays.
pub fn test_config(base_url: &str, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = base_url.to_string();
    config.crawler.min_delay_ms = 0;
    config.crawler.max_delay_ms = 0;
    config.crawler.timeout_secs = 5;
    config.output.dir = output_dir.to_path_buf();
    config
}

/// Review list markup with one item per id.
pub fn reviews_html(ids: Range<usize>) -> String {
    ids.map(|id| {
        format!(
            r#"<li class="comment-item" data-cid="{id}">
                <div class="comment">
                  <h3>
                    <span class="comment-vote"><span class="vote-count">{id}</span></span>
                    <span class="comment-info">
                      <a href="https://www.example.com/people/{id}/">reader{id}</a>
                      <span class="user-stars allstar30 rating"></span>
                      <a class="comment-time" href="https://book.example.com/comment/{id}/">2024-03-01 12:00:00</a>
                    </span>
                  </h3>
                  <p class="comment-content"><span class="short">review {id}</span></p>
                </div>
              </li>"#
        )
    })
    .collect()
}

/// JSON envelope body for a page of reviews.
pub fn envelope(ids: Range<usize>) -> serde_json::Value {
    json!({ "r": 0, "html": reviews_html(ids) })
}

pub fn item_page(title: &str, author: &str) -> String {
    format!(
        r#"<html><head>
        <script type="application/ld+json">
        {{"@context": "http://schema.org", "@type": "Book", "name": "{title}",
          "author": [{{"@type": "Person", "name": "{author}"}}], "isbn": "9787536692930"}}
        </script>
        </head><body><h1>{title}</h1></body></html>"#
    )
}

pub fn tabs_page(tabs: &[(&str, usize)]) -> String {
    let items: String = tabs
        .iter()
        .map(|(label, count)| format!(r##"<li><a href="#">{label}({count})</a></li>"##))
        .collect();
    format!(r#"<html><body><ul class="fleft CommentTabs">{items}</ul></body></html>"#)
}

/// Serves `total` sequential reviews, paging on the `start` parameter.
pub struct ListingResponder {
    pub total: usize,
}

impl Respond for ListingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let start = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "start")
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (start + 20).min(self.total);
        ResponseTemplate::new(200).set_body_json(envelope(start.min(end)..end))
    }
}

// src/utils/http.rs

//! HTTP client utilities.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Default headers sent with every request.
///
/// Accept-Encoding is left to reqwest so that compressed bodies are decoded.
pub fn default_headers(config: &CrawlerConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value("accept", &config.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept_language", &config.accept_language)?,
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    Ok(headers)
}

/// Create a configured asynchronous HTTP client backed by `jar`.
pub fn create_async_client(config: &CrawlerConfig, jar: Arc<Jar>) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(default_headers(config)?)
        .cookie_provider(jar)
        .timeout(config.timeout())
        .build()?;
    Ok(client)
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::config(format!("crawler.{field} is not a valid header: {e}")))
}

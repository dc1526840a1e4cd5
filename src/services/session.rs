// src/services/session.rs

//! Session client.
//!
//! Holds the transport state shared by every request of a run (default
//! headers, cookie jar) and performs single GET requests followed by a
//! randomized pause.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::REFERER;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::utils::http::create_async_client;
use crate::utils::{is_cookie_string, parse_cookie_pairs};

/// Cookie name of the anti-forgery token.
pub const CK_COOKIE: &str = "ck";

/// Cookie name a bare session token is stored under.
pub const SESSION_COOKIE: &str = "dbcl2";

/// Source of raw pages.
///
/// Implemented by [`SessionClient`] for the live site; tests provide
/// in-memory sources.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body decoded as UTF-8.
    async fn get(&self, url: &str, referer: Option<&str>) -> Result<String>;

    /// Anti-forgery token to append to authenticated requests.
    fn ck_token(&self) -> Option<String>;
}

/// Inclusive range the post-request pause is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min_ms: u64,
    max_ms: u64,
}

impl DelayRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// Draw a pause uniformly from the range.
    pub fn sample(&self) -> Duration {
        Duration::from_millis(fastrand::u64(self.min_ms..=self.max_ms))
    }
}

/// HTTP session used for every request of a crawl.
pub struct SessionClient {
    client: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    credential: Option<String>,
    delay: DelayRange,
}

impl SessionClient {
    /// Build a session from configuration, loading credentials into the cookie jar.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(config.crawler.base())?;
        let jar = Arc::new(Jar::default());
        let credential = config.auth.cookies().map(str::to_string);

        if let Some(raw) = credential.as_deref() {
            let loaded = load_credential(&jar, &base_url, raw);
            log::info!("Loaded {} cookie(s) into session", loaded);
        } else {
            log::info!("No credential configured; crawling anonymously");
        }

        let client = create_async_client(&config.crawler, Arc::clone(&jar))?;

        Ok(Self {
            client,
            jar,
            base_url,
            credential,
            delay: DelayRange::new(config.crawler.min_delay_ms, config.crawler.max_delay_ms),
        })
    }

    /// Whether a credential was supplied.
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    async fn send(&self, url: &str, referer: Option<&str>) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // The site is UTF-8 even when the headers say otherwise.
        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn pause(&self) {
        let delay = self.delay.sample();
        if !delay.is_zero() {
            log::debug!("Sleeping {} ms", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }

    fn ck_from_jar(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let cookies = header.to_str().ok()?;
        find_ck(cookies)
    }
}

#[async_trait]
impl PageFetcher for SessionClient {
    async fn get(&self, url: &str, referer: Option<&str>) -> Result<String> {
        log::debug!("GET {}", url);
        let result = self.send(url, referer).await;
        self.pause().await;
        result
    }

    fn ck_token(&self) -> Option<String> {
        self.ck_from_jar()
            .or_else(|| self.credential.as_deref().and_then(find_ck))
    }
}

/// Store the credential in `jar`; returns the number of cookies set.
fn load_credential(jar: &Jar, base_url: &Url, raw: &str) -> usize {
    if is_cookie_string(raw) {
        let pairs = parse_cookie_pairs(raw);
        for (key, value) in &pairs {
            jar.add_cookie_str(&format!("{key}={value}"), base_url);
        }
        pairs.len()
    } else {
        jar.add_cookie_str(&format!("{SESSION_COOKIE}={raw}"), base_url);
        1
    }
}

fn find_ck(cookies: &str) -> Option<String> {
    if !is_cookie_string(cookies) {
        return None;
    }
    parse_cookie_pairs(cookies)
        .into_iter()
        .find(|(key, _)| *key == CK_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

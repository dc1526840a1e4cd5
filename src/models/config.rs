//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Optional credentials
    #[serde(default)]
    pub auth: AuthConfig,

    /// Where exported files land
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.min_delay_ms > self.crawler.max_delay_ms {
            return Err(AppError::validation(
                "crawler.min_delay_ms must not exceed crawler.max_delay_ms",
            ));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.unauthenticated_limit == 0 {
            return Err(AppError::validation(
                "crawler.unauthenticated_limit must be > 0",
            ));
        }
        url::Url::parse(&self.crawler.base_url)
            .map_err(|e| AppError::validation(format!("crawler.base_url: {e}")))?;
        if self.output.dir.as_os_str().is_empty() {
            return Err(AppError::validation("output.dir is empty"));
        }
        Ok(())
    }

    /// Whether a credential is configured.
    pub fn is_authenticated(&self) -> bool {
        self.auth.cookies().is_some()
    }

    /// Maximum number of records to keep for a category with `reported_total` reviews.
    ///
    /// Authenticated sessions may walk the whole listing; anonymous ones are
    /// capped at `crawler.unauthenticated_limit`.
    pub fn crawl_limit(&self, reported_total: usize) -> usize {
        if self.is_authenticated() {
            reported_total
        } else {
            reported_total.min(self.crawler.unauthenticated_limit)
        }
    }

    /// Override the credential and output directory from environment-style
    /// variables resolved through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(cookies) = lookup(Self::COOKIES_ENV) {
            self.auth.cookies = Some(cookies);
        }
        if let Some(dir) = lookup(Self::OUTPUT_DIR_ENV) {
            self.output.dir = PathBuf::from(dir);
        }
    }

    /// Variable holding the credential cookie string.
    pub const COOKIES_ENV: &'static str = "DOUBAN_COOKIES";

    /// Variable overriding the output directory.
    pub const OUTPUT_DIR_ENV: &'static str = "OUTPUT_DIR";
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Site root, without trailing slash
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept header for HTTP requests
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Accept-Language header for HTTP requests
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Lower bound of the pause after every request, in milliseconds
    #[serde(default = "defaults::min_delay")]
    pub min_delay_ms: u64,

    /// Upper bound of the pause after every request, in milliseconds
    #[serde(default = "defaults::max_delay")]
    pub max_delay_ms: u64,

    /// Per-category record ceiling when no credential is configured
    #[serde(default = "defaults::unauthenticated_limit")]
    pub unauthenticated_limit: usize,

    /// Number of categories crawled at the same time
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl CrawlerConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL with any trailing slash removed.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
            min_delay_ms: defaults::min_delay(),
            max_delay_ms: defaults::max_delay(),
            unauthenticated_limit: defaults::unauthenticated_limit(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Credential settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Either a full `k=v; k=v` cookie string or a bare session token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
}

impl AuthConfig {
    /// The configured cookie string, if it is non-blank.
    pub fn cookies(&self) -> Option<&str> {
        self.cookies
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one CSV per category
    #[serde(default = "defaults::output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn base_url() -> String {
        "https://book.douban.com".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36 Edg/143.0.0.0"
            .into()
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".into()
    }
    pub fn accept_language() -> String {
        "zh-CN,zh;q=0.9,en;q=0.8".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn min_delay() -> u64 {
        500
    }
    pub fn max_delay() -> u64 {
        2000
    }
    pub fn unauthenticated_limit() -> usize {
        100
    }
    pub fn max_concurrent() -> usize {
        1
    }
    pub fn output_dir() -> PathBuf {
        PathBuf::from("./output")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_delay_range() {
        let mut config = Config::default();
        config.crawler.min_delay_ms = 3000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.crawler.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            min_delay_ms = 0
            max_delay_ms = 0

            [output]
            dir = "reviews"
            "#,
        )
        .unwrap();
        assert_eq!(config.crawler.min_delay_ms, 0);
        assert_eq!(config.crawler.unauthenticated_limit, 100);
        assert_eq!(config.output.dir, PathBuf::from("reviews"));
        assert!(config.auth.cookies().is_none());
    }

    #[test]
    fn crawl_limit_caps_anonymous_sessions() {
        let mut config = Config::default();
        assert_eq!(config.crawl_limit(4916), 100);
        assert_eq!(config.crawl_limit(45), 45);

        config.auth.cookies = Some("dbcl2=\"123:abc\"; ck=Xy12".to_string());
        assert_eq!(config.crawl_limit(4916), 4916);
    }

    #[test]
    fn dotenv_credential_authenticates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "DOUBAN_COOKIES=\"dbcl2=abc; ck=Tok9\"\nOUTPUT_DIR=reviews\n",
        )
        .unwrap();
        let vars: HashMap<String, String> = dotenvy::from_path_iter(&path)
            .unwrap()
            .map(|item| item.unwrap())
            .collect();

        let mut config = Config::default();
        assert_eq!(config.crawl_limit(4916), 100);

        config.apply_env_overrides(|key| vars.get(key).cloned());
        assert!(config.is_authenticated());
        assert_eq!(config.auth.cookies(), Some("dbcl2=abc; ck=Tok9"));
        assert_eq!(config.crawl_limit(4916), 4916);
        assert_eq!(config.output.dir, PathBuf::from("reviews"));
    }

    #[test]
    fn missing_env_keeps_file_values() {
        let mut config = Config::default();
        config.apply_env_overrides(|_| None);
        assert!(!config.is_authenticated());
        assert_eq!(config.output.dir, PathBuf::from("./output"));
    }

    #[test]
    fn blank_cookie_string_is_anonymous() {
        let mut config = Config::default();
        config.auth.cookies = Some("   ".to_string());
        assert!(!config.is_authenticated());
    }
}

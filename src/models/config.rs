//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SiteSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// What to look for and where to send it
    #[serde(default)]
    pub search: SearchConfig,

    /// DOM addresses on the catalog site
    #[serde(default)]
    pub selectors: SiteSelectors,

    /// Document export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Digest mail settings
    #[serde(default)]
    pub notify: NotifyConfig,
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
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        Url::parse(&self.crawler.base_url)?;
        if self.search.category.trim().is_empty() {
            return Err(AppError::validation("search.category is empty"));
        }
        if self.search.pages == 0 {
            return Err(AppError::validation("search.pages must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Site root the listing URLs are built from
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum in-flight fetches per phase
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Which sink receives a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// One document per record
    Export,
    /// One digest mail per batch
    #[default]
    Notify,
}

/// Search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Category slug, e.g. "scifi"
    #[serde(default)]
    pub category: String,

    /// Number of listing pages to fetch (page index 1 is never used)
    #[serde(default = "defaults::pages")]
    pub pages: usize,

    /// Recency window in days
    #[serde(default = "defaults::window_days")]
    pub window_days: u32,

    #[serde(default)]
    pub sink: SinkKind,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            category: String::new(),
            pages: defaults::pages(),
            window_days: defaults::window_days(),
            sink: SinkKind::default(),
        }
    }
}

/// Document export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,

    /// Where cover images are stored
    #[serde(default = "defaults::image_dir")]
    pub image_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            image_dir: defaults::image_dir(),
        }
    }
}

/// Digest mail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Mail-send API endpoint
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Sender address; falls back to `FROM_EMAIL`
    #[serde(default)]
    pub from_email: Option<String>,

    /// Recipient address; falls back to `TO_EMAIL`
    #[serde(default)]
    pub to_email: Option<String>,

    #[serde(default = "defaults::subject")]
    pub subject: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            from_email: None,
            to_email: None,
            subject: defaults::subject(),
            api_key_env: defaults::api_key_env(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn base_url() -> String {
        "http://audiobookbay.nl".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; audiobook-watch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        10
    }

    // Search defaults
    pub fn pages() -> usize {
        4
    }
    pub fn window_days() -> u32 {
        3
    }

    // Export defaults
    pub fn output_dir() -> String {
        "docs".into()
    }
    pub fn image_dir() -> String {
        "docs/pict".into()
    }

    // Notify defaults
    pub fn endpoint() -> String {
        "https://api.sendgrid.com/v3/mail/send".into()
    }
    pub fn subject() -> String {
        "Audiobooks Newsletter (AudiobookBay)".into()
    }
    pub fn api_key_env() -> String {
        "SENDGRID_API_KEY".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.search.category = "scifi".to_string();
        config
    }

    #[test]
    fn validate_default_with_category_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_category() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = valid_config();
        config.crawler.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = valid_config();
        config.crawler.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));
    }

    #[test]
    fn parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [search]
            category = "fantasy"
            sink = "export"

            [crawler]
            max_concurrent = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.search.category, "fantasy");
        assert_eq!(config.search.sink, SinkKind::Export);
        assert_eq!(config.search.pages, 4);
        assert_eq!(config.crawler.max_concurrent, 1);
        assert_eq!(config.crawler.timeout_secs, 30);
        assert_eq!(config.selectors.post, "div.post");
        assert_eq!(config.export.image_dir, "docs/pict");
    }
}

// src/services/fetcher.rs

//! Page fetching capability.
//!
//! Everything above this layer sees a single `fetch(url)` that yields the
//! page body or a transport error. Retries and TLS are reqwest's business.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::utils::http::create_async_client;

/// Performs single GET requests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page body as text.
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Fetch a binary resource such as a cover image.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.fetch(url).await?.into_bytes())
    }
}

/// `PageFetcher` backed by a reqwest client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a fetcher with a client configured from crawler settings.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::transport(url, e))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| AppError::transport(url, e))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {} (bytes)", url);
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| AppError::transport(url, e))?;
        Ok(bytes.to_vec())
    }
}

// src/services/crawler.rs

//! Listing crawler.
//!
//! Fetches the listing pages of one category concurrently and keeps the
//! detail links published on or after a cutoff date. Pages are parsed on
//! the blocking pool so several can be parsed at once.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use url::Url;

use crate::error::Result;
use crate::models::{Config, PendingLink};
use crate::services::{ListingParser, PageFetcher, parse_blocking};

/// Page index that never maps to a distinct page in the site's URL scheme.
const SKIPPED_PAGE: usize = 1;

/// Result of a listing crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// No post in any listing page fell inside the window
    NoNewItems,
    /// In-window detail links, without duplicates, in no particular order
    Found(Vec<PendingLink>),
    /// Every listing page failed to fetch or parse; holds their URLs, sorted
    Unavailable(Vec<String>),
}

/// Crawls category listing pages.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<ListingParser>,
    base_url: Url,
    concurrency: usize,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        parser: ListingParser,
        base_url: Url,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            parser: Arc::new(parser),
            base_url,
            concurrency: concurrency.max(1),
        }
    }

    /// Build a crawler for the configured site and concurrency.
    pub fn from_config(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Ok(Self::new(
            fetcher,
            ListingParser::new(&config.selectors)?,
            Url::parse(&config.crawler.base_url)?,
            config.crawler.max_concurrent,
        ))
    }

    /// `pages` listing URLs: index 0, then 2, 3, ... (index 1 is never used).
    pub fn listing_urls(&self, category: &str, pages: usize) -> Result<Vec<String>> {
        (0..=pages)
            .filter(|&page| page != SKIPPED_PAGE)
            .take(pages)
            .map(|page| -> Result<String> {
                let path = format!("audio-books/type/{category}/page/{page}/");
                Ok(self.base_url.join(&path)?.to_string())
            })
            .collect()
    }

    /// Crawl listing pages and keep links published on or after `cutoff`.
    ///
    /// A page that fails to fetch or parse is logged and contributes nothing;
    /// the other pages are unaffected. When no page succeeds at all the
    /// result is [`Discovery::Unavailable`], never `NoNewItems`.
    pub async fn crawl(&self, category: &str, pages: usize, cutoff: NaiveDate) -> Result<Discovery> {
        let urls = self.listing_urls(category, pages)?;
        let page_total = urls.len();
        log::info!(
            "Crawling {} listing pages of '{}' for posts since {}",
            page_total,
            category,
            cutoff
        );

        let mut failed_pages = Vec::new();
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        let mut page_stream = stream::iter(urls)
            .map(|url| async move {
                let result = self.fetch_listing(&url).await;
                (url, result)
            })
            .buffer_unordered(self.concurrency);

        while let Some((url, result)) = page_stream.next().await {
            match result {
                Ok(page_links) => {
                    let before = links.len();
                    for link in page_links {
                        if link.published >= cutoff && seen.insert(link.url.clone()) {
                            links.push(link);
                        }
                    }
                    log::debug!("{}: {} new links", url, links.len() - before);
                }
                Err(error) => {
                    log::warn!("Failed to process listing page {}: {}", url, error);
                    failed_pages.push(url);
                }
            }
        }

        log::info!(
            "Listing crawl done: {} links from {} pages ({} failed)",
            links.len(),
            page_total,
            failed_pages.len()
        );

        if page_total > 0 && failed_pages.len() == page_total {
            failed_pages.sort();
            Ok(Discovery::Unavailable(failed_pages))
        } else if links.is_empty() {
            Ok(Discovery::NoNewItems)
        } else {
            Ok(Discovery::Found(links))
        }
    }

    async fn fetch_listing(&self, url: &str) -> Result<Vec<PendingLink>> {
        let html = self.fetcher.fetch(url).await?;
        let parser = Arc::clone(&self.parser);
        let url = url.to_string();
        parse_blocking(move || parser.parse(&html, &url)).await
    }
}

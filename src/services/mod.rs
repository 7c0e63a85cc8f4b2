//! Service layer for the watcher.
//!
//! This module contains the discovery and extraction logic:
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - Listing page parsing (`ListingParser`)
//! - Detail page parsing (`DetailParser`)
//! - Listing crawl with the recency filter (`Crawler`)
//! - Detail fetch and parse (`Extractor`)

mod crawler;
mod detail;
mod extractor;
mod fetcher;
mod listing;

pub use crawler::{Crawler, Discovery};
pub use detail::{DetailParser, DetailStep};
pub use extractor::{ExtractFailure, ExtractOutcome, Extractor};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use listing::ListingParser;

use scraper::Selector;

use crate::error::{AppError, Result};

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Run a synchronous parse on tokio's blocking pool.
pub(crate) async fn parse_blocking<T, F>(parse: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(parse).await?
}

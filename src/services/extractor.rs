// src/services/extractor.rs

//! Detail page extractor.
//!
//! Fetches and parses every detail page concurrently, parsing on the
//! blocking pool. Each URL yields either a complete record or a failure
//! naming the URL.

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::Record;
use crate::services::{DetailParser, PageFetcher, parse_blocking};

/// A detail page that could not be turned into a record.
#[derive(Debug)]
pub struct ExtractFailure {
    pub url: String,
    pub error: AppError,
}

impl fmt::Display for ExtractFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.url, self.error.kind(), self.error)
    }
}

/// Per-URL extraction result.
pub type ExtractOutcome = std::result::Result<Record, ExtractFailure>;

/// Drives detail page fetch and parse.
pub struct Extractor {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<DetailParser>,
    concurrency: usize,
}

impl Extractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, parser: DetailParser, concurrency: usize) -> Self {
        Self {
            fetcher,
            parser: Arc::new(parser),
            concurrency: concurrency.max(1),
        }
    }

    /// Extract one outcome per URL. Completion order, not input order.
    pub async fn extract_all(&self, urls: Vec<String>) -> Vec<ExtractOutcome> {
        log::info!("Extracting {} detail pages", urls.len());

        let outcomes: Vec<ExtractOutcome> = stream::iter(urls)
            .map(|url| async move {
                let result = self.extract(&url).await;
                match result {
                    Ok(record) => Ok(record),
                    Err(error) => {
                        log::warn!("Failed to extract {}: {}", url, error);
                        Err(ExtractFailure { url, error })
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        log::info!(
            "Extraction done: {} records, {} failures",
            outcomes.len() - failed,
            failed
        );
        outcomes
    }

    async fn extract(&self, url: &str) -> Result<Record> {
        let html = self.fetcher.fetch(url).await?;
        let parser = Arc::clone(&self.parser);
        let record = parse_blocking(move || parser.parse(&html)).await?;
        log::debug!("Extracted '{}' from {}", record, url);
        Ok(record)
    }
}

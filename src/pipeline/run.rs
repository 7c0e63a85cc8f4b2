// src/pipeline/run.rs

//! Crawl, extract, deliver.
//!
//! The two fetch phases run one after the other: every listing page is done
//! before the first detail page is requested. Delivery is all-or-nothing at
//! the batch level; one failed detail page means no sink call at all.

use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, Record};
use crate::pipeline::{Abort, ExportFailure, RunOutcome};
use crate::services::{
    Crawler, DetailParser, Discovery, ExtractFailure, Extractor, ListingParser, PageFetcher,
};
use crate::sinks::Sink;

/// What to look for in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub category: String,
    /// Number of listing pages to fetch
    pub pages: usize,
    /// Oldest publication date kept
    pub cutoff: NaiveDate,
}

impl SearchRequest {
    /// Request for posts published within `window_days` of `today`.
    pub fn within_days(
        category: impl Into<String>,
        pages: usize,
        window_days: u32,
        today: NaiveDate,
    ) -> Self {
        let cutoff = today
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN);
        Self {
            category: category.into(),
            pages,
            cutoff,
        }
    }

    /// Same as [`SearchRequest::within_days`], counted from the local date.
    pub fn recent(category: impl Into<String>, pages: usize, window_days: u32) -> Self {
        Self::within_days(category, pages, window_days, Local::now().date_naive())
    }
}

/// Discovery and extraction pipeline feeding one sink.
pub struct Pipeline {
    crawler: Crawler,
    extractor: Extractor,
    sink: Sink,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(crawler: Crawler, extractor: Extractor, sink: Sink, concurrency: usize) -> Self {
        Self {
            crawler,
            extractor,
            sink,
            concurrency: concurrency.max(1),
        }
    }

    /// Wire crawler and extractor from configuration.
    pub fn from_config(config: &Config, fetcher: Arc<dyn PageFetcher>, sink: Sink) -> Result<Self> {
        let concurrency = config.crawler.max_concurrent;
        let crawler = Crawler::from_config(config, Arc::clone(&fetcher))?;
        let extractor = Extractor::new(fetcher, DetailParser::new(&config.selectors)?, concurrency);
        Ok(Self::new(crawler, extractor, sink, concurrency))
    }

    /// Run the listing crawl only.
    pub async fn discover(&self, request: &SearchRequest) -> Result<Discovery> {
        self.crawler
            .crawl(&request.category, request.pages, request.cutoff)
            .await
    }

    /// Run the full pipeline.
    ///
    /// `Err` is reserved for problems before any page is fetched; page, sink
    /// and record failures end up in [`RunOutcome::Aborted`]. A crawl where
    /// every listing page failed is an abort, not "no new items".
    pub async fn run(&self, request: &SearchRequest) -> Result<RunOutcome> {
        let outcome = match self.discover(request).await? {
            Discovery::NoNewItems => {
                log::info!("No new audiobooks found");
                return Ok(RunOutcome::NoNewItems);
            }
            Discovery::Unavailable(pages) => RunOutcome::Aborted(Abort::Listing(pages)),
            Discovery::Found(links) => {
                log::info!("Found {} new audiobooks", links.len());
                let urls = links.into_iter().map(|link| link.url).collect();
                self.extract_and_deliver(urls).await
            }
        };

        match &outcome {
            RunOutcome::Aborted(abort) => log::error!("Batch aborted: {}", abort),
            other => log::info!("Batch finished: {}", other),
        }
        Ok(outcome)
    }

    async fn extract_and_deliver(&self, urls: Vec<String>) -> RunOutcome {
        let mut records = Vec::new();
        let mut failures = Vec::new();
        for outcome in self.extractor.extract_all(urls).await {
            match outcome {
                Ok(record) => records.push(record),
                Err(failure) => failures.push(failure),
            }
        }

        if failures.is_empty() {
            self.deliver(records).await
        } else {
            failures.sort_by(|a: &ExtractFailure, b| a.url.cmp(&b.url));
            RunOutcome::Aborted(Abort::Extraction(failures))
        }
    }

    async fn deliver(&self, records: Vec<Record>) -> RunOutcome {
        let count = records.len();
        log::info!("Delivering {} records via {}", count, self.sink.name());

        match &self.sink {
            Sink::Export(exporter) => {
                let mut failures: Vec<ExportFailure> = stream::iter(&records)
                    .map(|record| async move {
                        exporter
                            .export(record)
                            .await
                            .err()
                            .map(|error| ExportFailure {
                                title: record.title().to_string(),
                                error,
                            })
                    })
                    .buffer_unordered(self.concurrency)
                    .filter_map(|failure| async move { failure })
                    .collect()
                    .await;

                if failures.is_empty() {
                    RunOutcome::Delivered { count }
                } else {
                    failures.sort_by(|a, b| a.title.cmp(&b.title));
                    RunOutcome::Aborted(Abort::Export(failures))
                }
            }
            Sink::Notify(notifier) => match notifier.notify(&records).await {
                Ok(()) => RunOutcome::Delivered { count },
                Err(error) => RunOutcome::Aborted(Abort::Notify(error)),
            },
        }
    }
}

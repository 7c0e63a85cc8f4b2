// src/models/mod.rs

//! Domain models for the watcher.

mod config;
mod record;
mod selectors;

// Re-export all public types
pub use config::{Config, CrawlerConfig, ExportConfig, NotifyConfig, SearchConfig, SinkKind};
pub use record::{PendingLink, Record, RecordDraft};
pub use selectors::SiteSelectors;

//! Delivery targets for a finished batch.
//!
//! A batch goes to exactly one sink:
//! - Export: one document per record, plus its cover image
//! - Notify: one digest mail for the whole batch

pub mod export;
pub mod notify;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Record;

// Re-export for convenience
pub use export::DocumentExporter;
pub use notify::MailNotifier;

/// Writes one artifact per record. Failures are reported per record.
#[async_trait]
pub trait RecordExporter: Send + Sync {
    async fn export(&self, record: &Record) -> Result<()>;
}

/// Sends one digest for a whole batch.
#[async_trait]
pub trait DigestNotifier: Send + Sync {
    async fn notify(&self, records: &[Record]) -> Result<()>;
}

/// The sink a pipeline delivers to.
#[derive(Clone)]
pub enum Sink {
    Export(Arc<dyn RecordExporter>),
    Notify(Arc<dyn DigestNotifier>),
}

impl Sink {
    pub fn name(&self) -> &'static str {
        match self {
            Sink::Export(_) => "export",
            Sink::Notify(_) => "notify",
        }
    }
}

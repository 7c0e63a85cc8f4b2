// src/pipeline/outcome.rs

//! Outcomes of a pipeline run.

use std::fmt;

use crate::error::AppError;
use crate::services::ExtractFailure;

/// A record the export sink could not write.
#[derive(Debug)]
pub struct ExportFailure {
    pub title: String,
    pub error: AppError,
}

/// Why a batch was not delivered.
#[derive(Debug)]
pub enum Abort {
    /// Every listing page failed; nothing could be discovered
    Listing(Vec<String>),
    /// One or more detail pages failed; the sink was never invoked
    Extraction(Vec<ExtractFailure>),
    /// One or more records could not be exported
    Export(Vec<ExportFailure>),
    /// The digest could not be sent
    Notify(AppError),
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing was published inside the window; no sink was invoked
    NoNewItems,
    /// Every record was extracted and delivered
    Delivered { count: usize },
    /// The batch was abandoned
    Aborted(Abort),
}

impl RunOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, RunOutcome::Aborted(_))
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Abort::Listing(urls) => {
                write!(f, "all {} listing page(s) failed:", urls.len())?;
                for url in urls {
                    write!(f, " {url};")?;
                }
                Ok(())
            }
            Abort::Extraction(failures) => {
                write!(f, "{} detail page(s) failed:", failures.len())?;
                for failure in failures {
                    write!(f, " {failure};")?;
                }
                Ok(())
            }
            Abort::Export(failures) => {
                write!(f, "{} record(s) could not be saved:", failures.len())?;
                for failure in failures {
                    write!(
                        f,
                        " '{}' [{}]: {};",
                        failure.title,
                        failure.error.kind(),
                        failure.error
                    )?;
                }
                Ok(())
            }
            Abort::Notify(error) => write!(f, "digest was not sent [{}]: {}", error.kind(), error),
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NoNewItems => write!(f, "no new items"),
            RunOutcome::Delivered { count } => write!(f, "all {count} record(s) delivered"),
            RunOutcome::Aborted(abort) => write!(f, "aborted: {abort}"),
        }
    }
}

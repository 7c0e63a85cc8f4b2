//! Pipeline entry points.
//!
//! - `Pipeline::discover`: crawl listing pages for in-window detail links
//! - `Pipeline::run`: crawl, extract every record, deliver the batch

mod outcome;
mod run;

pub use outcome::{Abort, ExportFailure, RunOutcome};
pub use run::{Pipeline, SearchRequest};

// src/lib.rs

//! audiobook-watch library
//!
//! Finds audiobooks published on the catalog site within a recency window,
//! extracts one record per detail page, and hands the batch to an export
//! or digest-mail sink.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sinks;
pub mod utils;

#[cfg(test)]
mod testing;

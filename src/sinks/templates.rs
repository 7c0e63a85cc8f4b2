//! Askama template structs for exported documents and the digest mail.
//!
//! Each struct corresponds to a template in the templates/ directory.

use askama::Template;

use crate::models::Record;

/// Markdown document for one record.
#[derive(Template)]
#[template(path = "record.md")]
pub struct RecordDocument<'a> {
    pub record: &'a Record,
    /// Cover image path relative to the document, when one was saved
    pub cover_path: Option<&'a str>,
}

/// HTML digest for a whole batch.
#[derive(Template)]
#[template(path = "digest.html")]
pub struct DigestEmail<'a> {
    pub subject: &'a str,
    pub records: &'a [Record],
}

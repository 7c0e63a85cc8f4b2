//! Audiobook record and the pending links that lead to it.

use std::fmt;

use chrono::NaiveDate;

use crate::error::{AppError, Result};

/// A detail-page link discovered on a listing page, with the post date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    /// Absolute URL of the detail page
    pub url: String,

    /// Publication date shown on the listing page
    pub published: NaiveDate,
}

/// Field values collected from a detail page before validation.
#[derive(Debug, Clone, Default)]
pub struct RecordDraft {
    pub title: String,
    pub author: String,
    pub categories: String,
    pub language: String,
    pub link: String,
    pub cover: String,
    pub narrator: String,
    pub audio_format: Option<String>,
    pub bitrate: String,
    pub unabridged: bool,
}

/// One audiobook listing, validated and immutable.
///
/// Only `title` and `author` are checked; every other field is carried as
/// extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    title: String,
    author: String,
    categories: String,
    language: String,
    link: String,
    cover: String,
    narrator: String,
    audio_format: Option<String>,
    bitrate: String,
    unabridged: bool,
}

impl TryFrom<RecordDraft> for Record {
    type Error = AppError;

    fn try_from(draft: RecordDraft) -> Result<Self> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("record must have a title"));
        }
        let author = draft.author.trim();
        if author.is_empty() {
            return Err(AppError::validation(format!(
                "record '{title}' must have an author"
            )));
        }

        Ok(Self {
            title: title.to_string(),
            author: author.to_string(),
            categories: draft.categories,
            language: draft.language,
            link: draft.link,
            cover: draft.cover,
            narrator: draft.narrator,
            audio_format: draft.audio_format,
            bitrate: draft.bitrate,
            unabridged: draft.unabridged,
        })
    }
}

impl Record {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Slash- or comma-joined category path as shown on the site, trimmed.
    pub fn categories(&self) -> &str {
        &self.categories
    }

    /// Language name, trimmed.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Link found in the detail page's second centered paragraph.
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Cover image URL.
    pub fn cover(&self) -> &str {
        &self.cover
    }

    /// Who reads the book.
    pub fn narrator(&self) -> &str {
        &self.narrator
    }

    /// Audio format, absent when the page has no bitrate marker.
    pub fn audio_format(&self) -> Option<&str> {
        self.audio_format.as_deref()
    }

    pub fn bitrate(&self) -> &str {
        &self.bitrate
    }

    pub fn is_unabridged(&self) -> bool {
        self.unabridged
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.author)
    }
}

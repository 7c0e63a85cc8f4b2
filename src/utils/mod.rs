//! Utility functions and helpers.

pub mod http;

use unicode_segmentation::UnicodeSegmentation;
use url::Url;

/// Longest file stem produced by [`file_stem`], in graphemes.
const MAX_STEM_GRAPHEMES: usize = 120;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Last non-empty path segment of a URL, if any.
pub fn last_path_segment(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()?
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| s.to_string())
}

/// Turn free text (a book title) into a safe file stem.
///
/// Path separators and characters reserved on common filesystems become `_`,
/// and the result is cut on a grapheme boundary.
pub fn file_stem(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let stem: String = cleaned.graphemes(true).take(MAX_STEM_GRAPHEMES).collect();
    let stem = stem.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem.to_string()
    }
}

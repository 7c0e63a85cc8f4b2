// src/services/detail.rs

//! Detail page parser.
//!
//! A detail page describes one audiobook in loosely delimited free text.
//! The parser walks a fixed sequence of steps; each step narrows the text
//! left by the previous one and fails with its own [`DetailStep`] name.
//!
//! ```text
//! postInfo:  Category: <categories>\nLanguage: <language>\nKeywords: ...
//! audio:     Written by <author> Read by <narrator> Format: <audio data>
//! audio data <format> / Bitrate: <rate> [Unabridged]
//! ```

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Record, RecordDraft, SiteSelectors};
use crate::services::parse_selector;

const KEYWORDS_MARKER: &str = "Keywords:";
const READ_BY_MARKER: &str = " Read by ";
const WRITTEN_BY_PREFIX: &str = "Written by ";

const CATEGORY_PATTERN: &str = "C.*:";
const LANGUAGE_PATTERN: &str = "\nL.*:";
const FORMAT_PATTERN: &str = " F.*t: ";
const UNABRIDGED_PATTERN: &str = " U";
const BITRATE_PATTERN: &str = " B.*: ";

/// Steps of the detail grammar that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailStep {
    Post,
    Title,
    Info,
    Categories,
    Language,
    Links,
    AudioDetails,
    Author,
    Narrator,
}

impl DetailStep {
    pub fn name(self) -> &'static str {
        match self {
            DetailStep::Post => "post",
            DetailStep::Title => "title",
            DetailStep::Info => "info",
            DetailStep::Categories => "categories",
            DetailStep::Language => "language",
            DetailStep::Links => "links",
            DetailStep::AudioDetails => "audio details",
            DetailStep::Author => "author",
            DetailStep::Narrator => "narrator",
        }
    }

    fn fail(self, message: impl std::fmt::Display) -> AppError {
        AppError::extraction(self.name(), message)
    }
}

/// Parses detail pages into records.
pub struct DetailParser {
    post: Selector,
    title: Selector,
    info: Selector,
    content: Selector,
    centered: Selector,
    description: Selector,
    audio: Selector,
    anchor: Selector,
    image: Selector,
    category_marker: Regex,
    language_marker: Regex,
    format_marker: Regex,
    unabridged_marker: Regex,
    bitrate_marker: Regex,
}

impl DetailParser {
    pub fn new(selectors: &SiteSelectors) -> Result<Self> {
        Ok(Self {
            post: parse_selector(&selectors.post)?,
            title: parse_selector(&selectors.title)?,
            info: parse_selector(&selectors.info)?,
            content: parse_selector(&selectors.content)?,
            centered: parse_selector(&selectors.centered_paragraph)?,
            description: parse_selector(&selectors.description)?,
            audio: parse_selector(&selectors.audio_paragraph)?,
            anchor: parse_selector("a")?,
            image: parse_selector("img")?,
            category_marker: marker(CATEGORY_PATTERN)?,
            language_marker: marker(LANGUAGE_PATTERN)?,
            format_marker: marker(FORMAT_PATTERN)?,
            unabridged_marker: marker(UNABRIDGED_PATTERN)?,
            bitrate_marker: marker(BITRATE_PATTERN)?,
        })
    }

    /// Extract exactly one record from a detail page.
    pub fn parse(&self, html: &str) -> Result<Record> {
        let document = Html::parse_document(html);
        let post = first(document.root_element(), &self.post, DetailStep::Post)?;
        let mut draft = RecordDraft::default();

        draft.title = text_of(first(post, &self.title, DetailStep::Title)?)
            .trim()
            .to_string();

        let info = text_of(first(post, &self.info, DetailStep::Info)?);
        let (book_info, _keywords) =
            split_literal(info.trim(), KEYWORDS_MARKER, DetailStep::Info)?;

        let (_label, categories_and_language) =
            split_pattern(book_info, &self.category_marker, DetailStep::Categories)?;
        let (categories, language) = split_pattern(
            categories_and_language,
            &self.language_marker,
            DetailStep::Language,
        )?;
        draft.categories = categories.trim().to_string();
        draft.language = language.trim().to_string();

        let content = first(post, &self.content, DetailStep::Links)?;
        let link_paragraph = content
            .select(&self.centered)
            .nth(1)
            .ok_or_else(|| DetailStep::Links.fail("no second centered paragraph"))?;
        draft.link = attr_of(link_paragraph, &self.anchor, "href", DetailStep::Links)?;
        draft.cover = attr_of(link_paragraph, &self.image, "src", DetailStep::Links)?;

        let description = first(content, &self.description, DetailStep::AudioDetails)?;
        let audio_details = text_of(first(description, &self.audio, DetailStep::AudioDetails)?);

        let (author, rest) = split_literal(&audio_details, READ_BY_MARKER, DetailStep::Author)?;
        draft.author = author.replace(WRITTEN_BY_PREFIX, "").trim().to_string();

        let (narrator, audio_data) =
            split_pattern(rest, &self.format_marker, DetailStep::Narrator)?;
        draft.narrator = narrator.trim().to_string();

        // Both optional fields look at the audio data as it stood before the
        // unabridged split.
        match self.unabridged_marker.find(audio_data) {
            Some(found) => {
                draft.bitrate = audio_data[..found.start()].trim().to_string();
                draft.unabridged = true;
            }
            None => {
                draft.bitrate = audio_data.trim().to_string();
                draft.unabridged = false;
            }
        }
        draft.audio_format = self
            .bitrate_marker
            .find(audio_data)
            .map(|found| audio_data[..found.start()].trim().to_string());

        Record::try_from(draft)
    }
}

fn marker(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AppError::config(format!("bad marker '{pattern}': {e}")))
}

fn first<'a>(scope: ElementRef<'a>, selector: &Selector, step: DetailStep) -> Result<ElementRef<'a>> {
    scope
        .select(selector)
        .next()
        .ok_or_else(|| step.fail("expected node not found"))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn attr_of(
    scope: ElementRef<'_>,
    selector: &Selector,
    attr: &str,
    step: DetailStep,
) -> Result<String> {
    first(scope, selector, step)?
        .value()
        .attr(attr)
        .map(str::to_string)
        .ok_or_else(|| step.fail(format!("missing '{attr}' attribute")))
}

/// Split on a literal marker that must occur exactly once.
fn split_literal<'a>(text: &'a str, marker: &str, step: DetailStep) -> Result<(&'a str, &'a str)> {
    exactly_two(text.split(marker), marker, step)
}

/// Split on a marker pattern that must match exactly once.
fn split_pattern<'a>(text: &'a str, marker: &Regex, step: DetailStep) -> Result<(&'a str, &'a str)> {
    exactly_two(marker.split(text), marker.as_str(), step)
}

fn exactly_two<'a>(
    mut parts: impl Iterator<Item = &'a str>,
    marker: &str,
    step: DetailStep,
) -> Result<(&'a str, &'a str)> {
    match (parts.next(), parts.next(), parts.next()) {
        (Some(left), Some(right), None) => Ok((left, right)),
        (_, None, _) => Err(step.fail(format!("marker {marker:?} not found"))),
        _ => Err(step.fail(format!("marker {marker:?} found more than once"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::DetailPage;

    fn parser() -> DetailParser {
        DetailParser::new(&SiteSelectors::default()).unwrap()
    }

    fn step_of(err: AppError) -> &'static str {
        match err {
            AppError::Extraction { step, .. } => step,
            other => panic!("expected extraction error, got {other:?}"),
        }
    }

    #[test]
    fn test_unabridged_with_format() {
        let record = parser().parse(&DetailPage::default().html()).unwrap();

        assert_eq!(record.title(), "The Long Orbit");
        assert_eq!(record.categories(), "Science Fiction / Space Opera");
        assert_eq!(record.language(), "English");
        assert_eq!(record.link(), "https://files.example/t/long-orbit");
        assert_eq!(record.cover(), "https://img.example/covers/long-orbit.jpg");
        assert_eq!(record.author(), "Ada Stone");
        assert_eq!(record.narrator(), "John Roe");
        assert_eq!(record.bitrate(), "MP3 / Bitrate: 64 Kbps");
        assert_eq!(record.audio_format(), Some("MP3 /"));
        assert!(record.is_unabridged());
    }

    #[test]
    fn test_abridged_without_format() {
        let page = DetailPage::with_audio("Written by Ada Stone Read by John Roe Format: 128 Kbps");
        let record = parser().parse(&page.html()).unwrap();

        assert_eq!(record.narrator(), "John Roe");
        assert_eq!(record.bitrate(), "128 Kbps");
        assert_eq!(record.audio_format(), None);
        assert!(!record.is_unabridged());
    }

    #[test]
    fn test_unabridged_without_format() {
        let page =
            DetailPage::with_audio("Written by Ada Stone Read by John Roe Format: 64 Kbps Unabridged");
        let record = parser().parse(&page.html()).unwrap();

        assert_eq!(record.bitrate(), "64 Kbps");
        assert_eq!(record.audio_format(), None);
        assert!(record.is_unabridged());
    }

    #[test]
    fn test_format_without_unabridged() {
        let page =
            DetailPage::with_audio("Written by Ada Stone Read by John Roe Format: M4B Bitrate: 96 Kbps");
        let record = parser().parse(&page.html()).unwrap();

        assert_eq!(record.bitrate(), "M4B Bitrate: 96 Kbps");
        assert_eq!(record.audio_format(), Some("M4B"));
        assert!(!record.is_unabridged());
    }

    #[test]
    fn test_missing_read_by_marker() {
        let page = DetailPage::with_audio("Written by Ada Stone Format: MP3 / Bitrate: 64 Kbps");
        let err = parser().parse(&page.html()).unwrap_err();
        assert_eq!(step_of(err), "author");
    }

    #[test]
    fn test_missing_format_marker() {
        let page = DetailPage::with_audio("Written by Ada Stone Read by John Roe 64 Kbps");
        let err = parser().parse(&page.html()).unwrap_err();
        assert_eq!(step_of(err), "narrator");
    }

    #[test]
    fn test_repeated_read_by_marker() {
        let page = DetailPage::with_audio(
            "Written by Ada Stone Read by John Roe Read by Jane Roe Format: 64 Kbps",
        );
        let err = parser().parse(&page.html()).unwrap_err();
        assert_eq!(step_of(err), "author");
    }

    #[test]
    fn test_missing_keywords_marker() {
        let html = DetailPage::default().html().replace("Keywords:", "Tags:");
        let err = parser().parse(&html).unwrap_err();
        assert_eq!(step_of(err), "info");
    }

    #[test]
    fn test_missing_language_line() {
        let html = DetailPage::default().html().replace("Language:", "Lang");
        let err = parser().parse(&html).unwrap_err();
        assert_eq!(step_of(err), "language");
    }

    #[test]
    fn test_missing_cover_image() {
        let html = DetailPage::default()
            .html()
            .replace(r#"<img src="https://img.example/covers/long-orbit.jpg">"#, "");
        let err = parser().parse(&html).unwrap_err();
        assert_eq!(step_of(err), "links");
    }

    #[test]
    fn test_not_a_detail_page() {
        let err = parser().parse("<html><body><p>gone</p></body></html>").unwrap_err();
        assert_eq!(step_of(err), "post");
    }

    #[test]
    fn test_empty_author_is_validation_error() {
        let page = DetailPage::with_audio("Written by  Read by John Roe Format: 64 Kbps");
        let err = parser().parse(&page.html()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_empty_title_is_validation_error() {
        let page = DetailPage {
            title: "",
            ..DetailPage::default()
        };
        let err = parser().parse(&page.html()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

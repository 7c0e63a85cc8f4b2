// src/services/listing.rs

//! Listing page parser.
//!
//! Reads every post block on a category listing page and returns the detail
//! link with its publication date. The date comes from the centered
//! "Posted: 14 Oct 2026Format: ..." paragraph.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{PendingLink, SiteSelectors};
use crate::services::parse_selector;
use crate::utils::resolve_url;

/// Marker ending the date-bearing prefix of the posted paragraph.
const FORMAT_MARKER: &str = "Format:";

/// Characters before the date itself ("Posted: ").
const DATE_OFFSET: usize = 8;

const DATE_FORMAT: &str = "%d %b %Y";

/// Parses listing pages into pending links.
pub struct ListingParser {
    post: Selector,
    posted: Selector,
    centered: Selector,
    anchor: Selector,
}

impl ListingParser {
    pub fn new(selectors: &SiteSelectors) -> Result<Self> {
        Ok(Self {
            post: parse_selector(&selectors.post)?,
            posted: parse_selector(&selectors.posted_paragraph)?,
            centered: parse_selector(&selectors.centered_paragraph)?,
            anchor: parse_selector("a")?,
        })
    }

    /// Extract one pending link per post, in page order.
    ///
    /// Any malformed post fails the whole page.
    pub fn parse(&self, html: &str, page_url: &str) -> Result<Vec<PendingLink>> {
        let base = Url::parse(page_url)?;
        let document = Html::parse_document(html);

        document
            .select(&self.post)
            .enumerate()
            .map(|(index, post)| self.parse_post(post, index, &base))
            .collect()
    }

    fn parse_post(&self, post: ElementRef<'_>, index: usize, base: &Url) -> Result<PendingLink> {
        let posted: String = post
            .select(&self.posted)
            .next()
            .ok_or_else(|| AppError::markup(format!("post {index}"), "no posted paragraph"))?
            .text()
            .collect();
        let published = parse_posted_date(&posted)?;

        let href = post
            .select(&self.centered)
            .nth(1)
            .ok_or_else(|| AppError::markup(format!("post {index}"), "no second centered paragraph"))?
            .select(&self.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| AppError::markup(format!("post {index}"), "no detail link"))?;

        Ok(PendingLink {
            url: resolve_url(base, href),
            published,
        })
    }
}

/// Parse the date out of a "Posted: 14 Oct 2026Format: ..." paragraph.
///
/// Whitespace around the date text is ignored.
fn parse_posted_date(text: &str) -> Result<NaiveDate> {
    let (prefix, _) = text
        .split_once(FORMAT_MARKER)
        .ok_or_else(|| AppError::markup("posted paragraph", format!("no '{FORMAT_MARKER}' marker")))?;
    let date_text: String = prefix.chars().skip(DATE_OFFSET).collect();
    let date_text = date_text.trim();

    NaiveDate::parse_from_str(date_text, DATE_FORMAT).map_err(|source| AppError::DateParse {
        text: date_text.to_string(),
        source,
    })
}

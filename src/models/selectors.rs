// src/models/selectors.rs

//! CSS selectors addressing the catalog site's listing and detail pages.

use serde::{Deserialize, Serialize};

/// CSS selectors for the catalog site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSelectors {
    /// Selector for each post block (listing and detail pages)
    pub post: String,

    /// Paragraph on a listing post carrying "Posted: ... Format: ..."
    pub posted_paragraph: String,

    /// Centered paragraphs; the second one holds the link (and cover)
    pub centered_paragraph: String,

    /// Title node on a detail page
    pub title: String,

    /// Info node (categories, language, keywords) on a detail page
    pub info: String,

    /// Content node on a detail page
    pub content: String,

    /// Description block within the content node
    pub description: String,

    /// Paragraph in the description holding author, narrator and audio data
    pub audio_paragraph: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            post: "div.post".to_string(),
            posted_paragraph: r#"p[style="text-align:center;"]"#.to_string(),
            centered_paragraph: "p.center".to_string(),
            title: "div.postTitle".to_string(),
            info: "div.postInfo".to_string(),
            content: "div.postContent".to_string(),
            description: "div.desc".to_string(),
            audio_paragraph: r#"p[style="left;"]"#.to_string(),
        }
    }
}

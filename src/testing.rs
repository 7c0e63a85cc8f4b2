// src/testing.rs

//! Shared test doubles and HTML fixtures.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::Record;
use crate::services::PageFetcher;
use crate::sinks::{DigestNotifier, RecordExporter};

/// In-memory fetcher serving canned pages; unknown URLs fail as 404s.
#[derive(Default)]
pub(crate) struct StaticFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }

    /// URLs requested so far, sorted.
    pub(crate) fn requested(&self) -> Vec<String> {
        let mut urls = self.requested.lock().unwrap().clone();
        urls.sort();
        urls
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::transport(url, "404 Not Found"))
    }
}

/// Exporter remembering exported titles; fails for the listed titles.
#[derive(Default)]
pub(crate) struct RecordingExporter {
    pub fail_titles: Vec<String>,
    exported: Mutex<Vec<String>>,
    calls: Mutex<usize>,
}

impl RecordingExporter {
    pub(crate) fn failing_on(title: &str) -> Self {
        Self {
            fail_titles: vec![title.to_string()],
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub(crate) fn exported(&self) -> Vec<String> {
        let mut titles = self.exported.lock().unwrap().clone();
        titles.sort();
        titles
    }
}

#[async_trait]
impl RecordExporter for RecordingExporter {
    async fn export(&self, record: &Record) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        if self.fail_titles.iter().any(|t| t == record.title()) {
            return Err(AppError::Io(std::io::Error::other("disk full")));
        }
        self.exported.lock().unwrap().push(record.title().to_string());
        Ok(())
    }
}

/// Notifier remembering batch sizes; optionally always fails.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub fail: bool,
    batches: Mutex<Vec<usize>>,
}

impl RecordingNotifier {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn batches(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl DigestNotifier for RecordingNotifier {
    async fn notify(&self, records: &[Record]) -> Result<()> {
        self.batches.lock().unwrap().push(records.len());
        if self.fail {
            return Err(AppError::transport("http://mail.example", "mail API answered 500"));
        }
        Ok(())
    }
}

/// One post block as it appears on a listing page.
pub(crate) fn listing_post(posted: &str, href: &str) -> String {
    format!(
        r#"<div class="post">
  <div class="postTitle"><h2><a href="{href}">Some Book</a></h2></div>
  <div class="postContent">
    <p class="center"><img src="https://img.example/thumb.jpg"></p>
    <p class="center"><a href="{href}">Some Book</a></p>
    <p style="text-align:center;">Posted: {posted}<br>Format: MP3 / Bitrate: 64 Kbps</p>
  </div>
</div>"#
    )
}

/// A listing page wrapping the given post blocks.
pub(crate) fn listing_page(posts: &[String]) -> String {
    format!(
        "<html><body><div id=\"content\">{}</div></body></html>",
        posts.join("\n")
    )
}

/// Field values used to build a detail page.
pub(crate) struct DetailPage {
    pub title: &'static str,
    pub categories: &'static str,
    pub language: &'static str,
    pub link: &'static str,
    pub cover: &'static str,
    pub audio: String,
}

impl Default for DetailPage {
    fn default() -> Self {
        Self {
            title: "The Long Orbit",
            categories: "Science Fiction / Space Opera",
            language: "English",
            link: "https://files.example/t/long-orbit",
            cover: "https://img.example/covers/long-orbit.jpg",
            audio: "Written by Ada Stone Read by John Roe Format: MP3 / Bitrate: 64 Kbps Unabridged"
                .to_string(),
        }
    }
}

impl DetailPage {
    pub(crate) fn with_audio(audio: &str) -> Self {
        Self {
            audio: audio.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn html(&self) -> String {
        format!(
            r#"<html><body>
<div class="post">
  <div class="postTitle"><h1>  {title}  </h1></div>
  <div class="postInfo">Category: {categories} <br>
Language: {language}<br>
Keywords: audiobook mp3 </div>
  <div class="postContent">
    <p class="center">Shared by uploader</p>
    <p class="center"><a href="{link}"><img src="{cover}"></a></p>
    <div class="desc">
      <p>Some blurb about the book.</p>
      <p style="left;">{audio}</p>
    </div>
  </div>
</div>
</body></html>"#,
            title = self.title,
            categories = self.categories,
            language = self.language,
            link = self.link,
            cover = self.cover,
            audio = self.audio,
        )
    }
}

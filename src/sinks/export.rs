//! Document export sink.
//!
//! Writes one Markdown document per record into the output directory and
//! saves the record's cover image next to it.
//!
//! ## Layout
//!
//! ```text
//! {output_dir}/
//! ├── The Long Orbit.md
//! └── pict/                 # image_dir
//!     └── long-orbit.jpg
//! ```
//!
//! Two records with the same title (re-uploads) get distinct files within
//! one exporter: the second becomes `The Long Orbit (2).md`.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use askama::Template;
use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::models::{ExportConfig, Record};
use crate::services::PageFetcher;
use crate::sinks::RecordExporter;
use crate::sinks::templates::RecordDocument;
use crate::utils::{file_stem, last_path_segment};

/// Exports records as Markdown documents.
pub struct DocumentExporter {
    fetcher: Arc<dyn PageFetcher>,
    output_dir: PathBuf,
    image_dir: PathBuf,
    /// Paths already handed out to a record during this run
    claimed: Mutex<HashSet<PathBuf>>,
}

impl DocumentExporter {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &ExportConfig) -> Self {
        Self {
            fetcher,
            output_dir: PathBuf::from(&config.output_dir),
            image_dir: PathBuf::from(&config.image_dir),
            claimed: Mutex::new(HashSet::new()),
        }
    }

    /// Where the document for `record` is written.
    pub fn document_path(&self, record: &Record) -> PathBuf {
        self.output_dir
            .join(format!("{}.md", file_stem(record.title())))
    }

    /// Where the cover for `record` is written.
    pub fn image_path(&self, record: &Record) -> PathBuf {
        let name = last_path_segment(record.cover())
            .map(|segment| file_stem(&segment))
            .unwrap_or_else(|| format!("{}.jpg", file_stem(record.title())));
        self.image_dir.join(name)
    }

    /// Reserve `path`, or the first free `stem (n).ext` variant of it.
    fn claim(&self, path: PathBuf) -> PathBuf {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if claimed.insert(path.clone()) {
            return path;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let mut n = 2;
        loop {
            let candidate = path.with_file_name(format!("{stem} ({n}){ext}"));
            if claimed.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Image path as referenced from inside the document.
    fn cover_reference(&self, image_path: &Path) -> String {
        image_path
            .strip_prefix(&self.output_dir)
            .unwrap_or(image_path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    async fn save_cover(&self, record: &Record) -> Result<Option<String>> {
        if record.cover().is_empty() {
            log::debug!("'{}' has no cover image", record);
            return Ok(None);
        }

        let bytes = self.fetcher.fetch_bytes(record.cover()).await?;
        let path = self.claim(self.image_path(record));
        write_bytes(&path, &bytes).await?;
        Ok(Some(self.cover_reference(&path)))
    }
}

#[async_trait]
impl RecordExporter for DocumentExporter {
    async fn export(&self, record: &Record) -> Result<()> {
        let cover = self.save_cover(record).await?;
        let document = RecordDocument {
            record,
            cover_path: cover.as_deref(),
        }
        .render()?;

        let path = self.claim(self.document_path(record));
        write_bytes(&path, document.as_bytes()).await?;
        log::info!("Saved '{}' to {}", record, path.display());
        Ok(())
    }
}

/// Write bytes atomically: a uniquely named temp file in the target
/// directory, then a rename over `path`.
async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir).await?;

    let path = path.to_path_buf();
    let bytes = bytes.to_vec();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await?
}

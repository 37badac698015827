//! Media catalog listing: which clip files exist and where to fetch them

use std::future::Future;
use std::path::PathBuf;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use vidseq_core::MediaIndex;

/// Extensions the listing keeps
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "webm", "mov", "avi"];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Catalog returned status {0}")]
    Status(u16),
}

/// Source of available media file names
pub trait MediaCatalog {
    /// Ordered list of available media file names
    fn list(&self) -> impl Future<Output = Result<Vec<String>, CatalogError>> + Send;

    /// Locator a player or importer should use for `filename`
    fn locator(&self, filename: &str) -> String;
}

/// Fetch the listing and index it by logical name
pub async fn fetch_media_index<C: MediaCatalog>(catalog: &C) -> Result<MediaIndex, CatalogError> {
    let files = catalog.list().await?;
    for file in &files {
        debug!(file = %file, "Catalog entry");
    }
    let index = MediaIndex::from_listing(&files, |f| catalog.locator(f));
    info!(files = files.len(), names = index.len(), "Media catalog loaded");
    Ok(index)
}

#[derive(Debug, Deserialize)]
struct ClipListing {
    #[serde(default)]
    files: Vec<String>,
}

/// Catalog served over HTTP at `{base}/api/clips`
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }
}

impl MediaCatalog for HttpCatalog {
    async fn list(&self) -> Result<Vec<String>, CatalogError> {
        let response = self
            .http
            .get(format!("{}/api/clips", self.base_url))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Clip listing failed");
            return Err(CatalogError::Status(status.as_u16()));
        }
        let listing: ClipListing = response.json().await?;
        Ok(listing.files)
    }

    fn locator(&self, filename: &str) -> String {
        format!("{}/api/clips/{}", self.base_url, filename)
    }
}

/// Catalog backed by a local directory of clips
#[derive(Debug, Clone)]
pub struct DirCatalog {
    dir: PathBuf,
}

impl DirCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn is_video(filename: &str) -> bool {
    VIDEO_EXTENSIONS
        .iter()
        .any(|ext| filename.ends_with(&format!(".{ext}")))
}

impl MediaCatalog for DirCatalog {
    /// A missing or unreadable directory lists as empty
    async fn list(&self) -> Result<Vec<String>, CatalogError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), "Cannot read clips directory: {}", e);
                return Ok(Vec::new());
            }
        };
        let mut files = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    if let Some(name) = entry.file_name().to_str() {
                        if is_video(name) {
                            files.push(name.to_string());
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %self.dir.display(), "Error while listing clips: {}", e);
                    break;
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn locator(&self, filename: &str) -> String {
        self.dir.join(filename).display().to_string()
    }
}

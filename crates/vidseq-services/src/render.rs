//! Client for the external render service

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};
use vidseq_core::{render_uploads, RenderManifest, SequencerState};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render did not finish within {0:?}")]
    Timeout(Duration),
    #[error("Render service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Cannot read upload {path}: {source}")]
    Upload {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot encode render manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Submits compositions to `POST {base_url}/render` and waits for the video
#[derive(Debug, Clone)]
pub struct RenderClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl RenderClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(Client::new(), base_url, timeout)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, e: reqwest::Error) -> RenderError {
        if e.is_timeout() {
            RenderError::Timeout(self.timeout)
        } else {
            RenderError::Http(e)
        }
    }

    async fn build_form(&self, state: &SequencerState) -> Result<(Form, usize), RenderError> {
        let manifest = serde_json::to_string(&RenderManifest::from_state(state))?;
        let mut form = Form::new().text("data", manifest);
        let uploads = render_uploads(state);
        for upload in &uploads {
            let bytes = tokio::fs::read(&upload.path)
                .await
                .map_err(|source| RenderError::Upload {
                    path: upload.path.clone(),
                    source,
                })?;
            let part = Part::bytes(bytes)
                .file_name(upload.file_name.clone())
                .mime_str(upload.content_type)?;
            form = form.part("videos", part);
        }
        Ok((form, uploads.len()))
    }

    /// Send the composition with any uploaded media and return the rendered
    /// video bytes. Timeouts and service errors come back as `Err`.
    pub async fn trigger_remote_render(&self, state: &SequencerState) -> Result<Vec<u8>, RenderError> {
        let result = self.submit(state).await;
        if let Err(e) = &result {
            error!("Render failed: {}", e);
        }
        result
    }

    async fn submit(&self, state: &SequencerState) -> Result<Vec<u8>, RenderError> {
        let (form, uploaded) = self.build_form(state).await?;
        info!(
            uploaded,
            catalogued = state.instruments.len() - uploaded,
            clips = state.clips.len(),
            "Sending render request"
        );

        let response = self
            .http
            .post(format!("{}/render", self.base_url))
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        info!(bytes = bytes.len(), "Render received");
        Ok(bytes.to_vec())
    }
}

/// Write a rendered video into `output_dir` as `render_<unix millis>.mp4`
pub async fn save_render(output_dir: &Path, video: &[u8]) -> Result<PathBuf, RenderError> {
    tokio::fs::create_dir_all(output_dir).await?;
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let path = output_dir.join(format!("render_{millis}.mp4"));
    tokio::fs::write(&path, video).await?;
    info!(path = %path.display(), "Render saved");
    Ok(path)
}

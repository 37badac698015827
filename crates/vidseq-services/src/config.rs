//! User configuration: service endpoints and local directories

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Overrides `render_url`
pub const RENDER_URL_ENV: &str = "RENDER_SERVICE_URL";
/// Overrides `catalog_url`
pub const CATALOG_URL_ENV: &str = "VIDSEQ_CATALOG_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VidseqConfig {
    /// Base URL of the render service (`POST {render_url}/render`)
    pub render_url: String,
    /// Base URL of the app serving `/api/clips`
    pub catalog_url: String,
    pub clips_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Renders of long compositions take a while
    pub render_timeout_secs: u64,
}

impl Default for VidseqConfig {
    fn default() -> Self {
        Self {
            render_url: "http://localhost:8000".to_string(),
            catalog_url: "http://localhost:5173".to_string(),
            clips_dir: PathBuf::from("./clips"),
            output_dir: PathBuf::from("./output"),
            render_timeout_secs: 30 * 60,
        }
    }
}

impl VidseqConfig {
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&s)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// [`load_config`])
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(RENDER_URL_ENV).filter(|v| !v.is_empty()) {
            self.render_url = url;
        }
        if let Some(url) = lookup(CATALOG_URL_ENV).filter(|v| !v.is_empty()) {
            self.catalog_url = url;
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidseq")
        .join("config.toml")
}

/// Load the user config, falling back to defaults when the file is missing
/// or unreadable, then apply environment overrides
pub fn load_config() -> VidseqConfig {
    let path = config_path();
    let mut config = if path.exists() {
        VidseqConfig::load_from(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), "Ignoring config file: {}", e);
            VidseqConfig::default()
        })
    } else {
        VidseqConfig::default()
    };
    config.apply_overrides(|key| std::env::var(key).ok());
    config
}

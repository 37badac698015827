//! Error types for vidseq

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VidseqError {
    #[error("Project file has no \"version\" field")]
    MissingVersion,
    #[error("Unsupported project file version: {0}")]
    UnsupportedVersion(String),
    #[error("Project grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: u32, cols: u32 },
    #[error("Malformed project file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VidseqError>;

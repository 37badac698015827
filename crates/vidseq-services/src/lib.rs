//! vidseq-services: Media catalog, project import and render service clients

pub mod catalog;
pub mod config;
pub mod import;
pub mod render;

pub use catalog::{fetch_media_index, CatalogError, DirCatalog, HttpCatalog, MediaCatalog};
pub use config::{load_config, ConfigError, VidseqConfig};
pub use import::{import_project, ImportError};
pub use render::{save_render, RenderClient, RenderError};

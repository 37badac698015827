//! Project import: validate the file, resolve media against the catalog,
//! then swap the whole project into the store

use thiserror::Error;
use tracing::{error, info};
use vidseq_core::{ProjectFile, Sequencer, VidseqError};

use crate::catalog::{fetch_media_index, CatalogError, MediaCatalog};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Project(#[from] VidseqError),
    #[error("Could not load media catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Import `json` into `store`. The version tag is checked before the catalog
/// is contacted; on any failure the store is left as it was.
pub async fn import_project<C: MediaCatalog>(
    store: &mut Sequencer,
    json: &str,
    catalog: &C,
) -> Result<(), ImportError> {
    let result = try_import(store, json, catalog).await;
    if let Err(e) = &result {
        error!("Project import failed: {}", e);
    }
    result
}

async fn try_import<C: MediaCatalog>(
    store: &mut Sequencer,
    json: &str,
    catalog: &C,
) -> Result<(), ImportError> {
    let file = ProjectFile::from_json(json)?;
    info!(version = %file.version, "Project file validated");
    let index = fetch_media_index(catalog).await?;
    store.import_project(file, &index)?;
    Ok(())
}

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::json;
use vidseq_core::{GridSize, InstrumentId, MediaRef, MediaSource, Sequencer, VidseqError};
use vidseq_services::{
    fetch_media_index, import_project, CatalogError, DirCatalog, HttpCatalog, ImportError,
    MediaCatalog,
};

use common::{local_client, spawn_server};

const PROJECT: &str = r##"{
    "version": "1.0",
    "bpm": 110,
    "totalBeats": 96,
    "gridSize": { "rows": 2, "cols": 3 },
    "instruments": [
        { "id": "inst-kick", "name": "kick", "color": "#FF6B6B", "gridPosition": 0 },
        { "id": "inst-pad", "name": "pad", "color": "#4ECDC4", "gridPosition": 5, "offset": 2, "maxDuration": 4 }
    ],
    "clips": [
        { "id": "c1", "instrumentId": "inst-kick", "startTime": 0, "duration": 1, "trackIndex": 0 },
        { "id": "c2", "instrumentId": "inst-pad", "startTime": 16, "duration": 16, "trackIndex": 1 }
    ]
}"##;

async fn catalog_server(files: &'static [&'static str]) -> String {
    let app = Router::new().route(
        "/api/clips",
        get(move || async move { Json(json!({ "files": files })) }),
    );
    spawn_server(app).await
}

async fn failing_catalog_server() -> String {
    let app = Router::new().route(
        "/api/clips",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "disk on fire") }),
    );
    spawn_server(app).await
}

/// Catalog that counts how often it was asked for a listing
#[derive(Default)]
struct CountingCatalog {
    calls: Arc<AtomicUsize>,
}

impl MediaCatalog for CountingCatalog {
    async fn list(&self) -> Result<Vec<String>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["kick.mp4".to_string()])
    }

    fn locator(&self, filename: &str) -> String {
        format!("mem://{filename}")
    }
}

#[tokio::test]
async fn http_catalog_lists_and_resolves() {
    let base = catalog_server(&["kick.mp4", "pad.webm", "pad.mov"]).await;
    let catalog = HttpCatalog::with_client(local_client(), base.clone());

    let index = fetch_media_index(&catalog).await.expect("catalog");

    assert_eq!(index.len(), 2);
    assert_eq!(index.resolve("kick"), Some(format!("{base}/api/clips/kick.mp4").as_str()));
    assert_eq!(index.resolve("pad"), Some(format!("{base}/api/clips/pad.mov").as_str()));
}

#[tokio::test]
async fn import_resolves_media_and_replaces_state() {
    let base = catalog_server(&["kick.mp4"]).await;
    let catalog = HttpCatalog::with_client(local_client(), base.clone());
    let mut store = Sequencer::new();
    store.add_instrument("stale", Some(MediaSource::Upload("stale.mp4".into())));

    import_project(&mut store, PROJECT, &catalog).await.expect("import");

    let state = store.state();
    assert_eq!(state.instruments.len(), 2);
    assert_eq!(state.clips.len(), 2);
    assert_eq!(state.transport.bpm, 110.0);
    assert_eq!(state.transport.total_beats, 96.0);
    assert_eq!(state.grid, GridSize::new(2, 3));
    assert!(!state.transport.loop_mode);

    let kick = state.get_instrument(&InstrumentId::from("inst-kick")).unwrap();
    assert_eq!(kick.media, Some(MediaRef::Locator(format!("{base}/api/clips/kick.mp4"))));
    let pad = state.get_instrument(&InstrumentId::from("inst-pad")).unwrap();
    assert_eq!(pad.media, None);
    assert_eq!(pad.offset, 2.0);
    assert_eq!(pad.max_duration, 4.0);

    assert_eq!(store.live_handles(), 0);
}

#[tokio::test]
async fn unsupported_version_fails_before_catalog() {
    let catalog = CountingCatalog::default();
    let mut store = Sequencer::new();
    store.add_instrument("keep", None);
    let before = store.snapshot();

    let json = PROJECT.replace("\"1.0\"", "\"2.0\"");
    let err = import_project(&mut store, &json, &catalog).await.unwrap_err();

    assert!(matches!(err, ImportError::Project(VidseqError::UnsupportedVersion(v)) if v == "2.0"));
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[tokio::test]
async fn missing_version_fails() {
    let catalog = CountingCatalog::default();
    let mut store = Sequencer::new();

    let json = PROJECT.replace("\"version\": \"1.0\",", "");
    let err = import_project(&mut store, &json, &catalog).await.unwrap_err();

    assert!(matches!(err, ImportError::Project(VidseqError::MissingVersion)));
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    assert!(store.state().instruments.is_empty());
}

#[tokio::test]
async fn catalog_failure_leaves_state_untouched() {
    let base = failing_catalog_server().await;
    let catalog = HttpCatalog::with_client(local_client(), base);
    let mut store = Sequencer::new();
    store.add_instrument("keep", Some(MediaSource::Upload("keep.mp4".into())));
    let before = store.snapshot();

    let err = import_project(&mut store, PROJECT, &catalog).await.unwrap_err();

    assert!(matches!(err, ImportError::Catalog(CatalogError::Status(500))));
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
    assert_eq!(store.live_handles(), 1);
}

#[tokio::test]
async fn unreachable_catalog_is_reported() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let catalog = HttpCatalog::with_client(local_client(), format!("http://{addr}"));
    let mut store = Sequencer::new();
    let err = import_project(&mut store, PROJECT, &catalog).await.unwrap_err();
    assert!(matches!(err, ImportError::Catalog(CatalogError::Http(_))));
}

#[tokio::test]
async fn dir_catalog_filters_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["snare.webm", "kick.mp4", "notes.txt", "pad.mov", "hat.avi"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    let catalog = DirCatalog::new(dir.path());

    let files = catalog.list().await.unwrap();
    assert_eq!(files, vec!["hat.avi", "kick.mp4", "pad.mov", "snare.webm"]);

    let index = fetch_media_index(&catalog).await.unwrap();
    let kick = dir.path().join("kick.mp4").display().to_string();
    assert_eq!(index.resolve("kick"), Some(kick.as_str()));
}

#[tokio::test]
async fn dir_catalog_missing_dir_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = DirCatalog::new(dir.path().join("nope"));
    assert!(catalog.list().await.unwrap().is_empty());
}

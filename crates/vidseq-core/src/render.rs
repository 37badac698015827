//! What the render service needs to know about a project

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::clip::ClipId;
use crate::grid::GridSize;
use crate::instrument::InstrumentId;
use crate::state::SequencerState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderInstrument {
    pub id: InstrumentId,
    pub name: String,
    pub grid_position: u32,
    pub offset: f64,
    pub max_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderClip {
    pub id: ClipId,
    pub instrument_id: InstrumentId,
    pub start_time: f64,
    pub duration: f64,
}

/// JSON document sent as the `data` part of a render submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderManifest {
    pub bpm: f64,
    pub grid_size: GridSize,
    pub instruments: Vec<RenderInstrument>,
    pub clips: Vec<RenderClip>,
}

impl RenderManifest {
    pub fn from_state(state: &SequencerState) -> Self {
        Self {
            bpm: state.transport.bpm,
            grid_size: state.grid,
            instruments: state
                .instruments
                .iter()
                .map(|inst| RenderInstrument {
                    id: inst.id.clone(),
                    name: inst.name.clone(),
                    grid_position: inst.grid_position,
                    offset: inst.offset,
                    max_duration: inst.max_duration,
                })
                .collect(),
            clips: state
                .clips
                .iter()
                .map(|clip| RenderClip {
                    id: clip.id.clone(),
                    instrument_id: clip.instrument_id.clone(),
                    start_time: clip.start_time,
                    duration: clip.duration,
                })
                .collect(),
        }
    }
}

/// A local file that has to travel with the render submission
#[derive(Debug, Clone, PartialEq)]
pub struct RenderUpload {
    pub path: PathBuf,
    /// `<instrument name>.<ext>`, which the service matches back to the instrument
    pub file_name: String,
    pub content_type: &'static str,
}

impl RenderUpload {
    fn for_instrument(name: &str, path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4")
            .to_string();
        Self {
            path: path.to_path_buf(),
            file_name: format!("{name}.{ext}"),
            content_type: video_content_type(&ext),
        }
    }
}

/// Uploaded media of every instrument, in instrument order
pub fn render_uploads(state: &SequencerState) -> Vec<RenderUpload> {
    state
        .instruments
        .iter()
        .filter_map(|inst| {
            let path = inst.media.as_ref()?.upload_path()?;
            Some(RenderUpload::for_instrument(&inst.name, path))
        })
        .collect()
}

/// Content type for a video file extension
pub fn video_content_type(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        _ => "video/mp4",
    }
}

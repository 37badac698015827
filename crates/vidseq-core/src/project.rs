//! Versioned project file format

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clip::Clip;
use crate::error::{Result, VidseqError};
use crate::grid::GridSize;
use crate::instrument::InstrumentId;
use crate::state::SequencerState;

/// The only project file version this build reads and writes
pub const PROJECT_VERSION: &str = "1.0";

/// Durable fields of an instrument. Media is dropped on export and
/// re-resolved by name on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInstrument {
    pub id: InstrumentId,
    pub name: String,
    pub color: String,
    pub grid_position: u32,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub max_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub version: String,
    pub bpm: f64,
    pub total_beats: f64,
    pub grid_size: GridSize,
    pub instruments: Vec<ProjectInstrument>,
    #[serde(default)]
    pub clips: Vec<Clip>,
    /// Read when present, never written
    #[serde(default, skip_serializing)]
    pub loop_mode: bool,
}

impl ProjectFile {
    /// Snapshot the durable parts of `state`
    pub fn from_state(state: &SequencerState) -> Self {
        Self {
            version: PROJECT_VERSION.to_string(),
            bpm: state.transport.bpm,
            total_beats: state.transport.total_beats,
            grid_size: state.grid,
            instruments: state
                .instruments
                .iter()
                .map(|inst| ProjectInstrument {
                    id: inst.id.clone(),
                    name: inst.name.clone(),
                    color: inst.color.clone(),
                    grid_position: inst.grid_position,
                    offset: inst.offset,
                    max_duration: inst.max_duration,
                })
                .collect(),
            clips: state.clips.clone(),
            loop_mode: state.transport.loop_mode,
        }
    }

    /// Parse a project file, checking the version tag before anything else
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        check_version(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn check_version(&self) -> Result<()> {
        match self.version.as_str() {
            "" => Err(VidseqError::MissingVersion),
            PROJECT_VERSION => Ok(()),
            other => Err(VidseqError::UnsupportedVersion(other.to_string())),
        }
    }
}

fn check_version(value: &Value) -> Result<()> {
    match value.get("version") {
        None | Some(Value::Null) => Err(VidseqError::MissingVersion),
        Some(Value::String(v)) if v.is_empty() => Err(VidseqError::MissingVersion),
        Some(Value::String(v)) if v == PROJECT_VERSION => Ok(()),
        Some(Value::String(v)) => Err(VidseqError::UnsupportedVersion(v.clone())),
        Some(other) => Err(VidseqError::UnsupportedVersion(other.to_string())),
    }
}

//! Clips scheduled on the beat timeline

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::instrument::InstrumentId;

/// Unique identifier for clips
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    pub fn generate() -> Self {
        Self(format!("clip-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClipId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A placement of an instrument's media on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: ClipId,
    pub instrument_id: InstrumentId,
    /// Start position in beats
    pub start_time: f64,
    /// Length in beats
    pub duration: f64,
    pub track_index: u32,
}

impl Clip {
    pub fn new(
        id: ClipId,
        instrument_id: InstrumentId,
        start_time: f64,
        duration: f64,
        track_index: u32,
    ) -> Self {
        Self {
            id,
            instrument_id,
            start_time,
            duration,
            track_index,
        }
    }

    /// End position in beats (start + duration)
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether the clip is sounding at `beat`
    pub fn is_active_at(&self, beat: f64) -> bool {
        beat >= self.start_time && beat < self.end_time()
    }
}

/// Fields to merge into a clip. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ClipPatch {
    pub instrument_id: Option<InstrumentId>,
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub track_index: Option<u32>,
}

impl ClipPatch {
    pub fn instrument_id(mut self, id: InstrumentId) -> Self {
        self.instrument_id = Some(id);
        self
    }

    pub fn start_time(mut self, beats: f64) -> Self {
        self.start_time = Some(beats);
        self
    }

    pub fn duration(mut self, beats: f64) -> Self {
        self.duration = Some(beats);
        self
    }

    pub fn track_index(mut self, index: u32) -> Self {
        self.track_index = Some(index);
        self
    }

    pub(crate) fn apply(self, clip: &mut Clip) {
        if let Some(id) = self.instrument_id {
            clip.instrument_id = id;
        }
        if let Some(start) = self.start_time {
            clip.start_time = start;
        }
        if let Some(duration) = self.duration {
            clip.duration = duration;
        }
        if let Some(track) = self.track_index {
            clip.track_index = track;
        }
    }
}

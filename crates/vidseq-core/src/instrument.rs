//! Instrument representation

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::media::{MediaRef, MediaSource};

/// Display colors, assigned by cycling over the instrument count
pub const PALETTE: [&str; 9] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2",
    "#F8B739",
];

/// Unique identifier for instruments
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    pub fn generate() -> Self {
        Self(format!("instrument-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named video source bound to one grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub id: InstrumentId,
    pub name: String,
    pub media: Option<MediaRef>,
    pub color: String,
    /// Row-major index into the display grid
    pub grid_position: u32,
    /// Seconds into the source media where playback starts
    pub offset: f64,
    /// Seconds of source to play; 0 plays to the end
    pub max_duration: f64,
}

impl Instrument {
    pub fn new(id: InstrumentId, name: impl Into<String>, grid_position: u32) -> Self {
        Self {
            id,
            name: name.into(),
            media: None,
            color: PALETTE[0].to_string(),
            grid_position,
            offset: 0.0,
            max_duration: 0.0,
        }
    }

    pub fn palette_color(index: usize) -> &'static str {
        PALETTE[index % PALETTE.len()]
    }

    pub fn is_upload(&self) -> bool {
        self.media.as_ref().is_some_and(|m| m.upload_path().is_some())
    }
}

/// Fields to merge into an instrument. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct InstrumentPatch {
    pub name: Option<String>,
    /// `Some(None)` detaches the media
    pub media: Option<Option<MediaSource>>,
    pub color: Option<String>,
    pub grid_position: Option<u32>,
    pub offset: Option<f64>,
    pub max_duration: Option<f64>,
}

impl InstrumentPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn media(mut self, media: Option<MediaSource>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn grid_position(mut self, position: u32) -> Self {
        self.grid_position = Some(position);
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn max_duration(mut self, max_duration: f64) -> Self {
        self.max_duration = Some(max_duration);
        self
    }
}

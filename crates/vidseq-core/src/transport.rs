//! Transport state and beat/second conversion

use serde::{Deserialize, Serialize};

pub const MIN_BPM: f64 = 40.0;
pub const MAX_BPM: f64 = 300.0;
pub const DEFAULT_BPM: f64 = 120.0;
/// 32 bars of 4/4, about a minute at 120 BPM
pub const DEFAULT_TOTAL_BEATS: f64 = 128.0;

/// Convert a beat count to seconds at the given tempo
pub fn beats_to_seconds(beats: f64, bpm: f64) -> f64 {
    beats / bpm * 60.0
}

/// Convert seconds to a beat count at the given tempo
pub fn seconds_to_beats(seconds: f64, bpm: f64) -> f64 {
    seconds / 60.0 * bpm
}

/// Transport controls and project timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    pub is_playing: bool,
    /// Playhead position in beats, always within `[0, total_beats]`
    pub current_time: f64,
    /// Tempo in BPM, always within `[MIN_BPM, MAX_BPM]`
    pub bpm: f64,
    /// Project length in beats
    pub total_beats: f64,
    pub loop_mode: bool,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            bpm: DEFAULT_BPM,
            total_beats: DEFAULT_TOTAL_BEATS,
            loop_mode: false,
        }
    }
}

impl Transport {
    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn stop(&mut self) {
        self.is_playing = false;
        self.current_time = 0.0;
    }

    pub fn toggle_loop_mode(&mut self) {
        self.loop_mode = !self.loop_mode;
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm.max(MIN_BPM).min(MAX_BPM);
    }

    pub fn set_current_time(&mut self, beats: f64) {
        // Not `clamp`: an imported total_beats may be negative.
        self.current_time = beats.min(self.total_beats).max(0.0);
    }

    /// Project length in seconds
    pub fn duration_secs(&self) -> f64 {
        beats_to_seconds(self.total_beats, self.bpm)
    }
}

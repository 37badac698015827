//! Playback-tick projection, recomputed by whatever drives the playhead

use std::collections::HashSet;

use crate::clip::{Clip, ClipId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    pub current_beat: f64,
    /// Clips showing at `current_beat`
    pub active_clips: HashSet<ClipId>,
}

impl PlaybackState {
    pub fn reset(&mut self) {
        self.current_beat = 0.0;
        self.active_clips.clear();
    }

    /// Move to `beat` and recompute the active set. Returns true when the set changed.
    pub fn advance(&mut self, beat: f64, clips: &[Clip]) -> bool {
        self.current_beat = beat;
        let active: HashSet<ClipId> = clips
            .iter()
            .filter(|c| c.is_active_at(beat))
            .map(|c| c.id.clone())
            .collect();
        if active == self.active_clips {
            return false;
        }
        self.active_clips = active;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::InstrumentId;

    fn clip(id: &str, start: f64, duration: f64) -> Clip {
        Clip::new(ClipId::from(id), InstrumentId::from("inst"), start, duration, 0)
    }

    #[test]
    fn test_advance_tracks_half_open_spans() {
        let clips = vec![clip("a", 0.0, 2.0), clip("b", 1.0, 1.0)];
        let mut playback = PlaybackState::default();

        assert!(playback.advance(0.5, &clips));
        assert_eq!(playback.active_clips.len(), 1);

        assert!(playback.advance(1.5, &clips));
        assert_eq!(playback.active_clips.len(), 2);

        assert!(!playback.advance(1.75, &clips));

        assert!(playback.advance(2.0, &clips));
        assert!(playback.active_clips.is_empty());
    }

    #[test]
    fn test_reset() {
        let clips = vec![clip("a", 0.0, 4.0)];
        let mut playback = PlaybackState::default();
        playback.advance(3.0, &clips);
        playback.reset();
        assert_eq!(playback.current_beat, 0.0);
        assert!(playback.active_clips.is_empty());
    }
}

//! Project state: instruments, clips, grid and transport

use crate::clip::{Clip, ClipId};
use crate::grid::GridSize;
use crate::instrument::{Instrument, InstrumentId};
use crate::transport::{beats_to_seconds, Transport};

/// The whole project model. Replaced as one value on every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequencerState {
    pub instruments: Vec<Instrument>,
    pub clips: Vec<Clip>,
    pub transport: Transport,
    pub grid: GridSize,
}

impl SequencerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_instrument(&self, id: &InstrumentId) -> Option<&Instrument> {
        self.instruments.iter().find(|i| &i.id == id)
    }

    pub fn get_instrument_mut(&mut self, id: &InstrumentId) -> Option<&mut Instrument> {
        self.instruments.iter_mut().find(|i| &i.id == id)
    }

    pub fn get_clip(&self, id: &ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| &c.id == id)
    }

    pub fn get_clip_mut(&mut self, id: &ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| &c.id == id)
    }

    pub fn instrument_at(&self, position: u32) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.grid_position == position)
    }

    pub fn clips_for(&self, instrument: &InstrumentId) -> impl Iterator<Item = &Clip> {
        self.clips.iter().filter(move |c| &c.instrument_id == instrument)
    }

    /// Lowest grid position not taken by any instrument
    pub fn first_free_position(&self) -> Option<u32> {
        (0..self.grid.cells()).find(|&pos| self.instrument_at(pos).is_none())
    }

    /// Highest occupied grid position, if any instrument exists
    pub fn max_occupied_position(&self) -> Option<u32> {
        self.instruments.iter().map(|i| i.grid_position).max()
    }

    /// End of the last clip in beats
    pub fn last_clip_end(&self) -> f64 {
        self.clips.iter().map(Clip::end_time).fold(0.0, f64::max)
    }

    /// Length of the rendered composition in seconds
    pub fn render_duration_secs(&self) -> f64 {
        beats_to_seconds(self.last_clip_end(), self.transport.bpm)
    }
}

//! The sequencer store: owns the project state and applies validated mutations

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::clip::{Clip, ClipId, ClipPatch};
use crate::error::{Result, VidseqError};
use crate::grid::GridSize;
use crate::instrument::{Instrument, InstrumentId, InstrumentPatch};
use crate::media::{LocalHandles, MediaIndex, MediaRef, MediaSource};
use crate::playback::PlaybackState;
use crate::project::ProjectFile;
use crate::state::SequencerState;

/// Owned state container. Every mutation computes the next state and
/// swaps it in whole; rejected mutations leave the current value in place.
#[derive(Debug, Default)]
pub struct Sequencer {
    state: Arc<SequencerState>,
    playback: PlaybackState,
    handles: LocalHandles,
    subscribers: Vec<Sender<Arc<SequencerState>>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: SequencerState) -> Self {
        Self {
            state: Arc::new(state),
            ..Default::default()
        }
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Cheap shared snapshot of the current state
    pub fn snapshot(&self) -> Arc<SequencerState> {
        Arc::clone(&self.state)
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackState {
        &mut self.playback
    }

    /// Number of local media handles not yet released
    pub fn live_handles(&self) -> usize {
        self.handles.live()
    }

    /// Receive a snapshot after every applied mutation
    pub fn subscribe(&mut self) -> Receiver<Arc<SequencerState>> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn commit(&mut self, next: SequencerState) {
        self.state = Arc::new(next);
        let snapshot = &self.state;
        self.subscribers.retain(|tx| tx.send(Arc::clone(snapshot)).is_ok());
    }

    fn next_state(&self) -> SequencerState {
        (*self.state).clone()
    }

    fn bind_media(&mut self, source: MediaSource) -> MediaRef {
        match source {
            MediaSource::Upload(path) => MediaRef::Upload {
                path,
                handle: self.handles.acquire(),
            },
            MediaSource::Locator(url) => MediaRef::Locator(url),
        }
    }

    fn release_media(&mut self, media: Option<&MediaRef>) {
        if let Some(handle) = media.and_then(MediaRef::local_handle) {
            self.handles.release(handle);
        }
    }

    /// Add an instrument in the lowest free grid cell. Returns `None`, leaving
    /// the state unchanged, when the grid is full.
    pub fn add_instrument(
        &mut self,
        name: impl Into<String>,
        media: Option<MediaSource>,
    ) -> Option<InstrumentId> {
        let name = name.into();
        let Some(position) = self.state.first_free_position() else {
            warn!(name = %name, grid = ?self.state.grid, "Grid full, cannot add instrument");
            return None;
        };

        let mut next = self.next_state();
        let id = InstrumentId::generate();
        let mut instrument = Instrument::new(id.clone(), name, position);
        instrument.color = Instrument::palette_color(next.instruments.len()).to_string();
        instrument.media = media.map(|m| self.bind_media(m));
        debug!(id = %id, position, "Instrument added");
        next.instruments.push(instrument);
        self.commit(next);
        Some(id)
    }

    /// Remove an instrument and every clip that references it
    pub fn remove_instrument(&mut self, id: &InstrumentId) {
        let Some(instrument) = self.state.get_instrument(id) else {
            return;
        };
        let media = instrument.media.clone();
        self.release_media(media.as_ref());

        let mut next = self.next_state();
        next.instruments.retain(|i| &i.id != id);
        next.clips.retain(|c| &c.instrument_id != id);
        debug!(id = %id, "Instrument removed");
        self.commit(next);
    }

    /// Append a clip. Neither the instrument nor the timeline bounds are checked.
    pub fn add_clip(
        &mut self,
        instrument_id: InstrumentId,
        start_time: f64,
        duration: f64,
        track_index: u32,
    ) -> ClipId {
        let id = ClipId::generate();
        let mut next = self.next_state();
        next.clips.push(Clip::new(id.clone(), instrument_id, start_time, duration, track_index));
        self.commit(next);
        id
    }

    pub fn remove_clip(&mut self, id: &ClipId) {
        if self.state.get_clip(id).is_none() {
            return;
        }
        let mut next = self.next_state();
        next.clips.retain(|c| &c.id != id);
        self.commit(next);
    }

    pub fn update_clip(&mut self, id: &ClipId, patch: ClipPatch) {
        let mut next = self.next_state();
        let Some(clip) = next.get_clip_mut(id) else {
            return;
        };
        patch.apply(clip);
        self.commit(next);
    }

    pub fn update_instrument(&mut self, id: &InstrumentId, patch: InstrumentPatch) {
        let Some(current) = self.state.get_instrument(id) else {
            return;
        };
        let mut updated = current.clone();

        if let Some(media) = patch.media {
            self.release_media(updated.media.as_ref());
            updated.media = media.map(|m| self.bind_media(m));
        }
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(color) = patch.color {
            updated.color = color;
        }
        if let Some(position) = patch.grid_position {
            updated.grid_position = position;
        }
        if let Some(offset) = patch.offset {
            updated.offset = offset;
        }
        if let Some(max_duration) = patch.max_duration {
            updated.max_duration = max_duration;
        }

        let mut next = self.next_state();
        if let Some(slot) = next.get_instrument_mut(id) {
            *slot = updated;
        }
        self.commit(next);
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        let mut next = self.next_state();
        next.transport.set_bpm(bpm);
        self.commit(next);
    }

    pub fn set_current_time(&mut self, beats: f64) {
        let mut next = self.next_state();
        next.transport.set_current_time(beats);
        self.commit(next);
    }

    pub fn play(&mut self) {
        let mut next = self.next_state();
        next.transport.play();
        self.commit(next);
    }

    pub fn pause(&mut self) {
        let mut next = self.next_state();
        next.transport.pause();
        self.commit(next);
    }

    /// Pause, rewind to beat 0 and clear the playback projection
    pub fn stop(&mut self) {
        let mut next = self.next_state();
        next.transport.stop();
        self.commit(next);
        self.playback.reset();
    }

    pub fn toggle_loop_mode(&mut self) {
        let mut next = self.next_state();
        next.transport.toggle_loop_mode();
        self.commit(next);
    }

    /// Move an instrument to `position`. An instrument already in that cell
    /// takes the mover's old position.
    pub fn move_instrument_to_position(&mut self, id: &InstrumentId, position: u32) {
        if !self.state.grid.contains(position) {
            return;
        }
        let Some(moving) = self.state.get_instrument(id) else {
            return;
        };
        let old_position = moving.grid_position;
        let occupant = self.state.instrument_at(position).map(|i| i.id.clone());

        let mut next = self.next_state();
        for inst in next.instruments.iter_mut() {
            if &inst.id == id {
                inst.grid_position = position;
            } else if occupant.as_ref() == Some(&inst.id) {
                inst.grid_position = old_position;
            }
        }
        self.commit(next);
    }

    /// Resize the grid. Rejected when a dimension is zero or when an
    /// instrument would sit outside the new grid.
    pub fn set_grid_size(&mut self, rows: u32, cols: u32) {
        let grid = GridSize::new(rows, cols);
        if rows == 0 || cols == 0 {
            warn!(rows, cols, "Grid dimensions must be at least 1");
            return;
        }
        if let Some(max) = self.state.max_occupied_position() {
            if grid.cells() <= max {
                warn!(
                    rows,
                    cols,
                    max_position = max,
                    "Cannot shrink grid: instruments occupy cells that would be removed"
                );
                return;
            }
        }
        let mut next = self.next_state();
        next.grid = grid;
        self.commit(next);
    }

    pub fn export_project(&self) -> ProjectFile {
        ProjectFile::from_state(&self.state)
    }

    /// Replace the whole project with `file`, resolving each instrument's
    /// media by name against `media`. Names without a match keep no media.
    /// On error nothing changes.
    pub fn import_project(&mut self, file: ProjectFile, media: &MediaIndex) -> Result<()> {
        file.check_version()?;
        let GridSize { rows, cols } = file.grid_size;
        if rows == 0 || cols == 0 {
            return Err(VidseqError::EmptyGrid { rows, cols });
        }

        let instruments: Vec<Instrument> = file
            .instruments
            .into_iter()
            .map(|inst| {
                let locator = media.resolve(&inst.name);
                if locator.is_none() {
                    warn!(name = %inst.name, position = inst.grid_position, "No media found for instrument");
                }
                Instrument {
                    media: locator.map(|l| MediaRef::Locator(l.to_string())),
                    id: inst.id,
                    name: inst.name,
                    color: inst.color,
                    grid_position: inst.grid_position,
                    offset: inst.offset,
                    max_duration: inst.max_duration,
                }
            })
            .collect();

        let superseded: Vec<MediaRef> = self
            .state
            .instruments
            .iter()
            .filter_map(|i| i.media.clone())
            .collect();
        for media in &superseded {
            self.release_media(Some(media));
        }

        let mut next = SequencerState {
            instruments,
            clips: file.clips,
            grid: file.grid_size,
            ..Default::default()
        };
        next.transport.bpm = file.bpm;
        next.transport.total_beats = file.total_beats;
        next.transport.loop_mode = file.loop_mode;

        info!(
            instruments = next.instruments.len(),
            clips = next.clips.len(),
            bpm = next.transport.bpm,
            rows = next.grid.rows,
            cols = next.grid.cols,
            "Project imported"
        );
        self.commit(next);
        self.playback.reset();
        Ok(())
    }
}

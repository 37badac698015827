//! vidseq-core: Domain types and state store for the video sequencer

mod clip;
mod error;
mod grid;
mod instrument;
pub mod media;
mod playback;
pub mod project;
pub mod render;
pub mod script;
mod sequencer;
mod state;
mod transport;

pub use clip::{Clip, ClipId, ClipPatch};
pub use error::{Result, VidseqError};
pub use grid::{GridSize, CANVAS_HEIGHT, CANVAS_WIDTH};
pub use instrument::{Instrument, InstrumentId, InstrumentPatch, PALETTE};
pub use media::{LocalHandle, MediaIndex, MediaRef, MediaSource};
pub use playback::PlaybackState;
pub use project::{ProjectFile, ProjectInstrument, PROJECT_VERSION};
pub use render::{render_uploads, RenderManifest, RenderUpload};
pub use script::{generate_render_script, SCRIPT_FILE_NAME};
pub use sequencer::Sequencer;
pub use state::SequencerState;
pub use transport::{beats_to_seconds, seconds_to_beats, Transport, MAX_BPM, MIN_BPM};

//! Standalone MoviePy render script generation
//!
//! The script lays every instrument's first frame on its grid cell for the
//! whole composition, then overlays one timed clip per scheduled clip.

use crate::state::SequencerState;
use crate::transport::beats_to_seconds;

/// Suggested file name for the generated script
pub const SCRIPT_FILE_NAME: &str = "render-VideoSequencer.py";

/// Python string literal for `s`
fn py_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Text safe to put after a `#`
fn comment_text(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}

fn annotations(offset: f64, max_duration: f64) -> String {
    let mut notes = String::new();
    if offset > 0.0 {
        notes.push_str(&format!(" (offset: {offset}s)"));
    }
    if max_duration > 0.0 {
        notes.push_str(&format!(" (max: {max_duration}s)"));
    }
    notes
}

/// Render the composition in `state` as a Python script. Pure function of
/// the state: the same state always yields the same text.
pub fn generate_render_script(state: &SequencerState) -> String {
    let bpm = state.transport.bpm;
    let duration = state.render_duration_secs();
    let grid = state.grid;
    let (cell_width, cell_height) = grid.cell_size();

    let mut s = String::new();
    let header = format!(
        r#"#!/usr/bin/env python3
"""
VideoSequencer render script
BPM: {bpm}, Duration: {duration:.2}s, Grid: {cols}x{rows}

Install: pip install moviepy
Usage: python3 {SCRIPT_FILE_NAME}
"""

from moviepy import VideoFileClip, ColorClip, CompositeVideoClip
from datetime import datetime
import os

# Configuration
CLIPS_DIR = "./clips"
OUTPUT_DIR = "./output"
os.makedirs(OUTPUT_DIR, exist_ok=True)

DURATION = {duration:.3}
WIDTH, HEIGHT = 1920, 1080
CELL_WIDTH = {cell_width}
CELL_HEIGHT = {cell_height}
VIDEO_EXTENSIONS = ['.mp4', '.mov', '.avi', '.mkv', '.webm']


def find_video(name):
    for ext in VIDEO_EXTENSIONS:
        potential = os.path.join(CLIPS_DIR, name + ext)
        if os.path.exists(potential):
            return potential
    return None


print("VideoSequencer render")
print(f"Duration: {{DURATION:.2f}}s")
print("Grid: {cols}x{rows}")
print("Clips: {clip_count}")
print("")

# Black background
base = ColorClip(size=(WIDTH, HEIGHT), color=(0, 0, 0), duration=DURATION)

clips = []

"#,
        cols = grid.cols,
        rows = grid.rows,
        clip_count = state.clips.len(),
    );
    s.push_str(&header);

    for (idx, clip) in state.clips.iter().enumerate() {
        let Some(inst) = state.get_instrument(&clip.instrument_id) else {
            continue;
        };
        let start_secs = beats_to_seconds(clip.start_time, bpm);
        let offset = inst.offset;
        let (x, y) = grid.cell_origin(inst.grid_position);
        let name = py_string(&inst.name);

        s.push_str(&format!(
            "# Clip {}: {} at beat {}{}\n",
            idx + 1,
            comment_text(&inst.name),
            clip.start_time,
            annotations(offset, inst.max_duration)
        ));
        s.push_str(&format!("video_path{idx} = find_video({name})\n"));
        s.push_str(&format!("if video_path{idx}:\n"));
        s.push_str(&format!("    video{idx} = VideoFileClip(video_path{idx})\n"));
        if inst.max_duration > 0.0 {
            s.push_str(&format!(
                "    clip_duration{idx} = min({:.3}, video{idx}.duration - {offset:.3})\n",
                inst.max_duration
            ));
        } else {
            s.push_str(&format!("    clip_duration{idx} = video{idx}.duration - {offset:.3}\n"));
        }
        s.push_str(&format!(
            "    video{idx} = video{idx}.subclipped({offset:.3}, {offset:.3} + clip_duration{idx})\n"
        ));
        s.push_str(&format!("    video{idx} = video{idx}.resized(({cell_width}, {cell_height}))\n"));
        s.push_str(&format!("    video{idx} = video{idx}.with_start({start_secs:.3})\n"));
        s.push_str(&format!("    video{idx} = video{idx}.with_position(({x}, {y}))\n"));
        s.push_str(&format!("    clips.append(video{idx})\n"));
        s.push_str("else:\n");
        s.push_str(&format!("    print(\"Video not found: \" + {name})\n"));
        s.push('\n');
    }

    s.push_str(
        r#"# Still first frame of every instrument on its cell
print("Creating still frames...")
static_frames = []

"#,
    );

    for (idx, inst) in state.instruments.iter().enumerate() {
        let offset = inst.offset;
        let (x, y) = grid.cell_origin(inst.grid_position);
        let name = py_string(&inst.name);

        s.push_str(&format!(
            "# Still frame for {}{}\n",
            comment_text(&inst.name),
            annotations(offset, 0.0)
        ));
        s.push_str(&format!("static_path{idx} = find_video({name})\n"));
        s.push_str(&format!("if static_path{idx}:\n"));
        s.push_str(&format!(
            "    static{idx} = VideoFileClip(static_path{idx}).to_ImageClip({offset:.3})\n"
        ));
        s.push_str(&format!("    static{idx} = static{idx}.resized(({cell_width}, {cell_height}))\n"));
        s.push_str(&format!("    static{idx} = static{idx}.with_duration(DURATION)\n"));
        s.push_str(&format!("    static{idx} = static{idx}.with_position(({x}, {y}))\n"));
        s.push_str(&format!("    static_frames.append(static{idx})\n"));
        s.push('\n');
    }

    s.push_str(
        r#"# Compose: background, then still frames, then animated clips
print(f"Composing {len(static_frames)} still frames + {len(clips)} clips...")
final = CompositeVideoClip([base] + static_frames + clips, size=(WIDTH, HEIGHT))

output_file = f"{OUTPUT_DIR}/render_{datetime.now().strftime('%Y%m%d_%H%M%S')}.mp4"
print(f"Rendering to: {output_file}")

final.write_videofile(
    output_file,
    fps=30,
    codec='libx264',
    audio_codec='aac',
    bitrate='5000k',
    preset='medium'
)

print("Render complete")
print(f"File: {output_file}")
"#,
    );

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{Clip, ClipId};
    use crate::grid::GridSize;
    use crate::instrument::{Instrument, InstrumentId};

    fn two_by_three() -> SequencerState {
        let mut state = SequencerState::new();
        state.transport.bpm = 120.0;
        state.grid = GridSize::new(2, 3);

        let kick = Instrument::new(InstrumentId::from("kick"), "kick", 0);
        let mut pad = Instrument::new(InstrumentId::from("pad"), "big \"pad\"", 4);
        pad.offset = 1.5;
        pad.max_duration = 2.0;
        state.instruments.extend([kick, pad]);

        state.clips.push(Clip::new(ClipId::from("c1"), InstrumentId::from("kick"), 0.0, 1.0, 0));
        state.clips.push(Clip::new(ClipId::from("c2"), InstrumentId::from("pad"), 8.0, 8.0, 1));
        state.clips.push(Clip::new(ClipId::from("c3"), InstrumentId::from("gone"), 2.0, 1.0, 2));
        state
    }

    #[test]
    fn test_header_geometry_and_duration() {
        let script = generate_render_script(&two_by_three());
        // last clip ends at beat 16 -> 8s at 120 bpm
        assert!(script.contains("BPM: 120, Duration: 8.00s, Grid: 3x2"));
        assert!(script.contains("DURATION = 8.000\n"));
        assert!(script.contains("CELL_WIDTH = 640\n"));
        assert!(script.contains("CELL_HEIGHT = 540\n"));
        assert!(script.contains("print(\"Clips: 3\")"));
    }

    #[test]
    fn test_clip_blocks() {
        let script = generate_render_script(&two_by_three());

        assert!(script.contains("# Clip 1: kick at beat 0\n"));
        assert!(script.contains("    clip_duration0 = video0.duration - 0.000\n"));
        assert!(script.contains("    video0 = video0.with_position((0, 0))\n"));

        // position 4 in a 3-column grid is row 1, col 1
        assert!(script.contains("# Clip 2: big \"pad\" at beat 8 (offset: 1.5s) (max: 2s)\n"));
        assert!(script.contains("video_path1 = find_video(\"big \\\"pad\\\"\")\n"));
        assert!(script.contains("    clip_duration1 = min(2.000, video1.duration - 1.500)\n"));
        assert!(script.contains("    video1 = video1.subclipped(1.500, 1.500 + clip_duration1)\n"));
        assert!(script.contains("    video1 = video1.with_start(4.000)\n"));
        assert!(script.contains("    video1 = video1.with_position((640, 540))\n"));

        // clip whose instrument no longer exists is skipped
        assert!(!script.contains("video_path2"));
    }

    #[test]
    fn test_still_frames_per_instrument() {
        let script = generate_render_script(&two_by_three());
        assert!(script.contains("    static0 = VideoFileClip(static_path0).to_ImageClip(0.000)\n"));
        assert!(script.contains("# Still frame for big \"pad\" (offset: 1.5s)\n"));
        assert!(script.contains("    static1 = static1.with_position((640, 540))\n"));
        assert!(script.contains("    static1 = static1.resized((640, 540))\n"));
    }

    #[test]
    fn test_deterministic() {
        let state = two_by_three();
        assert_eq!(generate_render_script(&state), generate_render_script(&state));
    }

    #[test]
    fn test_empty_project() {
        let script = generate_render_script(&SequencerState::new());
        assert!(script.contains("DURATION = 0.000\n"));
        assert!(script.contains("CELL_WIDTH = 640\n"));
        assert!(script.contains("CELL_HEIGHT = 360\n"));
        assert!(script.ends_with("print(f\"File: {output_file}\")\n"));
    }

    #[test]
    fn test_instrument_far_outside_grid() {
        let mut state = SequencerState::new();
        state.grid = GridSize::new(1, 1);
        state
            .instruments
            .push(Instrument::new(InstrumentId::from("far"), "far", 5_000_000));
        state.clips.push(Clip::new(ClipId::from("c1"), InstrumentId::from("far"), 0.0, 1.0, 0));

        let script = generate_render_script(&state);
        assert!(script.contains("    video0 = video0.with_position((0, 5400000000))\n"));
        assert!(script.contains("    static0 = static0.with_position((0, 5400000000))\n"));
    }

    #[test]
    fn test_py_string_escapes() {
        assert_eq!(py_string("a\\b"), "\"a\\\\b\"");
        assert_eq!(py_string("line\nbreak"), "\"line\\nbreak\"");
    }
}

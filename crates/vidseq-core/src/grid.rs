//! Display grid geometry

use serde::{Deserialize, Serialize};

/// Output canvas width in pixels
pub const CANVAS_WIDTH: u32 = 1920;
/// Output canvas height in pixels
pub const CANVAS_HEIGHT: u32 = 1080;

/// Grid dimensions, both at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: u32,
    pub cols: u32,
}

impl Default for GridSize {
    fn default() -> Self {
        Self { rows: 3, cols: 3 }
    }
}

impl GridSize {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Number of cells in the grid
    pub fn cells(&self) -> u32 {
        self.rows.saturating_mul(self.cols)
    }

    pub fn contains(&self, position: u32) -> bool {
        position < self.cells()
    }

    /// Row and column of a row-major position
    pub fn cell_of(&self, position: u32) -> (u32, u32) {
        let cols = self.cols.max(1);
        (position / cols, position % cols)
    }

    /// Pixel size of one cell on the output canvas
    pub fn cell_size(&self) -> (u32, u32) {
        (CANVAS_WIDTH / self.cols.max(1), CANVAS_HEIGHT / self.rows.max(1))
    }

    /// Top-left pixel of the cell at `position`. Positions outside the grid
    /// land below the canvas.
    pub fn cell_origin(&self, position: u32) -> (u64, u64) {
        let (row, col) = self.cell_of(position);
        let (w, h) = self.cell_size();
        (u64::from(col) * u64::from(w), u64::from(row) * u64::from(h))
    }
}

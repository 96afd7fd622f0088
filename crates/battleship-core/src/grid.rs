//! Grid coordinate system for the 10×10 battle grid.
//!
//! This module provides the foundational geometry types:
//! - `Coord`: Identifies a single cell by column (`x`) and row (`y`)
//! - `Orientation`: The axis along which a ship extends from its origin
//!
//! Coordinates are signed so that a placement hanging off the top or left edge
//! decodes cleanly and is rejected by the bounds check instead of by the parser.

use serde::{Deserialize, Serialize};

/// Width and height of each player's grid
pub const GRID_SIZE: i32 = 10;

/// Axis a ship extends along from its origin cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Extends along the x-axis (increasing column)
    Horizontal,
    /// Extends along the y-axis (increasing row)
    Vertical,
}

impl Orientation {
    /// Map the wire-level `horizontal` flag to an orientation
    pub fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Unit step taken for each successive ship cell
    pub const fn step(&self) -> (i32, i32) {
        match self {
            Orientation::Horizontal => (1, 0),
            Orientation::Vertical => (0, 1),
        }
    }
}

/// A single grid cell.
///
/// - `x` increases to the right (column)
/// - `y` increases downward (row)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Coord {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Coord {
    /// Create a new coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether this cell lies on the grid
    pub const fn in_bounds(&self) -> bool {
        self.x >= 0 && self.x < GRID_SIZE && self.y >= 0 && self.y < GRID_SIZE
    }

    /// Offset by `(dx, dy)`
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The cell itself plus its eight neighbours (Chebyshev distance ≤ 1).
    ///
    /// Cells off the grid are included; callers only test membership.
    pub fn neighborhood(&self) -> [Coord; 9] {
        let mut cells = [*self; 9];
        let mut i = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                cells[i] = self.offset(dx, dy);
                i += 1;
            }
        }
        cells
    }

    /// Chebyshev (king-move) distance to another cell
    pub fn chebyshev(&self, other: &Coord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Every cell of the grid, row by row
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..GRID_SIZE).flat_map(|y| (0..GRID_SIZE).map(move |x| Coord::new(x, y)))
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

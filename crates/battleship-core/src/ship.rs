//! Ship geometry and damage tracking.
//!
//! A ship occupies `length` consecutive cells starting at its origin and
//! extending along its orientation. Damage is tracked per cell so a second
//! shot on an already-damaged cell never costs the ship another life.

use crate::grid::{Coord, Orientation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Result of resolving a single shot against one ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipHit {
    /// The cell is not part of this ship
    Miss,
    /// New damage; the ship is still afloat
    Hit,
    /// The cell was already damaged; nothing changed
    Repeat,
    /// New damage that took the last life on this very shot
    Sunk,
}

impl ShipHit {
    /// Whether the shot landed on the ship at all, fresh damage or not
    pub fn is_on_ship(&self) -> bool {
        !matches!(self, ShipHit::Miss)
    }
}

/// A single placed vessel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    origin: Coord,
    length: usize,
    orientation: Orientation,
    remaining_health: usize,
    hit_cells: BTreeSet<Coord>,
}

impl Ship {
    /// Create an undamaged ship. `length` must be at least 1.
    pub fn new(origin: Coord, length: usize, orientation: Orientation) -> Self {
        debug_assert!(length >= 1, "ship length must be at least 1");
        Self {
            origin,
            length,
            orientation,
            remaining_health: length,
            hit_cells: BTreeSet::new(),
        }
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Lives left; always `length - hit_cells.len()`
    pub fn lives(&self) -> usize {
        self.remaining_health
    }

    pub fn is_sunk(&self) -> bool {
        self.remaining_health == 0
    }

    /// Cells already damaged on this ship
    pub fn hit_cells(&self) -> &BTreeSet<Coord> {
        &self.hit_cells
    }

    /// The occupied cells, origin first
    pub fn points(&self) -> Vec<Coord> {
        let (dx, dy) = self.orientation.step();
        (0..self.length as i32)
            .map(|i| self.origin.offset(dx * i, dy * i))
            .collect()
    }

    /// Whether `at` is one of this ship's cells
    pub fn contains(&self, at: Coord) -> bool {
        // Project onto the ship's own axis: the cross-axis must match exactly
        // and the along-axis offset must fall within the hull.
        let (along, across, origin_along, origin_across) = match self.orientation {
            Orientation::Horizontal => (at.x, at.y, self.origin.x, self.origin.y),
            Orientation::Vertical => (at.y, at.x, self.origin.y, self.origin.x),
        };
        across == origin_across && (origin_along..origin_along + self.length as i32).contains(&along)
    }

    /// Whether every cell lies on the grid
    pub fn in_bounds(&self) -> bool {
        self.points().iter().all(Coord::in_bounds)
    }

    /// Resolve a shot at `at` against this ship.
    ///
    /// A sunk ship only ever reports `Repeat` or `Miss`: all of its cells are
    /// already in `hit_cells`.
    pub fn hit(&mut self, at: Coord) -> ShipHit {
        if !self.contains(at) {
            return ShipHit::Miss;
        }
        if !self.hit_cells.insert(at) {
            return ShipHit::Repeat;
        }

        self.remaining_health -= 1;
        if self.remaining_health == 0 {
            ShipHit::Sunk
        } else {
            ShipHit::Hit
        }
    }

    /// Whether `other` may share a fleet with this ship.
    ///
    /// Ships may neither overlap nor touch, diagonals included. The relation
    /// is symmetric.
    pub fn allowed(&self, other: &Ship) -> bool {
        let exclusion: BTreeSet<Coord> = other
            .points()
            .iter()
            .flat_map(|p| p.neighborhood())
            .collect();
        self.points().iter().all(|p| !exclusion.contains(p))
    }
}

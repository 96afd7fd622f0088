//! Player state and fleet composition.
//!
//! This module contains:
//! - `PlayerToken`, the opaque identity handed out at registration
//! - `FleetTemplate`, the table of ship lengths each player must place
//! - `Player`, a participant's fleet, shots received and turn/win flags

use crate::grid::{Coord, GRID_SIZE};
use crate::ship::Ship;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque per-player identity: 128 random bits as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerToken(String);

impl PlayerToken {
    /// Draw a fresh random token
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        Self(format!("{:032x}", rng.gen::<u128>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Errors from parsing a fleet template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FleetTemplateError {
    #[error("Malformed fleet entry '{0}', expected LENGTH:COUNT")]
    Malformed(String),

    #[error("Ship length {0} does not fit on the grid")]
    InvalidLength(usize),

    #[error("Fleet template lists length {0} twice")]
    Duplicate(usize),

    #[error("Fleet template is empty")]
    Empty,
}

/// Required number of ships per ship length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<usize, u32>")]
pub struct FleetTemplate(BTreeMap<usize, u32>);

impl FleetTemplate {
    /// Build a template from `(length, count)` pairs
    pub fn new<I>(entries: I) -> Result<Self, FleetTemplateError>
    where
        I: IntoIterator<Item = (usize, u32)>,
    {
        let mut table = BTreeMap::new();
        for (length, count) in entries {
            if length == 0 || length > GRID_SIZE as usize {
                return Err(FleetTemplateError::InvalidLength(length));
            }
            if table.insert(length, count).is_some() {
                return Err(FleetTemplateError::Duplicate(length));
            }
        }
        if table.values().all(|&count| count == 0) {
            return Err(FleetTemplateError::Empty);
        }
        Ok(Self(table))
    }

    /// Count required for each length
    pub fn counts(&self) -> &BTreeMap<usize, u32> {
        &self.0
    }

    /// Total number of ships in a full fleet
    pub fn total_ships(&self) -> u32 {
        self.0.values().sum()
    }

    /// Total number of cells a full fleet occupies
    pub fn total_cells(&self) -> usize {
        self.0
            .iter()
            .map(|(length, count)| length * *count as usize)
            .sum()
    }
}

impl Default for FleetTemplate {
    /// One 5, one 4, two 3s, one 2 and one 1
    fn default() -> Self {
        Self(BTreeMap::from([(5, 1), (4, 1), (3, 2), (2, 1), (1, 1)]))
    }
}

impl TryFrom<BTreeMap<usize, u32>> for FleetTemplate {
    type Error = FleetTemplateError;

    fn try_from(table: BTreeMap<usize, u32>) -> Result<Self, Self::Error> {
        Self::new(table)
    }
}

impl FromStr for FleetTemplate {
    type Err = FleetTemplateError;

    /// Parse `"5:1,4:1,3:2,2:1,1:1"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entries = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let malformed = || FleetTemplateError::Malformed(entry.to_string());
                let (length, count) = entry.split_once(':').ok_or_else(malformed)?;
                let length = length.trim().parse().map_err(|_| malformed())?;
                let count = count.trim().parse().map_err(|_| malformed())?;
                Ok((length, count))
            })
            .collect::<Result<Vec<(usize, u32)>, FleetTemplateError>>()?;

        Self::new(entries)
    }
}

/// A participant in the match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub token: PlayerToken,
    /// Ships in placement order
    pub fleet: Vec<Ship>,
    /// Ships still to be placed, by length
    pub ships_left: BTreeMap<usize, u32>,
    /// Cells the opponent has fired at on this player's grid
    pub shots_received: BTreeSet<Coord>,
    pub has_turn: bool,
    pub has_won: bool,
}

impl Player {
    /// Create a player with an empty fleet and the full template left to place
    pub fn new(token: PlayerToken, template: &FleetTemplate) -> Self {
        Self {
            token,
            fleet: Vec::new(),
            ships_left: template.counts().clone(),
            shots_received: BTreeSet::new(),
            has_turn: false,
            has_won: false,
        }
    }

    /// Ships of `length` still to place (0 if the length is not in the template)
    pub fn remaining(&self, length: usize) -> u32 {
        self.ships_left.get(&length).copied().unwrap_or(0)
    }

    /// Whether the whole template has been placed
    pub fn fleet_complete(&self) -> bool {
        self.ships_left.values().all(|&count| count == 0)
    }

    /// Whether every ship is sunk. An empty fleet is never defeated.
    pub fn fleet_destroyed(&self) -> bool {
        !self.fleet.is_empty() && self.fleet.iter().all(Ship::is_sunk)
    }

    /// The ship covering `at`, if any
    pub fn ship_at(&self, at: Coord) -> Option<&Ship> {
        self.fleet.iter().find(|ship| ship.contains(at))
    }
}

//! Two-player Battleship game engine
//!
//! This crate provides the authoritative match logic:
//! - Grid geometry and ship placement validation
//! - Player registration with opaque tokens
//! - Turn sequencing and shot resolution
//! - Per-player fog-of-war status views
//!
//! # Architecture
//!
//! The engine performs no I/O and no locking. A front end owns a single
//! [`Game`], serializes every call through one lock, and translates each
//! [`GameError`] into a response for the player.
//!
//! # Modules
//!
//! - [`grid`]: Cell coordinates and orientation
//! - [`ship`]: Ship geometry, damage and the adjacency rule
//! - [`player`]: Tokens, fleet templates and player records
//! - [`game`]: The match state machine
//! - [`view`]: Rendered grids and status summaries

pub mod game;
pub mod grid;
pub mod player;
pub mod ship;
pub mod view;

// Re-export commonly used types
pub use game::{Game, GameError, HitResult, MatchPhase, MAX_PLAYERS};
pub use grid::{Coord, Orientation, GRID_SIZE};
pub use player::{FleetTemplate, FleetTemplateError, Player, PlayerToken};
pub use ship::{Ship, ShipHit};
pub use view::{render_grid, CellTag, CellView, GridView, ShipSummary, SideStatus, StatusView};

//! Core match engine.
//!
//! This module contains the `Game` aggregate and all rule enforcement:
//! registration, ship placement, turn sequencing, shot resolution and the
//! per-player status views. The match phase is never stored; it is derived
//! from registration count, placement progress and the win flags.

use crate::grid::{Coord, Orientation};
use crate::player::{FleetTemplate, Player, PlayerToken};
use crate::ship::{Ship, ShipHit};
use crate::view::{side_status, StatusView};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of seats at the table
pub const MAX_PLAYERS: usize = 2;

/// Errors that can occur when calling into the engine
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Too many players")]
    TooManyPlayers,

    #[error("Invalid player")]
    InvalidPlayer,

    #[error("No more ships of size {0}")]
    OutOfShips(usize),

    #[error("Coordinates out of bounds")]
    OutOfBounds,

    #[error("Ship overlaps or touches another ship")]
    ShipOverlaps,

    #[error("Players not ready yet")]
    PlayersNotReadyYet,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Already hit")]
    AlreadyHit,

    #[error("Game already over")]
    GameAlreadyOver,
}

/// Derived phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Fewer than two players registered
    Registering,
    /// Both registered, at least one fleet incomplete
    Placing,
    /// Fleets placed, no winner yet
    InProgress,
    /// Someone has won; terminal
    Finished,
}

/// Outcome of a shot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitResult {
    /// The shot landed on a ship
    pub hit: bool,
    /// The shot sank that ship
    pub kill: bool,
}

/// The complete match state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Game {
    /// Registered players, in registration order
    players: Vec<Player>,
    /// Fleet each player must place
    template: FleetTemplate,
}

impl Game {
    /// Create an empty match with the given fleet table
    pub fn new(template: FleetTemplate) -> Self {
        Self {
            players: Vec::with_capacity(MAX_PLAYERS),
            template,
        }
    }

    pub fn template(&self) -> &FleetTemplate {
        &self.template
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Tokens of all registered players
    pub fn tokens(&self) -> impl Iterator<Item = &PlayerToken> {
        self.players.iter().map(|p| &p.token)
    }

    /// Current phase, derived from player state
    pub fn phase(&self) -> MatchPhase {
        if self.players.iter().any(|p| p.has_won) {
            MatchPhase::Finished
        } else if self.players.len() < MAX_PLAYERS {
            MatchPhase::Registering
        } else if !self.ready() {
            MatchPhase::Placing
        } else {
            MatchPhase::InProgress
        }
    }

    /// The winner's token, once the match is finished
    pub fn winner(&self) -> Option<&PlayerToken> {
        self.players.iter().find(|p| p.has_won).map(|p| &p.token)
    }

    // ==================== Registration ====================

    /// Register a new player and hand back their token
    pub fn add_player(&mut self) -> Result<PlayerToken, GameError> {
        self.add_player_with_rng(&mut rand::thread_rng())
    }

    /// Register a new player, drawing the token from `rng`
    pub fn add_player_with_rng<R: Rng>(&mut self, rng: &mut R) -> Result<PlayerToken, GameError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::TooManyPlayers);
        }

        let token = loop {
            let candidate = PlayerToken::generate(rng);
            if self.players.iter().all(|p| p.token != candidate) {
                break candidate;
            }
        };

        self.players.push(Player::new(token.clone(), &self.template));
        Ok(token)
    }

    /// Look up the player owning `token` (`want_self`) or their opponent.
    ///
    /// The token must belong to a registered player either way.
    pub fn lookup_player(&self, token: &PlayerToken, want_self: bool) -> Result<&Player, GameError> {
        let index = if want_self {
            self.player_index(token)?
        } else {
            self.opponent_index(token)?
        };
        Ok(&self.players[index])
    }

    fn player_index(&self, token: &PlayerToken) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| &p.token == token)
            .ok_or(GameError::InvalidPlayer)
    }

    fn opponent_index(&self, token: &PlayerToken) -> Result<usize, GameError> {
        let me = self.player_index(token)?;
        (0..self.players.len())
            .find(|&i| i != me)
            .ok_or(GameError::InvalidPlayer)
    }

    // ==================== Placement ====================

    /// Place one ship for the player owning `token`.
    ///
    /// Nothing changes unless every check passes.
    pub fn add_ship(
        &mut self,
        token: &PlayerToken,
        origin: Coord,
        length: usize,
        orientation: Orientation,
    ) -> Result<(), GameError> {
        let index = self.player_index(token)?;
        let player = &mut self.players[index];

        if player.remaining(length) == 0 {
            return Err(GameError::OutOfShips(length));
        }

        // An on-grid origin plus a template length cannot overflow `i32`
        if !origin.in_bounds() {
            return Err(GameError::OutOfBounds);
        }
        let ship = Ship::new(origin, length, orientation);
        if !ship.in_bounds() {
            return Err(GameError::OutOfBounds);
        }
        if player.fleet.iter().any(|placed| !placed.allowed(&ship)) {
            return Err(GameError::ShipOverlaps);
        }

        player.fleet.push(ship);
        if let Some(count) = player.ships_left.get_mut(&length) {
            *count -= 1;
        }
        Ok(())
    }

    // ==================== Turns ====================

    /// Whether both players have placed their full fleets
    pub fn ready(&self) -> bool {
        self.players.len() == MAX_PLAYERS && self.players.iter().all(Player::fleet_complete)
    }

    /// Fire at `(x, y)` on the opponent's grid.
    ///
    /// Every rejection happens before any state is touched. Either player may
    /// take the opening shot; turns alternate from there.
    pub fn hit(&mut self, token: &PlayerToken, x: i32, y: i32) -> Result<HitResult, GameError> {
        if !self.ready() {
            return Err(GameError::PlayersNotReadyYet);
        }

        let at = Coord::new(x, y);
        if !at.in_bounds() {
            return Err(GameError::OutOfBounds);
        }

        let enemy = self.opponent_index(token)?;
        let me = self.player_index(token)?;

        if self.players.iter().any(|p| p.has_won) {
            return Err(GameError::GameAlreadyOver);
        }
        if self.players[enemy].has_turn {
            return Err(GameError::NotYourTurn);
        }
        if self.players[enemy].shots_received.contains(&at) {
            return Err(GameError::AlreadyHit);
        }

        let target = &mut self.players[enemy];
        target.shots_received.insert(at);

        let mut result = HitResult::default();
        for ship in target.fleet.iter_mut() {
            let outcome = ship.hit(at);
            if outcome.is_on_ship() {
                result.hit = true;
                result.kill = outcome == ShipHit::Sunk;
                break;
            }
        }

        if target.fleet_destroyed() {
            target.has_turn = false;
            self.players[me].has_won = true;
            self.players[me].has_turn = false;
        } else {
            target.has_turn = true;
            self.players[me].has_turn = false;
        }

        Ok(result)
    }

    // ==================== Views ====================

    /// Status as seen by the player owning `token`
    pub fn get_status(&self, token: &PlayerToken) -> Result<StatusView, GameError> {
        let own = self.lookup_player(token, true)?;
        let enemy = self.lookup_player(token, false).ok();

        Ok(StatusView {
            own: side_status(own, true),
            enemy: enemy.map(|p| side_status(p, false)),
        })
    }
}

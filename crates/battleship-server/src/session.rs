//! Maps client requests onto engine calls.
//!
//! Everything here is synchronous and runs with the game lock held.

use battleship_core::{Game, GameError, MatchPhase, Orientation, PlayerToken};
use thiserror::Error;

use crate::protocol::{ClientMessage, ServerMessage};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Join the game first")]
    NotJoined,

    #[error("Connection already has a player")]
    AlreadyJoined,

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Result of one successfully handled request.
#[derive(Debug)]
pub struct Outcome {
    /// Reply for the requesting connection
    pub reply: ServerMessage,
    /// Token newly bound to the connection
    pub bound: Option<PlayerToken>,
    /// Game state changed; every player needs a fresh view
    pub changed: bool,
}

impl Outcome {
    fn reply(reply: ServerMessage) -> Self {
        Self {
            reply,
            bound: None,
            changed: false,
        }
    }

    fn changed(reply: ServerMessage) -> Self {
        Self {
            reply,
            bound: None,
            changed: true,
        }
    }

    fn bind(token: PlayerToken) -> Self {
        Self {
            reply: ServerMessage::Welcome {
                token: token.clone(),
            },
            bound: Some(token),
            changed: false,
        }
    }
}

/// Apply a client request to the game.
///
/// `bound` is the token already attached to the connection, if any.
pub fn dispatch(
    game: &mut Game,
    bound: Option<&PlayerToken>,
    msg: ClientMessage,
) -> Result<Outcome, SessionError> {
    match msg {
        ClientMessage::Ping => Ok(Outcome::reply(ServerMessage::Pong)),

        ClientMessage::Ready => Ok(Outcome::reply(ServerMessage::Ready {
            ready: game.ready(),
        })),

        ClientMessage::Join => {
            if bound.is_some() {
                return Err(SessionError::AlreadyJoined);
            }
            let token = game.add_player()?;
            let mut outcome = Outcome::bind(token);
            outcome.changed = true;
            Ok(outcome)
        }

        ClientMessage::Resume { token } => {
            if bound.is_some() {
                return Err(SessionError::AlreadyJoined);
            }
            game.lookup_player(&token, true)?;
            Ok(Outcome::bind(token))
        }

        ClientMessage::AddShip {
            origin,
            length,
            horizontal,
        } => {
            let token = bound.ok_or(SessionError::NotJoined)?;
            game.add_ship(token, origin, length, Orientation::from_horizontal(horizontal))?;
            Ok(Outcome::changed(ServerMessage::ShipAdded))
        }

        ClientMessage::Hit { x, y } => {
            let token = bound.ok_or(SessionError::NotJoined)?;
            let result = game.hit(token, x, y)?;
            Ok(Outcome::changed(ServerMessage::ShotResult {
                hit: result.hit,
                kill: result.kill,
            }))
        }

        ClientMessage::GetStatus => {
            let token = bound.ok_or(SessionError::NotJoined)?;
            let status = game.get_status(token)?;
            Ok(Outcome::reply(ServerMessage::Status { status }))
        }
    }
}

/// Fresh per-player messages after a state change: a status view for each
/// registered player, plus the verdict once the match is over.
pub fn snapshots(game: &Game) -> Vec<(PlayerToken, Vec<ServerMessage>)> {
    let finished = game.phase() == MatchPhase::Finished;
    let winner = game.winner();

    game.tokens()
        .filter_map(|token| {
            let status = game.get_status(token).ok()?;
            let mut messages = vec![ServerMessage::Status { status }];
            if finished {
                messages.push(ServerMessage::GameOver {
                    won: winner == Some(token),
                });
            }
            Some((token.clone(), messages))
        })
        .collect()
}

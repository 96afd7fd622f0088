//! WebSocket protocol messages for Battleship multiplayer.

use battleship_core::{Coord, PlayerToken, StatusView};
use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Register as a new player
    Join,

    /// Bind an existing player token to this connection
    Resume { token: PlayerToken },

    /// Place one ship
    AddShip {
        origin: Coord,
        length: usize,
        horizontal: bool,
    },

    /// Fire at the opponent's grid
    Hit { x: i32, y: i32 },

    /// Request the current status view
    GetStatus,

    /// Ask whether both fleets are placed
    Ready,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Token bound to this connection
    Welcome { token: PlayerToken },

    /// Ship placed successfully
    ShipAdded,

    /// Outcome of the player's shot
    ShotResult { hit: bool, kill: bool },

    /// Status view for the receiving player
    Status { status: StatusView },

    /// Whether both fleets are placed
    Ready { ready: bool },

    /// Match finished
    GameOver { won: bool },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_format() {
        let join: ClientMessage = serde_json::from_str(r#"{"type":"Join"}"#).unwrap();
        assert!(matches!(join, ClientMessage::Join));

        let add: ClientMessage = serde_json::from_str(
            r#"{"type":"AddShip","payload":{"origin":{"x":3,"y":4},"length":2,"horizontal":true}}"#,
        )
        .unwrap();
        match add {
            ClientMessage::AddShip {
                origin,
                length,
                horizontal,
            } => {
                assert_eq!(origin, Coord::new(3, 4));
                assert_eq!(length, 2);
                assert!(horizontal);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_server_message_wire_format() {
        let msg = ServerMessage::ShotResult {
            hit: true,
            kill: false,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "ShotResult", "payload": {"hit": true, "kill": false}})
        );
    }
}

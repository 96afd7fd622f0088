//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{self, Outcome};
use battleship_core::{Game, PlayerToken};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Server state shared across all connections.
pub struct ServerState {
    /// The one match; every engine call holds this lock for its full duration
    pub game: Mutex<Game>,
    /// Mapping from player token to that player's message sender
    pub player_senders: DashMap<PlayerToken, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new(game: Game) -> Self {
        Self {
            game: Mutex::new(game),
            player_senders: DashMap::new(),
        }
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, token: &PlayerToken, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(token) {
            let _ = sender.send(msg);
        }
    }

    /// Handle one request for the connection bound to `bound`.
    ///
    /// The reply goes to `reply_to`; after a state change every connected
    /// player gets a fresh view, sent once the game lock is released.
    async fn handle_message(
        &self,
        bound: &mut Option<PlayerToken>,
        reply_to: &mpsc::UnboundedSender<ServerMessage>,
        msg: ClientMessage,
    ) {
        let (result, snapshots) = {
            let mut game = self.game.lock().await;
            let result = session::dispatch(&mut game, bound.as_ref(), msg);
            let snapshots = match &result {
                Ok(outcome) if outcome.changed => session::snapshots(&game),
                _ => Vec::new(),
            };
            (result, snapshots)
        };

        match result {
            Ok(Outcome {
                reply,
                bound: newly_bound,
                ..
            }) => {
                if let Some(token) = newly_bound {
                    info!("Connection bound to player {}", token);
                    self.player_senders.insert(token.clone(), reply_to.clone());
                    *bound = Some(token);
                }
                let _ = reply_to.send(reply);
            }
            Err(e) => {
                debug!("Rejected request from {:?}: {}", bound, e);
                let _ = reply_to.send(ServerMessage::Error {
                    message: e.to_string(),
                });
            }
        }

        for (token, messages) in snapshots {
            for msg in messages {
                self.send_to_player(&token, msg);
            }
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(Game::default())
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Battleship server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Token bound by Join or Resume
    let mut bound: Option<PlayerToken> = None;

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => state.handle_message(&mut bound, &tx, client_msg).await,
                Err(e) => {
                    warn!("Invalid message from {}: {}", addr, text);
                    let _ = tx.send(ServerMessage::Error {
                        message: format!("Invalid message: {}", e),
                    });
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", addr);
                break;
            }
            Ok(Message::Ping(_)) => {
                let _ = tx.send(ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", addr, e);
                break;
            }
            _ => {}
        }
    }

    // The player stays registered; only this connection's sender goes away,
    // and only if a later Resume has not already replaced it.
    if let Some(token) = &bound {
        state
            .player_senders
            .remove_if(token, |_, sender| sender.same_channel(&tx));
    }
    send_task.abort();

    info!("Connection closed for {}", addr);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use battleship_core::{Coord, FleetTemplate};

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    async fn join(
        state: &ServerState,
    ) -> (
        Option<PlayerToken>,
        mpsc::UnboundedSender<ServerMessage>,
        mpsc::UnboundedReceiver<ServerMessage>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut bound = None;
        state.handle_message(&mut bound, &tx, ClientMessage::Join).await;
        assert!(bound.is_some());
        (bound, tx, rx)
    }

    #[tokio::test]
    async fn test_state_change_pushes_status_to_everyone() {
        let state = ServerState::new(Game::new(FleetTemplate::new([(1, 1)]).unwrap()));
        let (mut a, a_tx, mut a_rx) = join(&state).await;
        let (_b, _b_tx, mut b_rx) = join(&state).await;
        drain(&mut a_rx);
        drain(&mut b_rx);

        state
            .handle_message(
                &mut a,
                &a_tx,
                ClientMessage::AddShip {
                    origin: Coord::new(0, 0),
                    length: 1,
                    horizontal: true,
                },
            )
            .await;

        let a_msgs = drain(&mut a_rx);
        assert!(matches!(a_msgs[0], ServerMessage::ShipAdded));
        assert!(matches!(a_msgs[1], ServerMessage::Status { .. }));

        let b_msgs = drain(&mut b_rx);
        assert_eq!(b_msgs.len(), 1);
        assert!(matches!(b_msgs[0], ServerMessage::Status { .. }));
    }

    #[tokio::test]
    async fn test_errors_reply_only_to_sender() {
        let state = ServerState::default();
        let (mut a, a_tx, mut a_rx) = join(&state).await;
        let (_b, _b_tx, mut b_rx) = join(&state).await;
        drain(&mut a_rx);
        drain(&mut b_rx);

        state
            .handle_message(&mut a, &a_tx, ClientMessage::Hit { x: 0, y: 0 })
            .await;

        match drain(&mut a_rx).as_slice() {
            [ServerMessage::Error { message }] => assert_eq!(message, "Players not ready yet"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(drain(&mut b_rx).is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_joins_fill_two_seats() {
        let state = Arc::new(ServerState::default());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let state = Arc::clone(&state);
            handles.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::unbounded_channel();
                let mut bound = None;
                state.handle_message(&mut bound, &tx, ClientMessage::Join).await;
                bound.is_some()
            }));
        }

        let mut joined = 0;
        for handle in handles {
            if handle.await.unwrap() {
                joined += 1;
            }
        }
        assert_eq!(joined, 2);
        assert_eq!(state.game.lock().await.player_count(), 2);
    }
}

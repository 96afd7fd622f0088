//! Battleship multiplayer game server.

use anyhow::Context;
use battleship_core::{FleetTemplate, Game};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod protocol;
mod server;
mod session;

use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse address from env or use default
    let addr: SocketAddr = std::env::var("SERVER_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .context("invalid SERVER_ADDR")?;

    // Fleet table, e.g. "5:1,4:1,3:2,2:1,1:1"
    let template = match std::env::var("BATTLESHIP_FLEET") {
        Ok(value) => value
            .parse::<FleetTemplate>()
            .with_context(|| format!("invalid BATTLESHIP_FLEET '{}'", value))?,
        Err(_) => FleetTemplate::default(),
    };

    let game = Game::new(template);
    info!(
        "Starting Battleship server with fleet {:?} ({} ships)...",
        game.template().counts(),
        game.template().total_ships()
    );

    let state = Arc::new(ServerState::new(game));

    server::run_server(addr, state).await
}

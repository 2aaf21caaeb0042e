//! Tag Game Server - authoritative multiplayer server for platform tag
//!
//! Clients connect over WebSocket, each controlling one cube. The server owns
//! the world: it integrates movement and gravity at 60 Hz, lands players on
//! the platforms, moves "it" between touching players and hands out points.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod util;
pub mod ws;

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpListener;
use tracing::info;

use crate::app::AppState;
use crate::config::Config;
use crate::game::{GameRunner, World};
use crate::http::build_router;
use crate::ws::ConnectionHub;

/// Wire up the world, its game loop and the shared route state.
/// The returned runner must be spawned for the game to advance.
pub fn build_state(config: Config) -> (AppState, GameRunner) {
    let seed = config.rng_seed.unwrap_or_else(rand::random);
    info!(seed, "World created");

    let hub = Arc::new(ConnectionHub::new(config.connection_buffer));
    let (runner, handle) = GameRunner::new(World::new(seed, Instant::now()), hub.clone());

    (AppState::new(config, handle, hub), runner)
}

/// Serve HTTP and WebSocket traffic until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

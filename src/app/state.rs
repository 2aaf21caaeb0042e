//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::GameHandle;
use crate::ws::ConnectionHub;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Handle to the authoritative game loop
    pub game: GameHandle,
    /// Outbound sinks of every open connection
    pub hub: Arc<ConnectionHub>,
}

impl AppState {
    pub fn new(config: Config, game: GameHandle, hub: Arc<ConnectionHub>) -> Self {
        Self {
            config: Arc::new(config),
            game,
            hub,
        }
    }
}

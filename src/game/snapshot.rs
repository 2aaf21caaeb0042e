//! Snapshot building for network transmission

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::world::{Player, World};
use super::Position;

/// Player state as every client sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub position: Position,
    pub velocity_y: f32,
    pub grounded: bool,
    pub is_it: bool,
    pub score: u32,
}

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            position: p.body.position,
            velocity_y: p.body.velocity_y,
            grounded: p.body.grounded,
            is_it: p.is_it,
            score: p.score,
        }
    }
}

/// Identity -> state, for every registered player
pub type PlayerMap = BTreeMap<Uuid, PlayerView>;

/// Full registry snapshot
pub fn build(world: &World) -> PlayerMap {
    world
        .players()
        .iter()
        .map(|p| (p.id, PlayerView::from(p)))
        .collect()
}

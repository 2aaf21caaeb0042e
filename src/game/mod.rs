//! Game simulation modules

pub mod constants;
pub mod geometry;
pub mod physics;
pub mod runner;
pub mod scoring;
pub mod snapshot;
pub mod tag;
pub mod world;

pub use runner::{GameCommand, GameHandle, GameRunner};
pub use world::{Player, World, WorldEvent};

use serde::{Deserialize, Serialize};

/// Point in world space. Y is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in 3D
    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Latest directional/jump intent received from a client.
/// Missing flags read as released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Discrete sound cue broadcast to every client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Jump,
    Tag,
}

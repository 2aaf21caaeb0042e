//! Gameplay constants shared with every client that renders the world.
//! These must match the values baked into the client exactly.

use std::time::Duration;

/// Horizontal displacement per tick for each held direction
pub const MOVEMENT_SPEED: f32 = 0.1;

/// Vertical velocity applied on jump
pub const JUMP_FORCE: f32 = 0.25;

/// Vertical velocity removed every tick
pub const GRAVITY: f32 = 0.02;

/// Minimum time between two tag transfers (global)
pub const TAG_COOLDOWN: Duration = Duration::from_millis(5000);

/// Two players closer than this (3D distance) are touching
pub const TAG_DISTANCE: f32 = 1.0;

/// Points awarded to the outgoing "it" holder on a tag
pub const TAG_REWARD: u32 = 10;

/// Points awarded to every non-"it" player each scoring pass
pub const SURVIVAL_REWARD: u32 = 1;

/// Height of the floor nobody can fall below
pub const BASE_FLOOR_HEIGHT: f32 = 0.0;

/// Half the vertical extent of a player cube
pub const PLAYER_HALF_HEIGHT: f32 = 0.5;

/// Spawn point, on top of the central platform
pub const SPAWN_POSITION: [f32; 3] = [0.0, 1.0, 0.0];

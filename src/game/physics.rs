//! Player movement, gravity and platform landing

use super::constants::{
    BASE_FLOOR_HEIGHT, GRAVITY, JUMP_FORCE, MOVEMENT_SPEED, PLAYER_HALF_HEIGHT,
};
use super::geometry::{surface_under, Platform};
use super::{InputState, Position};

/// Kinematic state of a player cube
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Position,
    pub velocity_y: f32,
    pub grounded: bool,
}

impl Body {
    pub fn at_rest(position: Position) -> Self {
        Self {
            position,
            velocity_y: 0.0,
            grounded: true,
        }
    }

    /// Height of the cube's underside
    pub fn bottom(&self) -> f32 {
        self.position.y - PLAYER_HALF_HEIGHT
    }

    fn land_on(&mut self, surface: f32) {
        self.position.y = surface + PLAYER_HALF_HEIGHT;
        self.velocity_y = 0.0;
        self.grounded = true;
    }
}

/// Physics system for advancing player bodies one tick at a time
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance a body by one tick. Returns true when the body jumped.
    ///
    /// Resolution is discrete: only the end-of-tick position is tested against
    /// the platforms, so nothing is swept between the old and new positions.
    pub fn step(body: &mut Body, input: &InputState, platforms: &[Platform]) -> bool {
        Self::apply_movement(body, input);

        let jumped = input.jump && body.grounded;
        if jumped {
            body.velocity_y = JUMP_FORCE;
            body.grounded = false;
        }

        body.velocity_y -= GRAVITY;
        body.position.y += body.velocity_y;

        Self::resolve_vertical(body, platforms);

        jumped
    }

    /// Diagonals are not normalized: two held directions move on both axes.
    fn apply_movement(body: &mut Body, input: &InputState) {
        if input.forward {
            body.position.z -= MOVEMENT_SPEED;
        }
        if input.backward {
            body.position.z += MOVEMENT_SPEED;
        }
        if input.left {
            body.position.x -= MOVEMENT_SPEED;
        }
        if input.right {
            body.position.x += MOVEMENT_SPEED;
        }
    }

    fn resolve_vertical(body: &mut Body, platforms: &[Platform]) {
        body.grounded = false;

        if body.bottom() <= BASE_FLOOR_HEIGHT {
            body.land_on(BASE_FLOOR_HEIGHT);
            return;
        }

        // Only a falling body lands; a rising one passes through.
        if body.velocity_y >= 0.0 {
            return;
        }

        if let Some(top) = surface_under(platforms, body.position.x, body.position.z, body.bottom())
        {
            body.land_on(top);
        }
    }
}

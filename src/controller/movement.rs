use glam::Vec3;

use crate::controller::input::{Action, InputState};
use crate::controller::physics::{BodyHandle, PhysicsWorld};

/// Per-frame position offsets for a controllable body.
///
/// Moves are applied as direct position edits rather than forces, so a body
/// can overlap static geometry for one step before the solver pushes it out.
#[derive(Debug, Clone, Copy)]
pub struct PlayerMovement {
    pub speed: f32,
}

impl PlayerMovement {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Sum of the offsets for every held action. Forward is -Z.
    pub fn offset(&self, input: &InputState) -> Vec3 {
        let mut offset = Vec3::ZERO;
        if input.is_held(Action::Forward) {
            offset.z -= self.speed;
        }
        if input.is_held(Action::Backward) {
            offset.z += self.speed;
        }
        if input.is_held(Action::Left) {
            offset.x -= self.speed;
        }
        if input.is_held(Action::Right) {
            offset.x += self.speed;
        }
        // Sustained climb while held, no apex or cooldown
        if input.is_held(Action::Jump) {
            offset.y += self.speed;
        }
        offset
    }

    pub fn apply(&self, world: &mut PhysicsWorld, body: BodyHandle, input: &InputState) {
        let offset = self.offset(input);
        if offset != Vec3::ZERO {
            world.translate(body, offset);
        }
    }
}

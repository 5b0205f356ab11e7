//! Actor state and per-tick input.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::Aabb;

use super::jump::JumpState;

/// Coarse movement phase, reported to status consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPhase {
    Grounded,
    #[default]
    Airborne,
    Flying,
}

/// Complete movement state for one actor.
///
/// Mutated only by [`ActorController`](super::ActorController), once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    /// Center of the collision box in world space.
    pub position: Vec3,

    /// Yaw in radians. Camera yaw when walking, steering angle in a vehicle.
    pub facing: f32,

    /// Units per tick, positive is up.
    pub vertical_velocity: f32,

    /// Signed vehicle speed along `facing`.
    pub speed: f32,

    pub phase: MovementPhase,

    /// Resting on a surface or the world floor this tick.
    pub grounded: bool,

    /// Target height of the automatic climb after flight starts.
    pub ascend_target: Option<f32>,

    pub jump: JumpState,
}

impl Default for ActorState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            facing: 0.0,
            vertical_velocity: 0.0,
            speed: 0.0,
            phase: MovementPhase::Airborne,
            grounded: false,
            ascend_target: None,
            jump: JumpState::default(),
        }
    }
}

impl ActorState {
    /// Create a new state at the given position.
    pub fn new(position: Vec3, facing: f32) -> Self {
        Self {
            position,
            facing,
            ..Default::default()
        }
    }

    /// Collision box at the current position.
    pub fn bounds(&self, half_extents: Vec3) -> Aabb {
        Aabb::from_center_half_extents(self.position, half_extents)
    }

    pub fn is_flying(&self) -> bool {
        self.phase == MovementPhase::Flying
    }

    /// Unit heading on the ground plane for `facing`.
    pub fn forward(&self) -> Vec3 {
        forward_from_yaw(self.facing)
    }
}

/// Unit forward vector on the ground plane for a yaw angle.
///
/// Yaw zero faces +Z; positive yaw turns toward +X.
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Unit right vector: `forward x up`.
#[inline]
pub fn right_from_yaw(yaw: f32) -> Vec3 {
    forward_from_yaw(yaw).cross(Vec3::Y)
}

/// Input for a single tick, already mapped from keys to intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorCommand {
    /// Forward (+) / backward (-), in -1..1. Throttle in a vehicle.
    pub forward_move: f32,

    /// Right (+) / left (-), in -1..1. Steering in a vehicle.
    pub right_move: f32,

    /// Camera yaw this tick. Heading for walking and flying.
    pub yaw: f32,

    /// Jump key held.
    pub jump: bool,

    /// Ascend key held (flight only).
    pub ascend: bool,

    /// Descend key held (flight only).
    pub descend: bool,

    /// Fly toggle pressed this tick (edge, not level).
    pub toggle_fly: bool,
}

impl ActorCommand {
    /// Unit move direction on the ground plane relative to `yaw`.
    ///
    /// Normalized so diagonal input is not faster than cardinal input.
    pub fn move_direction(&self, yaw: f32) -> Vec3 {
        let forward = forward_from_yaw(yaw) * self.forward_move.clamp(-1.0, 1.0);
        let right = right_from_yaw(yaw) * self.right_move.clamp(-1.0, 1.0);
        (forward + right).normalize_or_zero()
    }
}

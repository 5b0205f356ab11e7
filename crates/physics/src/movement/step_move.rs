//! Horizontal collision response.
//!
//! Axis-aligned boxes never rotate, so instead of clipping velocity against
//! contact planes this tries a short list of candidate positions in a fixed
//! order and keeps the first one that is clear:
//!
//! 1. The full displacement.
//! 2. The full displacement raised by the step height (climbs a ledge).
//! 3. The X component alone, then the Z component alone (slides along a face).
//!
//! With hard blocking enabled only candidate 1 is tried; on failure the actor
//! stays where it was.

use glam::Vec3;

use crate::collision::{Aabb, CollisionWorld};

/// Result of resolving one horizontal displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalOutcome {
    /// Committed position.
    pub position: Vec3,
    /// The naive move was obstructed.
    pub blocked: bool,
    /// The move was committed one step height up.
    pub stepped_up: bool,
}

/// Collision policy for [`step_slide_move`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPolicy {
    pub half_extents: Vec3,
    pub step_up_height: f32,
    pub hard_block: bool,
}

fn clear_at(world: &CollisionWorld, position: Vec3, half_extents: Vec3) -> bool {
    !world.is_blocked(&Aabb::from_center_half_extents(position, half_extents))
}

/// Move `position` by the horizontal part of `displacement`, resolving
/// collisions against solid geometry.
pub fn step_slide_move(
    world: &CollisionWorld,
    position: Vec3,
    displacement: Vec3,
    policy: StepPolicy,
) -> HorizontalOutcome {
    let displacement = Vec3::new(displacement.x, 0.0, displacement.z);
    let half = policy.half_extents;

    let target = position + displacement;
    if clear_at(world, target, half) {
        return HorizontalOutcome {
            position: target,
            blocked: false,
            stepped_up: false,
        };
    }

    if policy.hard_block {
        return HorizontalOutcome {
            position,
            blocked: true,
            stepped_up: false,
        };
    }

    if policy.step_up_height > 0.0 {
        let raised = target + Vec3::Y * policy.step_up_height;
        if clear_at(world, raised, half) {
            log::trace!("stepped up {:.2} at {:?}", policy.step_up_height, raised);
            return HorizontalOutcome {
                position: raised,
                blocked: true,
                stepped_up: true,
            };
        }
    }

    let mut resolved = position;

    let x_only = resolved + Vec3::new(displacement.x, 0.0, 0.0);
    if displacement.x != 0.0 && clear_at(world, x_only, half) {
        resolved = x_only;
    }

    let z_only = resolved + Vec3::new(0.0, 0.0, displacement.z);
    if displacement.z != 0.0 && clear_at(world, z_only, half) {
        resolved = z_only;
    }

    HorizontalOutcome {
        position: resolved,
        blocked: true,
        stepped_up: false,
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Checkpoint course.
//!
//! Checkpoints must be crossed in order. Only the next unpassed checkpoint
//! reacts to the actor; the goal unlocks once every checkpoint is passed.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skyline_physics::Aabb;

use crate::level::CheckpointSpec;

/// Where the actor comes back after a respawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespawnAnchor {
    pub position: Vec3,
    pub facing: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: u32,
    /// Zero-based position in the course.
    pub ordinal: usize,
    pub bounds: Aabb,
    pub respawn_facing: f32,
    pub passed: bool,
}

impl Checkpoint {
    /// Respawn point: centered on the volume, resting on its floor.
    pub fn anchor(&self, half_extents: Vec3) -> RespawnAnchor {
        let center = self.bounds.center();
        RespawnAnchor {
            position: Vec3::new(center.x, self.bounds.min.y + half_extents.y, center.z),
            facing: self.respawn_facing,
        }
    }
}

/// Result of feeding the actor box to the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointPassed {
    pub ordinal: usize,
    pub passed: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct CheckpointCourse {
    checkpoints: Vec<Checkpoint>,
    anchor: RespawnAnchor,
    initial_anchor: RespawnAnchor,
}

impl CheckpointCourse {
    pub fn new(specs: &[CheckpointSpec], spawn: RespawnAnchor) -> Self {
        let checkpoints = specs
            .iter()
            .enumerate()
            .map(|(ordinal, spec)| Checkpoint {
                id: ordinal as u32,
                ordinal,
                bounds: spec.bounds,
                respawn_facing: spec.respawn_facing,
                passed: false,
            })
            .collect();

        Self {
            checkpoints,
            anchor: spawn,
            initial_anchor: spawn,
        }
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn total(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn passed(&self) -> usize {
        self.checkpoints.iter().filter(|c| c.passed).count()
    }

    /// The checkpoint the actor must reach next.
    pub fn next(&self) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| !c.passed)
    }

    pub fn all_passed(&self) -> bool {
        self.next().is_none()
    }

    /// Latest respawn anchor.
    pub fn anchor(&self) -> RespawnAnchor {
        self.anchor
    }

    /// Mark the next checkpoint passed if `actor` overlaps it.
    pub fn update(&mut self, actor: &Aabb, half_extents: Vec3) -> Option<CheckpointPassed> {
        let total = self.total();
        let checkpoint = self.checkpoints.iter_mut().find(|c| !c.passed)?;

        if !checkpoint.bounds.intersects(actor) {
            return None;
        }

        checkpoint.passed = true;
        let ordinal = checkpoint.ordinal;
        self.anchor = checkpoint.anchor(half_extents);

        let passed = self.passed();
        log::info!("checkpoint {} passed ({}/{})", ordinal + 1, passed, total);

        Some(CheckpointPassed { ordinal, passed, total })
    }

    /// Clear progress and restore the spawn anchor.
    pub fn reset(&mut self) {
        for checkpoint in &mut self.checkpoints {
            checkpoint.passed = false;
        }
        self.anchor = self.initial_anchor;
    }
}

// ============================================================================
// Tests
// ============================================================================

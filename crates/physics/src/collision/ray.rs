//! Ray query results.

use glam::Vec3;

use super::world::ColliderId;

/// Nearest solid surface struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin along the normalized direction.
    pub distance: f32,
    /// World-space point of entry.
    pub point: Vec3,
    /// Outward normal of the face the ray entered through.
    pub normal: Vec3,
    /// The collider that was hit.
    pub collider: ColliderId,
}

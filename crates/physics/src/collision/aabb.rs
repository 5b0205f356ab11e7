//! Axis-aligned bounding boxes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Minimum penetration depth, per axis, for two boxes to count as overlapping.
///
/// Boxes that merely touch (an actor resting on a roof, sliding along a wall
/// face) are not in collision. Without this skin, rounding in
/// `box.max.y + half_height` would leave a resting actor a hair inside the
/// surface it stands on and every horizontal step would read as blocked.
pub const CONTACT_EPSILON: f32 = 1e-4;

/// Axis-aligned box in world space.
///
/// Invariant: `min[i] <= max[i]` on every axis. Construction through
/// [`Aabb::new`] (and deserialization) swaps inverted components instead of
/// carrying a malformed box into collision queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "AabbBounds")]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

/// Wire shape of an [`Aabb`], normalized on the way in.
#[derive(Deserialize)]
struct AabbBounds {
    min: Vec3,
    max: Vec3,
}

impl From<AabbBounds> for Aabb {
    fn from(bounds: AabbBounds) -> Self {
        Self::new(bounds.min, bounds.max)
    }
}

impl Aabb {
    /// Create a box from two corners, swapping components where `min > max`.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        if min.cmpgt(max).any() {
            log::warn!("degenerate aabb min={:?} max={:?}, normalizing", min, max);
        }
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Create a box from its center and half-size on each axis.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = half_extents.abs();
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Create a box from its center and full size on each axis.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self::from_center_half_extents(center, size * 0.5)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The same box moved by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Shrink every face inward by `tolerance`.
    ///
    /// An axis thinner than `2 * tolerance` collapses to its midpoint rather
    /// than inverting.
    pub fn shrunk(&self, tolerance: f32) -> Self {
        let center = self.center();
        let half = (self.half_extents() - Vec3::splat(tolerance)).max(Vec3::ZERO);
        Self::from_center_half_extents(center, half)
    }

    /// Grow every face outward by `margin`.
    pub fn expanded(&self, margin: f32) -> Self {
        let margin = Vec3::splat(margin.abs());
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// Whether the two boxes overlap by more than [`CONTACT_EPSILON`] on
    /// every axis. Touching faces do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x - CONTACT_EPSILON
            && self.max.x > other.min.x + CONTACT_EPSILON
            && self.min.y < other.max.y - CONTACT_EPSILON
            && self.max.y > other.min.y + CONTACT_EPSILON
            && self.min.z < other.max.z - CONTACT_EPSILON
            && self.max.z > other.min.z + CONTACT_EPSILON
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Whether `other` lies entirely inside this box (inclusive).
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }

    /// Slab test for a ray starting outside the box.
    ///
    /// Returns the distance along `direction` (in units of its length) at
    /// which the ray enters the box, and the outward normal of the entry
    /// face. Rays that start inside the box, point away from it or miss it
    /// return `None`.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-8 {
                // Parallel to this slab: either always inside it or never.
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let (t0, t1) = {
                let a = (lo - o) * inv;
                let b = (hi - o) * inv;
                if a <= b { (a, b) } else { (b, a) }
            };

            if t0 > t_enter {
                t_enter = t0;
                normal = Vec3::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(t1);

            if t_enter > t_exit {
                return None;
            }
        }

        if t_enter < 0.0 {
            return None;
        }

        Some((t_enter, normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_new_normalizes_inverted_axes() {
        let aabb = Aabb::new(Vec3::new(1.0, -1.0, 2.0), Vec3::new(-1.0, 1.0, 0.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn test_wire_bounds_are_normalized() {
        let aabb = Aabb::from(AabbBounds {
            min: Vec3::new(3.0, 0.0, 0.0),
            max: Vec3::new(1.0, 2.0, 2.0),
        });
        assert_eq!(aabb.min.x, 1.0);
        assert_eq!(aabb.max.x, 3.0);
    }

    #[test]
    fn test_touching_faces_do_not_intersect() {
        let floor = Aabb::new(Vec3::new(-5.0, -1.0, -5.0), Vec3::new(5.0, 0.0, 5.0));
        let actor = Aabb::from_center_half_extents(Vec3::new(0.0, 0.5, 0.0), Vec3::splat(0.5));
        assert!(!floor.intersects(&actor));

        let sunk = actor.translated(Vec3::new(0.0, -0.01, 0.0));
        assert!(floor.intersects(&sunk));
    }

    #[test]
    fn test_separated_boxes_do_not_intersect() {
        let a = unit_box();
        let b = unit_box().translated(Vec3::new(3.0, 0.0, 0.0));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_shrunk_never_inverts() {
        let thin = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 0.06, 4.0));
        let shrunk = thin.shrunk(0.05);
        assert!(shrunk.min.cmple(shrunk.max).all());
        assert!((shrunk.min.y - 0.03).abs() < 1e-6);
        assert!((shrunk.min.x - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_contains() {
        let outer = unit_box().expanded(1.0);
        assert!(outer.contains(&unit_box()));
        assert!(!unit_box().contains(&outer));
        assert!(outer.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_ray_entry_hits_near_face() {
        let (t, normal) = unit_box()
            .ray_entry(Vec3::new(-5.0, 0.0, 0.0), Vec3::X)
            .expect("ray should hit");
        assert!((t - 4.0).abs() < 1e-5);
        assert_eq!(normal, -Vec3::X);
    }

    #[test]
    fn test_ray_entry_ignores_inside_and_behind() {
        assert!(unit_box().ray_entry(Vec3::ZERO, Vec3::X).is_none());
        assert!(unit_box()
            .ray_entry(Vec3::new(5.0, 0.0, 0.0), Vec3::X)
            .is_none());
        assert!(unit_box()
            .ray_entry(Vec3::new(-5.0, 3.0, 0.0), Vec3::X)
            .is_none());
    }
}

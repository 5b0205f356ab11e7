//! Collision world holding every registered box for a level.
//!
//! Queries are brute-force linear scans in registration order. At tens to
//! low hundreds of boxes that is cheaper than maintaining any index, and it
//! keeps "first match wins" resolution deterministic.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::kind::GeometryKind;
use super::ray::RayHit;

/// Identifier handed out by [`CollisionWorld::register`].
///
/// Ids are only stable until the next [`CollisionWorld::rebuild`] or
/// [`CollisionWorld::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

/// A piece of collision geometry in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub id: ColliderId,
    pub bounds: Aabb,
    pub kind: GeometryKind,
}

/// The geometry registry for one level session.
///
/// An empty world is valid: nothing blocks and rays never hit.
#[derive(Debug, Default, Clone)]
pub struct CollisionWorld {
    colliders: Vec<Collider>,
    next_id: u32,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box to the world.
    pub fn register(&mut self, bounds: Aabb, kind: GeometryKind) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.colliders.push(Collider { id, bounds, kind });
        id
    }

    /// Add a solid static box to the world.
    pub fn register_static(&mut self, bounds: Aabb) -> ColliderId {
        self.register(bounds, GeometryKind::Static)
    }

    /// Replace the whole registry with `source`.
    ///
    /// The new list is built off to the side and swapped in, so no query
    /// ever observes a half-populated registry. Ids restart from zero in
    /// source order.
    pub fn rebuild<I>(&mut self, source: I)
    where
        I: IntoIterator<Item = (Aabb, GeometryKind)>,
    {
        let colliders: Vec<Collider> = source
            .into_iter()
            .enumerate()
            .map(|(index, (bounds, kind))| Collider {
                id: ColliderId(index as u32),
                bounds,
                kind,
            })
            .collect();

        self.next_id = colliders.len() as u32;
        self.colliders = colliders;

        log::trace!("collision world rebuilt with {} colliders", self.colliders.len());
    }

    /// Every registered collider, in registration order.
    pub fn query(&self) -> &[Collider] {
        &self.colliders
    }

    /// Colliders that block movement.
    pub fn solids(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter().filter(|c| c.kind.is_solid())
    }

    /// Look up a collider by id.
    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.id == id)
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.colliders.clear();
        self.next_id = 0;
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// First solid collider, in registration order, that `bounds` overlaps.
    pub fn first_blocking(&self, bounds: &Aabb) -> Option<&Collider> {
        self.solids().find(|c| c.bounds.intersects(bounds))
    }

    /// Whether `bounds` overlaps any solid collider.
    pub fn is_blocked(&self, bounds: &Aabb) -> bool {
        self.first_blocking(bounds).is_some()
    }

    /// Cast a ray against solid geometry.
    ///
    /// Returns the nearest entry hit within `max_distance`. Boxes that
    /// contain the origin are ignored, so a ray starting inside a prop can
    /// still report the wall behind it.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.raycast_filtered(origin, direction, max_distance, |_| true)
    }

    /// [`raycast`](Self::raycast) restricted to solids accepted by `filter`.
    pub fn raycast_filtered<F>(&self, origin: Vec3, direction: Vec3, max_distance: f32, filter: F) -> Option<RayHit>
    where
        F: Fn(&Collider) -> bool,
    {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut closest: Option<RayHit> = None;

        for collider in self.solids().filter(|c| filter(c)) {
            let Some((distance, normal)) = collider.bounds.ray_entry(origin, dir) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }

            let is_closer = closest.as_ref().map_or(true, |hit| distance < hit.distance);
            if is_closer {
                closest = Some(RayHit {
                    distance,
                    point: origin + dir * distance,
                    normal,
                    collider: collider.id,
                });
            }
        }

        closest
    }

    /// Trigger volumes that `bounds` overlaps.
    pub fn triggers_overlapping<'a>(&'a self, bounds: &'a Aabb) -> impl Iterator<Item = &'a Collider> + 'a {
        self.colliders
            .iter()
            .filter(move |c| c.kind.is_trigger() && c.bounds.intersects(bounds))
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Movable props.
//!
//! Props are cubes the player can pick with a ray, drag around at an
//! adjustable distance in front of the camera, and release. A released prop
//! with a non-zero gravity direction slides along it until something solid
//! stops it. Props enter the collision world as `Movable` colliders.

use glam::Vec3;
use skyline_physics::{Aabb, CollisionWorld, GeometryKind};

use crate::level::PropSpec;

/// Drag distance after each grab.
pub const DEFAULT_DRAG_DISTANCE: f32 = 8.0;
pub const MIN_DRAG_DISTANCE: f32 = 2.0;
pub const MAX_DRAG_DISTANCE: f32 = 12.0;
/// Drag distance change per tick while a drag key is held.
pub const DRAG_DISTANCE_STEP: f32 = 0.5;
/// Farthest a prop can be picked from.
pub const GRAB_RANGE: f32 = 50.0;
/// Distance a released prop travels per tick while settling.
pub const SETTLE_STEP: f32 = 0.1;

/// Index of a prop within its [`PropSet`].
pub type PropIndex = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub bounds: Aabb,
    pub gravity_direction: Vec3,
}

impl Prop {
    pub fn from_spec(spec: &PropSpec) -> Self {
        Self {
            bounds: Aabb::from_center_size(spec.center, Vec3::splat(spec.size)),
            gravity_direction: spec.gravity_direction.normalize_or_zero(),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        GeometryKind::Movable {
            gravity_direction: self.gravity_direction,
        }
    }
}

/// The props of one level plus the current grab.
#[derive(Debug, Clone, Default)]
pub struct PropSet {
    props: Vec<Prop>,
    held: Option<PropIndex>,
    drag_distance: f32,
    limits: Option<Aabb>,
}

impl PropSet {
    pub fn new(specs: &[PropSpec], limits: Option<Aabb>) -> Self {
        Self {
            props: specs.iter().map(Prop::from_spec).collect(),
            held: None,
            drag_distance: DEFAULT_DRAG_DISTANCE,
            limits,
        }
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn get(&self, index: PropIndex) -> Option<&Prop> {
        self.props.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prop> {
        self.props.iter()
    }

    pub fn held(&self) -> Option<PropIndex> {
        self.held
    }

    pub fn drag_distance(&self) -> f32 {
        self.drag_distance
    }

    /// Collision entries for every prop.
    pub fn colliders(&self) -> impl Iterator<Item = (Aabb, GeometryKind)> + '_ {
        self.props.iter().map(|p| (p.bounds, p.kind()))
    }

    /// Pick the nearest prop along a ray.
    ///
    /// Static geometry in front of the prop blocks the pick. Picking the prop
    /// already held drops it instead. Returns the newly held prop.
    pub fn grab(&mut self, origin: Vec3, direction: Vec3, world: &CollisionWorld) -> Option<PropIndex> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        let picked = self
            .props
            .iter()
            .enumerate()
            .filter_map(|(index, prop)| prop.bounds.ray_entry(origin, dir).map(|(t, _)| (index, t)))
            .filter(|(_, t)| *t <= GRAB_RANGE)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let (index, distance) = picked?;

        let wall = world.raycast_filtered(origin, dir, distance, |c| c.kind == GeometryKind::Static);
        if let Some(hit) = wall {
            log::debug!("grab blocked by {:?} at {:.2}", hit.collider, hit.distance);
            return None;
        }

        if self.held == Some(index) {
            self.release();
            return None;
        }

        self.held = Some(index);
        self.drag_distance = DEFAULT_DRAG_DISTANCE;
        log::debug!("prop {} grabbed at distance {:.2}", index, distance);
        Some(index)
    }

    /// Drop the held prop, if any.
    pub fn release(&mut self) -> Option<PropIndex> {
        let released = self.held.take();
        if let Some(index) = released {
            log::debug!("prop {} released", index);
        }
        released
    }

    /// Move the drag point farther (`steps > 0`) or closer.
    pub fn adjust_drag_distance(&mut self, steps: f32) {
        if self.held.is_none() || steps == 0.0 {
            return;
        }
        self.drag_distance =
            (self.drag_distance + steps * DRAG_DISTANCE_STEP).clamp(MIN_DRAG_DISTANCE, MAX_DRAG_DISTANCE);
        log::trace!("drag distance {:.2}", self.drag_distance);
    }

    /// Move the held prop to `anchor + look_direction * drag_distance`.
    ///
    /// The target is clamped to the level's prop limits. A target that would
    /// swallow the actor is skipped. Returns whether the prop moved.
    pub fn drag(&mut self, anchor: Vec3, look_direction: Vec3, actor: &Aabb) -> bool {
        let Some(index) = self.held else {
            return false;
        };
        let Some(prop) = self.props.get(index) else {
            self.held = None;
            return false;
        };

        let half = prop.bounds.half_extents();
        let mut target = anchor + look_direction.normalize_or_zero() * self.drag_distance;

        if let Some(limits) = &self.limits {
            target = clamp_center(target, limits, half);
        }
        target.y = target.y.max(half.y);

        let bounds = Aabb::from_center_half_extents(target, half);
        if bounds.intersects(actor) || bounds == prop.bounds {
            return false;
        }

        self.props[index].bounds = bounds;
        true
    }

    /// Advance every released prop one step along its gravity direction.
    ///
    /// Static geometry, other props, the world floor and `actor` stop a
    /// prop. Returns whether any prop moved.
    pub fn settle(&mut self, world: &CollisionWorld, actor: &Aabb) -> bool {
        let mut moved = false;

        for index in 0..self.props.len() {
            if self.held == Some(index) {
                continue;
            }
            let prop = &self.props[index];
            if prop.gravity_direction == Vec3::ZERO {
                continue;
            }

            let candidate = prop.bounds.translated(prop.gravity_direction * SETTLE_STEP);
            if candidate.min.y < 0.0 || candidate.intersects(actor) {
                continue;
            }

            let hits_static = world
                .solids()
                .any(|c| c.kind == GeometryKind::Static && c.bounds.intersects(&candidate));
            let hits_prop = self
                .props
                .iter()
                .enumerate()
                .any(|(other, p)| other != index && p.bounds.intersects(&candidate));

            if !hits_static && !hits_prop {
                self.props[index].bounds = candidate;
                moved = true;
            }
        }

        moved
    }
}

/// Keep a box of `half` extents centered at `center` inside `limits`.
fn clamp_center(center: Vec3, limits: &Aabb, half: Vec3) -> Vec3 {
    let lo = limits.min + half;
    let hi = limits.max - half;
    // A limit box smaller than the prop pins it to the middle.
    Vec3::new(
        if lo.x <= hi.x { center.x.clamp(lo.x, hi.x) } else { limits.center().x },
        if lo.y <= hi.y { center.y.clamp(lo.y, hi.y) } else { limits.center().y },
        if lo.z <= hi.z { center.z.clamp(lo.z, hi.z) } else { limits.center().z },
    )
}

// ============================================================================
// Tests
// ============================================================================

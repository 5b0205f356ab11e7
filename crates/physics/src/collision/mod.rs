//! Collision geometry for actor movement and camera queries.
//!
//! # Key Types
//!
//! - [`Aabb`]: axis-aligned box, the only collision primitive
//! - [`GeometryKind`]: what a box is (static, movable prop, trigger)
//! - [`CollisionWorld`]: the geometry registry, rebuilt wholesale on demand
//! - [`RayHit`]: output of a ray query

mod aabb;
mod kind;
mod ray;
mod world;

pub use aabb::{Aabb, CONTACT_EPSILON};
pub use kind::GeometryKind;
pub use ray::RayHit;
pub use world::{Collider, ColliderId, CollisionWorld};

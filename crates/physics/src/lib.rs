//! Skyline Physics
//!
//! Frame-stepped movement and collision for a third-person explorer. The
//! world is a flat list of axis-aligned boxes and every query is a linear
//! scan, which is plenty for the tens to low hundreds of boxes a level holds.
//!
//! # Architecture
//!
//! - **Collision**: the [`Aabb`] primitive, tagged geometry kinds and the
//!   [`CollisionWorld`] registry with overlap and ray queries
//! - **Movement**: the [`ActorController`] that advances an [`ActorState`]
//!   one tick at a time from an [`ActorCommand`]
//!
//! Units are "per tick": speeds, gravity and jump strength are applied once
//! per call to [`ActorController::update`], with no delta-time scaling.

pub mod collision;
pub mod movement;

pub use collision::{Aabb, Collider, ColliderId, CollisionWorld, GeometryKind, RayHit};
pub use movement::{
    ActorCommand, ActorController, ActorState, ControlMode, JumpState, MovementConfig,
    MovementPhase, MovementReport,
};

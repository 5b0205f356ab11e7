//! Actor movement physics.
//!
//! One parameterized controller covers every level variant:
//!
//! - Walking under gravity with step-up and axis sliding
//! - Vehicle steering with a throttle speed model and crash bounce
//! - Free flight, either permanent or toggled from walking
//!
//! # Design
//!
//! Movement is driven by the [`ActorController`], which takes an
//! [`ActorCommand`] and updates the [`ActorState`] through the collision
//! world. The per-tick order is fixed: horizontal move, gravity, vertical
//! snap, floor clamp, jump.
//!
//! All movement is deterministic: the same commands over the same geometry
//! always produce the same states.

mod config;
mod controller;
mod jump;
mod state;
mod step_move;
mod vehicle;

pub use config::{ControlMode, MovementConfig};
pub use controller::{ActorController, MovementReport};
pub use jump::JumpState;
pub use state::{forward_from_yaw, right_from_yaw, ActorCommand, ActorState, MovementPhase};
pub use step_move::{step_slide_move, HorizontalOutcome, StepPolicy};
pub use vehicle::{bounce, steer, update_speed};

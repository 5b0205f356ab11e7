//! Skyline Camera
//!
//! Third-person camera that orbits an aim point above the actor and pulls
//! in when level geometry would block the view.
//!
//! # Architecture
//!
//! - [`CameraAngles`]: the only persistent camera state, mouse-driven yaw and pitch
//! - [`CameraRig`]: configuration plus angles; [`CameraRig::solve`] derives a
//!   fresh [`CameraPose`] every tick from the actor transform and the world
//!
//! The pose is never stored between ticks. It is a pure function of the
//! actor position, actor facing, the angles and the collision world.

mod rig;

pub use rig::{CameraAngles, CameraConfig, CameraMode, CameraPose, CameraRig, DEFAULT_PITCH_MARGIN};

//! Skyline Game
//!
//! Level sessions for the explorer. This crate contains:
//!
//! - Input state and key bindings
//! - Level definitions (built-in and TOML)
//! - Movable props and the checkpoint course
//! - The per-tick session pipeline and its collaborator ports
//!
//! # Architecture
//!
//! A [`LevelSession`] owns everything a level needs and is driven by one call
//! to [`LevelSession::tick`] per frame. Collaborators push input in and
//! receive poses and [`SessionEvent`]s out; nothing here renders or polls.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Level Session                          │
//! │  ┌─────────┐   ┌────────────┐   ┌────────┐   ┌────────────┐  │
//! │  │ Input   │──►│ Actor      │──►│ Props  │──►│ Camera rig │  │
//! │  │ State   │   │ Controller │   └────────┘   └────────────┘  │
//! │  └─────────┘   └────────────┘        │             │         │
//! │                      │               ▼             ▼         │
//! │                      │        ┌───────────────────────────┐  │
//! │                      └───────►│ Checkpoints, goal, events │  │
//! │                               └───────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod level;
pub mod ports;
pub mod props;
pub mod session;

pub use checkpoint::{Checkpoint, CheckpointCourse, RespawnAnchor};
pub use config::SessionConfig;
pub use error::{ConfigError, LevelError};
pub use events::SessionEvent;
pub use input::{Action, InputEdges, InputState, Key, KeyBindings};
pub use level::{CheckpointSpec, LevelDefinition, PropSpec, RebuildPolicy};
pub use ports::{ActorPose, ActorPresenter, CompletionCallback, GeometrySource};
pub use props::{Prop, PropSet};
pub use session::{LevelSession, TickReport};

// Re-export the simulation types a host needs
pub use skyline_camera::{CameraAngles, CameraConfig, CameraMode, CameraPose};
pub use skyline_physics::{
    Aabb, ActorState, CollisionWorld, ControlMode, GeometryKind, MovementConfig, MovementPhase,
};

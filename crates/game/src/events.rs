//! Status notifications pushed to the HUD side once per change.

use skyline_physics::{ControlMode, MovementPhase};

use crate::props::PropIndex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// The actor touched down.
    Landed,
    Jumped,
    /// Movement phase changed (grounded, airborne, flying).
    ModeChanged { mode: ControlMode, phase: MovementPhase },
    /// Vehicle speed changed.
    SpeedChanged { speed: f32 },
    CheckpointPassed { ordinal: usize, passed: usize, total: usize },
    /// The actor entered the unlocked goal. The completion countdown starts.
    GoalReached,
    /// The completion callback ran.
    Completed,
    PropGrabbed { index: PropIndex },
    PropReleased { index: PropIndex },
}

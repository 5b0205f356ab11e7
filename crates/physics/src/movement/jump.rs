//! Jump edge-lock.
//!
//! A held jump key must not fire an impulse every tick. The lock is taken
//! when an impulse fires and released either when the key goes up or, if
//! configured, when the actor lands again.

use serde::{Deserialize, Serialize};

/// Jump edge-lock state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpState {
    /// An impulse has fired and the lock has not been released since.
    locked: bool,
}

impl JumpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the lock for this tick.
    ///
    /// # Arguments
    ///
    /// * `jump_held` - Whether the jump key is currently held
    /// * `grounded` - Whether the actor is on a surface this tick
    /// * `landed` - Whether the actor touched down this tick (airborne last tick)
    /// * `rearm_on_landing` - If true, a landing releases the lock even while held
    ///
    /// # Returns
    ///
    /// Whether a jump impulse should be applied this tick.
    pub fn update(&mut self, jump_held: bool, grounded: bool, landed: bool, rearm_on_landing: bool) -> bool {
        if !jump_held || (landed && rearm_on_landing) {
            self.locked = false;
        }

        let should_jump = grounded && jump_held && !self.locked;
        if should_jump {
            self.locked = true;
        }
        should_jump
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

// ============================================================================
// Tests
// ============================================================================

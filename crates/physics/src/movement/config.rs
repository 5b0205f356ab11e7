//! Movement configuration constants.
//!
//! All values are per tick: the simulation runs at a fixed frame step and
//! never scales by elapsed time.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Where the actor's heading comes from and which base mode it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Heading follows the camera yaw; forward/back/strafe input.
    #[default]
    Walking,
    /// Heading is an integrated steering angle; throttle drives a speed scalar.
    Vehicle,
    /// Always flying, no gravity.
    FreeFly,
}

/// Configuration for actor movement physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub mode: ControlMode,

    // ========================================================================
    // Actor Dimensions
    // ========================================================================
    /// Half-size of the collision box. Smaller than the visual on purpose.
    pub half_extents: Vec3,

    // ========================================================================
    // Walking
    // ========================================================================
    /// Horizontal distance covered per tick at full input.
    pub walk_speed: f32,

    pub gravity_enabled: bool,

    /// Added to vertical velocity every tick (negative is down).
    pub gravity: f32,

    /// Vertical velocity set by a jump.
    pub jump_strength: f32,

    /// Holding jump re-triggers once per distinct landing.
    /// When false the key must be released between jumps.
    pub jump_rearm_on_landing: bool,

    // ========================================================================
    // Collision Policy
    // ========================================================================
    /// Revert the whole horizontal move on contact instead of step/slide.
    pub hard_block_on_collision: bool,

    /// Ledge height climbed without jumping. Zero disables step-up.
    pub step_up_height: f32,

    // ========================================================================
    // Vehicle
    // ========================================================================
    /// Steering angle change per tick (radians).
    pub turn_speed: f32,

    /// Speed gained per tick while throttling.
    pub acceleration: f32,

    /// Speed shed per tick when braking against forward motion.
    pub brake_deceleration: f32,

    pub max_speed: f32,

    pub reverse_max_speed: f32,

    /// Multiplier applied to speed on ticks without throttle input.
    pub speed_decay: f32,

    /// Fraction of speed kept (and inverted) after a crash.
    pub bounce_damping: f32,

    // ========================================================================
    // Flight
    // ========================================================================
    /// Whether the fly toggle is honored.
    pub allow_free_fly: bool,

    /// Horizontal and vertical speed while flying.
    pub fly_speed: f32,

    /// Height gained by the automatic climb when flight starts.
    pub fly_ascent_height: f32,

    /// Climb rate of the automatic ascent, per tick.
    pub fly_ascent_rate: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self::walking()
    }
}

impl MovementConfig {
    /// On-foot movement with gravity and axis sliding.
    pub fn walking() -> Self {
        Self {
            mode: ControlMode::Walking,
            half_extents: Vec3::new(0.45, 0.5, 0.45),
            walk_speed: 0.15,
            gravity_enabled: true,
            gravity: -0.03,
            jump_strength: 0.45,
            jump_rearm_on_landing: true,
            hard_block_on_collision: false,
            step_up_height: 0.0,
            turn_speed: 0.05,
            acceleration: 0.01,
            brake_deceleration: 0.02,
            max_speed: 0.5,
            reverse_max_speed: 0.2,
            speed_decay: 0.95,
            bounce_damping: 0.5,
            allow_free_fly: false,
            fly_speed: 0.25,
            fly_ascent_height: 10.0,
            fly_ascent_rate: 0.2,
        }
    }

    /// Wheeled movement: a 2x1x4 box that steers, throttles and bounces off walls.
    pub fn vehicle() -> Self {
        Self {
            mode: ControlMode::Vehicle,
            half_extents: Vec3::new(1.0, 0.5, 2.0),
            hard_block_on_collision: true,
            ..Self::walking()
        }
    }

    /// Permanent flight with no gravity.
    pub fn free_fly() -> Self {
        Self {
            mode: ControlMode::FreeFly,
            gravity_enabled: false,
            hard_block_on_collision: true,
            allow_free_fly: true,
            ..Self::walking()
        }
    }

    /// Box-pushing levels: a 0.9 cube that climbs half-unit ledges.
    pub fn puzzle() -> Self {
        Self {
            half_extents: Vec3::splat(0.45),
            step_up_height: 0.5,
            ..Self::walking()
        }
    }

    /// Check that every value is usable by the controller.
    ///
    /// The error names the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if !self.half_extents.is_finite() || self.half_extents.cmple(Vec3::ZERO).any() {
            return Err("half_extents must be positive".to_string());
        }

        let scalars = [
            ("walk_speed", self.walk_speed),
            ("gravity", self.gravity),
            ("jump_strength", self.jump_strength),
            ("step_up_height", self.step_up_height),
            ("turn_speed", self.turn_speed),
            ("acceleration", self.acceleration),
            ("brake_deceleration", self.brake_deceleration),
            ("max_speed", self.max_speed),
            ("reverse_max_speed", self.reverse_max_speed),
            ("speed_decay", self.speed_decay),
            ("bounce_damping", self.bounce_damping),
            ("fly_speed", self.fly_speed),
            ("fly_ascent_height", self.fly_ascent_height),
            ("fly_ascent_rate", self.fly_ascent_rate),
        ];
        if let Some((name, _)) = scalars.iter().find(|(_, value)| !value.is_finite()) {
            return Err(format!("{} is not finite", name));
        }

        // The speed clamp needs min <= max.
        if self.max_speed < 0.0 || self.reverse_max_speed < 0.0 {
            return Err("max_speed and reverse_max_speed must be non-negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.speed_decay) {
            return Err("speed_decay must be within [0, 1]".to_string());
        }
        if self.step_up_height < 0.0 {
            return Err("step_up_height must be non-negative".to_string());
        }

        Ok(())
    }

    /// Distance moved per tick in the current horizontal mode.
    pub fn horizontal_speed(&self, flying: bool) -> f32 {
        if flying {
            self.fly_speed
        } else {
            self.walk_speed
        }
    }
}

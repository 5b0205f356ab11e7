//! Actor movement controller.
//!
//! This is the main entry point for actor movement. It takes an input
//! command and advances the actor state through the collision world by one
//! tick.

use glam::Vec3;

use crate::collision::{Aabb, CollisionWorld};

use super::config::{ControlMode, MovementConfig};
use super::state::{ActorCommand, ActorState, MovementPhase};
use super::step_move::{step_slide_move, HorizontalOutcome, StepPolicy};
use super::vehicle;

/// What happened during one [`ActorController::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementReport {
    /// Touched down this tick after being airborne.
    pub landed: bool,
    /// A jump impulse was applied.
    pub jumped: bool,
    /// The intended horizontal move was obstructed.
    pub blocked: bool,
    /// A vehicle crash inverted the speed.
    pub bounced: bool,
    /// The move climbed a ledge.
    pub stepped_up: bool,
    /// `state.phase` differs from the start of the tick.
    pub phase_changed: bool,
}

/// Actor movement controller.
///
/// One controller serves every level variant; the differences live in
/// [`MovementConfig`].
///
/// # Example
///
/// ```ignore
/// let controller = ActorController::new(MovementConfig::walking());
/// let mut state = ActorState::default();
/// controller.spawn(&mut state, spawn_position, 0.0);
///
/// // Each tick:
/// let report = controller.update(&mut state, &command, &world);
/// ```
#[derive(Debug, Clone)]
pub struct ActorController {
    pub config: MovementConfig,
}

impl ActorController {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    /// Reset `state` to stand at `position` facing `facing`.
    pub fn spawn(&self, state: &mut ActorState, position: Vec3, facing: f32) {
        *state = ActorState::new(position, facing);
        if self.config.mode == ControlMode::FreeFly {
            state.phase = MovementPhase::Flying;
        }
        log::debug!("actor spawned at {:?} facing {:.2}", position, facing);
    }

    /// Half extents for `state`. A vehicle turned nearer the X axis than
    /// the Z axis has its X and Z extents swapped.
    pub fn half_extents(&self, state: &ActorState) -> Vec3 {
        let half = self.config.half_extents;
        let (sin, cos) = state.facing.sin_cos();
        if self.config.mode == ControlMode::Vehicle && sin.abs() > cos.abs() {
            Vec3::new(half.z, half.y, half.x)
        } else {
            half
        }
    }

    /// Collision box for `state` under this configuration.
    pub fn bounds(&self, state: &ActorState) -> Aabb {
        state.bounds(self.half_extents(state))
    }

    /// Advance `state` by one tick.
    pub fn update(&self, state: &mut ActorState, command: &ActorCommand, world: &CollisionWorld) -> MovementReport {
        let start_phase = state.phase;
        let mut report = MovementReport::default();

        if self.config.mode == ControlMode::FreeFly {
            state.phase = MovementPhase::Flying;
        } else if command.toggle_fly && self.config.allow_free_fly {
            self.toggle_flight(state);
        }

        if state.is_flying() {
            self.fly_move(state, command, world, &mut report);
        } else {
            match self.config.mode {
                ControlMode::Vehicle => self.drive_move(state, command, world, &mut report),
                _ => self.walk_move(state, command, world, &mut report),
            }
            self.vertical_move(state, command, world, &mut report);
        }

        report.phase_changed = state.phase != start_phase;
        report
    }

    /// Resolve a horizontal displacement of `state` using this
    /// configuration's collision policy.
    pub fn resolve_horizontal(&self, world: &CollisionWorld, state: &ActorState, displacement: Vec3) -> HorizontalOutcome {
        step_slide_move(
            world,
            state.position,
            displacement,
            StepPolicy {
                half_extents: self.half_extents(state),
                step_up_height: self.config.step_up_height,
                hard_block: self.config.hard_block_on_collision,
            },
        )
    }

    // ========================================================================
    // Flight
    // ========================================================================

    fn toggle_flight(&self, state: &mut ActorState) {
        state.vertical_velocity = 0.0;
        state.grounded = false;

        if state.is_flying() {
            state.phase = MovementPhase::Airborne;
            state.ascend_target = None;
            log::debug!("flight off at {:?}", state.position);
        } else {
            state.phase = MovementPhase::Flying;
            state.ascend_target = Some(state.position.y + self.config.fly_ascent_height);
            log::debug!("flight on, climbing to {:.2}", state.position.y + self.config.fly_ascent_height);
        }
    }

    fn fly_move(&self, state: &mut ActorState, command: &ActorCommand, world: &CollisionWorld, report: &mut MovementReport) {
        let previous = state.position;
        let previous_facing = state.facing;
        let speed = self.config.horizontal_speed(true);

        if self.config.mode == ControlMode::Vehicle {
            state.facing = vehicle::steer(state.facing, command.right_move, self.config.turn_speed);
        } else {
            state.facing = command.yaw;
        }

        if let Some(target) = state.ascend_target {
            if state.position.y < target {
                state.position.y = (state.position.y + self.config.fly_ascent_rate).min(target);
            }
            if state.position.y >= target {
                state.ascend_target = None;
            }
        }

        let direction = match self.config.mode {
            ControlMode::Vehicle => state.forward() * command.forward_move.clamp(-1.0, 1.0),
            _ => command.move_direction(state.facing),
        };
        state.position += direction * speed;

        if command.ascend {
            state.position.y += speed;
        }
        if command.descend {
            state.position.y -= speed;
        }

        state.position.y = state.position.y.max(self.config.half_extents.y);

        if world.is_blocked(&self.bounds(state)) {
            state.position = previous;
            state.facing = previous_facing;
            state.ascend_target = None;
            report.blocked = true;
        }

        state.vertical_velocity = 0.0;
        state.grounded = false;
    }

    // ========================================================================
    // Horizontal
    // ========================================================================

    fn walk_move(&self, state: &mut ActorState, command: &ActorCommand, world: &CollisionWorld, report: &mut MovementReport) {
        state.facing = command.yaw;

        let direction = command.move_direction(state.facing);
        if direction == Vec3::ZERO {
            return;
        }

        let outcome = self.resolve_horizontal(world, state, direction * self.config.walk_speed);
        state.position = outcome.position;
        report.blocked = outcome.blocked;
        report.stepped_up = outcome.stepped_up;
    }

    fn drive_move(&self, state: &mut ActorState, command: &ActorCommand, world: &CollisionWorld, report: &mut MovementReport) {
        let previous_facing = state.facing;
        let previous_half = self.half_extents(state);
        state.facing = vehicle::steer(state.facing, command.right_move, self.config.turn_speed);

        // Turning past a diagonal swaps the footprint; refuse if it no longer fits.
        if self.half_extents(state) != previous_half && world.is_blocked(&self.bounds(state)) {
            state.facing = previous_facing;
            report.blocked = true;
        }

        state.speed = vehicle::update_speed(state.speed, command.forward_move, &self.config);

        if state.speed == 0.0 {
            return;
        }

        let outcome = self.resolve_horizontal(world, state, state.forward() * state.speed);
        state.position = outcome.position;
        report.blocked |= outcome.blocked;
        report.stepped_up = outcome.stepped_up;

        if outcome.blocked && self.config.hard_block_on_collision {
            let before = state.speed;
            state.speed = vehicle::bounce(state.speed, self.config.bounce_damping);
            report.bounced = true;
            log::debug!("vehicle crash at {:?}, speed {:.3} -> {:.3}", state.position, before, state.speed);
        }
    }

    // ========================================================================
    // Vertical
    // ========================================================================

    /// Gravity, landing/ceiling snap, floor clamp and jump, in that order.
    fn vertical_move(&self, state: &mut ActorState, command: &ActorCommand, world: &CollisionWorld, report: &mut MovementReport) {
        let half = self.config.half_extents;
        let was_grounded = state.grounded;

        if !self.config.gravity_enabled {
            state.vertical_velocity = 0.0;
            state.position.y = state.position.y.max(half.y);
            state.grounded = true;
            state.phase = MovementPhase::Grounded;
            report.landed = !was_grounded;
            return;
        }

        let before = self.bounds(state);
        state.vertical_velocity += self.config.gravity;
        state.position.y += state.vertical_velocity;
        let after = self.bounds(state);

        // Sweep the whole vertical span so a fast fall cannot skip a thin roof.
        let swept = Aabb::new(before.min.min(after.min), before.max.max(after.max));
        let mut grounded = false;

        if let Some(collider) = world.first_blocking(&swept) {
            if state.vertical_velocity <= 0.0 {
                state.position.y = collider.bounds.max.y + half.y;
                grounded = true;
            } else {
                state.position.y = collider.bounds.min.y - half.y;
                log::trace!("ceiling hit on {:?}", collider.id);
            }
            state.vertical_velocity = 0.0;
        }

        if state.position.y <= half.y {
            state.position.y = half.y;
            state.vertical_velocity = 0.0;
            grounded = true;
        }

        let landed = grounded && !was_grounded;
        state.grounded = grounded;
        report.landed = landed;

        if state
            .jump
            .update(command.jump, grounded, landed, self.config.jump_rearm_on_landing)
        {
            state.vertical_velocity = self.config.jump_strength;
            state.grounded = false;
            report.jumped = true;
        }

        state.phase = if state.grounded {
            MovementPhase::Grounded
        } else {
            MovementPhase::Airborne
        };
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn spawned(config: MovementConfig, position: Vec3) -> (ActorController, ActorState) {
        let controller = ActorController::new(config);
        let mut state = ActorState::default();
        controller.spawn(&mut state, position, 0.0);
        (controller, state)
    }

    fn forward() -> ActorCommand {
        ActorCommand {
            forward_move: 1.0,
            ..Default::default()
        }
    }

    fn hold_jump() -> ActorCommand {
        ActorCommand {
            jump: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_settles_on_world_floor() {
        let world = CollisionWorld::new();
        let (controller, mut state) = spawned(MovementConfig::walking(), Vec3::new(0.0, 3.0, 0.0));

        for _ in 0..100 {
            controller.update(&mut state, &ActorCommand::default(), &world);
            assert!(state.position.y >= 0.5);
        }

        assert!(state.grounded);
        assert_eq!(state.phase, MovementPhase::Grounded);
        assert!((state.position.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_lands_on_box_top() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 1.0, 1.0)));
        let (controller, mut state) = spawned(MovementConfig::walking(), Vec3::new(0.0, 5.0, 0.0));

        let mut landings = 0;
        for _ in 0..100 {
            if controller.update(&mut state, &ActorCommand::default(), &world).landed {
                landings += 1;
            }
        }

        assert_eq!(landings, 1);
        assert!(state.grounded);
        assert!((state.position.y - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_rest_is_idempotent() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(-3.0, 0.0, -3.0), Vec3::new(3.0, 2.3, 3.0)));
        let (controller, mut state) = spawned(MovementConfig::walking(), Vec3::new(0.0, 4.0, 0.0));

        for _ in 0..60 {
            controller.update(&mut state, &ActorCommand::default(), &world);
        }
        assert!(state.grounded);

        let rest = state.position;
        for _ in 0..200 {
            controller.update(&mut state, &ActorCommand::default(), &world);
            assert_eq!(state.position, rest);
            assert_eq!(state.vertical_velocity, 0.0);
        }
    }

    #[test]
    fn test_held_jump_fires_once_per_landing() {
        let world = CollisionWorld::new();
        let (controller, mut state) = spawned(MovementConfig::walking(), Vec3::new(0.0, 0.5, 0.0));

        let mut jumps = 0;
        let mut landings = 0;
        while landings < 2 {
            let report = controller.update(&mut state, &hold_jump(), &world);
            if report.landed {
                landings += 1;
            }
            if report.jumped {
                jumps += 1;
                assert!(report.landed, "held key may only re-fire on a landing");
            }
        }

        assert_eq!(jumps, 2);
    }

    #[test]
    fn test_held_jump_without_rearm_fires_once() {
        let world = CollisionWorld::new();
        let config = MovementConfig {
            jump_rearm_on_landing: false,
            ..MovementConfig::walking()
        };
        let (controller, mut state) = spawned(config, Vec3::new(0.0, 0.5, 0.0));

        let jumps = (0..200)
            .filter(|_| controller.update(&mut state, &hold_jump(), &world).jumped)
            .count();
        assert_eq!(jumps, 1);
    }

    #[test]
    fn test_ceiling_stops_jump() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(-2.0, 2.0, -2.0), Vec3::new(2.0, 3.0, 2.0)));
        let (controller, mut state) = spawned(MovementConfig::walking(), Vec3::new(0.0, 0.5, 0.0));

        let mut peak: f32 = 0.0;
        for tick in 0..60 {
            let command = if tick < 3 { hold_jump() } else { ActorCommand::default() };
            controller.update(&mut state, &command, &world);
            peak = peak.max(state.position.y);
            assert!(!world.is_blocked(&controller.bounds(&state)));
        }

        assert!(peak <= 1.5 + 1e-5);
        assert!(state.grounded);
    }

    #[test]
    fn test_walks_along_yaw() {
        let world = CollisionWorld::new();
        let (controller, mut state) = spawned(MovementConfig::walking(), Vec3::new(0.0, 0.5, 0.0));

        for _ in 0..10 {
            controller.update(&mut state, &forward(), &world);
        }

        assert!((state.position.z - 1.5).abs() < 1e-4);
        assert!(state.position.x.abs() < 1e-5);
    }

    #[test]
    fn test_step_up_through_controller() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(-5.0, 0.0, 1.0), Vec3::new(5.0, 0.5, 10.0)));
        let (controller, mut state) = spawned(MovementConfig::puzzle(), Vec3::new(0.0, 0.45, 0.0));

        let mut stepped = false;
        for _ in 0..30 {
            stepped |= controller.update(&mut state, &forward(), &world).stepped_up;
        }

        assert!(stepped);
        assert!(state.position.z > 2.0);
        assert!((state.position.y - 0.95).abs() < 1e-4);
    }

    #[test]
    fn test_vehicle_bounces_off_wall() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(-10.0, 0.0, 5.0), Vec3::new(10.0, 4.0, 6.0)));
        let (controller, mut state) = spawned(MovementConfig::vehicle(), Vec3::new(0.0, 0.5, 0.0));

        let mut bounced = false;
        for _ in 0..200 {
            let report = controller.update(&mut state, &forward(), &world);
            assert!(controller.bounds(&state).max.z <= 5.0 + 1e-4);
            if report.bounced {
                bounced = true;
                assert!(state.speed < 0.0);
                break;
            }
        }

        assert!(bounced);
    }

    #[test]
    fn test_vehicle_steers() {
        let world = CollisionWorld::new();
        let (controller, mut state) = spawned(MovementConfig::vehicle(), Vec3::new(0.0, 0.5, 0.0));

        let left = ActorCommand {
            right_move: -1.0,
            ..Default::default()
        };
        for _ in 0..10 {
            controller.update(&mut state, &left, &world);
        }

        assert!((state.facing - 0.5).abs() < 1e-5);
        assert_eq!(state.position.x, 0.0);
    }

    #[test]
    fn test_vehicle_footprint_follows_facing() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(5.0, 0.0, -10.0), Vec3::new(6.0, 4.0, 10.0)));
        let controller = ActorController::new(MovementConfig::vehicle());
        let mut state = ActorState::default();
        controller.spawn(&mut state, Vec3::new(0.0, 0.5, 0.0), FRAC_PI_2);

        let bounds = controller.bounds(&state);
        assert!((bounds.size().x - 4.0).abs() < 1e-5);
        assert!((bounds.size().z - 2.0).abs() < 1e-5);

        // Driving along +X stops with the long side against the wall.
        let mut bounced = false;
        for _ in 0..200 {
            bounced |= controller.update(&mut state, &forward(), &world).bounced;
            assert!(controller.bounds(&state).max.x <= 5.0 + 1e-4);
            if bounced {
                break;
            }
        }
        assert!(bounced);
        assert!(state.position.x <= 3.0 + 1e-4);
    }

    #[test]
    fn test_vehicle_cannot_turn_into_wall() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(1.5, 0.0, -10.0), Vec3::new(2.0, 4.0, 10.0)));
        let (controller, mut state) = spawned(MovementConfig::vehicle(), Vec3::new(0.0, 0.5, 0.0));

        let left = ActorCommand {
            right_move: -1.0,
            ..Default::default()
        };
        for _ in 0..40 {
            controller.update(&mut state, &left, &world);
            assert!(!world.is_blocked(&controller.bounds(&state)));
        }

        assert!(state.facing < FRAC_PI_4);
        assert!(state.facing > FRAC_PI_4 - 0.1);
    }

    #[test]
    fn test_flight_toggle_climbs_and_returns() {
        let world = CollisionWorld::new();
        let config = MovementConfig {
            allow_free_fly: true,
            ..MovementConfig::walking()
        };
        let (controller, mut state) = spawned(config, Vec3::new(0.0, 0.5, 0.0));
        controller.update(&mut state, &ActorCommand::default(), &world);

        let toggle = ActorCommand {
            toggle_fly: true,
            ..Default::default()
        };
        let report = controller.update(&mut state, &toggle, &world);
        assert!(report.phase_changed);
        assert_eq!(state.phase, MovementPhase::Flying);

        for _ in 0..80 {
            controller.update(&mut state, &ActorCommand::default(), &world);
        }
        assert!((state.position.y - 10.5).abs() < 1e-4);
        assert!(state.ascend_target.is_none());

        controller.update(&mut state, &toggle, &world);
        assert_ne!(state.phase, MovementPhase::Flying);
        for _ in 0..200 {
            controller.update(&mut state, &ActorCommand::default(), &world);
        }
        assert!(state.grounded);
        assert!((state.position.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_flight_ignored_when_not_allowed() {
        let world = CollisionWorld::new();
        let (controller, mut state) = spawned(MovementConfig::walking(), Vec3::new(0.0, 0.5, 0.0));
        let toggle = ActorCommand {
            toggle_fly: true,
            ..Default::default()
        };
        controller.update(&mut state, &toggle, &world);
        assert_ne!(state.phase, MovementPhase::Flying);
    }

    #[test]
    fn test_flight_reverts_on_overlap() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(-5.0, 0.0, 1.0), Vec3::new(5.0, 20.0, 2.0)));
        let (controller, mut state) = spawned(MovementConfig::free_fly(), Vec3::new(0.0, 5.0, 0.0));

        for _ in 0..20 {
            controller.update(&mut state, &forward(), &world);
        }

        assert!(controller.bounds(&state).max.z <= 1.0 + 1e-4);
        assert!((state.position.y - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_free_fly_ascend_descend() {
        let world = CollisionWorld::new();
        let (controller, mut state) = spawned(MovementConfig::free_fly(), Vec3::new(0.0, 5.0, 0.0));

        let up = ActorCommand {
            ascend: true,
            ..Default::default()
        };
        controller.update(&mut state, &up, &world);
        assert!((state.position.y - 5.25).abs() < 1e-6);

        let down = ActorCommand {
            descend: true,
            ..Default::default()
        };
        for _ in 0..100 {
            controller.update(&mut state, &down, &world);
        }
        assert!((state.position.y - 0.5).abs() < 1e-6);
    }
}

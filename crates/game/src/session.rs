//! Level session.
//!
//! Owns one level's collision world, actor, camera, props and checkpoint
//! course, and advances them together once per [`LevelSession::tick`].
//!
//! # Tick order
//!
//! 1. Rebuild the collision world (every tick, or when props moved)
//! 2. Apply pointer look to the camera angles
//! 3. Drain key edges: flight toggle, grab, drag distance
//! 4. Advance the actor
//! 5. Hand the actor pose to the presenter
//! 6. Drag the held prop and settle released ones
//! 7. Solve the camera against the world
//! 8. Checkpoints, then the goal, then the completion countdown

use skyline_camera::{CameraAngles, CameraMode, CameraPose, CameraRig};
use skyline_physics::{Aabb, ActorController, ActorState, CollisionWorld, ControlMode, MovementReport};

use crate::checkpoint::{CheckpointCourse, RespawnAnchor};
use crate::config::SessionConfig;
use crate::error::LevelError;
use crate::events::SessionEvent;
use crate::input::{Action, InputState};
use crate::level::{LevelDefinition, RebuildPolicy};
use crate::ports::{ActorPose, ActorPresenter, CompletionCallback, GeometrySource};
use crate::props::{PropIndex, PropSet};

/// Output of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub camera: CameraPose,
    pub events: Vec<SessionEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Pending,
    Countdown(u32),
    Done,
}

/// Free-look starts behind the spawn facing; chase starts straight behind.
fn initial_angles(definition: &LevelDefinition) -> CameraAngles {
    match definition.camera_mode {
        CameraMode::FreeLook => CameraAngles::new(definition.spawn_facing, 0.0),
        CameraMode::Chase => CameraAngles::default(),
    }
}

/// A running level.
pub struct LevelSession {
    definition: LevelDefinition,
    config: SessionConfig,
    controller: ActorController,
    actor: ActorState,
    rig: CameraRig,
    input: InputState,
    world: CollisionWorld,
    props: PropSet,
    course: CheckpointCourse,
    goal: Option<Aabb>,
    geometry_source: Option<Box<dyn GeometrySource>>,
    presenter: Option<Box<dyn ActorPresenter>>,
    on_complete: Option<CompletionCallback>,
    completion: Completion,
    camera: CameraPose,
    ticks: u64,
    torn_down: bool,
}

impl LevelSession {
    /// Load `definition` and place the actor at its spawn.
    pub fn new(
        definition: LevelDefinition,
        config: SessionConfig,
        on_complete: CompletionCallback,
    ) -> Result<Self, LevelError> {
        definition.validate()?;
        config.validate()?;

        let controller = ActorController::new(definition.movement.clone());
        let mut actor = ActorState::default();
        controller.spawn(&mut actor, definition.spawn, definition.spawn_facing);

        let mut camera_config = config.camera.clone();
        camera_config.mode = definition.camera_mode;
        let mut rig = CameraRig::new(camera_config);
        rig.angles = initial_angles(&definition);

        let course = CheckpointCourse::new(
            &definition.checkpoints,
            RespawnAnchor {
                position: definition.spawn,
                facing: definition.spawn_facing,
            },
        );
        let props = PropSet::new(&definition.props, definition.prop_bounds);
        let goal = definition.goal_volume();
        let input = InputState::new(config.bindings.clone());

        let mut session = Self {
            camera: rig.solve(actor.position, actor.facing, &CollisionWorld::new()),
            definition,
            config,
            controller,
            actor,
            rig,
            input,
            world: CollisionWorld::new(),
            props,
            course,
            goal,
            geometry_source: None,
            presenter: None,
            on_complete: Some(on_complete),
            completion: Completion::Pending,
            ticks: 0,
            torn_down: false,
        };
        session.rebuild_geometry();
        session.camera = session.solve_camera();

        log::info!(
            "level '{}' loaded: {} colliders, {} props, {} checkpoints",
            session.definition.name,
            session.world.len(),
            session.props.len(),
            session.course.total()
        );

        Ok(session)
    }

    /// Add externally owned geometry. The world is rebuilt immediately.
    pub fn with_geometry_source(mut self, source: Box<dyn GeometrySource>) -> Self {
        self.geometry_source = Some(source);
        self.rebuild_geometry();
        self.camera = self.solve_camera();
        self
    }

    pub fn with_presenter(mut self, presenter: Box<dyn ActorPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn definition(&self) -> &LevelDefinition {
        &self.definition
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn actor(&self) -> &ActorState {
        &self.actor
    }

    pub fn actor_bounds(&self) -> Aabb {
        self.controller.bounds(&self.actor)
    }

    pub fn camera(&self) -> CameraPose {
        self.camera
    }

    pub fn camera_angles(&self) -> CameraAngles {
        self.rig.angles
    }

    pub fn camera_angles_mut(&mut self) -> &mut CameraAngles {
        &mut self.rig.angles
    }

    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    pub fn props(&self) -> &PropSet {
        &self.props
    }

    pub fn checkpoints(&self) -> &CheckpointCourse {
        &self.course
    }

    pub fn checkpoints_passed(&self) -> usize {
        self.course.passed()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The completion callback has run.
    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Done
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Replace the collision world with the level's current geometry.
    pub fn rebuild_geometry(&mut self) {
        let mut geometry: Vec<_> = self.definition.static_geometry().collect();
        geometry.extend(self.props.colliders());
        if let Some(source) = &self.geometry_source {
            source.append_geometry(&mut geometry);
        }
        self.world.rebuild(geometry);
    }

    /// Put the actor back at the latest respawn anchor.
    pub fn respawn(&mut self) {
        let anchor = self.course.anchor();
        self.controller.spawn(&mut self.actor, anchor.position, anchor.facing);
        log::info!("respawned at {:?}", anchor.position);
    }

    /// Start the level over: checkpoints cleared, props back where they
    /// started, actor and camera at the spawn. A completion that already
    /// ran stays done; a pending countdown is cancelled.
    pub fn reload(&mut self) {
        if self.torn_down {
            return;
        }

        self.course.reset();
        self.props = PropSet::new(&self.definition.props, self.definition.prop_bounds);
        self.input.reset();
        self.rig.angles = initial_angles(&self.definition);
        self.controller
            .spawn(&mut self.actor, self.definition.spawn, self.definition.spawn_facing);
        if self.completion != Completion::Done {
            self.completion = Completion::Pending;
        }

        self.rebuild_geometry();
        self.camera = self.solve_camera();
        log::info!("level '{}' reloaded", self.definition.name);
    }

    /// Pick a prop along the current camera ray. Picking the held prop drops it.
    pub fn grab_prop(&mut self) -> Option<PropIndex> {
        self.props
            .grab(self.camera.position, self.camera.forward(), &self.world)
    }

    pub fn release_prop(&mut self) -> Option<PropIndex> {
        self.props.release()
    }

    /// Stop the session. Later ticks do nothing and the completion callback
    /// is dropped.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.input.reset();
        self.props.release();
        self.world.clear();
        self.on_complete = None;
        log::info!("level '{}' torn down after {} ticks", self.definition.name, self.ticks);
    }

    /// Advance the level by one tick.
    pub fn tick(&mut self) -> TickReport {
        let mut events = Vec::new();

        if self.torn_down {
            return TickReport {
                camera: self.camera,
                events,
            };
        }

        if self.definition.rebuild_policy == RebuildPolicy::EveryTick {
            self.rebuild_geometry();
        }

        let look = self.input.take_look_delta();
        self.rig.look(look.x, look.y);

        let edges = self.input.take_edges();
        if !self.props.is_empty() {
            self.handle_prop_input(edges.pressed(Action::Grab), &mut events);
        }

        let command = self
            .input
            .to_command(&edges, self.rig.orbit_yaw(self.actor.facing));
        let speed_before = self.actor.speed;
        let report = self.controller.update(&mut self.actor, &command, &self.world);
        self.push_movement_events(&report, speed_before, &mut events);

        if let Some(presenter) = self.presenter.as_mut() {
            presenter.present(&ActorPose {
                position: self.actor.position,
                facing: self.actor.facing,
                phase: self.actor.phase,
            });
        }

        let actor_bounds = self.actor_bounds();
        if !self.props.is_empty() {
            self.update_props(&actor_bounds);
        }

        self.camera = self.solve_camera();

        if let Some(passed) = self.course.update(&actor_bounds, self.controller.config.half_extents) {
            events.push(SessionEvent::CheckpointPassed {
                ordinal: passed.ordinal,
                passed: passed.passed,
                total: passed.total,
            });
        }

        self.check_goal(&actor_bounds, &mut events);
        self.advance_completion(&mut events);

        self.ticks += 1;
        if self.config.log_every_n_ticks > 0 && self.ticks % u64::from(self.config.log_every_n_ticks) == 0 {
            log::debug!(
                "tick {}: pos {:?} phase {:?} speed {:.3} checkpoints {}/{}",
                self.ticks,
                self.actor.position,
                self.actor.phase,
                self.actor.speed,
                self.course.passed(),
                self.course.total()
            );
        }

        TickReport {
            camera: self.camera,
            events,
        }
    }

    // ========================================================================
    // Tick stages
    // ========================================================================

    fn solve_camera(&self) -> CameraPose {
        self.rig.solve(self.actor.position, self.actor.facing, &self.world)
    }

    fn handle_prop_input(&mut self, grab_pressed: bool, events: &mut Vec<SessionEvent>) {
        if grab_pressed {
            let before = self.props.held();
            let after = self.grab_prop().or(self.props.held());
            match (before, after) {
                (Some(index), None) => events.push(SessionEvent::PropReleased { index }),
                (_, Some(index)) if before != Some(index) => {
                    if let Some(previous) = before {
                        events.push(SessionEvent::PropReleased { index: previous });
                    }
                    events.push(SessionEvent::PropGrabbed { index });
                }
                _ => {}
            }
        }

        let mut steps = 0.0;
        if self.input.is_held(Action::DragFarther) {
            steps += 1.0;
        }
        if self.input.is_held(Action::DragCloser) {
            steps -= 1.0;
        }
        self.props.adjust_drag_distance(steps);
    }

    fn push_movement_events(&self, report: &MovementReport, speed_before: f32, events: &mut Vec<SessionEvent>) {
        if report.landed {
            events.push(SessionEvent::Landed);
        }
        if report.jumped {
            events.push(SessionEvent::Jumped);
        }
        if report.phase_changed {
            events.push(SessionEvent::ModeChanged {
                mode: self.controller.config.mode,
                phase: self.actor.phase,
            });
        }
        // Reported at HUD resolution so a decaying speed does not spam.
        let hud = |speed: f32| (speed * 100.0).round() as i32;
        if self.controller.config.mode == ControlMode::Vehicle && hud(speed_before) != hud(self.actor.speed) {
            events.push(SessionEvent::SpeedChanged { speed: self.actor.speed });
        }
    }

    fn update_props(&mut self, actor_bounds: &Aabb) {
        let look = (self.rig.aim_point(self.actor.position)
            - self.rig.ideal_position(self.actor.position, self.actor.facing))
        .normalize_or_zero();

        let dragged = self.props.drag(self.actor.position, look, actor_bounds);
        let settled = self.props.settle(&self.world, actor_bounds);

        if dragged || settled {
            self.rebuild_geometry();
        }
    }

    fn check_goal(&mut self, actor_bounds: &Aabb, events: &mut Vec<SessionEvent>) {
        if self.completion != Completion::Pending || !self.course.all_passed() {
            return;
        }
        let Some(goal) = &self.goal else {
            return;
        };
        if goal.intersects(actor_bounds) {
            log::info!("goal reached in '{}'", self.definition.name);
            self.completion = Completion::Countdown(self.config.completion_delay_ticks);
            events.push(SessionEvent::GoalReached);
        }
    }

    fn advance_completion(&mut self, events: &mut Vec<SessionEvent>) {
        let Completion::Countdown(remaining) = self.completion else {
            return;
        };

        if remaining > 0 {
            self.completion = Completion::Countdown(remaining - 1);
            return;
        }

        self.completion = Completion::Done;
        if let Some(mut callback) = self.on_complete.take() {
            callback();
        }
        log::info!("level '{}' complete", self.definition.name);
        events.push(SessionEvent::Completed);
    }
}

// ============================================================================
// Tests
// ============================================================================

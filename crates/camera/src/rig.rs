//! Orbit camera rig.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use skyline_physics::CollisionWorld;

/// Pitch stays this far (radians) from straight up or down by default.
pub const DEFAULT_PITCH_MARGIN: f32 = 0.1;

/// How the orbit yaw relates to the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Yaw is absolute; the actor's facing is ignored.
    #[default]
    FreeLook,
    /// Yaw is an offset from the actor's facing (vehicle chase cam).
    Chase,
}

/// Mouse-controlled orbit angles in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraAngles {
    /// Absolute yaw in free-look, offset from facing in chase mode.
    pub yaw: f32,
    /// Positive raises the camera above the aim point.
    pub pitch: f32,
}

impl CameraAngles {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        let mut angles = Self { yaw, pitch };
        angles.clamp_pitch(DEFAULT_PITCH_MARGIN);
        angles
    }

    /// Apply a raw pointer delta. Moving right turns left-handed (yaw
    /// decreases), moving down raises the camera.
    pub fn apply_mouse_delta(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.rotate(dx, dy, sensitivity, DEFAULT_PITCH_MARGIN);
    }

    /// [`apply_mouse_delta`](Self::apply_mouse_delta) with an explicit pitch margin.
    pub fn rotate(&mut self, dx: f32, dy: f32, sensitivity: f32, pitch_margin: f32) {
        self.yaw -= dx * sensitivity;
        self.pitch += dy * sensitivity;
        self.clamp_pitch(pitch_margin);
    }

    /// Keep pitch inside `(-PI/2 + margin, PI/2 - margin)`.
    pub fn clamp_pitch(&mut self, margin: f32) {
        let limit = (FRAC_PI_2 - margin.abs()).max(0.0);
        self.pitch = self.pitch.clamp(-limit, limit);
    }
}

/// Camera rig parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub mode: CameraMode,

    /// Orbit radius around the aim point.
    pub distance: f32,

    /// Extra height added to the orbit position.
    pub height_offset: f32,

    /// Height of the aim point above the actor center.
    pub aim_height: f32,

    /// Gap left between the camera and an occluding surface.
    pub occlusion_epsilon: f32,

    pub occlusion_enabled: bool,

    /// Radians per pixel of pointer movement.
    pub mouse_sensitivity: f32,

    pub pitch_margin: f32,

    /// World floor plane. The camera is never placed at or below it.
    pub floor_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mode: CameraMode::FreeLook,
            distance: 8.0,
            height_offset: 1.8,
            aim_height: 1.5,
            occlusion_epsilon: 0.2,
            occlusion_enabled: true,
            mouse_sensitivity: 0.0025,
            pitch_margin: DEFAULT_PITCH_MARGIN,
            floor_height: 0.0,
        }
    }
}

impl CameraConfig {
    /// Check that every value is finite and the distances are non-negative.
    pub fn validate(&self) -> Result<(), String> {
        let scalars = [
            ("distance", self.distance),
            ("height_offset", self.height_offset),
            ("aim_height", self.aim_height),
            ("occlusion_epsilon", self.occlusion_epsilon),
            ("mouse_sensitivity", self.mouse_sensitivity),
            ("pitch_margin", self.pitch_margin),
            ("floor_height", self.floor_height),
        ];
        if let Some((name, _)) = scalars.iter().find(|(_, value)| !value.is_finite()) {
            return Err(format!("camera.{} is not finite", name));
        }
        if self.distance < 0.0 {
            return Err("camera.distance must be non-negative".to_string());
        }
        if self.occlusion_epsilon < 0.0 {
            return Err("camera.occlusion_epsilon must be non-negative".to_string());
        }
        Ok(())
    }

    /// Vehicle chase camera.
    pub fn chase() -> Self {
        Self {
            mode: CameraMode::Chase,
            ..Default::default()
        }
    }
}

/// Camera transform for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    /// Look-at point.
    pub target: Vec3,
    /// The ideal position was blocked and the camera was pulled in.
    pub occluded: bool,
}

impl CameraPose {
    /// Unit look direction.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Right-handed view matrix for a renderer.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

/// Third-person orbit camera.
#[derive(Debug, Clone, Default)]
pub struct CameraRig {
    pub config: CameraConfig,
    pub angles: CameraAngles,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            angles: CameraAngles::default(),
        }
    }

    /// Apply a raw pointer delta using the configured sensitivity and margin.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.angles
            .rotate(dx, dy, self.config.mouse_sensitivity, self.config.pitch_margin);
    }

    /// Orbit yaw after applying the camera mode.
    pub fn orbit_yaw(&self, actor_facing: f32) -> f32 {
        match self.config.mode {
            CameraMode::FreeLook => self.angles.yaw,
            CameraMode::Chase => actor_facing + self.angles.yaw,
        }
    }

    /// Point the camera looks at.
    pub fn aim_point(&self, actor_position: Vec3) -> Vec3 {
        actor_position + Vec3::Y * self.config.aim_height
    }

    /// Unobstructed orbit position behind and above the actor.
    pub fn ideal_position(&self, actor_position: Vec3, actor_facing: f32) -> Vec3 {
        let yaw = self.orbit_yaw(actor_facing);
        let (sin_pitch, cos_pitch) = self.angles.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = yaw.sin_cos();
        let d = self.config.distance;

        actor_position
            + Vec3::new(
                -sin_yaw * d * cos_pitch,
                sin_pitch * d + self.config.height_offset,
                -cos_yaw * d * cos_pitch,
            )
    }

    /// Derive this tick's camera pose.
    ///
    /// A ray is cast from the aim point toward the ideal position. If solid
    /// geometry or the floor plane intersects it first, the camera is placed
    /// `occlusion_epsilon` short of the hit, and always strictly between the
    /// aim point and the obstruction. The floor plane applies even with
    /// occlusion disabled.
    pub fn solve(&self, actor_position: Vec3, actor_facing: f32, world: &CollisionWorld) -> CameraPose {
        let target = self.aim_point(actor_position);
        let ideal = self.ideal_position(actor_position, actor_facing);
        let offset = ideal - target;
        let reach = offset.length();

        let floor_hit = self.floor_distance(target, offset, reach);
        let world_hit = if self.config.occlusion_enabled {
            world
                .raycast(target, offset, reach)
                .filter(|hit| hit.distance < reach)
                .map(|hit| {
                    log::trace!("camera ray hit {:?} at {:.2}", hit.collider, hit.distance);
                    hit.distance
                })
        } else {
            None
        };

        let nearest = match (world_hit, floor_hit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        match nearest {
            Some(t) => {
                let distance = (t - self.config.occlusion_epsilon).max(t * 0.5);
                log::trace!("camera occluded at {:.2}, pulled in to {:.2}", t, distance);
                CameraPose {
                    position: target + offset / reach * distance,
                    target,
                    occluded: true,
                }
            }
            None => CameraPose {
                position: ideal,
                target,
                occluded: false,
            },
        }
    }

    /// Distance along the camera ray to the floor plane, if it is crossed
    /// before `reach`.
    fn floor_distance(&self, target: Vec3, offset: Vec3, reach: f32) -> Option<f32> {
        let floor = self.config.floor_height;
        if reach <= 0.0 || offset.y >= 0.0 || target.y <= floor {
            return None;
        }
        let t = (target.y - floor) / -offset.y * reach;
        (t < reach).then_some(t)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use skyline_physics::Aabb;
    use std::f32::consts::PI;

    const ACTOR: Vec3 = Vec3::new(0.0, 0.5, 0.0);

    #[test]
    fn test_ideal_position_behind_actor() {
        let rig = CameraRig::new(CameraConfig::default());
        let pose = rig.solve(ACTOR, 0.0, &CollisionWorld::new());

        assert!(!pose.occluded);
        assert!((pose.position - Vec3::new(0.0, 2.3, -8.0)).length() < 1e-5);
        assert!((pose.target - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);
        assert!(pose.forward().z > 0.9);
    }

    #[test]
    fn test_pitch_raises_camera() {
        let mut rig = CameraRig::new(CameraConfig::default());
        rig.angles.pitch = 0.5;
        let pos = rig.ideal_position(ACTOR, 0.0);

        assert!((pos.y - (0.5 + 0.5_f32.sin() * 8.0 + 1.8)).abs() < 1e-5);
        assert!((pos.z + 8.0 * 0.5_f32.cos()).abs() < 1e-5);
    }

    #[test]
    fn test_mouse_delta_and_clamp() {
        let mut angles = CameraAngles::default();
        angles.apply_mouse_delta(100.0, 0.0, 0.0025);
        assert!((angles.yaw + 0.25).abs() < 1e-6);

        angles.apply_mouse_delta(0.0, 10_000.0, 0.0025);
        assert!((angles.pitch - (FRAC_PI_2 - DEFAULT_PITCH_MARGIN)).abs() < 1e-6);

        angles.apply_mouse_delta(0.0, -20_000.0, 0.0025);
        assert!((angles.pitch + (FRAC_PI_2 - DEFAULT_PITCH_MARGIN)).abs() < 1e-6);
    }

    #[test]
    fn test_occluder_pulls_camera_in() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(-5.0, 0.0, -4.5), Vec3::new(5.0, 10.0, -3.5)));

        let rig = CameraRig::new(CameraConfig::default());
        let pose = rig.solve(ACTOR, 0.0, &world);

        assert!(pose.occluded);
        // Strictly between the aim point and the wall's near face.
        assert!(pose.position.z < pose.target.z);
        assert!(pose.position.z > -3.5);
        assert!((pose.position - pose.target).length() < 3.6);
    }

    #[test]
    fn test_occlusion_disabled() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(-5.0, 0.0, -4.5), Vec3::new(5.0, 10.0, -3.5)));

        let rig = CameraRig::new(CameraConfig {
            occlusion_enabled: false,
            ..Default::default()
        });
        let pose = rig.solve(ACTOR, 0.0, &world);

        assert!(!pose.occluded);
        assert!((pose.position.z + 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_box_around_aim_point_is_ignored() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::splat(-3.0), Vec3::splat(3.0)));

        let rig = CameraRig::new(CameraConfig::default());
        let pose = rig.solve(ACTOR, 0.0, &world);
        assert!(!pose.occluded);
    }

    #[test]
    fn test_obstruction_beyond_ideal_is_ignored() {
        let mut world = CollisionWorld::new();
        world.register_static(Aabb::new(Vec3::new(-5.0, 0.0, -12.0), Vec3::new(5.0, 10.0, -10.0)));

        let rig = CameraRig::new(CameraConfig::default());
        assert!(!rig.solve(ACTOR, 0.0, &world).occluded);
    }

    #[test]
    fn test_camera_stays_above_floor_at_low_pitch() {
        let mut rig = CameraRig::new(CameraConfig::default());
        rig.angles.apply_mouse_delta(0.0, -100_000.0, 0.0025);
        assert!(rig.ideal_position(ACTOR, 0.0).y < 0.0);

        let pose = rig.solve(ACTOR, 0.0, &CollisionWorld::new());
        assert!(pose.occluded);
        assert!(pose.position.y > 0.0);
        assert!(pose.position.y < pose.target.y);

        rig.config.occlusion_enabled = false;
        assert!(rig.solve(ACTOR, 0.0, &CollisionWorld::new()).position.y > 0.0);
    }

    #[test]
    fn test_validate() {
        assert_eq!(CameraConfig::default().validate(), Ok(()));

        let negative = CameraConfig {
            distance: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let nan = CameraConfig {
            aim_height: f32::NAN,
            ..Default::default()
        };
        assert_eq!(nan.validate(), Err("camera.aim_height is not finite".to_string()));
    }

    #[test]
    fn test_chase_follows_facing() {
        let rig = CameraRig::new(CameraConfig::chase());
        let pose = rig.solve(ACTOR, PI / 2.0, &CollisionWorld::new());

        // Facing +X puts the camera on the -X side.
        assert!((pose.position.x + 8.0).abs() < 1e-4);
        assert!(pose.position.z.abs() < 1e-4);
    }

    #[test]
    fn test_view_matrix() {
        let rig = CameraRig::new(CameraConfig::default());
        let pose = rig.solve(ACTOR, 0.0, &CollisionWorld::new());
        assert!(pose.view_matrix().determinant().abs() > 0.0001);
    }
}

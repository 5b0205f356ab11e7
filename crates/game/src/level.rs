//! Level definitions.
//!
//! A level is plain data: static boxes, movable props, checkpoint volumes, a
//! goal and the movement and camera variant to play it with. Four levels are
//! built in; more can be loaded from TOML.

use std::f32::consts::PI;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skyline_camera::CameraMode;
use skyline_physics::{Aabb, GeometryKind, MovementConfig};

use crate::error::LevelError;

fn default_collision_tolerance() -> f32 {
    0.05
}

fn default_goal_tolerance() -> f32 {
    0.1
}

fn default_prop_size() -> f32 {
    2.0
}

fn default_prop_gravity() -> Vec3 {
    Vec3::NEG_Y
}

/// When the session rebuilds the collision world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildPolicy {
    /// Only at load and on explicit request (or when a prop settles).
    #[default]
    OnDemand,
    /// Wholesale at the start of every tick.
    EveryTick,
}

/// A movable cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropSpec {
    pub center: Vec3,

    /// Edge length.
    #[serde(default = "default_prop_size")]
    pub size: f32,

    /// Direction the prop settles in when released. Zero to float in place.
    #[serde(default = "default_prop_gravity")]
    pub gravity_direction: Vec3,
}

/// A checkpoint volume. Checkpoints are crossed in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSpec {
    pub bounds: Aabb,

    /// Facing restored when respawning here.
    #[serde(default)]
    pub respawn_facing: f32,
}

/// A complete level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub name: String,

    /// Actor center at load.
    pub spawn: Vec3,

    #[serde(default)]
    pub spawn_facing: f32,

    #[serde(default)]
    pub movement: MovementConfig,

    #[serde(default)]
    pub camera_mode: CameraMode,

    /// Static boxes are shrunk by this much to avoid false contacts.
    #[serde(default = "default_collision_tolerance")]
    pub collision_tolerance: f32,

    #[serde(default)]
    pub static_boxes: Vec<Aabb>,

    #[serde(default)]
    pub props: Vec<PropSpec>,

    #[serde(default)]
    pub checkpoints: Vec<CheckpointSpec>,

    #[serde(default)]
    pub goal: Option<Aabb>,

    /// The goal volume is grown by this much before testing.
    #[serde(default = "default_goal_tolerance")]
    pub goal_tolerance: f32,

    /// Props are kept inside this box while dragged.
    #[serde(default)]
    pub prop_bounds: Option<Aabb>,

    #[serde(default)]
    pub rebuild_policy: RebuildPolicy,
}

impl LevelDefinition {
    /// An empty level with default walking movement.
    pub fn new(name: &str, spawn: Vec3) -> Self {
        Self {
            name: name.to_string(),
            spawn,
            spawn_facing: 0.0,
            movement: MovementConfig::default(),
            camera_mode: CameraMode::FreeLook,
            collision_tolerance: default_collision_tolerance(),
            static_boxes: Vec::new(),
            props: Vec::new(),
            checkpoints: Vec::new(),
            goal: None,
            goal_tolerance: default_goal_tolerance(),
            prop_bounds: None,
            rebuild_policy: RebuildPolicy::OnDemand,
        }
    }

    /// Parse and validate a level from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, LevelError> {
        let level: Self = toml::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    /// Load and validate a level from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, LevelError> {
        let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Look up a built-in level.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "hub" => Some(Self::hub()),
            "rooftops" => Some(Self::rooftops()),
            "drive" => Some(Self::drive()),
            "warehouse" => Some(Self::warehouse()),
            _ => {
                log::warn!("unknown level '{}'", name);
                None
            }
        }
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &["hub", "rooftops", "drive", "warehouse"]
    }

    /// Reject data the simulation cannot meaningfully run.
    pub fn validate(&self) -> Result<(), LevelError> {
        let invalid = |reason: String| LevelError::Invalid {
            level: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if !self.spawn.is_finite() || !self.spawn_facing.is_finite() {
            return Err(invalid("spawn is not finite".to_string()));
        }
        if !(self.collision_tolerance.is_finite() && self.collision_tolerance >= 0.0) {
            return Err(invalid("collision_tolerance must be finite and non-negative".to_string()));
        }
        if !(self.goal_tolerance.is_finite() && self.goal_tolerance >= 0.0) {
            return Err(invalid("goal_tolerance must be finite and non-negative".to_string()));
        }
        self.movement
            .validate()
            .map_err(|reason| invalid(format!("movement.{}", reason)))?;

        let finite = |b: &Aabb| b.min.is_finite() && b.max.is_finite();

        if let Some(index) = self.static_boxes.iter().position(|b| !finite(b)) {
            return Err(invalid(format!("static box {} is not finite", index)));
        }
        for (index, prop) in self.props.iter().enumerate() {
            if !prop.center.is_finite() || !prop.gravity_direction.is_finite() {
                return Err(invalid(format!("prop {} is not finite", index)));
            }
            if !(prop.size.is_finite() && prop.size > 0.0) {
                return Err(invalid(format!("prop {} has non-positive size", index)));
            }
        }
        for (index, checkpoint) in self.checkpoints.iter().enumerate() {
            if !finite(&checkpoint.bounds) || !checkpoint.respawn_facing.is_finite() {
                return Err(invalid(format!("checkpoint {} is not finite", index)));
            }
        }
        if self.goal.as_ref().is_some_and(|g| !finite(g)) {
            return Err(invalid("goal is not finite".to_string()));
        }
        if self.prop_bounds.as_ref().is_some_and(|b| !finite(b)) {
            return Err(invalid("prop_bounds is not finite".to_string()));
        }

        Ok(())
    }

    /// Static solid geometry as it enters the collision world.
    pub fn static_geometry(&self) -> impl Iterator<Item = (Aabb, GeometryKind)> + '_ {
        self.static_boxes
            .iter()
            .map(|b| (b.shrunk(self.collision_tolerance), GeometryKind::Static))
    }

    /// Goal volume grown by the goal tolerance.
    pub fn goal_volume(&self) -> Option<Aabb> {
        self.goal.map(|g| g.expanded(self.goal_tolerance))
    }

    // ========================================================================
    // Built-in levels
    // ========================================================================

    /// Walled plaza with a few crates. No goal.
    pub fn hub() -> Self {
        let mut level = Self::new("hub", Vec3::new(0.0, 0.5, -10.0));

        let half = 20.0;
        let height = 5.0;
        let thickness = 0.5;
        level.static_boxes.extend([
            Aabb::new(Vec3::new(-half, 0.0, -half - thickness), Vec3::new(half, height, -half)),
            Aabb::new(Vec3::new(-half, 0.0, half), Vec3::new(half, height, half + thickness)),
            Aabb::new(Vec3::new(-half - thickness, 0.0, -half), Vec3::new(-half, height, half)),
            Aabb::new(Vec3::new(half, 0.0, -half), Vec3::new(half + thickness, height, half)),
        ]);

        // Crates of increasing height, lowest one jumpable.
        for (i, height) in [1.0, 2.0, 3.0].into_iter().enumerate() {
            let x = -6.0 + i as f32 * 6.0;
            level.static_boxes.push(Aabb::new(Vec3::new(x - 1.0, 0.0, 4.0), Vec3::new(x + 1.0, height, 6.0)));
        }

        level
    }

    /// Grid of skyscrapers. Flight can be toggled; checkpoints sit on three
    /// roofs and the goal on a fourth.
    pub fn rooftops() -> Self {
        let mut level = Self::new("rooftops", Vec3::new(0.0, 0.5, -45.0));
        level.movement = MovementConfig {
            allow_free_fly: true,
            ..MovementConfig::walking()
        };

        let spacing = 20.0;
        let half_width = 5.0;
        let roof = |i: usize, j: usize| 12.0 + ((i * 3 + j * 5) % 4) as f32 * 4.0;
        let center = |i: usize| (i as f32 - 1.5) * spacing;

        for i in 0..4 {
            for j in 0..4 {
                let (x, z) = (center(i), center(j));
                level.static_boxes.push(Aabb::new(
                    Vec3::new(x - half_width, 0.0, z - half_width),
                    Vec3::new(x + half_width, roof(i, j), z + half_width),
                ));
            }
        }

        let pad = |i: usize, j: usize| {
            let (x, z, y) = (center(i), center(j), roof(i, j));
            Aabb::new(Vec3::new(x - 3.0, y, z - 3.0), Vec3::new(x + 3.0, y + 3.0, z + 3.0))
        };

        level.checkpoints = vec![
            CheckpointSpec { bounds: pad(1, 0), respawn_facing: 0.0 },
            CheckpointSpec { bounds: pad(2, 1), respawn_facing: 0.0 },
            CheckpointSpec { bounds: pad(1, 2), respawn_facing: 0.0 },
        ];
        level.goal = Some(pad(2, 3));

        level
    }

    /// Vehicle course down a walled road, through three gates.
    pub fn drive() -> Self {
        let mut level = Self::new("drive", Vec3::new(0.0, 0.5, 0.0));
        level.movement = MovementConfig::vehicle();
        level.camera_mode = CameraMode::Chase;

        let road_half = 8.0;
        let length = 200.0;
        level.static_boxes.extend([
            // Guard rails
            Aabb::new(Vec3::new(-road_half - 1.0, 0.0, -10.0), Vec3::new(-road_half, 1.5, length)),
            Aabb::new(Vec3::new(road_half, 0.0, -10.0), Vec3::new(road_half + 1.0, 1.5, length)),
            // End walls
            Aabb::new(Vec3::new(-road_half, 0.0, -11.0), Vec3::new(road_half, 3.0, -10.0)),
            Aabb::new(Vec3::new(-road_half, 0.0, length), Vec3::new(road_half, 3.0, length + 1.0)),
            // Barriers to weave around
            Aabb::new(Vec3::new(-road_half, 0.0, 70.0), Vec3::new(-2.0, 1.5, 72.0)),
            Aabb::new(Vec3::new(2.0, 0.0, 120.0), Vec3::new(road_half, 1.5, 122.0)),
        ]);

        level.checkpoints = [50.0, 100.0, 150.0]
            .into_iter()
            .map(|z| CheckpointSpec {
                bounds: Aabb::new(Vec3::new(-road_half, 0.0, z), Vec3::new(road_half, 4.0, z + 2.0)),
                respawn_facing: 0.0,
            })
            .collect();
        level.goal = Some(Aabb::new(Vec3::new(-road_half, 0.0, 185.0), Vec3::new(road_half, 4.0, 190.0)));

        level
    }

    /// Box-pushing puzzle: a pit splits the floor and the goal door lies
    /// beyond it. Three crates can be dragged into the pit to cross.
    pub fn warehouse() -> Self {
        let mut level = Self::new("warehouse", Vec3::new(0.0, 2.45, 10.0));
        level.spawn_facing = PI;
        level.movement = MovementConfig::puzzle();
        level.rebuild_policy = RebuildPolicy::EveryTick;

        let half_width = 15.0;
        let south = 15.0;
        let north = -25.0;
        let floor = 2.0;
        let wall = 8.0;
        let thickness = 0.3;
        let (pit_north, pit_south) = (-9.0, -1.0);

        level.static_boxes.extend([
            // Floor slabs either side of the pit
            Aabb::new(Vec3::new(-half_width, 0.0, pit_south), Vec3::new(half_width, floor, south)),
            Aabb::new(Vec3::new(-half_width, 0.0, north), Vec3::new(half_width, floor, pit_north)),
            // Outer walls
            Aabb::new(Vec3::new(-half_width - thickness, 0.0, north), Vec3::new(-half_width, wall, south)),
            Aabb::new(Vec3::new(half_width, 0.0, north), Vec3::new(half_width + thickness, wall, south)),
            Aabb::new(Vec3::new(-half_width, 0.0, south), Vec3::new(half_width, wall, south + thickness)),
            Aabb::new(Vec3::new(-half_width, 0.0, north - thickness), Vec3::new(half_width, wall, north)),
        ]);

        level.props = [-4.0, 2.0, 6.0]
            .into_iter()
            .map(|x| PropSpec {
                center: Vec3::new(x, floor + 1.0, 4.0),
                size: default_prop_size(),
                gravity_direction: default_prop_gravity(),
            })
            .collect();
        level.prop_bounds = Some(Aabb::new(
            Vec3::new(-half_width, 0.0, north),
            Vec3::new(half_width, wall, south),
        ));

        level.goal = Some(Aabb::from_center_size(
            Vec3::new(0.0, floor + 2.0, north + 2.0),
            Vec3::new(3.0, 4.0, 0.2),
        ));

        level
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use skyline_physics::ControlMode;

    #[test]
    fn test_builtins_are_valid() {
        for name in LevelDefinition::builtin_names() {
            let level = LevelDefinition::by_name(name).expect("builtin exists");
            assert_eq!(level.name, *name);
            level.validate().expect("builtin validates");
        }
        assert!(LevelDefinition::by_name("nowhere").is_none());
    }

    #[test]
    fn test_builtin_spawns_are_clear() {
        for name in LevelDefinition::builtin_names() {
            let level = LevelDefinition::by_name(name).unwrap();
            let actor = Aabb::from_center_half_extents(level.spawn, level.movement.half_extents);
            for (bounds, _) in level.static_geometry() {
                assert!(!bounds.intersects(&actor), "{} spawn overlaps {:?}", name, bounds);
            }
        }
    }

    #[test]
    fn test_variants() {
        assert_eq!(LevelDefinition::drive().movement.mode, ControlMode::Vehicle);
        assert_eq!(LevelDefinition::drive().camera_mode, CameraMode::Chase);
        assert!(LevelDefinition::rooftops().movement.allow_free_fly);
        assert_eq!(LevelDefinition::warehouse().rebuild_policy, RebuildPolicy::EveryTick);
        assert_eq!(LevelDefinition::warehouse().props.len(), 3);
    }

    #[test]
    fn test_static_geometry_is_shrunk() {
        let mut level = LevelDefinition::new("test", Vec3::new(0.0, 0.5, 0.0));
        level.static_boxes.push(Aabb::new(Vec3::ZERO, Vec3::splat(2.0)));

        let (bounds, kind) = level.static_geometry().next().unwrap();
        assert_eq!(kind, GeometryKind::Static);
        assert!((bounds.min.x - 0.05).abs() < 1e-6);
        assert!((bounds.max.y - 1.95).abs() < 1e-6);
    }

    #[test]
    fn test_goal_volume_has_tolerance() {
        let level = LevelDefinition::warehouse();
        let goal = level.goal.unwrap();
        let volume = level.goal_volume().unwrap();
        assert!((volume.size().z - (goal.size().z + 0.2)).abs() < 1e-5);
    }

    #[test]
    fn test_parse_minimal_level() {
        let toml = r#"
            name = "tiny"
            spawn = [0.0, 0.5, 0.0]

            [[static_boxes]]
            min = [-1.0, 1.0, -1.0]
            max = [1.0, 2.0, 1.0]
        "#;

        let level = LevelDefinition::from_toml_str(toml).unwrap();
        assert_eq!(level.name, "tiny");
        assert_eq!(level.static_boxes.len(), 1);
        assert_eq!(level.collision_tolerance, 0.05);
        assert_eq!(level.rebuild_policy, RebuildPolicy::OnDemand);
        assert_eq!(level.movement, MovementConfig::walking());
    }

    #[test]
    fn test_parse_normalizes_boxes() {
        let toml = r#"
            name = "flipped"
            spawn = [0.0, 0.5, 0.0]

            [[static_boxes]]
            min = [1.0, 2.0, 1.0]
            max = [-1.0, 1.0, -1.0]
        "#;

        let level = LevelDefinition::from_toml_str(toml).unwrap();
        assert_eq!(level.static_boxes[0].min, Vec3::new(-1.0, 1.0, -1.0));
    }

    #[test]
    fn test_rejects_empty_name() {
        let toml = r#"
            name = "  "
            spawn = [0.0, 0.5, 0.0]
        "#;
        assert!(matches!(
            LevelDefinition::from_toml_str(toml),
            Err(LevelError::Invalid { .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut level = LevelDefinition::hub();
        level.spawn.x = f32::NAN;
        assert!(matches!(level.validate(), Err(LevelError::Invalid { .. })));

        let mut level = LevelDefinition::warehouse();
        level.props[0].size = 0.0;
        assert!(level.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_movement() {
        let toml = r#"
            name = "reverse"
            spawn = [0.0, 0.5, 0.0]

            [movement]
            mode = "vehicle"
            max_speed = -1.0
        "#;
        assert!(matches!(
            LevelDefinition::from_toml_str(toml),
            Err(LevelError::Invalid { .. })
        ));

        let toml = r#"
            name = "floaty"
            spawn = [0.0, 0.5, 0.0]

            [movement]
            gravity = nan
        "#;
        match LevelDefinition::from_toml_str(toml) {
            Err(LevelError::Invalid { reason, .. }) => assert_eq!(reason, "movement.gravity is not finite"),
            other => panic!("expected invalid level, got {:?}", other),
        }

        let mut level = LevelDefinition::drive();
        level.movement.speed_decay = 2.0;
        assert!(level.validate().is_err());
    }

    #[test]
    fn test_sample_level_file_loads() {
        let level = LevelDefinition::from_toml_str(include_str!("../../../levels/courtyard.toml")).unwrap();
        assert_eq!(level.name, "courtyard");
        assert_eq!(level.static_boxes.len(), 7);
        assert_eq!(level.checkpoints.len(), 2);
        assert!(level.goal.is_some());
        assert!((level.movement.step_up_height - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_toml_roundtrip_of_builtin() {
        let level = LevelDefinition::drive();
        let text = level.to_toml_string().unwrap();
        let parsed = LevelDefinition::from_toml_str(&text).unwrap();
        assert_eq!(parsed.checkpoints.len(), 3);
        assert_eq!(parsed.movement.mode, ControlMode::Vehicle);
    }
}

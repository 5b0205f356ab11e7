//! Geometry tagging.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What a registered box is, for the purpose of collision filtering.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometryKind {
    /// Fixed level geometry: walls, floors, buildings.
    #[default]
    Static,
    /// A prop that can be dragged around and settles along `gravity_direction`.
    /// A zero direction means the prop stays where it is released.
    Movable { gravity_direction: Vec3 },
    /// Non-solid volume used for overlap tests only.
    Trigger,
}

impl GeometryKind {
    /// Whether this kind blocks actor movement and camera rays.
    #[inline]
    pub fn is_solid(&self) -> bool {
        matches!(self, Self::Static | Self::Movable { .. })
    }

    #[inline]
    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solidity() {
        assert!(GeometryKind::Static.is_solid());
        assert!(GeometryKind::Movable {
            gravity_direction: Vec3::NEG_Y
        }
        .is_solid());
        assert!(!GeometryKind::Trigger.is_solid());
        assert!(GeometryKind::Trigger.is_trigger());
    }
}

//! Collaborator seams of a level session.
//!
//! The session owns the simulation. Everything outside it (scene geometry a
//! renderer owns, the actor's visual, level teardown) plugs in here.

use glam::Vec3;
use skyline_physics::{Aabb, GeometryKind, MovementPhase};

/// Extra collision geometry owned outside the level definition.
pub trait GeometrySource {
    /// Append this source's boxes. Called on every collision rebuild.
    fn append_geometry(&self, out: &mut Vec<(Aabb, GeometryKind)>);
}

impl GeometrySource for Vec<Aabb> {
    fn append_geometry(&self, out: &mut Vec<(Aabb, GeometryKind)>) {
        out.extend(self.iter().map(|b| (*b, GeometryKind::Static)));
    }
}

/// Pose handed to an [`ActorPresenter`] once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorPose {
    pub position: Vec3,
    pub facing: f32,
    pub phase: MovementPhase,
}

/// Places the actor's visual.
pub trait ActorPresenter {
    fn present(&mut self, pose: &ActorPose);
}

/// Invoked once when the level is completed.
pub type CompletionCallback = Box<dyn FnMut()>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_list_is_static_geometry() {
        let boxes = vec![Aabb::new(Vec3::ZERO, Vec3::ONE)];
        let mut out = Vec::new();
        boxes.append_geometry(&mut out);
        assert_eq!(out, vec![(Aabb::new(Vec3::ZERO, Vec3::ONE), GeometryKind::Static)]);
    }
}

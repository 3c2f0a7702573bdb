use super::draw::StrokeSession;
use super::measure::MeasureSession;
use crate::engine::commands::Animation;
use crate::engine::geometry::WorldPoint;
use crate::engine::scene_graph::{NodeHandle, SceneGraph};

/// What gestures currently act on. One variant per interaction so every
/// operation spells out what it means for each target.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ManipulationTarget {
    #[default]
    None,
    Model(NodeHandle),
    VideoPlane(NodeHandle),
    Measurement(MeasureSession),
    Stroke(StrokeSession),
}

impl ManipulationTarget {
    /// Placed node the target moves, if it is one.
    pub fn node(&self) -> Option<NodeHandle> {
        match self {
            Self::Model(handle) | Self::VideoPlane(handle) => Some(*handle),
            Self::None | Self::Measurement(_) | Self::Stroke(_) => None,
        }
    }

    pub fn move_to(&self, graph: &mut SceneGraph, point: WorldPoint) -> bool {
        match self {
            Self::Model(handle) | Self::VideoPlane(handle) => graph.move_to(*handle, point, None),
            Self::None | Self::Measurement(_) | Self::Stroke(_) => false,
        }
    }

    pub fn apply_scale(&self, graph: &mut SceneGraph, multiplier: f32) -> bool {
        match self {
            Self::Model(handle) | Self::VideoPlane(handle) => graph.apply_scale(*handle, multiplier),
            Self::None | Self::Measurement(_) | Self::Stroke(_) => false,
        }
    }

    /// Only models turn; a video plane keeps facing the way it was placed.
    pub fn apply_yaw(&self, graph: &mut SceneGraph, radians: f32, animation: Option<Animation>) -> bool {
        match self {
            Self::Model(handle) => graph.apply_yaw(*handle, radians, animation),
            Self::VideoPlane(_) | Self::None | Self::Measurement(_) | Self::Stroke(_) => false,
        }
    }
}

/// Transient per-mode state. Reset on mode entry, exit and explicit clear.
#[derive(Debug, Default)]
pub struct ManipulationSession {
    target: ManipulationTarget,
}

impl ManipulationSession {
    pub fn target(&self) -> &ManipulationTarget {
        &self.target
    }

    pub fn set_target(&mut self, target: ManipulationTarget) {
        self.target = target;
    }

    /// Hand back the current target, leaving `None`.
    pub fn take(&mut self) -> ManipulationTarget {
        std::mem::take(&mut self.target)
    }

    pub fn reset(&mut self) {
        self.target = ManipulationTarget::None;
    }

    pub fn measurement(&self) -> Option<&MeasureSession> {
        match &self.target {
            ManipulationTarget::Measurement(session) => Some(session),
            _ => None,
        }
    }

    pub fn measurement_mut(&mut self) -> Option<&mut MeasureSession> {
        match &mut self.target {
            ManipulationTarget::Measurement(session) => Some(session),
            _ => None,
        }
    }

    pub fn stroke_mut(&mut self) -> Option<&mut StrokeSession> {
        match &mut self.target {
            ManipulationTarget::Stroke(stroke) => Some(stroke),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene_graph::{Geometry, NodeKind, NodeTemplate};
    use bevy::prelude::*;

    fn graph_with(kind: NodeKind) -> (SceneGraph, NodeHandle) {
        let mut graph = SceneGraph::new();
        let handle = graph.spawn(NodeTemplate::new(kind, Geometry::Sphere { radius: 0.1 }));
        graph.drain_commands();
        (graph, handle)
    }

    #[test]
    fn no_target_ignores_manipulation() {
        let (mut graph, _) = graph_with(NodeKind::Model);
        let target = ManipulationTarget::None;
        assert!(!target.move_to(&mut graph, Vec3::ONE));
        assert!(!target.apply_scale(&mut graph, 1.1));
        assert!(!target.apply_yaw(&mut graph, 0.2, None));
        assert!(graph.drain_commands().is_empty());
    }

    #[test]
    fn model_moves_scales_and_turns() {
        let (mut graph, handle) = graph_with(NodeKind::Model);
        let target = ManipulationTarget::Model(handle);
        assert!(target.move_to(&mut graph, Vec3::X));
        assert!(target.apply_scale(&mut graph, 1.2));
        assert!(target.apply_yaw(&mut graph, 0.2, Animation::over(0.1)));
        assert_eq!(graph.drain_commands().len(), 3);
    }

    #[test]
    fn video_plane_does_not_turn() {
        let (mut graph, handle) = graph_with(NodeKind::VideoPlane);
        let target = ManipulationTarget::VideoPlane(handle);
        assert!(target.apply_scale(&mut graph, 0.9));
        assert!(!target.apply_yaw(&mut graph, 0.2, None));
    }

    #[test]
    fn removed_target_is_a_silent_no_op() {
        let (mut graph, handle) = graph_with(NodeKind::Model);
        graph.clear_all();
        graph.drain_commands();
        let target = ManipulationTarget::Model(handle);
        assert!(!target.apply_scale(&mut graph, 1.1));
        assert!(graph.drain_commands().is_empty());
    }

    #[test]
    fn session_take_leaves_none() {
        let mut session = ManipulationSession::default();
        session.set_target(ManipulationTarget::Model(NodeHandle(3)));
        assert_eq!(session.take(), ManipulationTarget::Model(NodeHandle(3)));
        assert_eq!(session.target(), &ManipulationTarget::None);
    }
}

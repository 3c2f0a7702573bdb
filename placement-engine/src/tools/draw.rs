use crate::config::StrokeConfig;
use crate::engine::geometry::{WorldPoint, connector_geometry, distance};
use crate::engine::scene_graph::{Geometry, NodeKind, NodeTemplate, SceneGraph};
use bevy::prelude::*;
use constants::render_settings::{STROKE_POINT_COLOUR, STROKE_SEGMENT_COLOUR};

/// Tag carried by every stroke point and segment.
pub const STROKE_TAG: &str = "drawn";

/// Points closer than this to the previous one are not captured.
const MIN_POINT_SPACING: f32 = 1e-4;

/// Ordered points of the stroke being drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeSession {
    points: Vec<WorldPoint>,
}

impl StrokeSession {
    /// Start a stroke, wiping earlier drawings.
    pub fn begin(graph: &mut SceneGraph) -> Self {
        let removed = clear(graph);
        if removed > 0 {
            debug!("Cleared {} stroke nodes", removed);
        }
        Self::default()
    }

    pub fn points(&self) -> &[WorldPoint] {
        &self.points
    }

    /// Capture `point`, joining it to the previous one. Returns false when
    /// the point was too close to be worth keeping.
    pub fn extend(&mut self, graph: &mut SceneGraph, style: &StrokeConfig, point: WorldPoint) -> bool {
        let previous = self.points.last().copied();
        if previous.is_some_and(|p| distance(p, point) < MIN_POINT_SPACING) {
            return false;
        }

        graph.spawn(
            NodeTemplate::new(
                NodeKind::StrokePoint,
                Geometry::Sphere {
                    radius: style.point_radius,
                },
            )
            .with_transform(Transform::from_translation(point))
            .with_colour(STROKE_POINT_COLOUR)
            .with_tag(STROKE_TAG),
        );

        if let Some(previous) = previous {
            let connector = connector_geometry(previous, point, style.segment_thickness);
            graph.spawn(
                NodeTemplate::new(
                    NodeKind::StrokeSegment,
                    Geometry::Cylinder {
                        radius: connector.thickness,
                        height: connector.length,
                    },
                )
                .with_transform(Transform::from_translation(connector.position).with_rotation(connector.orientation))
                .with_colour(STROKE_SEGMENT_COLOUR)
                .with_tag(STROKE_TAG),
            );
        }

        self.points.push(point);
        true
    }
}

pub fn clear(graph: &mut SceneGraph) -> usize {
    graph.clear_by_tag(STROKE_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_are_joined_by_segments() {
        let mut graph = SceneGraph::new();
        let style = StrokeConfig::default();
        let mut stroke = StrokeSession::begin(&mut graph);
        stroke.extend(&mut graph, &style, Vec3::ZERO);
        stroke.extend(&mut graph, &style, Vec3::new(0.1, 0.0, 0.0));
        stroke.extend(&mut graph, &style, Vec3::new(0.1, 0.1, 0.0));

        assert_eq!(stroke.points().len(), 3);
        assert_eq!(graph.count_kind(NodeKind::StrokePoint), 3);
        assert_eq!(graph.count_kind(NodeKind::StrokeSegment), 2);
        assert!(graph.iter().all(|n| n.has_tag(STROKE_TAG)));
    }

    #[test]
    fn repeated_point_is_skipped() {
        let mut graph = SceneGraph::new();
        let style = StrokeConfig::default();
        let mut stroke = StrokeSession::begin(&mut graph);
        assert!(stroke.extend(&mut graph, &style, Vec3::ONE));
        assert!(!stroke.extend(&mut graph, &style, Vec3::ONE));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn new_stroke_clears_previous_drawing() {
        let mut graph = SceneGraph::new();
        let style = StrokeConfig::default();
        let mut stroke = StrokeSession::begin(&mut graph);
        stroke.extend(&mut graph, &style, Vec3::ZERO);
        stroke.extend(&mut graph, &style, Vec3::X);

        let fresh = StrokeSession::begin(&mut graph);
        assert!(fresh.points().is_empty());
        assert!(graph.is_empty());
    }
}

use crate::config::MeasureConfig;
use crate::engine::geometry::{WorldPoint, connector_geometry, distance};
use crate::engine::scene_graph::{Geometry, NodeHandle, NodeKind, NodeTemplate, SceneGraph};
use bevy::prelude::*;
use constants::render_settings::MEASURE_COLOUR;
use serde::{Deserialize, Serialize};

/// Tag carried by every marker and line of the current measurement.
pub const MEASUREMENT_TAG: &str = "measurement";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureState {
    #[default]
    Idle,
    Measuring,
}

/// A completed measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub start: WorldPoint,
    pub end: WorldPoint,
    pub distance: f32,
}

/// In-progress measurement: start fixed, end follows the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureSession {
    pub start: WorldPoint,
    /// Last end point that hit a surface; equals `start` until one does.
    pub last_end: WorldPoint,
    /// Screen position the sampler re-casts from.
    pub pointer: Vec2,
    start_marker: NodeHandle,
    line: Option<NodeHandle>,
}

impl MeasureSession {
    /// Clear any previous measurement and drop the start marker at `start`.
    pub fn begin(graph: &mut SceneGraph, style: &MeasureConfig, start: WorldPoint, pointer: Vec2) -> Self {
        clear(graph);
        let start_marker = graph.spawn(marker(style, start));
        Self {
            start,
            last_end: start,
            pointer,
            start_marker,
            line: None,
        }
    }

    pub fn distance(&self) -> f32 {
        distance(self.start, self.last_end)
    }

    pub fn start_marker(&self) -> NodeHandle {
        self.start_marker
    }

    /// Record a new end point and stretch the line to it. Returns the distance.
    pub fn sample(&mut self, graph: &mut SceneGraph, style: &MeasureConfig, end: WorldPoint) -> f32 {
        self.last_end = end;
        let connector = connector_geometry(self.start, end, style.line_thickness);
        let geometry = Geometry::Cylinder {
            radius: connector.thickness,
            height: connector.length,
        };
        let transform = Transform::from_translation(connector.position).with_rotation(connector.orientation);

        match self.line {
            Some(line) if graph.contains(line) => {
                graph.set_geometry(line, geometry);
                graph.set_transform(line, transform, None);
            }
            _ => {
                self.line = Some(
                    graph.spawn(
                        NodeTemplate::new(NodeKind::MeasurementLine, geometry)
                            .with_transform(transform)
                            .with_colour(MEASURE_COLOUR)
                            .with_tag(MEASUREMENT_TAG),
                    ),
                );
            }
        }
        self.distance()
    }

    /// Drop the end marker at the last sampled point. Markers and line stay
    /// until cleared.
    pub fn finish(self, graph: &mut SceneGraph, style: &MeasureConfig) -> Measurement {
        graph.spawn(marker(style, self.last_end));
        Measurement {
            start: self.start,
            end: self.last_end,
            distance: self.distance(),
        }
    }
}

fn marker(style: &MeasureConfig, at: WorldPoint) -> NodeTemplate {
    NodeTemplate::new(
        NodeKind::MeasurementMarker,
        Geometry::Sphere {
            radius: style.marker_radius,
        },
    )
    .with_transform(Transform::from_translation(at))
    .with_colour(MEASURE_COLOUR)
    .with_tag(MEASUREMENT_TAG)
}

/// Remove markers and line in one go. Returns how many nodes went.
pub fn clear(graph: &mut SceneGraph) -> usize {
    graph.clear_by_tag(MEASUREMENT_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> MeasureConfig {
        MeasureConfig::default()
    }

    #[test]
    fn begin_places_only_the_start_marker() {
        let mut graph = SceneGraph::new();
        let session = MeasureSession::begin(&mut graph, &style(), Vec3::ZERO, Vec2::ZERO);
        assert_eq!(graph.count_kind(NodeKind::MeasurementMarker), 1);
        assert_eq!(graph.count_kind(NodeKind::MeasurementLine), 0);
        assert_eq!(session.distance(), 0.0);
    }

    #[test]
    fn sampling_reuses_one_line() {
        let mut graph = SceneGraph::new();
        let mut session = MeasureSession::begin(&mut graph, &style(), Vec3::ZERO, Vec2::ZERO);
        session.sample(&mut graph, &style(), Vec3::new(0.1, 0.0, 0.0));
        let d = session.sample(&mut graph, &style(), Vec3::new(0.3, 0.0, 0.0));

        assert!((d - 0.3).abs() < 1e-6);
        assert_eq!(graph.count_kind(NodeKind::MeasurementLine), 1);
        let line = graph.iter().find(|n| n.kind == NodeKind::MeasurementLine).unwrap();
        assert!(line.transform.translation.abs_diff_eq(Vec3::new(0.15, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn finish_adds_end_marker_and_keeps_line() {
        let mut graph = SceneGraph::new();
        let mut session = MeasureSession::begin(&mut graph, &style(), Vec3::ZERO, Vec2::ZERO);
        session.sample(&mut graph, &style(), Vec3::new(0.0, 0.0, 0.2));
        let done = session.finish(&mut graph, &style());

        assert_eq!(done.end, Vec3::new(0.0, 0.0, 0.2));
        assert_eq!(graph.count_kind(NodeKind::MeasurementMarker), 2);
        assert_eq!(graph.count_kind(NodeKind::MeasurementLine), 1);
    }

    #[test]
    fn new_measurement_replaces_old_one() {
        let mut graph = SceneGraph::new();
        let mut first = MeasureSession::begin(&mut graph, &style(), Vec3::ZERO, Vec2::ZERO);
        first.sample(&mut graph, &style(), Vec3::X);
        first.finish(&mut graph, &style());

        MeasureSession::begin(&mut graph, &style(), Vec3::Z, Vec2::ZERO);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn clear_removes_everything_at_once() {
        let mut graph = SceneGraph::new();
        let mut session = MeasureSession::begin(&mut graph, &style(), Vec3::ZERO, Vec2::ZERO);
        session.sample(&mut graph, &style(), Vec3::X);
        session.finish(&mut graph, &style());

        assert_eq!(clear(&mut graph), 3);
        assert_eq!(clear(&mut graph), 0);
        assert!(graph.is_empty());
    }
}

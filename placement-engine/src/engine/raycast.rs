use super::anchors::{Anchor, AnchorKind, AnchorTable, PlaneAlignment};
use super::geometry::WorldPoint;
use super::ray::{ray_hits_obb, ray_plane_hit_t};
use super::scene_graph::{NodeHandle, NodeKind, SceneGraph};
use super::session::TrackingSession;
use bevy::math::Ray3d;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// What a screen-space query is allowed to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTestTarget {
    /// Detected planes, bounded by their extent.
    ExistingSurface,
    /// Reconstructed feature points; reaches off-plane geometry.
    FeaturePoints,
    /// Nodes already placed in the scene graph.
    ExistingNode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentFilter {
    #[default]
    Any,
    Horizontal,
    Vertical,
}

impl AlignmentFilter {
    pub fn accepts(self, alignment: PlaneAlignment) -> bool {
        match self {
            Self::Any => true,
            Self::Horizontal => alignment == PlaneAlignment::Horizontal,
            Self::Vertical => alignment == PlaneAlignment::Vertical,
        }
    }
}

/// One intersection, nearest first in query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub world_point: WorldPoint,
    /// Plane the point lies on, for surface hits.
    pub anchor: Option<Anchor>,
    /// Node the ray struck, for node hits.
    pub hit_node: Option<NodeHandle>,
    /// Distance from the camera along the ray.
    pub distance: f32,
}

/// Turns pointer positions into world points using the tracker's current frame.
#[derive(Debug, Clone, Copy)]
pub struct RaycastAdapter {
    feature_point_tolerance: f32,
}

impl RaycastAdapter {
    pub fn new(feature_point_tolerance: f32) -> Self {
        Self {
            feature_point_tolerance,
        }
    }

    /// All hits along the ray through `screen_point`, nearest first. Empty when
    /// the tracker has no frame yet or nothing intersects.
    pub fn query<S: TrackingSession + ?Sized>(
        &self,
        session: &S,
        anchors: &AnchorTable,
        graph: &SceneGraph,
        screen_point: Vec2,
        target: HitTestTarget,
        alignment: AlignmentFilter,
    ) -> Vec<Hit> {
        let Some(frame) = session.current_frame() else {
            return Vec::new();
        };
        let Some(camera) = frame.camera else {
            return Vec::new();
        };
        let Some(ray) = camera.viewport_to_world(screen_point) else {
            return Vec::new();
        };

        let mut hits = match target {
            HitTestTarget::ExistingSurface => surface_hits(&ray, anchors, alignment),
            HitTestTarget::FeaturePoints => {
                feature_point_hits(&ray, &frame.feature_points, self.feature_point_tolerance)
            }
            HitTestTarget::ExistingNode => node_hits(&ray, graph),
        };
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Nearest hit only; every caller works off the first result.
    pub fn first<S: TrackingSession + ?Sized>(
        &self,
        session: &S,
        anchors: &AnchorTable,
        graph: &SceneGraph,
        screen_point: Vec2,
        target: HitTestTarget,
        alignment: AlignmentFilter,
    ) -> Option<Hit> {
        self.query(session, anchors, graph, screen_point, target, alignment)
            .into_iter()
            .next()
    }
}

fn surface_hits(ray: &Ray3d, anchors: &AnchorTable, alignment: AlignmentFilter) -> Vec<Hit> {
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    anchors
        .planes()
        .filter_map(|anchor| {
            let AnchorKind::Plane {
                center,
                extent,
                alignment: plane_alignment,
            } = anchor.kind
            else {
                return None;
            };
            if !alignment.accepts(plane_alignment) {
                return None;
            }

            let normal = anchor.transform.rotation * Vec3::Y;
            let t = ray_plane_hit_t(origin, dir, anchor.transform.translation, normal)?;
            let world = origin + dir * t;

            // Extent check happens in the plane's own frame.
            let local = anchor.transform.compute_matrix().inverse().transform_point3(world);
            let inside = (local.x - center.x).abs() <= extent.x * 0.5
                && (local.z - center.z).abs() <= extent.y * 0.5;
            inside.then(|| Hit {
                world_point: world,
                anchor: Some(anchor.clone()),
                hit_node: None,
                distance: t,
            })
        })
        .collect()
}

fn feature_point_hits(ray: &Ray3d, points: &[Vec3], tolerance: f32) -> Vec<Hit> {
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    points
        .iter()
        .filter_map(|&point| {
            let depth = (point - origin).dot(dir);
            if depth <= 0.0 {
                return None;
            }
            let off_ray = (point - (origin + dir * depth)).length();
            (off_ray <= tolerance * depth).then_some(Hit {
                world_point: point,
                anchor: None,
                hit_node: None,
                distance: depth,
            })
        })
        .collect()
}

fn node_hits(ray: &Ray3d, graph: &SceneGraph) -> Vec<Hit> {
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    graph
        .iter()
        .filter(|node| {
            !matches!(
                node.kind,
                NodeKind::PlaneOverlay | NodeKind::ImageOverlay | NodeKind::FaceOverlay
            )
        })
        .filter_map(|node| {
            let t = ray_hits_obb(origin, dir, &node.transform, node.geometry.bounds())?;
            Some(Hit {
                world_point: origin + dir * t,
                anchor: None,
                hit_node: Some(node.handle),
                distance: t,
            })
        })
        .collect()
}

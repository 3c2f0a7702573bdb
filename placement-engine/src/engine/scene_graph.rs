use super::anchors::{Anchor, AnchorId, AnchorKind};
use super::commands::{Animation, RenderQueue, SceneCommand};
use super::geometry::{WorldPoint, connector_geometry};
use crate::config::OverlayConfig;
use crate::error::EngineError;
use bevy::prelude::*;
use constants::render_settings::{
    DEFAULT_COLOUR, FACE_OVERLAY_COLOUR, IMAGE_CONNECTOR_COLOUR, PLANE_OVERLAY_COLOUR,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::f32::consts::FRAC_PI_2;

/// Thinnest extent used for hit-testing flat geometry.
const MIN_BOUNDS: f32 = 0.001;

/// Stable identity of a placed node. Never reused within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Model,
    VideoPlane,
    MeasurementMarker,
    MeasurementLine,
    StrokePoint,
    StrokeSegment,
    GrownObject,
    PlaneOverlay,
    ImageOverlay,
    FaceOverlay,
}

impl NodeKind {
    /// Kinds limited to a single interactive instance.
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Model | Self::VideoPlane)
    }
}

/// Abstract shape description; the renderer owns meshes and materials.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Flat rectangle in local XY.
    Plane { width: f32, height: f32 },
    /// Axis along local Y.
    Cylinder { radius: f32, height: f32 },
    Sphere { radius: f32 },
    Cone { top_radius: f32, bottom_radius: f32, height: f32 },
    ImportedMesh { asset: String, bounds: Vec3 },
    /// Rendered text on a flat rectangle in local XY.
    Label { text: String, width: f32, height: f32 },
    FaceMesh { vertices: Vec<Vec3>, indices: Vec<u32> },
    Compound(Vec<GeometryPart>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryPart {
    pub offset: Transform,
    pub geometry: Geometry,
    pub colour: [f32; 4],
}

impl Geometry {
    /// Size of the local box centred on the node origin that contains the shape.
    pub fn bounds(&self) -> Vec3 {
        let size = match self {
            Self::Plane { width, height } | Self::Label { width, height, .. } => {
                Vec3::new(*width, *height, 0.0)
            }
            Self::Cylinder { radius, height } => Vec3::new(radius * 2.0, *height, radius * 2.0),
            Self::Sphere { radius } => Vec3::splat(radius * 2.0),
            Self::Cone {
                top_radius,
                bottom_radius,
                height,
            } => {
                let r = top_radius.max(*bottom_radius);
                Vec3::new(r * 2.0, *height, r * 2.0)
            }
            Self::ImportedMesh { bounds, .. } => *bounds,
            Self::FaceMesh { vertices, .. } => {
                vertices.iter().fold(Vec3::ZERO, |acc, v| acc.max(v.abs())) * 2.0
            }
            Self::Compound(parts) => parts.iter().fold(Vec3::ZERO, |acc, part| {
                let half = part.geometry.bounds() * 0.5 * part.offset.scale.abs();
                let reach = part.offset.translation.abs() + half;
                acc.max(reach * 2.0)
            }),
        };
        size.max(Vec3::splat(MIN_BOUNDS))
    }
}

/// Everything needed to create a node except its handle.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTemplate {
    pub kind: NodeKind,
    pub transform: Transform,
    pub geometry: Geometry,
    pub colour: [f32; 4],
    pub tag: Option<String>,
    pub anchor: Option<AnchorId>,
}

impl NodeTemplate {
    pub fn new(kind: NodeKind, geometry: Geometry) -> Self {
        Self {
            kind,
            transform: Transform::IDENTITY,
            geometry,
            colour: DEFAULT_COLOUR,
            tag: None,
            anchor: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_colour(mut self, colour: [f32; 4]) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn owned_by(mut self, anchor: AnchorId) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub handle: NodeHandle,
    pub kind: NodeKind,
    pub transform: Transform,
    pub geometry: Geometry,
    pub colour: [f32; 4],
    pub tag: Option<String>,
    pub anchor: Option<AnchorId>,
}

impl PlacedNode {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.as_deref() == Some(tag)
    }
}

/// Outcome of `place_or_relocate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Created(NodeHandle),
    Relocated(NodeHandle),
}

impl Placement {
    pub fn handle(self) -> NodeHandle {
        match self {
            Self::Created(h) | Self::Relocated(h) => h,
        }
    }
}

/// Sole owner of placed nodes. Every mutation is mirrored as a
/// `SceneCommand`; mutations on handles that no longer exist are ignored.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeHandle, PlacedNode>,
    primary: HashMap<NodeKind, NodeHandle>,
    overlays: HashMap<AnchorId, Vec<NodeHandle>>,
    next_handle: u64,
    queue: RenderQueue,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, template: NodeTemplate) -> NodeHandle {
        let handle = NodeHandle(self.next_handle);
        self.next_handle += 1;

        self.queue.push(SceneCommand::AddNode {
            handle,
            kind: template.kind,
            transform: template.transform,
            geometry: template.geometry.clone(),
            colour: template.colour,
        });
        if template.kind.is_primary() {
            self.primary.insert(template.kind, handle);
        }
        if let Some(anchor) = template.anchor {
            self.overlays.entry(anchor).or_default().push(handle);
        }
        self.nodes.insert(
            handle,
            PlacedNode {
                handle,
                kind: template.kind,
                transform: template.transform,
                geometry: template.geometry,
                colour: template.colour,
                tag: template.tag,
                anchor: template.anchor,
            },
        );
        handle
    }

    /// Create the primary node of `kind` at `point`, or move the existing one
    /// there. `template` only runs when a node has to be created, so a failing
    /// asset lookup leaves the graph untouched.
    pub fn place_or_relocate(
        &mut self,
        kind: NodeKind,
        point: WorldPoint,
        relocate: Option<Animation>,
        template: impl FnOnce() -> Result<NodeTemplate, EngineError>,
    ) -> Result<Placement, EngineError> {
        if let Some(handle) = self.primary(kind) {
            self.move_to(handle, point, relocate);
            return Ok(Placement::Relocated(handle));
        }

        let mut template = template()?;
        template.kind = kind;
        template.transform.translation = point;
        Ok(Placement::Created(self.spawn(template)))
    }

    pub fn primary(&self, kind: NodeKind) -> Option<NodeHandle> {
        self.primary.get(&kind).copied()
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&PlacedNode> {
        self.nodes.get(&handle)
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedNode> {
        self.nodes.values()
    }

    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.values().filter(|n| n.kind == kind).count()
    }

    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a PlacedNode> + 'a {
        self.nodes.values().filter(move |n| n.has_tag(tag))
    }

    /// Overlay nodes owned by `anchor`.
    pub fn overlays_for(&self, anchor: AnchorId) -> &[NodeHandle] {
        self.overlays.get(&anchor).map(Vec::as_slice).unwrap_or(&[])
    }

    fn update_transform(
        &mut self,
        handle: NodeHandle,
        animation: Option<Animation>,
        f: impl FnOnce(&mut Transform),
    ) -> bool {
        let Some(node) = self.nodes.get_mut(&handle) else {
            return false;
        };
        f(&mut node.transform);
        self.queue.push(SceneCommand::UpdateTransform {
            handle,
            transform: node.transform,
            animation,
        });
        true
    }

    pub fn set_transform(&mut self, handle: NodeHandle, transform: Transform, animation: Option<Animation>) -> bool {
        self.update_transform(handle, animation, |t| *t = transform)
    }

    pub fn move_to(&mut self, handle: NodeHandle, point: WorldPoint, animation: Option<Animation>) -> bool {
        self.update_transform(handle, animation, |t| t.translation = point)
    }

    /// Multiply the node's scale uniformly.
    pub fn apply_scale(&mut self, handle: NodeHandle, multiplier: f32) -> bool {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return false;
        }
        self.update_transform(handle, None, |t| t.scale *= multiplier)
    }

    /// Rotate around the world vertical axis.
    pub fn apply_yaw(&mut self, handle: NodeHandle, delta_radians: f32, animation: Option<Animation>) -> bool {
        if !delta_radians.is_finite() {
            return false;
        }
        self.update_transform(handle, animation, |t| t.rotate_y(delta_radians))
    }

    pub fn set_geometry(&mut self, handle: NodeHandle, geometry: Geometry) -> bool {
        let Some(node) = self.nodes.get_mut(&handle) else {
            return false;
        };
        node.geometry = geometry.clone();
        self.queue.push(SceneCommand::UpdateGeometry { handle, geometry });
        true
    }

    pub fn set_playback(&mut self, handle: NodeHandle, playing: bool, restart: bool) -> bool {
        if !self.nodes.contains_key(&handle) {
            return false;
        }
        self.queue.push(SceneCommand::SetPlayback {
            handle,
            playing,
            restart,
        });
        true
    }

    pub fn remove(&mut self, handle: NodeHandle) -> bool {
        let Some(node) = self.nodes.remove(&handle) else {
            return false;
        };
        if self.primary.get(&node.kind) == Some(&handle) {
            self.primary.remove(&node.kind);
        }
        if let Some(anchor) = node.anchor {
            if let Some(owned) = self.overlays.get_mut(&anchor) {
                owned.retain(|h| *h != handle);
                if owned.is_empty() {
                    self.overlays.remove(&anchor);
                }
            }
        }
        self.queue.push(SceneCommand::RemoveNode { handle });
        true
    }

    /// Remove every node carrying `tag`. Idempotent; other tags are untouched.
    pub fn clear_by_tag(&mut self, tag: &str) -> usize {
        let doomed: Vec<NodeHandle> = self.tagged(tag).map(|n| n.handle).collect();
        for handle in &doomed {
            self.remove(*handle);
        }
        doomed.len()
    }

    /// Remove every overlay node; placed content stays.
    pub fn clear_overlays(&mut self) -> usize {
        let doomed: Vec<NodeHandle> = self.overlays.values().flatten().copied().collect();
        for handle in &doomed {
            self.remove(*handle);
        }
        self.overlays.clear();
        doomed.len()
    }

    pub fn clear_all(&mut self) {
        let doomed: Vec<NodeHandle> = self.nodes.keys().copied().collect();
        for handle in doomed {
            self.remove(handle);
        }
        self.primary.clear();
        self.overlays.clear();
    }

    pub fn drain_commands(&mut self) -> Vec<SceneCommand> {
        self.queue.drain()
    }

    pub fn pending_commands(&self) -> &[SceneCommand] {
        self.queue.pending()
    }

    pub fn on_anchor_added(&mut self, anchor: &Anchor, style: &OverlayConfig) {
        if !self.overlays_for(anchor.id).is_empty() {
            // Already seen; treat as an update.
            self.on_anchor_updated(anchor, style);
            return;
        }
        match &anchor.kind {
            AnchorKind::Plane { center, extent, .. } => {
                self.spawn(
                    NodeTemplate::new(NodeKind::PlaneOverlay, plane_overlay_geometry(*extent))
                        .with_transform(plane_overlay_transform(anchor, *center))
                        .with_colour(PLANE_OVERLAY_COLOUR)
                        .owned_by(anchor.id),
                );
            }
            AnchorKind::Image { name } => {
                let text = style.label_for(name);
                if text.is_empty() {
                    debug!("No label registered for detected image {}", name);
                }
                info!("Detected image: {}", name);
                self.spawn_image_overlay(anchor, text, style);
            }
            AnchorKind::Face { vertices, indices } => {
                self.spawn(
                    NodeTemplate::new(
                        NodeKind::FaceOverlay,
                        Geometry::FaceMesh {
                            vertices: vertices.clone(),
                            indices: indices.clone(),
                        },
                    )
                    .with_transform(anchor.transform)
                    .with_colour(FACE_OVERLAY_COLOUR)
                    .owned_by(anchor.id),
                );
            }
        }
    }

    pub fn on_anchor_updated(&mut self, anchor: &Anchor, style: &OverlayConfig) {
        let owned = self.overlays_for(anchor.id).to_vec();
        if owned.is_empty() {
            // Updates for anchors we never saw added: image overlays are
            // created on first sight, planes and faces need to exist too.
            self.on_anchor_added(anchor, style);
            return;
        }
        match &anchor.kind {
            AnchorKind::Plane { center, extent, .. } => {
                for handle in owned {
                    self.set_geometry(handle, plane_overlay_geometry(*extent));
                    self.set_transform(handle, plane_overlay_transform(anchor, *center), None);
                }
            }
            // Image overlays are static once created.
            AnchorKind::Image { .. } => {}
            AnchorKind::Face { vertices, indices } => {
                for handle in owned {
                    self.set_geometry(
                        handle,
                        Geometry::FaceMesh {
                            vertices: vertices.clone(),
                            indices: indices.clone(),
                        },
                    );
                    self.set_transform(handle, anchor.transform, None);
                }
            }
        }
    }

    pub fn on_anchor_removed(&mut self, anchor: AnchorId) -> usize {
        let Some(owned) = self.overlays.remove(&anchor) else {
            return 0;
        };
        for handle in &owned {
            self.remove(*handle);
        }
        owned.len()
    }

    fn spawn_image_overlay(&mut self, anchor: &Anchor, text: &str, style: &OverlayConfig) {
        let offset = Vec3::from_array(style.label_offset);
        // Label sits on its bottom edge at `offset`.
        let label_centre = offset + Vec3::Y * style.label_height * 0.5;
        self.spawn(
            NodeTemplate::new(
                NodeKind::ImageOverlay,
                Geometry::Label {
                    text: text.to_string(),
                    width: style.label_width,
                    height: style.label_height,
                },
            )
            .with_transform(anchor.transform.mul_transform(Transform::from_translation(label_centre)))
            .owned_by(anchor.id),
        );

        let connector = connector_geometry(
            anchor.to_world(Vec3::ZERO),
            anchor.to_world(offset),
            style.connector_thickness,
        );
        self.spawn(
            NodeTemplate::new(
                NodeKind::ImageOverlay,
                Geometry::Cylinder {
                    radius: connector.thickness,
                    height: connector.length,
                },
            )
            .with_transform(Transform::from_translation(connector.position).with_rotation(connector.orientation))
            .with_colour(IMAGE_CONNECTOR_COLOUR)
            .owned_by(anchor.id),
        );
    }
}

fn plane_overlay_geometry(extent: Vec2) -> Geometry {
    Geometry::Plane {
        width: extent.x,
        height: extent.y,
    }
}

/// Lay the XY overlay rectangle flat in the anchor's XZ plane at its centre.
fn plane_overlay_transform(anchor: &Anchor, center: Vec3) -> Transform {
    let local = Transform::from_xyz(center.x, 0.0, center.z).with_rotation(Quat::from_rotation_x(-FRAC_PI_2));
    anchor.transform.mul_transform(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::anchors::PlaneAlignment;

    fn marker(tag: &str) -> NodeTemplate {
        NodeTemplate::new(NodeKind::StrokePoint, Geometry::Sphere { radius: 0.002 }).with_tag(tag)
    }

    fn model_template() -> Result<NodeTemplate, EngineError> {
        Ok(NodeTemplate::new(
            NodeKind::Model,
            Geometry::ImportedMesh {
                asset: "car.usdz".into(),
                bounds: Vec3::ONE,
            },
        )
        .with_transform(Transform::from_scale(Vec3::splat(0.1))))
    }

    fn plane(id: u64) -> Anchor {
        Anchor::plane(id, Transform::IDENTITY, Vec3::ZERO, Vec2::new(1.0, 2.0), PlaneAlignment::Horizontal)
    }

    #[test]
    fn place_then_relocate_keeps_single_primary() {
        let mut graph = SceneGraph::new();
        let first = graph
            .place_or_relocate(NodeKind::Model, Vec3::new(1.0, 0.0, 0.0), None, model_template)
            .unwrap();
        let second = graph
            .place_or_relocate(NodeKind::Model, Vec3::new(2.0, 0.0, 0.0), Animation::over(0.1), model_template)
            .unwrap();

        assert!(matches!(first, Placement::Created(_)));
        assert_eq!(second, Placement::Relocated(first.handle()));
        assert_eq!(graph.count_kind(NodeKind::Model), 1);
        let node = graph.get(first.handle()).unwrap();
        assert_eq!(node.transform.translation, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(node.transform.scale, Vec3::splat(0.1));
    }

    #[test]
    fn failed_template_leaves_graph_untouched() {
        let mut graph = SceneGraph::new();
        let result = graph.place_or_relocate(NodeKind::Model, Vec3::ZERO, None, || {
            Err(EngineError::MissingResource("gone.usdz".into()))
        });
        assert!(result.is_err());
        assert!(graph.is_empty());
        assert!(graph.pending_commands().is_empty());
    }

    #[test]
    fn stale_handle_mutations_are_ignored() {
        let mut graph = SceneGraph::new();
        let h = graph.spawn(marker("drawn"));
        assert!(graph.remove(h));
        graph.drain_commands();

        assert!(!graph.apply_scale(h, 1.1));
        assert!(!graph.apply_yaw(h, 0.3, None));
        assert!(!graph.move_to(h, Vec3::ONE, None));
        assert!(!graph.remove(h));
        assert!(graph.drain_commands().is_empty());
    }

    #[test]
    fn clear_by_tag_is_idempotent_and_scoped() {
        let mut graph = SceneGraph::new();
        graph.spawn(marker("drawn"));
        graph.spawn(marker("drawn"));
        let keep = graph.spawn(marker("measurement"));

        assert_eq!(graph.clear_by_tag("drawn"), 2);
        let after_first: Vec<_> = graph.iter().map(|n| n.handle).collect();
        assert_eq!(graph.clear_by_tag("drawn"), 0);
        let after_second: Vec<_> = graph.iter().map(|n| n.handle).collect();

        assert_eq!(after_first, after_second);
        assert_eq!(after_second, vec![keep]);
    }

    #[test]
    fn apply_scale_and_yaw_compose() {
        let mut graph = SceneGraph::new();
        let h = graph
            .place_or_relocate(NodeKind::Model, Vec3::ZERO, None, model_template)
            .unwrap()
            .handle();
        graph.apply_scale(h, 1.2);
        graph.apply_yaw(h, FRAC_PI_2, None);

        let t = graph.get(h).unwrap().transform;
        assert!(t.scale.abs_diff_eq(Vec3::splat(0.12), 1e-6));
        assert!((t.rotation * Vec3::X).abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn plane_overlay_follows_anchor_lifecycle() {
        let mut graph = SceneGraph::new();
        let style = OverlayConfig::default();
        let anchor = plane(7);

        graph.on_anchor_added(&anchor, &style);
        assert_eq!(graph.overlays_for(anchor.id).len(), 1);

        let mut grown = anchor.clone();
        grown.kind = AnchorKind::Plane {
            center: Vec3::new(0.5, 0.0, 0.0),
            extent: Vec2::new(3.0, 3.0),
            alignment: PlaneAlignment::Horizontal,
        };
        graph.on_anchor_updated(&grown, &style);
        let h = graph.overlays_for(anchor.id)[0];
        assert_eq!(
            graph.get(h).unwrap().geometry,
            Geometry::Plane {
                width: 3.0,
                height: 3.0
            }
        );
        assert!(graph.get(h).unwrap().transform.translation.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));

        assert_eq!(graph.on_anchor_removed(anchor.id), 1);
        assert!(graph.overlays_for(anchor.id).is_empty());
        assert!(graph.is_empty());
    }

    #[test]
    fn image_overlay_is_created_once_and_static() {
        let mut graph = SceneGraph::new();
        let style = OverlayConfig::default();
        let anchor = Anchor::image(3, Transform::from_xyz(0.0, 0.0, -1.0), "skruf_logo_1");

        graph.on_anchor_added(&anchor, &style);
        let owned = graph.overlays_for(anchor.id).to_vec();
        assert_eq!(owned.len(), 2);
        assert!(graph.iter().any(|n| matches!(&n.geometry, Geometry::Label { text, .. } if text == "Skruf")));

        graph.drain_commands();
        let mut moved = anchor.clone();
        moved.transform.translation = Vec3::new(5.0, 5.0, 5.0);
        graph.on_anchor_updated(&moved, &style);
        assert!(graph.drain_commands().is_empty());
        assert_eq!(graph.overlays_for(anchor.id), owned.as_slice());
    }

    #[test]
    fn unknown_image_gets_blank_label() {
        let mut graph = SceneGraph::new();
        let anchor = Anchor::image(4, Transform::IDENTITY, "poster");
        graph.on_anchor_added(&anchor, &OverlayConfig::default());
        assert_eq!(graph.overlays_for(anchor.id).len(), 2);
        assert!(graph.iter().any(|n| matches!(&n.geometry, Geometry::Label { text, .. } if text.is_empty())));
    }

    #[test]
    fn face_overlay_tracks_live_mesh() {
        let mut graph = SceneGraph::new();
        let style = OverlayConfig::default();
        let face = Anchor::face(9, Transform::IDENTITY, vec![Vec3::X, Vec3::Y, Vec3::Z], vec![0, 1, 2]);
        graph.on_anchor_added(&face, &style);

        let mut blink = face.clone();
        blink.kind = AnchorKind::Face {
            vertices: vec![Vec3::X, Vec3::Y * 0.5, Vec3::Z],
            indices: vec![0, 1, 2],
        };
        graph.on_anchor_updated(&blink, &style);
        let h = graph.overlays_for(face.id)[0];
        assert!(matches!(&graph.get(h).unwrap().geometry, Geometry::FaceMesh { vertices, .. } if vertices[1] == Vec3::Y * 0.5));

        graph.on_anchor_removed(face.id);
        assert!(graph.is_empty());
    }

    #[test]
    fn clear_overlays_keeps_placed_content() {
        let mut graph = SceneGraph::new();
        graph.on_anchor_added(&plane(1), &OverlayConfig::default());
        let model = graph
            .place_or_relocate(NodeKind::Model, Vec3::ZERO, None, model_template)
            .unwrap()
            .handle();
        assert_eq!(graph.clear_overlays(), 1);
        assert!(graph.contains(model));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn compound_bounds_cover_parts() {
        let g = Geometry::Compound(vec![GeometryPart {
            offset: Transform::from_xyz(0.0, 0.1, 0.0),
            geometry: Geometry::Sphere { radius: 0.02 },
            colour: DEFAULT_COLOUR,
        }]);
        assert!(g.bounds().abs_diff_eq(Vec3::new(0.04, 0.24, 0.04), 1e-6));
    }
}

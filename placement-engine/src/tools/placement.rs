use crate::config::EngineConfig;
use crate::engine::anchors::Anchor;
use crate::engine::commands::Animation;
use crate::engine::geometry::WorldPoint;
use crate::engine::scene_graph::{Geometry, GeometryPart, NodeHandle, NodeKind, NodeTemplate, SceneGraph};
use crate::error::EngineError;
use bevy::prelude::*;
use constants::render_settings::{
    FOLIAGE_COLOUR, TREE_FOLIAGE_HEIGHT, TREE_FOLIAGE_RADIUS, TREE_TRUNK_HEIGHT, TREE_TRUNK_RADIUS,
    TRUNK_COLOUR,
};
use std::f32::consts::FRAC_PI_2;

/// Tag carried by grown objects.
pub const GROWN_TAG: &str = "grown";

/// The configured model at its initial scale. Fails if the asset is not in
/// the catalogue.
pub fn model_template(config: &EngineConfig) -> Result<NodeTemplate, EngineError> {
    let bounds = config.resolve_asset(&config.model_asset)?;
    Ok(NodeTemplate::new(
        NodeKind::Model,
        Geometry::ImportedMesh {
            asset: config.model_asset.clone(),
            bounds,
        },
    )
    .with_transform(Transform::from_scale(Vec3::splat(config.initial_model_scale))))
}

/// Video plane lying in the plane it was placed on: flat on a floor,
/// upright on a wall. Without a surface it faces +Z.
pub fn video_template(config: &EngineConfig, surface: Option<&Anchor>) -> NodeTemplate {
    let rotation = surface
        .filter(|anchor| anchor.is_plane())
        .map(|anchor| anchor.transform.rotation * Quat::from_rotation_x(-FRAC_PI_2))
        .unwrap_or(Quat::IDENTITY);

    NodeTemplate::new(
        NodeKind::VideoPlane,
        Geometry::Plane {
            width: config.video.width,
            height: config.video.width / config.video.aspect,
        },
    )
    .with_transform(Transform::from_rotation(rotation))
}

/// Seedling spawned slightly above `point`; the caller animates it up to
/// full size.
pub fn tree_template(config: &EngineConfig, point: WorldPoint) -> NodeTemplate {
    let trunk = GeometryPart {
        offset: Transform::from_xyz(0.0, TREE_TRUNK_HEIGHT * 0.5, 0.0),
        geometry: Geometry::Cylinder {
            radius: TREE_TRUNK_RADIUS,
            height: TREE_TRUNK_HEIGHT,
        },
        colour: TRUNK_COLOUR,
    };
    let foliage = GeometryPart {
        offset: Transform::from_xyz(0.0, TREE_TRUNK_HEIGHT + TREE_FOLIAGE_HEIGHT * 0.5, 0.0),
        geometry: Geometry::Cone {
            top_radius: 0.0,
            bottom_radius: TREE_FOLIAGE_RADIUS,
            height: TREE_FOLIAGE_HEIGHT,
        },
        colour: FOLIAGE_COLOUR,
    };

    NodeTemplate::new(NodeKind::GrownObject, Geometry::Compound(vec![trunk, foliage]))
        .with_transform(
            Transform::from_translation(point + Vec3::Y * config.grow.spawn_offset)
                .with_scale(Vec3::splat(config.grow.initial_scale)),
        )
        .with_tag(GROWN_TAG)
}

/// Spawn a tree at `point` and start it growing.
pub fn grow_tree(graph: &mut SceneGraph, config: &EngineConfig, point: WorldPoint) -> NodeHandle {
    let template = tree_template(config, point);
    let grown = template.transform.with_scale(Vec3::splat(config.grow.final_scale));
    let handle = graph.spawn(template);
    graph.set_transform(handle, grown, Animation::over(config.grow.duration_secs));
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::anchors::PlaneAlignment;
    use crate::engine::commands::SceneCommand;

    #[test]
    fn model_starts_small() {
        let template = model_template(&EngineConfig::default()).unwrap();
        assert_eq!(template.transform.scale, Vec3::splat(0.1));
        assert!(matches!(template.geometry, Geometry::ImportedMesh { ref asset, .. } if asset == "BMW_M4_f82.usdz"));
    }

    #[test]
    fn unknown_model_asset_is_reported() {
        let config = EngineConfig {
            model_asset: "missing.usdz".into(),
            ..default()
        };
        assert!(matches!(model_template(&config), Err(EngineError::MissingResource(_))));
    }

    #[test]
    fn video_is_16_by_9_and_flat_on_floors() {
        let config = EngineConfig::default();
        let floor = Anchor::plane(1, Transform::IDENTITY, Vec3::ZERO, Vec2::ONE, PlaneAlignment::Horizontal);
        let template = video_template(&config, Some(&floor));

        let Geometry::Plane { width, height } = template.geometry else {
            panic!("video should be a plane");
        };
        assert_eq!(width, 0.5);
        assert!((height - 0.5 * 9.0 / 16.0).abs() < 1e-6);
        // Face normal (+Z) points up.
        assert!((template.transform.rotation * Vec3::Z).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn video_stands_upright_on_walls() {
        let config = EngineConfig::default();
        // Wall facing +Z: anchor normal (+Y) turned onto +Z.
        let wall_pose = Transform::from_rotation(Quat::from_rotation_x(FRAC_PI_2));
        let wall = Anchor::plane(2, wall_pose, Vec3::ZERO, Vec2::ONE, PlaneAlignment::Vertical);
        let template = video_template(&config, Some(&wall));
        assert!((template.transform.rotation * Vec3::Z).abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn tree_grows_from_seedling() {
        let mut graph = SceneGraph::new();
        let handle = grow_tree(&mut graph, &EngineConfig::default(), Vec3::new(1.0, 0.0, 0.0));

        let commands = graph.drain_commands();
        assert!(matches!(
            &commands[0],
            SceneCommand::AddNode { transform, .. } if transform.scale == Vec3::splat(0.1)
                && transform.translation.abs_diff_eq(Vec3::new(1.0, 0.05, 0.0), 1e-6)
        ));
        assert!(matches!(
            &commands[1],
            SceneCommand::UpdateTransform { handle: h, transform, animation: Some(a) }
                if *h == handle && transform.scale == Vec3::ONE && a.duration_secs == 3.0
        ));
        assert!(graph.get(handle).unwrap().has_tag(GROWN_TAG));
    }
}

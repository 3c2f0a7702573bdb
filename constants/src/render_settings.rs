use bevy::math::Vec3;

/// Radius of the cylinder drawn between measurement markers.
pub const MEASURE_LINE_THICKNESS: f32 = 0.001;

/// Radius of the sphere dropped at either end of a measurement.
pub const MEASURE_MARKER_RADIUS: f32 = 0.005;

/// Radius of a captured stroke point.
pub const STROKE_POINT_RADIUS: f32 = 0.002;

/// Radius of the cylinder joining two stroke points.
pub const STROKE_SEGMENT_THICKNESS: f32 = 0.004;

/// Width of the placed video plane; height follows `VIDEO_ASPECT`.
pub const VIDEO_PLANE_WIDTH: f32 = 0.5;

/// 16:9 video.
pub const VIDEO_ASPECT: f32 = 16.0 / 9.0;

/// Opacity of the overlay drawn over detected planes.
pub const PLANE_OVERLAY_ALPHA: f32 = 0.2;

/// Label plane shown above a detected reference image.
pub const IMAGE_LABEL_WIDTH: f32 = 0.2;
pub const IMAGE_LABEL_HEIGHT: f32 = 0.07;

/// Label position relative to the image anchor origin.
pub const IMAGE_LABEL_OFFSET: Vec3 = Vec3::new(0.0, 0.1, 0.0);

/// Radius of the connector from the image to its label.
pub const IMAGE_CONNECTOR_THICKNESS: f32 = 0.001;

pub const TREE_TRUNK_RADIUS: f32 = 0.005;
pub const TREE_TRUNK_HEIGHT: f32 = 0.1;
pub const TREE_FOLIAGE_RADIUS: f32 = 0.02;
pub const TREE_FOLIAGE_HEIGHT: f32 = 0.06;

// Linear RGBA.
pub const MEASURE_COLOUR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const STROKE_POINT_COLOUR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const STROKE_SEGMENT_COLOUR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
pub const PLANE_OVERLAY_COLOUR: [f32; 4] = [1.0, 1.0, 1.0, PLANE_OVERLAY_ALPHA];
pub const IMAGE_CONNECTOR_COLOUR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const FACE_OVERLAY_COLOUR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const TRUNK_COLOUR: [f32; 4] = [0.6, 0.4, 0.2, 1.0];
pub const FOLIAGE_COLOUR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
pub const DEFAULT_COLOUR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

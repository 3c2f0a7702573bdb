/// Height of the title strip at the top of the render surface. Taps and pans
/// starting inside it belong to the chrome and are ignored.
pub const RESERVED_TOP_HEIGHT: f32 = 60.0;

/// Lower bound of a single pinch update.
pub const PINCH_SCALE_MIN: f32 = 0.8;

/// Upper bound of a single pinch update.
pub const PINCH_SCALE_MAX: f32 = 1.2;

/// Scale applied to a freshly placed model on all three axes.
pub const INITIAL_MODEL_SCALE: f32 = 0.1;

/// Duration of the move animation hint when a node is relocated (seconds).
pub const RELOCATE_DURATION_SECS: f32 = 0.1;

/// Duration of the yaw animation hint for rotate gestures (seconds).
pub const ROTATE_DURATION_SECS: f32 = 0.1;

/// Perpendicular distance a feature point may sit from the pointer ray,
/// expressed per metre of depth.
pub const FEATURE_POINT_TOLERANCE: f32 = 0.01;

/// Grown objects spawn this far above the surface hit.
pub const GROW_SPAWN_OFFSET: f32 = 0.05;

/// Starting scale of a grown object.
pub const GROW_INITIAL_SCALE: f32 = 0.1;

/// Final scale of a grown object.
pub const GROW_FINAL_SCALE: f32 = 1.0;

/// How long the grow animation runs (seconds).
pub const GROW_DURATION_SECS: f32 = 3.0;

/// Length of the looping sample clip (seconds).
pub const VIDEO_DURATION_SECS: f32 = 10.0;

/// Shortest clip length accepted from configuration (seconds).
pub const MIN_CLIP_SECS: f32 = 0.001;

/// 1 world unit = 100 cm.
pub const CENTIMETRES_PER_UNIT: f32 = 100.0;

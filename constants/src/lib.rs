/// Gesture thresholds, clamps and animation timings.
pub mod interaction;

/// Sizes and colours of the geometry the engine hands to the renderer.
pub mod render_settings;

use crate::error::EngineError;
use bevy::prelude::*;
use constants::interaction::*;
use constants::render_settings::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tuning for the whole engine. Every field has a default from the
/// `constants` crate, so a JSON override only needs the fields it changes.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Taps and pans above this screen y are ignored.
    pub reserved_top_height: f32,
    pub pinch: PinchConfig,
    pub initial_model_scale: f32,
    pub relocate_duration_secs: f32,
    pub rotate_duration_secs: f32,
    pub feature_point_tolerance: f32,
    /// Asset placed in model mode; must be present in `assets`.
    pub model_asset: String,
    pub assets: BTreeMap<String, AssetEntry>,
    pub video: VideoConfig,
    pub grow: GrowConfig,
    pub overlays: OverlayConfig,
    pub measure: MeasureConfig,
    pub stroke: StrokeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    pub min: f32,
    pub max: f32,
    pub clamp: bool,
}

/// What the engine knows about a loadable model without parsing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Local bounding box size, used for node hit-testing.
    pub bounds: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub asset: String,
    pub width: f32,
    pub aspect: f32,
    pub duration_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowConfig {
    pub spawn_offset: f32,
    pub initial_scale: f32,
    pub final_scale: f32,
    pub duration_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Reference image name to label text. Images without an entry get a blank label.
    pub image_labels: BTreeMap<String, String>,
    pub label_width: f32,
    pub label_height: f32,
    pub label_offset: [f32; 3],
    pub connector_thickness: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    pub line_thickness: f32,
    pub marker_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    pub point_radius: f32,
    pub segment_thickness: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let model_asset = "BMW_M4_f82.usdz".to_string();
        let mut assets = BTreeMap::new();
        assets.insert(
            model_asset.clone(),
            AssetEntry {
                bounds: [2.0, 1.4, 4.7],
            },
        );
        Self {
            reserved_top_height: RESERVED_TOP_HEIGHT,
            pinch: PinchConfig::default(),
            initial_model_scale: INITIAL_MODEL_SCALE,
            relocate_duration_secs: RELOCATE_DURATION_SECS,
            rotate_duration_secs: ROTATE_DURATION_SECS,
            feature_point_tolerance: FEATURE_POINT_TOLERANCE,
            model_asset,
            assets,
            video: VideoConfig::default(),
            grow: GrowConfig::default(),
            overlays: OverlayConfig::default(),
            measure: MeasureConfig::default(),
            stroke: StrokeConfig::default(),
        }
    }
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            min: PINCH_SCALE_MIN,
            max: PINCH_SCALE_MAX,
            clamp: true,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            asset: "sample_video.mp4".to_string(),
            width: VIDEO_PLANE_WIDTH,
            aspect: VIDEO_ASPECT,
            duration_secs: VIDEO_DURATION_SECS,
        }
    }
}

impl Default for GrowConfig {
    fn default() -> Self {
        Self {
            spawn_offset: GROW_SPAWN_OFFSET,
            initial_scale: GROW_INITIAL_SCALE,
            final_scale: GROW_FINAL_SCALE,
            duration_secs: GROW_DURATION_SECS,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        let mut image_labels = BTreeMap::new();
        image_labels.insert("skruf_logo_1".to_string(), "Skruf".to_string());
        Self {
            image_labels,
            label_width: IMAGE_LABEL_WIDTH,
            label_height: IMAGE_LABEL_HEIGHT,
            label_offset: IMAGE_LABEL_OFFSET.to_array(),
            connector_thickness: IMAGE_CONNECTOR_THICKNESS,
        }
    }
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            line_thickness: MEASURE_LINE_THICKNESS,
            marker_radius: MEASURE_MARKER_RADIUS,
        }
    }
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            point_radius: STROKE_POINT_RADIUS,
            segment_thickness: STROKE_SEGMENT_THICKNESS,
        }
    }
}

impl OverlayConfig {
    /// Label text for a detected reference image, empty when none is registered.
    pub fn label_for(&self, image: &str) -> &str {
        self.image_labels.get(image).map_or("", String::as_str)
    }
}

impl EngineConfig {
    /// Parse a JSON override on top of the defaults.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the gesture and placement code cannot work with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.pinch.min > 0.0 && self.pinch.min <= 1.0 && self.pinch.max >= 1.0) {
            return Err(EngineError::InvalidSetting(format!(
                "pinch clamp [{}, {}] must straddle 1.0",
                self.pinch.min, self.pinch.max
            )));
        }
        if self.initial_model_scale <= 0.0 {
            return Err(EngineError::InvalidSetting(
                "initial_model_scale must be positive".to_string(),
            ));
        }
        if !(self.video.duration_secs.is_finite() && self.video.duration_secs >= MIN_CLIP_SECS) {
            return Err(EngineError::InvalidSetting(format!(
                "video.duration_secs must be a finite length of at least {MIN_CLIP_SECS} s"
            )));
        }
        Ok(())
    }

    /// Local bounds of a registered asset.
    pub fn resolve_asset(&self, name: &str) -> Result<Vec3, EngineError> {
        self.assets
            .get(name)
            .map(|entry| Vec3::from_array(entry.bounds))
            .ok_or_else(|| EngineError::MissingResource(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.pinch.min, 0.8);
        assert_eq!(config.pinch.max, 1.2);
        assert_eq!(config.reserved_top_height, 60.0);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "pinch": { "clamp": false }, "initial_model_scale": 0.5 }"#)
                .unwrap();
        assert!(!config.pinch.clamp);
        assert_eq!(config.pinch.max, 1.2);
        assert_eq!(config.initial_model_scale, 0.5);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn inverted_pinch_clamp_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "pinch": { "min": 1.5, "max": 0.5 } }"#);
        assert!(matches!(err, Err(EngineError::InvalidSetting(_))));
    }

    #[test]
    fn degenerate_clip_length_is_rejected() {
        for duration in ["1e-9", "0.0", "-3.0"] {
            let json = format!(r#"{{ "video": {{ "duration_secs": {duration} }} }}"#);
            let err = EngineConfig::from_json_str(&json);
            assert!(matches!(err, Err(EngineError::InvalidSetting(_))), "{duration}");
        }
        let mut config = EngineConfig::default();
        config.video.duration_secs = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_asset_is_missing_resource() {
        let config = EngineConfig::default();
        assert!(config.resolve_asset(&config.model_asset).is_ok());
        assert!(matches!(
            config.resolve_asset("teapot.usdz"),
            Err(EngineError::MissingResource(name)) if name == "teapot.usdz"
        ));
    }
}

use crate::engine::raycast::{AlignmentFilter, HitTestTarget};
use crate::engine::scene_graph::NodeKind;
use crate::engine::session::{PlaneDetection, TrackingConfiguration};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Interaction modes the engine can run in. Each is a configuration of the
/// same engine, see [`ModeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    PlaceModel,
    PlaceVideo,
    Measure,
    Draw,
    Grow,
    DetectImages,
    TrackFace,
}

/// What a tap does in a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAction {
    None,
    Place,
    /// Act on an existing primary node under the finger, else place one.
    SelectOrPlace,
    Clear,
}

/// What a pan does in a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanAction {
    None,
    Move,
    Stroke,
}

/// Per-mode policy consumed by the gesture interpreter and the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeConfig {
    /// Kind of the single manipulable node, if the mode has one.
    pub primary_kind: Option<NodeKind>,
    pub raycast_target: HitTestTarget,
    pub alignment: AlignmentFilter,
    pub plane_detection: PlaneDetection,
    pub tap: TapAction,
    pub pan: PanAction,
    pub pinch_scales: bool,
    pub rotate_yaws: bool,
    pub long_press_measures: bool,
    /// Every tap adds a new node instead of relocating.
    pub allows_growth: bool,
    /// Ignore taps and pans inside the reserved top strip.
    pub reserve_top_strip: bool,
    pub face_tracking: bool,
    pub detects_images: bool,
}

const BASE: ModeConfig = ModeConfig {
    primary_kind: None,
    raycast_target: HitTestTarget::ExistingSurface,
    alignment: AlignmentFilter::Any,
    plane_detection: PlaneDetection::HORIZONTAL,
    tap: TapAction::None,
    pan: PanAction::None,
    pinch_scales: false,
    rotate_yaws: false,
    long_press_measures: false,
    allows_growth: false,
    reserve_top_strip: true,
    face_tracking: false,
    detects_images: false,
};

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::PlaceModel,
        Mode::PlaceVideo,
        Mode::Measure,
        Mode::Draw,
        Mode::Grow,
        Mode::DetectImages,
        Mode::TrackFace,
    ];

    pub fn config(self) -> ModeConfig {
        match self {
            Mode::PlaceModel => ModeConfig {
                primary_kind: Some(NodeKind::Model),
                tap: TapAction::Place,
                pan: PanAction::Move,
                pinch_scales: true,
                rotate_yaws: true,
                ..BASE
            },
            Mode::PlaceVideo => ModeConfig {
                primary_kind: Some(NodeKind::VideoPlane),
                plane_detection: PlaneDetection::ALL,
                tap: TapAction::SelectOrPlace,
                pan: PanAction::Move,
                pinch_scales: true,
                ..BASE
            },
            Mode::Measure => ModeConfig {
                alignment: AlignmentFilter::Horizontal,
                tap: TapAction::Clear,
                long_press_measures: true,
                ..BASE
            },
            Mode::Draw => ModeConfig {
                raycast_target: HitTestTarget::FeaturePoints,
                plane_detection: PlaneDetection::ALL,
                pan: PanAction::Stroke,
                ..BASE
            },
            Mode::Grow => ModeConfig {
                tap: TapAction::Place,
                allows_growth: true,
                ..BASE
            },
            Mode::DetectImages => ModeConfig {
                plane_detection: PlaneDetection::NONE,
                detects_images: true,
                ..BASE
            },
            Mode::TrackFace => ModeConfig {
                plane_detection: PlaneDetection::NONE,
                face_tracking: true,
                ..BASE
            },
        }
    }

    /// Tracker configuration to run when entering this mode.
    pub fn tracking_configuration(self, reference_images: &[String]) -> TrackingConfiguration {
        let config = self.config();
        if config.face_tracking {
            return TrackingConfiguration::Face;
        }
        TrackingConfiguration::World {
            plane_detection: config.plane_detection,
            detection_images: if config.detects_images {
                reference_images.to_vec()
            } else {
                Vec::new()
            },
        }
    }

    /// Convert string identifier to mode for host compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "place_model" | "model" => Some(Self::PlaceModel),
            "place_video" | "video" => Some(Self::PlaceVideo),
            "measure" => Some(Self::Measure),
            "draw" => Some(Self::Draw),
            "grow" => Some(Self::Grow),
            "detect_images" | "images" => Some(Self::DetectImages),
            "track_face" | "face" => Some(Self::TrackFace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlaceModel => "place_model",
            Self::PlaceVideo => "place_video",
            Self::Measure => "measure",
            Self::Draw => "draw",
            Self::Grow => "grow",
            Self::DetectImages => "detect_images",
            Self::TrackFace => "track_face",
        }
    }
}

/// Tracks the active mode. Switching is exclusive: one mode at a time.
#[derive(Debug, Default)]
pub struct ToolManager {
    active: Option<Mode>,
}

impl ToolManager {
    /// Activate `mode`. Returns false if it was already active.
    pub fn activate(&mut self, mode: Mode) -> bool {
        if self.active == Some(mode) {
            return false;
        }
        if let Some(previous) = self.active {
            info!("Mode deactivated: {}", previous.as_str());
        }
        self.active = Some(mode);
        info!("Mode activated: {}", mode.as_str());
        true
    }

    pub fn deactivate(&mut self) -> Option<Mode> {
        let previous = self.active.take();
        if let Some(mode) = previous {
            info!("Mode deactivated: {}", mode.as_str());
        }
        previous
    }

    pub fn active(&self) -> Option<Mode> {
        self.active
    }

    pub fn is_active(&self, mode: Mode) -> bool {
        self.active == Some(mode)
    }

    /// Config of the active mode; an idle manager reacts to nothing.
    pub fn config(&self) -> ModeConfig {
        self.active.map(Mode::config).unwrap_or(ModeConfig {
            reserve_top_strip: false,
            ..BASE
        })
    }
}

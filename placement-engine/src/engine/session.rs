use super::camera::TrackingFrame;
use serde::{Deserialize, Serialize};

/// Which plane orientations the tracker should look for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneDetection {
    pub horizontal: bool,
    pub vertical: bool,
}

impl PlaneDetection {
    pub const NONE: Self = Self {
        horizontal: false,
        vertical: false,
    };
    pub const HORIZONTAL: Self = Self {
        horizontal: true,
        vertical: false,
    };
    pub const ALL: Self = Self {
        horizontal: true,
        vertical: true,
    };
}

/// What the tracker is asked to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackingConfiguration {
    World {
        plane_detection: PlaneDetection,
        /// Reference image names to detect; empty for none.
        detection_images: Vec<String>,
    },
    Face,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    pub reset_tracking: bool,
    pub remove_existing_anchors: bool,
}

impl RunOptions {
    /// Start from scratch: new world origin, no anchors carried over.
    pub const RESET: Self = Self {
        reset_tracking: true,
        remove_existing_anchors: true,
    };
}

/// Lifecycle of the tracker as seen from the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum TrackingState {
    #[default]
    NotStarted,
    Running,
    Interrupted,
    Paused,
    Failed(String),
}

/// The external visual-inertial tracker. Its internals run elsewhere; every
/// call here happens on the engine's thread and must not block.
pub trait TrackingSession: Send + Sync + 'static {
    /// Snapshot of the frame being displayed right now. Queried on every
    /// raycast so a reset never leaves the engine on a stale pose.
    fn current_frame(&self) -> Option<TrackingFrame>;

    fn run(&mut self, configuration: &TrackingConfiguration, options: RunOptions);

    fn pause(&mut self);
}

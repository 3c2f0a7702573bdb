//! Spatial placement and manipulation engine for augmented reality.
//!
//! Turns touch gestures and tracker callbacks into scene mutations: place
//! and manipulate a model or video, measure between surface points, draw
//! strokes, grow objects and overlay detected planes, images and faces.
//! Rendering and tracking live outside; see `PlacementEngine` for the
//! standalone API and `PlacementEnginePlugin` for Bevy hosts.

pub mod config;
pub mod engine;
pub mod error;
pub mod placement_engine;
pub mod plugin;
pub mod status;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use error::EngineError;
pub use placement_engine::PlacementEngine;
pub use plugin::{
    AnchorEvent, EngineControl, PlacementEnginePlugin, SceneCommandEvent, StatusEvent,
    TrackingEvent,
};
pub use status::{Notification, Status};
pub use tools::gesture::{GestureEvent, GesturePhase};
pub use tools::tool_manager::Mode;

use super::scene_graph::{Geometry, NodeHandle, NodeKind};
use bevy::prelude::*;

/// Hint for the renderer to tween to the new state instead of snapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub duration_secs: f32,
}

impl Animation {
    pub fn over(duration_secs: f32) -> Option<Self> {
        (duration_secs > 0.0).then_some(Self { duration_secs })
    }
}

/// Mutation the external renderer must mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    AddNode {
        handle: NodeHandle,
        kind: NodeKind,
        transform: Transform,
        geometry: Geometry,
        colour: [f32; 4],
    },
    UpdateTransform {
        handle: NodeHandle,
        transform: Transform,
        animation: Option<Animation>,
    },
    UpdateGeometry {
        handle: NodeHandle,
        geometry: Geometry,
    },
    RemoveNode {
        handle: NodeHandle,
    },
    /// Video material playback on a video plane.
    SetPlayback {
        handle: NodeHandle,
        playing: bool,
        /// Seek to the start before applying `playing`.
        restart: bool,
    },
}

/// Ordered outbox of scene commands, drained by the host once per frame.
#[derive(Debug, Default)]
pub struct RenderQueue {
    pending: Vec<SceneCommand>,
}

impl RenderQueue {
    pub fn push(&mut self, command: SceneCommand) {
        self.pending.push(command);
    }

    pub fn drain(&mut self) -> Vec<SceneCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[SceneCommand] {
        &self.pending
    }
}

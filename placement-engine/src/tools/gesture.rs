use super::tool_manager::{ModeConfig, PanAction, TapAction};
use crate::config::EngineConfig;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Tap,
    Pan,
    Pinch,
    Rotate,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// Recogniser output as delivered by the host. `scale` and `rotation` are
/// cumulative since the gesture began.
#[derive(Event, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub phase: GesturePhase,
    /// Screen position, origin top-left.
    pub location: Vec2,
    pub scale: f32,
    pub rotation: f32,
}

impl GestureEvent {
    fn new(kind: GestureKind, phase: GesturePhase, location: Vec2) -> Self {
        Self {
            kind,
            phase,
            location,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    /// Taps are discrete; the recogniser reports them as ended.
    pub fn tap(location: Vec2) -> Self {
        Self::new(GestureKind::Tap, GesturePhase::Ended, location)
    }

    pub fn pan(phase: GesturePhase, location: Vec2) -> Self {
        Self::new(GestureKind::Pan, phase, location)
    }

    pub fn pinch(phase: GesturePhase, location: Vec2, scale: f32) -> Self {
        Self {
            scale,
            ..Self::new(GestureKind::Pinch, phase, location)
        }
    }

    pub fn rotate(phase: GesturePhase, location: Vec2, rotation: f32) -> Self {
        Self {
            rotation,
            ..Self::new(GestureKind::Rotate, phase, location)
        }
    }

    pub fn long_press(phase: GesturePhase, location: Vec2) -> Self {
        Self::new(GestureKind::LongPress, phase, location)
    }
}

/// What the engine should do in response to a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Place(Vec2),
    /// Hit-test existing nodes first, fall back to placing.
    Select(Vec2),
    Move(Vec2),
    /// Multiplier relative to the previous sample.
    Scale(f32),
    /// Yaw delta in radians relative to the previous sample.
    Rotate(f32),
    StartMeasure(Vec2),
    UpdateMeasure(Vec2),
    EndMeasure(Vec2),
    BeginStroke(Vec2),
    ExtendStroke(Vec2),
    EndStroke,
    Clear,
}

/// Turns phased recogniser events into intents. Pinch and rotation keep a
/// baseline so every intent carries the change since the last one applied.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    reserved_top_height: f32,
    pinch_min: f32,
    pinch_max: f32,
    clamp_pinch: bool,
    pinch_baseline: f32,
    rotation_baseline: f32,
}

impl GestureInterpreter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            reserved_top_height: config.reserved_top_height,
            pinch_min: config.pinch.min,
            pinch_max: config.pinch.max,
            clamp_pinch: config.pinch.clamp,
            pinch_baseline: 1.0,
            rotation_baseline: 0.0,
        }
    }

    /// Forget in-flight pinch and rotation baselines.
    pub fn reset(&mut self) {
        self.pinch_baseline = 1.0;
        self.rotation_baseline = 0.0;
    }

    pub fn interpret(&mut self, event: &GestureEvent, mode: &ModeConfig) -> Option<Intent> {
        match event.kind {
            GestureKind::Tap => self.tap(event, mode),
            GestureKind::Pan => self.pan(event, mode),
            GestureKind::Pinch => self.pinch(event, mode),
            GestureKind::Rotate => self.rotate(event, mode),
            GestureKind::LongPress => long_press(event, mode),
        }
    }

    fn in_reserved_strip(&self, location: Vec2, mode: &ModeConfig) -> bool {
        mode.reserve_top_strip && location.y < self.reserved_top_height
    }

    fn tap(&self, event: &GestureEvent, mode: &ModeConfig) -> Option<Intent> {
        if self.in_reserved_strip(event.location, mode) {
            return None;
        }
        match mode.tap {
            TapAction::None => None,
            TapAction::Place => Some(Intent::Place(event.location)),
            TapAction::SelectOrPlace => Some(Intent::Select(event.location)),
            TapAction::Clear => Some(Intent::Clear),
        }
    }

    fn pan(&self, event: &GestureEvent, mode: &ModeConfig) -> Option<Intent> {
        let in_strip = self.in_reserved_strip(event.location, mode);
        match (mode.pan, event.phase) {
            (PanAction::None, _) => None,
            (PanAction::Move, GesturePhase::Cancelled) => None,
            (PanAction::Move, _) => (!in_strip).then_some(Intent::Move(event.location)),
            // A stroke always ends, wherever the finger lifts.
            (PanAction::Stroke, GesturePhase::Ended | GesturePhase::Cancelled) => Some(Intent::EndStroke),
            (PanAction::Stroke, GesturePhase::Began) => {
                (!in_strip).then_some(Intent::BeginStroke(event.location))
            }
            (PanAction::Stroke, GesturePhase::Changed) => {
                (!in_strip).then_some(Intent::ExtendStroke(event.location))
            }
        }
    }

    fn pinch(&mut self, event: &GestureEvent, mode: &ModeConfig) -> Option<Intent> {
        if !mode.pinch_scales {
            return None;
        }
        match event.phase {
            GesturePhase::Began | GesturePhase::Cancelled => {
                self.pinch_baseline = 1.0;
                None
            }
            GesturePhase::Changed | GesturePhase::Ended => {
                if !event.scale.is_finite() || event.scale <= 0.0 {
                    return None;
                }
                let mut multiplier = event.scale / self.pinch_baseline;
                self.pinch_baseline = if event.phase == GesturePhase::Ended {
                    1.0
                } else {
                    event.scale
                };
                if self.clamp_pinch {
                    multiplier = multiplier.clamp(self.pinch_min, self.pinch_max);
                }
                Some(Intent::Scale(multiplier))
            }
        }
    }

    fn rotate(&mut self, event: &GestureEvent, mode: &ModeConfig) -> Option<Intent> {
        if !mode.rotate_yaws {
            return None;
        }
        match event.phase {
            GesturePhase::Began | GesturePhase::Cancelled => {
                self.rotation_baseline = 0.0;
                None
            }
            GesturePhase::Changed | GesturePhase::Ended => {
                if !event.rotation.is_finite() {
                    return None;
                }
                let delta = event.rotation - self.rotation_baseline;
                self.rotation_baseline = if event.phase == GesturePhase::Ended {
                    0.0
                } else {
                    event.rotation
                };
                // Clockwise on screen is clockwise seen from above.
                Some(Intent::Rotate(-delta))
            }
        }
    }
}

fn long_press(event: &GestureEvent, mode: &ModeConfig) -> Option<Intent> {
    if !mode.long_press_measures {
        return None;
    }
    Some(match event.phase {
        GesturePhase::Began => Intent::StartMeasure(event.location),
        GesturePhase::Changed => Intent::UpdateMeasure(event.location),
        GesturePhase::Ended | GesturePhase::Cancelled => Intent::EndMeasure(event.location),
    })
}

use crate::engine::anchors::{Anchor, AnchorId};
use crate::engine::commands::SceneCommand;
use crate::engine::session::TrackingSession;
use crate::placement_engine::PlacementEngine;
use crate::status::Notification;
use crate::tools::gesture::GestureEvent;
use crate::tools::tool_manager::Mode;
use bevy::prelude::*;
use std::marker::PhantomData;

/// Tracker anchor callbacks.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum AnchorEvent {
    Added(Anchor),
    Updated(Anchor),
    Removed(AnchorId),
}

/// Tracker lifecycle callbacks.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum TrackingEvent {
    Interrupted,
    Resumed,
    Failed(String),
}

/// Host requests.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineControl {
    SetMode(Mode),
    Stop,
}

/// Scene mutation for the renderer to mirror.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SceneCommandEvent(pub SceneCommand);

/// Status or lifecycle notification for the host UI.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct StatusEvent(pub Notification);

/// Wires a `PlacementEngine<S>` resource into the app. The host inserts the
/// engine itself, since only it can construct the tracker.
pub struct PlacementEnginePlugin<S: TrackingSession> {
    _session: PhantomData<fn() -> S>,
}

impl<S: TrackingSession> Default for PlacementEnginePlugin<S> {
    fn default() -> Self {
        Self {
            _session: PhantomData,
        }
    }
}

impl<S: TrackingSession> Plugin for PlacementEnginePlugin<S> {
    fn build(&self, app: &mut App) {
        app.add_event::<GestureEvent>()
            .add_event::<AnchorEvent>()
            .add_event::<TrackingEvent>()
            .add_event::<EngineControl>()
            .add_event::<SceneCommandEvent>()
            .add_event::<StatusEvent>()
            .add_systems(
                Update,
                (
                    handle_engine_control::<S>,
                    forward_tracking_events::<S>,
                    forward_anchor_events::<S>,
                    forward_gestures::<S>,
                    tick_engine::<S>,
                    publish_engine_output::<S>,
                )
                    .chain(),
            );
    }
}

fn handle_engine_control<S: TrackingSession>(
    mut events: EventReader<EngineControl>,
    engine: Option<ResMut<PlacementEngine<S>>>,
) {
    let Some(mut engine) = engine else {
        return;
    };
    for control in events.read() {
        match control {
            EngineControl::SetMode(mode) => {
                if let Err(err) = engine.set_mode(*mode) {
                    warn!("Could not enter {}: {}", mode.as_str(), err);
                }
            }
            EngineControl::Stop => engine.stop(),
        }
    }
}

fn forward_tracking_events<S: TrackingSession>(
    mut events: EventReader<TrackingEvent>,
    engine: Option<ResMut<PlacementEngine<S>>>,
) {
    let Some(mut engine) = engine else {
        return;
    };
    for event in events.read() {
        match event {
            TrackingEvent::Interrupted => engine.on_tracking_interrupted(),
            TrackingEvent::Resumed => engine.on_tracking_resumed(),
            TrackingEvent::Failed(reason) => engine.on_session_failed(reason),
        }
    }
}

fn forward_anchor_events<S: TrackingSession>(
    mut events: EventReader<AnchorEvent>,
    engine: Option<ResMut<PlacementEngine<S>>>,
) {
    let Some(mut engine) = engine else {
        return;
    };
    for event in events.read() {
        match event {
            AnchorEvent::Added(anchor) => engine.on_anchor_added(anchor.clone()),
            AnchorEvent::Updated(anchor) => engine.on_anchor_updated(anchor.clone()),
            AnchorEvent::Removed(id) => engine.on_anchor_removed(*id),
        }
    }
}

fn forward_gestures<S: TrackingSession>(
    mut gestures: EventReader<GestureEvent>,
    engine: Option<ResMut<PlacementEngine<S>>>,
) {
    let Some(mut engine) = engine else {
        return;
    };
    for gesture in gestures.read() {
        if let Err(err) = engine.handle_gesture(gesture) {
            // Already reflected in the engine status.
            debug!("Gesture {:?} rejected: {}", gesture.kind, err);
        }
    }
}

fn tick_engine<S: TrackingSession>(time: Option<Res<Time>>, engine: Option<ResMut<PlacementEngine<S>>>) {
    let Some(mut engine) = engine else {
        return;
    };
    let dt = time.map(|t| t.delta_secs()).unwrap_or(0.0);
    engine.tick(dt);
}

fn publish_engine_output<S: TrackingSession>(
    engine: Option<ResMut<PlacementEngine<S>>>,
    mut commands_out: EventWriter<SceneCommandEvent>,
    mut status_out: EventWriter<StatusEvent>,
) {
    let Some(mut engine) = engine else {
        return;
    };
    for command in engine.drain_commands() {
        commands_out.write(SceneCommandEvent(command));
    }
    for notification in engine.drain_notifications() {
        status_out.write(StatusEvent(notification));
    }
}

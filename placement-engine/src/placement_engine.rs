use crate::config::EngineConfig;
use crate::engine::anchors::{Anchor, AnchorId, AnchorTable};
use crate::engine::commands::{Animation, SceneCommand};
use crate::engine::raycast::{AlignmentFilter, Hit, HitTestTarget, RaycastAdapter};
use crate::engine::scene_graph::{NodeHandle, NodeKind, Placement, SceneGraph};
use crate::engine::session::{RunOptions, TrackingSession, TrackingState};
use crate::error::EngineError;
use crate::status::{Notification, Status, StatusBoard};
use crate::tools::draw::StrokeSession;
use crate::tools::gesture::{GestureEvent, GestureInterpreter, Intent};
use crate::tools::manipulation::{ManipulationSession, ManipulationTarget};
use crate::tools::measure::{self, MeasureSession, MeasureState};
use crate::tools::placement;
use crate::tools::sampler::{ContinuousSampler, PlaybackClock};
use crate::tools::tool_manager::{Mode, ModeConfig, ToolManager};
use bevy::prelude::*;

/// One parameterised engine for every mode. Owns the scene graph and all
/// interaction state; the tracker is injected and the renderer drains
/// commands from it.
pub struct PlacementEngine<S: TrackingSession> {
    session: S,
    config: EngineConfig,
    tools: ToolManager,
    graph: SceneGraph,
    anchors: AnchorTable,
    gestures: GestureInterpreter,
    raycaster: RaycastAdapter,
    manipulation: ManipulationSession,
    sampler: ContinuousSampler,
    playback: PlaybackClock,
    status: StatusBoard,
    tracking: TrackingState,
    stopped: bool,
}

impl<S: TrackingSession> Resource for PlacementEngine<S> {}

impl<S: TrackingSession> PlacementEngine<S> {
    pub fn new(session: S, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            session,
            gestures: GestureInterpreter::new(&config),
            raycaster: RaycastAdapter::new(config.feature_point_tolerance),
            playback: PlaybackClock::new(config.video.duration_secs),
            config,
            tools: ToolManager::default(),
            graph: SceneGraph::new(),
            anchors: AnchorTable::default(),
            manipulation: ManipulationSession::default(),
            sampler: ContinuousSampler::default(),
            status: StatusBoard::default(),
            tracking: TrackingState::NotStarted,
            stopped: false,
        })
    }

    pub fn mode(&self) -> Option<Mode> {
        self.tools.active()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn anchors(&self) -> &AnchorTable {
        &self.anchors
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn status(&self) -> &Status {
        self.status.current()
    }

    pub fn tracking_state(&self) -> &TrackingState {
        &self.tracking
    }

    pub fn target(&self) -> &ManipulationTarget {
        self.manipulation.target()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn measure_state(&self) -> MeasureState {
        if self.manipulation.measurement().is_some() {
            MeasureState::Measuring
        } else {
            MeasureState::Idle
        }
    }

    /// Enter `mode` from a clean slate: scene, anchors and interaction state
    /// are dropped and the tracker is restarted for the mode.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), EngineError> {
        if self.stopped {
            return Err(EngineError::Stopped);
        }
        if !self.tools.activate(mode) {
            return Ok(());
        }

        self.sampler.stop();
        self.manipulation.reset();
        self.gestures.reset();
        self.playback = PlaybackClock::new(self.config.video.duration_secs);
        self.graph.clear_all();
        self.anchors.clear();

        let images: Vec<String> = self.config.overlays.image_labels.keys().cloned().collect();
        self.session
            .run(&mode.tracking_configuration(&images), RunOptions::RESET);
        self.set_tracking(TrackingState::Running);
        self.status.set(if mode == Mode::Measure {
            Status::LongPressToMeasure
        } else {
            Status::Ready
        });
        Ok(())
    }

    pub fn handle_gesture(&mut self, event: &GestureEvent) -> Result<(), EngineError> {
        if self.stopped {
            return Err(EngineError::Stopped);
        }
        let mode = self.tools.config();
        let Some(intent) = self.gestures.interpret(event, &mode) else {
            return Ok(());
        };
        self.dispatch(intent, &mode)
    }

    fn dispatch(&mut self, intent: Intent, mode: &ModeConfig) -> Result<(), EngineError> {
        match intent {
            Intent::Place(at) => {
                if mode.allows_growth {
                    self.grow(at, mode);
                    Ok(())
                } else {
                    self.place_primary(at, mode)
                }
            }
            Intent::Select(at) => self.select(at, mode),
            Intent::Move(at) => {
                if let Some(hit) = self.hit(at, mode.raycast_target, mode.alignment) {
                    self.manipulation.target().move_to(&mut self.graph, hit.world_point);
                }
                Ok(())
            }
            Intent::Scale(multiplier) => {
                self.manipulation.target().apply_scale(&mut self.graph, multiplier);
                Ok(())
            }
            Intent::Rotate(radians) => {
                let animation = Animation::over(self.config.rotate_duration_secs);
                self.manipulation
                    .target()
                    .apply_yaw(&mut self.graph, radians, animation);
                Ok(())
            }
            Intent::StartMeasure(at) => {
                self.start_measure(at, mode);
                Ok(())
            }
            Intent::UpdateMeasure(at) => {
                if let Some(measuring) = self.manipulation.measurement_mut() {
                    measuring.pointer = at;
                }
                Ok(())
            }
            Intent::EndMeasure(at) => {
                self.end_measure(at, mode);
                Ok(())
            }
            Intent::BeginStroke(at) => {
                let stroke = StrokeSession::begin(&mut self.graph);
                self.manipulation.set_target(ManipulationTarget::Stroke(stroke));
                self.extend_stroke(at, mode);
                Ok(())
            }
            Intent::ExtendStroke(at) => {
                self.extend_stroke(at, mode);
                Ok(())
            }
            Intent::EndStroke => {
                if let ManipulationTarget::Stroke(stroke) = self.manipulation.take() {
                    debug!("Stroke finished with {} points", stroke.points().len());
                }
                Ok(())
            }
            Intent::Clear => {
                self.clear_measurement();
                Ok(())
            }
        }
    }

    fn hit(&self, at: Vec2, target: HitTestTarget, alignment: AlignmentFilter) -> Option<Hit> {
        self.raycaster
            .first(&self.session, &self.anchors, &self.graph, at, target, alignment)
    }

    fn place_primary(&mut self, at: Vec2, mode: &ModeConfig) -> Result<(), EngineError> {
        let Some(kind) = mode.primary_kind else {
            return Ok(());
        };
        let Some(hit) = self.hit(at, mode.raycast_target, mode.alignment) else {
            debug!("Placement tap at {:?} hit no surface", at);
            self.status.set(Status::NoSurfaceDetected);
            return Ok(());
        };

        let config = &self.config;
        let surface = hit.anchor.as_ref();
        let placed = self.graph.place_or_relocate(
            kind,
            hit.world_point,
            Animation::over(config.relocate_duration_secs),
            || match kind {
                NodeKind::VideoPlane => Ok(placement::video_template(config, surface)),
                _ => placement::model_template(config),
            },
        );

        let placed = match placed {
            Ok(placed) => placed,
            Err(err) => {
                warn!("Placement failed: {}", err);
                if let EngineError::MissingResource(asset) = &err {
                    self.status.set(Status::MissingResource {
                        asset: asset.clone(),
                    });
                }
                return Err(err);
            }
        };

        let handle = placed.handle();
        self.manipulation.set_target(match kind {
            NodeKind::VideoPlane => ManipulationTarget::VideoPlane(handle),
            _ => ManipulationTarget::Model(handle),
        });
        if let Placement::Created(_) = placed {
            info!("Placed {:?} at {:?}", kind, hit.world_point);
            if kind == NodeKind::VideoPlane {
                self.playback.restart();
                self.playback.play();
                self.graph.set_playback(handle, true, true);
                self.announce_playback(false);
            }
        }
        self.status.set(Status::Ready);
        Ok(())
    }

    /// Tapping the video toggles playback; tapping anywhere else places it.
    fn select(&mut self, at: Vec2, mode: &ModeConfig) -> Result<(), EngineError> {
        let primary = mode.primary_kind.and_then(|kind| self.graph.primary(kind));
        let touched = self
            .hit(at, HitTestTarget::ExistingNode, AlignmentFilter::Any)
            .and_then(|hit| hit.hit_node);

        match (primary, touched) {
            (Some(primary), Some(touched)) if primary == touched => {
                self.toggle_playback(primary);
                Ok(())
            }
            _ => self.place_primary(at, mode),
        }
    }

    fn toggle_playback(&mut self, handle: NodeHandle) {
        let playing = self.playback.toggle();
        self.graph.set_playback(handle, playing, false);
        self.announce_playback(false);
    }

    fn announce_playback(&mut self, looped: bool) {
        self.status.send_notification(
            "playback_changed",
            serde_json::json!({
                "playing": self.playback.is_playing(),
                "looped": looped,
            }),
        );
    }

    fn grow(&mut self, at: Vec2, mode: &ModeConfig) {
        let Some(hit) = self.hit(at, mode.raycast_target, mode.alignment) else {
            self.status.set(Status::NoSurfaceDetected);
            return;
        };
        let handle = placement::grow_tree(&mut self.graph, &self.config, hit.world_point);
        debug!("Growing {:?} at {:?}", handle, hit.world_point);
        self.status.set(Status::Ready);
    }

    fn start_measure(&mut self, at: Vec2, mode: &ModeConfig) {
        // Prior markers go even if this press misses every surface.
        if self.manipulation.measurement().is_some() {
            self.manipulation.reset();
        }
        self.sampler.stop();
        measure::clear(&mut self.graph);

        let Some(hit) = self.hit(at, mode.raycast_target, mode.alignment) else {
            self.status.set(Status::NoSurfaceDetected);
            return;
        };
        let start = hit.world_point;
        let session = MeasureSession::begin(&mut self.graph, &self.config.measure, start, at);
        self.manipulation.set_target(ManipulationTarget::Measurement(session));
        self.sampler.start();
        self.status.set(Status::Measuring);
        self.status.send_notification(
            "measure_started",
            serde_json::json!({ "position": [start.x, start.y, start.z] }),
        );
    }

    fn end_measure(&mut self, at: Vec2, mode: &ModeConfig) {
        if self.manipulation.measurement().is_none() {
            return;
        }
        let last_hit = self.hit(at, mode.raycast_target, mode.alignment);
        let ManipulationTarget::Measurement(mut session) = self.manipulation.take() else {
            return;
        };
        if let Some(hit) = last_hit {
            session.sample(&mut self.graph, &self.config.measure, hit.world_point);
        }
        self.sampler.stop();

        let m = session.finish(&mut self.graph, &self.config.measure);
        self.status.set(Status::Distance { metres: m.distance });
        self.status.send_notification(
            "measure_completed",
            serde_json::json!({
                "start": [m.start.x, m.start.y, m.start.z],
                "end": [m.end.x, m.end.y, m.end.z],
                "distance": m.distance,
            }),
        );
    }

    fn clear_measurement(&mut self) {
        if self.manipulation.measurement().is_some() {
            self.manipulation.reset();
            self.sampler.stop();
        }
        if measure::clear(&mut self.graph) > 0 {
            self.status.send_notification("measure_cleared", serde_json::json!({}));
        }
        self.status.set(Status::LongPressToMeasure);
    }

    fn extend_stroke(&mut self, at: Vec2, mode: &ModeConfig) {
        let Some(hit) = self.hit(at, mode.raycast_target, mode.alignment) else {
            return;
        };
        if let Some(stroke) = self.manipulation.stroke_mut() {
            stroke.extend(&mut self.graph, &self.config.stroke, hit.world_point);
        }
    }

    /// Per-frame work: re-sample a live measurement and advance video playback.
    pub fn tick(&mut self, dt: f32) {
        if self.stopped {
            return;
        }
        self.sample_measurement();

        let Some(video) = self.graph.primary(NodeKind::VideoPlane) else {
            return;
        };
        if self.playback.advance(dt) > 0 {
            self.graph.set_playback(video, true, true);
            self.announce_playback(true);
        }
    }

    fn sample_measurement(&mut self) {
        if !self.sampler.is_running() {
            return;
        }
        let Some(pointer) = self.manipulation.measurement().map(|m| m.pointer) else {
            return;
        };
        let mode = self.tools.config();
        let Some(hit) = self.hit(pointer, mode.raycast_target, mode.alignment) else {
            // Keep the last line; just tell the user.
            self.status.set(Status::NoSurfaceDetected);
            return;
        };
        if let Some(measuring) = self.manipulation.measurement_mut() {
            let metres = measuring.sample(&mut self.graph, &self.config.measure, hit.world_point);
            self.status.set(Status::Distance { metres });
        }
    }

    pub fn on_anchor_added(&mut self, anchor: Anchor) {
        if self.stopped {
            return;
        }
        self.graph.on_anchor_added(&anchor, &self.config.overlays);
        self.anchors.upsert(anchor);
    }

    pub fn on_anchor_updated(&mut self, anchor: Anchor) {
        if self.stopped {
            return;
        }
        self.graph.on_anchor_updated(&anchor, &self.config.overlays);
        self.anchors.upsert(anchor);
    }

    pub fn on_anchor_removed(&mut self, id: AnchorId) {
        if self.stopped {
            return;
        }
        self.anchors.remove(id);
        self.graph.on_anchor_removed(id);
    }

    pub fn on_tracking_interrupted(&mut self) {
        if self.stopped {
            return;
        }
        warn!("Tracking interrupted");
        self.set_tracking(TrackingState::Interrupted);
        self.status.set(Status::TrackingInterrupted);
    }

    /// Restart tracking from scratch; anchors and their overlays are gone.
    pub fn on_tracking_resumed(&mut self) {
        if self.stopped {
            return;
        }
        let Some(mode) = self.tools.active() else {
            return;
        };
        let images: Vec<String> = self.config.overlays.image_labels.keys().cloned().collect();
        self.session
            .run(&mode.tracking_configuration(&images), RunOptions::RESET);
        self.anchors.clear();
        let removed = self.graph.clear_overlays();
        info!("Tracking reset, {} overlays removed", removed);
        self.set_tracking(TrackingState::Running);
        self.status.set(Status::TrackingReset);
    }

    pub fn on_session_failed(&mut self, reason: &str) {
        if self.stopped {
            return;
        }
        let err = EngineError::TrackingFailed(reason.to_string());
        error!("{}", err);
        self.set_tracking(TrackingState::Failed(reason.to_string()));
        self.status.set(Status::SessionFailed {
            reason: reason.to_string(),
        });
    }

    /// Stop for good: the sampler is invalidated, the tracker paused and
    /// every later callback ignored.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.sampler.invalidate();
        self.playback.pause();
        self.session.pause();
        self.manipulation.reset();
        self.tools.deactivate();
        self.set_tracking(TrackingState::Paused);
        self.status.set(Status::Stopped);
        self.stopped = true;
    }

    fn set_tracking(&mut self, state: TrackingState) {
        if self.tracking == state {
            return;
        }
        self.status.send_notification(
            "tracking_state_changed",
            serde_json::json!({ "state": &state }),
        );
        self.tracking = state;
    }

    pub fn drain_commands(&mut self) -> Vec<SceneCommand> {
        self.graph.drain_commands()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.status.drain()
    }
}

//! Fake tracker and fixtures shared by unit tests.

use crate::engine::anchors::{Anchor, PlaneAlignment};
use crate::engine::camera::{CameraPose, TrackingFrame};
use crate::engine::session::{RunOptions, TrackingConfiguration, TrackingSession};
use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

/// Tracker double: a camera one unit above the origin looking straight down,
/// 90° vertical field of view on a 1000 x 1000 surface. Screen (500, 500) hits
/// the world origin and every 50 screen units move the hit 0.1 along X or Z.
#[derive(Debug, Default)]
pub struct FakeSession {
    pub camera: Option<CameraPose>,
    pub feature_points: Vec<Vec3>,
    pub runs: Vec<(TrackingConfiguration, RunOptions)>,
    pub paused: bool,
}

impl FakeSession {
    pub fn looking_down() -> Self {
        Self {
            camera: Some(CameraPose::new(
                Transform::from_xyz(0.0, 1.0, 0.0).with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
                FRAC_PI_2,
                Vec2::new(1000.0, 1000.0),
            )),
            ..default()
        }
    }

    pub fn without_frame() -> Self {
        Self::default()
    }
}

impl TrackingSession for FakeSession {
    fn current_frame(&self) -> Option<TrackingFrame> {
        self.camera.map(|camera| TrackingFrame {
            camera: Some(camera),
            feature_points: self.feature_points.clone(),
        })
    }

    fn run(&mut self, configuration: &TrackingConfiguration, options: RunOptions) {
        self.paused = false;
        self.runs.push((configuration.clone(), options));
    }

    fn pause(&mut self) {
        self.paused = true;
    }
}

/// 1 x 1 horizontal plane centred on the world origin.
pub fn floor(id: u64) -> Anchor {
    Anchor::plane(id, Transform::IDENTITY, Vec3::ZERO, Vec2::ONE, PlaneAlignment::Horizontal)
}

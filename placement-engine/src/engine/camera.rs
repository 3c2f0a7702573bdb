use bevy::math::{Dir3, Ray3d};
use bevy::prelude::*;

/// Tracked device camera for one frame: pose in world space plus the
/// pinhole intrinsics needed to turn a screen point into a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera looks down its local -Z with +Y up.
    pub transform: Transform,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Render surface size in screen units, origin top-left, y down.
    pub viewport: Vec2,
}

impl CameraPose {
    pub fn new(transform: Transform, fov_y: f32, viewport: Vec2) -> Self {
        Self {
            transform,
            fov_y,
            viewport,
        }
    }

    /// World-space ray through `screen_point`. `None` for an empty viewport
    /// or a degenerate field of view.
    pub fn viewport_to_world(&self, screen_point: Vec2) -> Option<Ray3d> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 || self.fov_y <= 0.0 {
            return None;
        }

        let ndc_x = 2.0 * screen_point.x / self.viewport.x - 1.0;
        let ndc_y = 1.0 - 2.0 * screen_point.y / self.viewport.y;
        let tan_half = (self.fov_y * 0.5).tan();
        let aspect = self.viewport.x / self.viewport.y;

        let local = Vec3::new(ndc_x * tan_half * aspect, ndc_y * tan_half, -1.0);
        let world = self.transform.rotation * local;
        let direction = Dir3::new(world).ok()?;
        Some(Ray3d::new(self.transform.translation, direction))
    }
}

/// Everything the tracker knows about the current frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingFrame {
    pub camera: Option<CameraPose>,
    /// Reconstructed feature points in world space.
    pub feature_points: Vec<Vec3>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn looking_down() -> CameraPose {
        CameraPose::new(
            Transform::from_xyz(0.0, 1.0, 0.0).with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
            FRAC_PI_2,
            Vec2::new(1000.0, 1000.0),
        )
    }

    #[test]
    fn centre_of_screen_looks_straight_ahead() {
        let ray = looking_down().viewport_to_world(Vec2::new(500.0, 500.0)).unwrap();
        assert!(ray.origin.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
        assert!(ray.direction.as_vec3().abs_diff_eq(Vec3::NEG_Y, 1e-5));
    }

    #[test]
    fn screen_right_maps_to_world_right() {
        let ray = looking_down().viewport_to_world(Vec2::new(1000.0, 500.0)).unwrap();
        let d = ray.direction.as_vec3();
        assert!(d.x > 0.0 && d.y < 0.0);
        assert!(d.z.abs() < 1e-5);
    }

    #[test]
    fn empty_viewport_has_no_ray() {
        let mut cam = looking_down();
        cam.viewport = Vec2::ZERO;
        assert!(cam.viewport_to_world(Vec2::ZERO).is_none());
    }
}

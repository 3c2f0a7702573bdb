use bevy::math::{Quat, Vec3};

/// A position in the tracked world frame, in metres.
pub type WorldPoint = Vec3;

/// Directions shorter than this are treated as coincident points.
const DEGENERATE_LENGTH: f32 = f32::EPSILON;

/// Euclidean distance between two world points.
pub fn distance(a: WorldPoint, b: WorldPoint) -> f32 {
    (b - a).length()
}

/// Componentwise average of two points.
pub fn midpoint(a: WorldPoint, b: WorldPoint) -> WorldPoint {
    (a + b) * 0.5
}

/// Unnormalised vector pointing from `from` to `to`.
pub fn direction(from: WorldPoint, to: WorldPoint) -> Vec3 {
    to - from
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    a.cross(b)
}

/// Unsigned angle between two vectors in radians. Zero-length input yields 0.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let denom = a.length() * b.length();
    if denom <= DEGENERATE_LENGTH {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Rotation that turns the node's local `up` axis so it points from `from`
/// towards `to`.
///
/// Coincident points have no direction; the identity rotation is returned so
/// no NaN ever reaches a transform.
pub fn orient_toward(from: WorldPoint, to: WorldPoint, up: Vec3) -> Quat {
    let dir = direction(from, to);
    let length = dir.length();
    if length <= DEGENERATE_LENGTH || up.length() <= DEGENERATE_LENGTH {
        return Quat::IDENTITY;
    }

    let axis = cross(up, dir);
    let angle = angle_between(up, dir);
    let axis_length = axis.length();
    if axis_length <= DEGENERATE_LENGTH {
        // Parallel or antiparallel; `from_rotation_arc` picks a stable
        // perpendicular axis for the half turn.
        return Quat::from_rotation_arc(up.normalize(), dir / length);
    }
    Quat::from_axis_angle(axis / axis_length, angle)
}

/// Thin cylinder joining two points. The cylinder axis is local +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub length: f32,
    pub position: WorldPoint,
    pub orientation: Quat,
    pub thickness: f32,
}

/// Length, centre and orientation of the segment from `start` to `end`.
/// Shared by measurement lines, stroke segments and image label connectors.
pub fn connector_geometry(start: WorldPoint, end: WorldPoint, thickness: f32) -> Connector {
    Connector {
        length: distance(start, end),
        position: midpoint(start, end),
        orientation: orient_toward(start, end, Vec3::Y),
        thickness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Vec3::new(0.2, -1.0, 3.5);
        let b = Vec3::new(-4.0, 0.5, 1.0);
        assert_eq!(distance(a, b), distance(b, a));
        assert_eq!(distance(a, a), 0.0);
    }

    #[test]
    fn midpoint_is_equidistant() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-3.0, 0.0, 7.0);
        let m = midpoint(a, b);
        assert!((distance(a, m) - distance(b, m)).abs() < EPS);
        assert!((distance(a, m) * 2.0 - distance(a, b)).abs() < EPS);
    }

    #[test]
    fn orient_toward_maps_up_onto_direction() {
        let from = Vec3::new(0.0, 0.0, 0.0);
        let to = Vec3::new(1.0, 1.0, 0.0);
        let rot = orient_toward(from, to, Vec3::Y);
        let aimed = rot * Vec3::Y;
        assert!(aimed.abs_diff_eq((to - from).normalize(), EPS));
    }

    #[test]
    fn orient_toward_coincident_points_is_identity() {
        let p = Vec3::new(0.3, 0.3, 0.3);
        assert_eq!(orient_toward(p, p, Vec3::Y), Quat::IDENTITY);
    }

    #[test]
    fn orient_toward_handles_antiparallel_direction() {
        let rot = orient_toward(Vec3::ZERO, Vec3::NEG_Y, Vec3::Y);
        assert!(rot.is_finite());
        assert!((rot * Vec3::Y).abs_diff_eq(Vec3::NEG_Y, EPS));
    }

    #[test]
    fn angle_between_zero_vector_is_zero() {
        assert_eq!(angle_between(Vec3::ZERO, Vec3::X), 0.0);
        assert!((angle_between(Vec3::X, Vec3::Y) - std::f32::consts::FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn connector_spans_both_points() {
        let start = Vec3::new(0.0, 0.0, 0.0);
        let end = Vec3::new(0.0, 0.0, 2.0);
        let c = connector_geometry(start, end, 0.004);
        assert!((c.length - 2.0).abs() < EPS);
        assert!(c.position.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), EPS));
        assert!((c.orientation * Vec3::Y).abs_diff_eq(Vec3::Z, EPS));
        assert_eq!(c.thickness, 0.004);
    }
}

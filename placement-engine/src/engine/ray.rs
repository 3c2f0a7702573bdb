use bevy::prelude::*;

/// Ray against a node's oriented box of `size`, centred on its transform origin.
/// Returns the distance along `dir` in world units.
pub fn ray_hits_obb(origin: Vec3, dir: Vec3, xf: &Transform, size: Vec3) -> Option<f32> {
    let inv = xf.compute_matrix().inverse();
    let o_local = inv.transform_point3(origin);
    let d_local = inv.transform_vector3(dir);
    let he = size * 0.5;
    let t_local = ray_aabb_hit_t(o_local, d_local, -he, he)?;
    // Scale in the transform stretches the parameter; recover the world distance.
    let hit_world = xf.compute_matrix().transform_point3(o_local + d_local * t_local);
    Some((hit_world - origin).length())
}

// Slab-method ray–AABB intersection, returns Some(t) or None
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = Vec3::new(
        if ray_direction.x != 0.0 { 1.0 / ray_direction.x } else { f32::INFINITY },
        if ray_direction.y != 0.0 { 1.0 / ray_direction.y } else { f32::INFINITY },
        if ray_direction.z != 0.0 { 1.0 / ray_direction.z } else { f32::INFINITY },
    );

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    for axis in 0..3 {
        let (lo, hi) = (min[axis], max[axis]);
        let o = ray_origin[axis];
        if inv[axis].is_infinite() {
            // Parallel to this slab: must already be inside it.
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (mut t0, mut t1) = ((lo - o) * inv[axis], (hi - o) * inv[axis]);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    Some(if t_enter >= 0.0 { t_enter } else { t_exit })
}

/// Ray against the infinite plane through `point` with `normal`.
/// Hits behind the origin and rays parallel to the plane are rejected.
pub fn ray_plane_hit_t(origin: Vec3, dir: Vec3, point: Vec3, normal: Vec3) -> Option<f32> {
    let denom = dir.dot(normal);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (point - origin).dot(normal) / denom;
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_hit_from_outside_returns_entry_distance() {
        let t = ray_aabb_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::splat(-1.0), Vec3::ONE);
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn aabb_miss_when_parallel_and_outside() {
        let t = ray_aabb_hit_t(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::splat(-1.0), Vec3::ONE);
        assert_eq!(t, None);
    }

    #[test]
    fn aabb_behind_origin_is_ignored() {
        let t = ray_aabb_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, Vec3::splat(-1.0), Vec3::ONE);
        assert_eq!(t, None);
    }

    #[test]
    fn obb_respects_scale() {
        let xf = Transform::from_xyz(0.0, 0.0, -2.0).with_scale(Vec3::splat(0.5));
        let t = ray_hits_obb(Vec3::ZERO, Vec3::NEG_Z, &xf, Vec3::splat(2.0)).unwrap();
        assert!((t - 1.5).abs() < 1e-5);
    }

    #[test]
    fn plane_hit_below_camera() {
        let t = ray_plane_hit_t(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y, Vec3::ZERO, Vec3::Y);
        assert_eq!(t, Some(1.0));
        assert_eq!(ray_plane_hit_t(Vec3::new(0.0, 1.0, 0.0), Vec3::X, Vec3::ZERO, Vec3::Y), None);
    }
}

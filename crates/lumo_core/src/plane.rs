//! Finite plane patch.

use lumo_math::{Bounds3, EulerRot, Quat, Ray, Transform, Vec2, Vec3};

use crate::shape::{accept, local_unit_ray, Shape};

/// A square patch `[-1, 1] x [-1, 1]` in the local `y = 0` plane.
///
/// The patch is finite: position, orientation and extent all come from the
/// transform. The local normal is `+Y`.
#[derive(Debug, Clone, Default)]
pub struct Plane {
    transform: Transform,
}

impl Plane {
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }

    /// Patch through `point` facing `normal`, with half-extents `size` along
    /// its local x and z axes.
    pub fn through(point: Vec3, normal: Vec3, size: Vec2) -> Self {
        let rotation = Quat::from_rotation_arc(Vec3::Y, normal.normalize());
        Self::new(Transform::from_trs(
            point,
            rotation,
            Vec3::new(size.x, 1.0, size.y),
        ))
    }

    /// Patch through `point`, rotated by Euler `angles` (radians, applied
    /// about z, then x, then y) and scaled by `scale` in its own plane.
    pub fn with_pose(point: Vec3, angles: Vec3, scale: Vec2) -> Self {
        let rotation = Quat::from_euler(EulerRot::YXZ, angles.y, angles.x, angles.z);
        Self::new(Transform::from_trs(
            point,
            rotation,
            Vec3::new(scale.x, 1.0, scale.y),
        ))
    }
}

impl Shape for Plane {
    fn name(&self) -> &'static str {
        "plane"
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn intersect(&self, ray: &Ray) -> Option<f32> {
        let (local, length) = local_unit_ray(&self.transform, ray);
        if local.direction.y == 0.0 {
            return None;
        }

        let t = -local.origin.y / local.direction.y;
        let p = local.at(t);
        if p.x.abs() > 1.0 || p.z.abs() > 1.0 {
            return None;
        }
        accept(t / length, ray)
    }

    fn normal_at(&self, _p: Vec3) -> Vec3 {
        self.transform.to_world_normal(Vec3::Y)
    }

    fn bounds(&self) -> Bounds3 {
        self.transform.to_world_bounds(&Bounds3::new(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
        ))
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_plane_hit_scaled_patch() {
        let plane = Plane::new(Transform::from_trs(
            Vec3::ZERO,
            Quat::IDENTITY,
            Vec3::new(10.0, 1.0, 10.0),
        ));
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));

        let t = plane.intersect(&ray).expect("ray should hit the patch");
        assert!((t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_plane_is_finite() {
        let plane = Plane::new(Transform::from_trs(
            Vec3::ZERO,
            Quat::IDENTITY,
            Vec3::new(10.0, 1.0, 10.0),
        ));

        // Inside the scaled extent
        let ray = Ray::new(Vec3::new(9.5, 5.0, -9.5), Vec3::NEG_Y);
        assert!(plane.intersect(&ray).is_some());

        // Outside it
        let ray = Ray::new(Vec3::new(10.5, 5.0, 0.0), Vec3::NEG_Y);
        assert!(plane.intersect(&ray).is_none());
    }

    #[test]
    fn test_plane_parallel_and_behind() {
        let plane = Plane::default();

        let parallel = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(plane.intersect(&parallel).is_none());

        let away = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(plane.intersect(&away).is_none());
    }

    #[test]
    fn test_plane_oblique_world_distance() {
        let plane = Plane::through(Vec3::new(0.0, -2.0, 0.0), Vec3::Y, Vec2::splat(5.0));
        let dir = Vec3::new(1.0, -1.0, 0.0);
        let ray = Ray::new(Vec3::ZERO, dir);
        let t = plane.intersect(&ray).expect("ray should hit");
        assert!((ray.at(t).y + 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_plane_normal_follows_rotation() {
        let plane = Plane::through(Vec3::ZERO, Vec3::X, Vec2::ONE);
        let n = plane.normal_at(Vec3::ZERO);
        assert!((n - Vec3::X).length() < 1e-5);

        let wall = Plane::with_pose(Vec3::ZERO, Vec3::new(FRAC_PI_2, 0.0, 0.0), Vec2::ONE);
        let n = wall.normal_at(Vec3::ZERO);
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!((n - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_plane_bounds_are_padded() {
        let b = Plane::default().bounds();
        assert!(b.size().y > 0.0);
        assert!((b.size().x - 2.0).abs() < 1e-3);
    }
}

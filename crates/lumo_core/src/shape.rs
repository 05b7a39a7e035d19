//! Shape trait for analytic ray-surface intersection.

use std::fmt;

use lumo_math::{Bounds3, Ray, Transform, Vec3};

/// Minimum world-space distance for a root to count as a hit.
///
/// Keeps rays leaving a surface from hitting that same surface again.
pub const HIT_EPSILON: f32 = 1e-4;

/// Trait for geometry that can be hit by rays.
///
/// Every shape owns its local-to-world [`Transform`]. Intersection happens in
/// local space; distances are returned in world units along the original ray.
pub trait Shape: Send + Sync + fmt::Debug {
    /// Short type name, used in logs and scene dumps.
    fn name(&self) -> &'static str;

    fn transform(&self) -> &Transform;

    fn set_transform(&mut self, transform: Transform);

    /// Distance to the nearest hit with `t` in `(HIT_EPSILON, ray.t_max)`.
    fn intersect(&self, ray: &Ray) -> Option<f32>;

    /// Unit outward normal at a world-space point on the surface.
    fn normal_at(&self, p: Vec3) -> Vec3;

    /// World-space bounds enclosing the transformed shape.
    fn bounds(&self) -> Bounds3;

    fn clone_box(&self) -> Box<dyn Shape>;
}

impl Clone for Box<dyn Shape> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Map a world ray into the shape's local space with a unit direction.
///
/// Returns the local ray and the length of the transformed direction before
/// normalization; a local distance `t` is `t / length` in world units.
#[inline]
pub(crate) fn local_unit_ray(transform: &Transform, ray: &Ray) -> (Ray, f32) {
    let local = transform.to_local_ray(ray);
    let length = local.direction.length();
    (Ray::new(local.origin, local.direction / length), length)
}

/// Accept a world-space root if it lies in `(HIT_EPSILON, ray.t_max)`.
#[inline]
pub(crate) fn accept(t: f32, ray: &Ray) -> Option<f32> {
    (t > HIT_EPSILON && t < ray.t_max).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumo_math::Quat;

    #[test]
    fn test_local_unit_ray_length() {
        let transform = Transform::from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::splat(4.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 8.0), Vec3::NEG_Z);
        let (local, length) = local_unit_ray(&transform, &ray);

        assert_eq!(local.origin, Vec3::new(0.0, 0.0, 2.0));
        assert!((local.direction.length() - 1.0).abs() < 1e-6);
        assert!((length - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_accept_range() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X).with_max(10.0);
        assert_eq!(accept(5.0, &ray), Some(5.0));
        assert_eq!(accept(0.0, &ray), None);
        assert_eq!(accept(-1.0, &ray), None);
        assert_eq!(accept(10.0, &ray), None);
        assert_eq!(accept(f32::NAN, &ray), None);
    }
}

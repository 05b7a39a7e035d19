// Affine local <-> world mapping owned by every shape.
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and
// inverse(); this type caches the inverse and the normal matrix so ray
// tracing never inverts per ray.

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::{Bounds3, Ray};

/// Local-to-world affine transform with its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    local_to_world: Mat4,
    world_to_local: Mat4,
    /// Inverse-transpose of the linear part, for normals.
    normal_matrix: Mat3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        local_to_world: Mat4::IDENTITY,
        world_to_local: Mat4::IDENTITY,
        normal_matrix: Mat3::IDENTITY,
    };

    /// Build from a local-to-world matrix. The matrix must be invertible.
    pub fn from_matrix(local_to_world: Mat4) -> Self {
        let world_to_local = local_to_world.inverse();
        let normal_matrix = Mat3::from_mat4(world_to_local).transpose();
        Self {
            local_to_world,
            world_to_local,
            normal_matrix,
        }
    }

    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self::from_matrix(Mat4::from_scale_rotation_translation(
            scale,
            rotation,
            translation,
        ))
    }

    #[inline]
    pub fn to_world_point(&self, p: Vec3) -> Vec3 {
        self.local_to_world.transform_point3(p)
    }

    #[inline]
    pub fn to_local_point(&self, p: Vec3) -> Vec3 {
        self.world_to_local.transform_point3(p)
    }

    /// Transform a direction (w=0, translation ignored) into local space.
    #[inline]
    pub fn to_local_vector(&self, v: Vec3) -> Vec3 {
        self.world_to_local.transform_vector3(v)
    }

    /// Map a local normal to a unit world normal.
    #[inline]
    pub fn to_world_normal(&self, n: Vec3) -> Vec3 {
        (self.normal_matrix * n).normalize()
    }

    /// Map a world ray into local space.
    ///
    /// The direction is left unnormalized so callers can recover world
    /// distances from its length.
    pub fn to_local_ray(&self, ray: &Ray) -> Ray {
        Ray {
            origin: self.to_local_point(ray.origin),
            direction: self.to_local_vector(ray.direction),
            t_min: ray.t_min,
            t_max: ray.t_max,
        }
    }

    /// World bounds of local bounds: the box around all 8 transformed corners.
    pub fn to_world_bounds(&self, local: &Bounds3) -> Bounds3 {
        let corners = local.corners().map(|c| self.to_world_point(c));
        let mut min = corners[0];
        let mut max = corners[0];
        for &corner in &corners[1..] {
            min = min.min(corner);
            max = max.max(corner);
        }
        Bounds3::from_points(min, max)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_identity() {
        let t = Transform::default();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(t.to_world_point(p), p);
        assert_eq!(t.to_local_point(p), p);
        assert_eq!(t.to_world_normal(Vec3::Y), Vec3::Y);
    }

    #[test]
    fn test_translation_ignored_for_vectors() {
        let t = Transform::from_trs(Vec3::new(10.0, 20.0, 30.0), Quat::IDENTITY, Vec3::ONE);
        assert_eq!(t.to_world_point(Vec3::ONE), Vec3::new(11.0, 21.0, 31.0));
        assert!(t.to_local_point(Vec3::new(10.0, 20.0, 30.0)).length() < 1e-5);
        assert_eq!(t.to_local_vector(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_round_trip() {
        let t = Transform::from_trs(
            Vec3::new(1.0, -2.0, 3.0),
            Quat::from_rotation_y(PI / 4.0),
            Vec3::new(2.0, 0.5, 3.0),
        );
        let p = Vec3::new(5.0, 3.0, 2.0);
        let back = t.to_local_point(t.to_world_point(p));
        assert!((back - p).length() < 0.001);
        let axis = t.to_local_vector(Vec3::new(0.0, 3.0, 0.0));
        assert!((axis - Vec3::new(0.0, 6.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_normal_uses_inverse_transpose() {
        // Squash y: a 45 degree local normal must tilt towards +y in world.
        let t = Transform::from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::new(1.0, 0.5, 1.0));
        let n = t.to_world_normal(Vec3::new(1.0, 1.0, 0.0).normalize());
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(n.y > n.x);

        // The normal stays perpendicular to a transformed tangent.
        let tangent = Vec3::new(1.0, -0.5, 0.0);
        assert!(n.dot(tangent).abs() < 1e-5);
    }

    #[test]
    fn test_world_bounds_rotated() {
        let t = Transform::from_trs(Vec3::ZERO, Quat::from_rotation_z(PI / 4.0), Vec3::ONE);
        let local = Bounds3::from_points(Vec3::splat(-1.0), Vec3::ONE);
        let world = t.to_world_bounds(&local);
        let r = 2.0_f32.sqrt();
        assert!((world.max.x - r).abs() < 0.001);
        assert!((world.min.y + r).abs() < 0.001);
        assert!((world.max.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_local_ray_keeps_scale() {
        let t = Transform::from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::splat(2.0));
        let local = t.to_local_ray(&Ray::new(Vec3::new(0.0, 0.0, 4.0), Vec3::NEG_Z));
        assert_eq!(local.origin, Vec3::new(0.0, 0.0, 2.0));
        assert!((local.direction.length() - 0.5).abs() < 1e-6);
    }
}

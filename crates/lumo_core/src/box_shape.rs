//! Axis-aligned box primitive (oriented in world by its transform).

use lumo_math::{Bounds3, Ray, Transform, Vec3};

use crate::shape::{accept, local_unit_ray, Shape};

/// A box spanning two opposite local corners.
#[derive(Debug, Clone)]
pub struct BoxShape {
    min: Vec3,
    max: Vec3,
    transform: Transform,
}

impl BoxShape {
    /// Box between any two opposite corners, identity transform.
    pub fn from_corners(p1: Vec3, p2: Vec3) -> Self {
        Self {
            min: p1.min(p2),
            max: p1.max(p2),
            transform: Transform::IDENTITY,
        }
    }

    /// Box of half-size `half_extent` around the local origin.
    pub fn centered(half_extent: Vec3) -> Self {
        Self::from_corners(-half_extent, half_extent)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn local_bounds(&self) -> Bounds3 {
        Bounds3::new(self.min, self.max)
    }
}

impl Default for BoxShape {
    fn default() -> Self {
        Self::centered(Vec3::ONE)
    }
}

impl Shape for BoxShape {
    fn name(&self) -> &'static str {
        "box"
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Slab test in local space.
    ///
    /// Zero direction components produce infinite slab distances, which the
    /// min/max reductions absorb.
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        let (local, length) = local_unit_ray(&self.transform, ray);
        let inv_dir = local.direction.recip();

        let t0 = (self.min - local.origin) * inv_dir;
        let t1 = (self.max - local.origin) * inv_dir;
        let near = t0.min(t1).max_element();
        let far = t0.max(t1).min_element();
        if near > far {
            return None;
        }

        // From inside the box the near root is behind the origin: use the far one.
        accept(near / length, ray).or_else(|| accept(far / length, ray))
    }

    fn normal_at(&self, p: Vec3) -> Vec3 {
        let local = self.transform.to_local_point(p);
        let center = (self.min + self.max) * 0.5;
        let half = (self.max - self.min) * 0.5;
        let offset = local - center;

        let mut axis = 0;
        let mut largest = 0.0f32;
        for i in 0..3 {
            let q = if half[i] != 0.0 { offset[i] / half[i] } else { 0.0 };
            if q.abs() > largest.abs() {
                largest = q;
                axis = i;
            }
        }

        let mut normal = Vec3::ZERO;
        normal[axis] = if largest > 0.0 { 1.0 } else { -1.0 };
        self.transform.to_world_normal(normal)
    }

    fn bounds(&self) -> Bounds3 {
        self.transform.to_world_bounds(&self.local_bounds())
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumo_math::Quat;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_box_hit_front_face() {
        let cube = BoxShape::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = cube.intersect(&ray).expect("ray should hit");
        assert!((t - 4.0).abs() < 1e-5);
        let n = cube.normal_at(ray.at(t));
        assert!((n - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_box_hit_from_inside() {
        let cube = BoxShape::from_corners(Vec3::new(2.0, 2.0, 2.0), Vec3::new(-2.0, -2.0, -2.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = cube.intersect(&ray).expect("inside ray should exit");
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_box_axis_aligned_ray_zero_components() {
        // Direction has two zero components: slab math runs on infinities
        let cube = BoxShape::default();
        let hit = Ray::new(Vec3::new(0.5, 0.5, -3.0), Vec3::Z);
        assert!(cube.intersect(&hit).is_some());

        let miss = Ray::new(Vec3::new(1.5, 0.5, -3.0), Vec3::Z);
        assert!(cube.intersect(&miss).is_none());
    }

    #[test]
    fn test_box_miss_behind() {
        let cube = BoxShape::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(cube.intersect(&ray).is_none());
    }

    #[test]
    fn test_box_rotated() {
        let cube = BoxShape::default().with_transform(Transform::from_trs(
            Vec3::ZERO,
            Quat::from_rotation_y(FRAC_PI_4),
            Vec3::ONE,
        ));
        // The edge now points at +z, sqrt(2) from the center
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = cube.intersect(&ray).expect("ray should hit");
        assert!((t - (5.0 - 2.0_f32.sqrt())).abs() < 1e-4);

        let b = cube.bounds();
        assert!((b.max.z - 2.0_f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_box_normals_are_unit() {
        let cube = BoxShape::centered(Vec3::new(1.0, 2.0, 3.0)).with_transform(Transform::from_trs(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_z(0.3),
            Vec3::new(2.0, 1.0, 0.5),
        ));
        for p in [Vec3::X, Vec3::NEG_Y * 3.0, Vec3::new(0.2, 0.1, 4.0)] {
            let n = cube.normal_at(p);
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }
}

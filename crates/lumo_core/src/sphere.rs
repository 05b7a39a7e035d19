//! Sphere primitive.

use lumo_math::{Bounds3, Quat, Ray, Transform, Vec3};

use crate::shape::{accept, local_unit_ray, Shape};

/// A sphere given by a local center and radius, placed by a transform.
///
/// Non-uniform scale turns it into an ellipsoid; intersection still happens
/// against the local sphere.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    transform: Transform,
}

impl Sphere {
    /// Create a new sphere in local space with an identity transform.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            transform: Transform::IDENTITY,
        }
    }

    /// Unit sphere moved to `center` and scaled by `radius`.
    pub fn at(center: Vec3, radius: f32) -> Self {
        Self::new(Vec3::ZERO, 1.0).with_transform(Transform::from_trs(
            center,
            Quat::IDENTITY,
            Vec3::splat(radius),
        ))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0)
    }
}

impl Shape for Sphere {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn intersect(&self, ray: &Ray) -> Option<f32> {
        let (local, length) = local_unit_ray(&self.transform, ray);

        // |O + tD - C|^2 = r^2 with |D| = 1, in half-b form
        let oc = local.origin - self.center;
        let half_b = oc.dot(local.direction);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let near = (-half_b - sqrtd) / length;
        let far = (-half_b + sqrtd) / length;
        accept(near, ray).or_else(|| accept(far, ray))
    }

    fn normal_at(&self, p: Vec3) -> Vec3 {
        let local = self.transform.to_local_point(p);
        self.transform
            .to_world_normal((local - self.center) / self.radius)
    }

    fn bounds(&self) -> Bounds3 {
        let r = Vec3::splat(self.radius);
        self.transform
            .to_world_bounds(&Bounds3::new(self.center - r, self.center + r))
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HIT_EPSILON;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::at(Vec3::new(0.0, 0.0, -1.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let t = sphere.intersect(&ray).expect("ray should hit");
        assert!((t - 0.5).abs() < 0.001); // Should hit at t=0.5
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::at(Vec3::new(0.0, 0.0, -1.0), 0.5);

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.intersect(&ray).is_none());

        // Sphere entirely behind the origin
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let sphere = Sphere::at(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = sphere.intersect(&ray).expect("inside ray should exit");
        assert!((t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_distance_in_world_units() {
        // Unnormalized world direction and a scaled sphere
        let sphere = Sphere::at(Vec3::new(0.0, 0.0, -10.0), 3.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0));
        let t = sphere.intersect(&ray).expect("ray should hit");
        let p = ray.at(t);
        assert!(((p - Vec3::new(0.0, 0.0, -10.0)).length() - 3.0).abs() < 1e-4);
        assert!((t - 3.5).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_respects_t_max() {
        let sphere = Sphere::at(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z).with_max(3.0);
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_ignores_self_hit() {
        let sphere = Sphere::at(Vec3::ZERO, 1.0);
        // Starting on the surface and leaving it
        let ray = Ray::new(Vec3::new(0.0, 1.0 + HIT_EPSILON * 0.1, 0.0), Vec3::Y);
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_normal() {
        let sphere = Sphere::at(Vec3::new(1.0, 2.0, 3.0), 2.0);
        let n = sphere.normal_at(Vec3::new(3.0, 2.0, 3.0));
        assert!((n - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_bounds() {
        let sphere = Sphere::at(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let b = sphere.bounds();
        assert!((b.min - Vec3::new(-1.0, -2.0, -2.0)).length() < 1e-4);
        assert!((b.max - Vec3::new(3.0, 2.0, 2.0)).length() < 1e-4);
    }

    #[test]
    fn test_random_rays_agree_with_discriminant() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut hits = 0;
        let mut misses = 0;
        for _ in 0..20_000 {
            let center = Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            let radius: f32 = rng.gen_range(0.3..2.0);
            let sphere = Sphere::at(center, radius);

            let origin = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            let aim = center
                + Vec3::new(
                    rng.gen_range(-2.0..2.0),
                    rng.gen_range(-2.0..2.0),
                    rng.gen_range(-2.0..2.0),
                ) * radius;
            let direction = aim - origin;
            if direction.length() < 1e-3 {
                continue;
            }
            let ray = Ray::new(origin, direction.normalize());

            // Reference roots in f64: t = -h ± sqrt(h^2 - (|oc|^2 - r^2))
            let oc = (origin - center).as_dvec3();
            let d = ray.direction.as_dvec3();
            let h = d.dot(oc);
            let disc = h * h - (oc.length_squared() - (radius as f64).powi(2));
            let eps = HIT_EPSILON as f64;
            let expected = if disc < 0.0 {
                None
            } else {
                let root = disc.sqrt();
                [-h - root, -h + root].into_iter().find(|&t| t > eps)
            };

            // Skip grazing rays and roots sitting on the epsilon cutoff
            let near_cutoff = [-h - disc.abs().sqrt(), -h + disc.abs().sqrt()]
                .iter()
                .any(|t| (t - eps).abs() < 1e-3);
            if disc.abs() < 1e-2 || near_cutoff {
                continue;
            }

            match (sphere.intersect(&ray), expected) {
                (Some(t), Some(reference)) => {
                    hits += 1;
                    assert!((t as f64 - reference).abs() < 1e-3 * reference.max(1.0));
                    let distance = (ray.at(t) - center).length();
                    assert!(
                        (distance - radius).abs() < 1e-4 * radius.max(1.0),
                        "point at t={} is {} from the center, radius {}",
                        t,
                        distance,
                        radius
                    );
                }
                (None, None) => misses += 1,
                (actual, reference) => {
                    panic!("sphere.intersect gave {:?}, discriminant says {:?}", actual, reference)
                }
            }
        }
        assert!(hits > 1000 && misses > 1000, "hits {} misses {}", hits, misses);
    }
}

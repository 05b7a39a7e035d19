use crate::{Interval, Vec3};

/// A ray in 3D space with origin, direction, and a valid parameter range.
///
/// Points along the ray are `origin + t * direction` for `t` in
/// `(t_min, t_max)`. Primary rays run to infinity; shadow rays stop at the
/// light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub t_min: f32,
    pub t_max: f32,
}

impl Ray {
    /// Create a new ray valid over `(0, +inf)`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            t_min: 0.0,
            t_max: f32::INFINITY,
        }
    }

    /// Same ray, clipped to `t_max`.
    pub fn with_max(mut self, t_max: f32) -> Self {
        self.t_max = t_max;
        self
    }

    /// The valid parameter range as an interval.
    #[inline]
    pub fn range(&self) -> Interval {
        Interval::new(self.t_min, self.t_max)
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_range() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(ray.t_min, 0.0);
        assert_eq!(ray.t_max, f32::INFINITY);

        let shadow = ray.with_max(3.5);
        assert_eq!(shadow.range(), Interval::new(0.0, 3.5));
        assert!(shadow.range().surrounds(3.0));
        assert!(!shadow.range().surrounds(3.5));
    }
}

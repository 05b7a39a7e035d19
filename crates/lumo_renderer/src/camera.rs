//! Pinhole camera for primary ray generation.

use lumo_math::{Ray, Vec3};

/// Pinhole camera with an orthonormal world-space basis.
///
/// `u` points right, `v` up, and `n` backwards (away from what the camera
/// sees). The image plane sits `near_plane` units along `-n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    u: Vec3,
    v: Vec3,
    n: Vec3,

    near_plane: f32,
    view_angle: f32, // Vertical field of view in degrees
    aspect_ratio: f32,

    // Explicit window height; derived from the view angle when unset
    window_height: Option<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Camera at the origin looking down -Z with +Y up.
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            n: Vec3::Z,
            near_plane: 1.0,
            view_angle: 45.0,
            aspect_ratio: 1.0,
            window_height: None,
        }
    }

    /// Place the camera at `eye` looking at `target`.
    pub fn with_position(mut self, eye: Vec3, target: Vec3, up: Vec3) -> Self {
        self.position = eye;
        self.n = (eye - target).normalize();
        self.u = up.cross(self.n).normalize();
        self.v = self.n.cross(self.u);
        self
    }

    /// Set the position and basis directly. The basis must be orthonormal.
    pub fn with_basis(mut self, position: Vec3, u: Vec3, v: Vec3, n: Vec3) -> Self {
        self.position = position;
        self.u = u;
        self.v = v;
        self.n = n;
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_view_angle(mut self, degrees: f32) -> Self {
        self.view_angle = degrees;
        self
    }

    /// Width over height of the window.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_near_plane(mut self, near_plane: f32) -> Self {
        self.near_plane = near_plane;
        self
    }

    /// Override the window height instead of deriving it from the view angle.
    pub fn with_window_height(mut self, height: f32) -> Self {
        self.window_height = Some(height);
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Camera-to-world basis `(u, v, n)`.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.n)
    }

    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    pub fn view_angle(&self) -> f32 {
        self.view_angle
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Height of the window on the near plane.
    pub fn window_height(&self) -> f32 {
        self.window_height.unwrap_or_else(|| {
            2.0 * self.near_plane * (self.view_angle.to_radians() * 0.5).tan()
        })
    }

    pub fn window_width(&self) -> f32 {
        self.window_height() * self.aspect_ratio
    }

    /// Primary ray through the center of pixel `(i, j)` of an `m` x `n`
    /// image, with `j = 0` at the top.
    pub fn make_ray(&self, i: u32, j: u32, m: u32, n: u32) -> Ray {
        let h = self.window_height();
        let w = h * self.aspect_ratio;

        let xp = w * (i as f32 + 0.5) / m as f32 - w * 0.5;
        let yp = h * 0.5 - h * (j as f32 + 0.5) / n as f32;

        let direction = (xp * self.u + yp * self.v - self.near_plane * self.n).normalize();
        Ray::new(self.position, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_at_basis() {
        let camera = Camera::new().with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let (u, v, n) = camera.basis();
        assert!((u - Vec3::X).length() < 1e-6);
        assert!((v - Vec3::Y).length() < 1e-6);
        assert!((n - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_window_size() {
        let camera = Camera::new()
            .with_view_angle(90.0)
            .with_near_plane(2.0)
            .with_aspect_ratio(1.5);
        assert!((camera.window_height() - 4.0).abs() < 1e-5);
        assert!((camera.window_width() - 6.0).abs() < 1e-5);

        let explicit = camera.with_window_height(1.0);
        assert_eq!(explicit.window_height(), 1.0);
        assert_eq!(explicit.window_width(), 1.5);
    }

    #[test]
    fn test_center_ray() {
        let camera = Camera::new().with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let ray = camera.make_ray(5, 5, 11, 11);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 5.0));
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_corner_rays() {
        let camera = Camera::new().with_view_angle(90.0);
        let top_left = camera.make_ray(0, 0, 2, 2);
        let bottom_right = camera.make_ray(1, 1, 2, 2);

        assert!(top_left.direction.x < 0.0 && top_left.direction.y > 0.0);
        assert!(bottom_right.direction.x > 0.0 && bottom_right.direction.y < 0.0);
        assert!((top_left.direction.length() - 1.0).abs() < 1e-6);

        // Pixel centers sit at a quarter of the window: (-0.5, 0.5, -1)
        let expected = Vec3::new(-0.5, 0.5, -1.0).normalize();
        assert!((top_left.direction - expected).length() < 1e-5);
    }
}

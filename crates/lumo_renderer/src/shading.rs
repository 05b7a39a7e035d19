//! Microfacet reflectance used for direct lighting.
//!
//! Lambertian diffuse plus a Cook-Torrance specular lobe built from a
//! Schlick Fresnel term, the GGX distribution and the Smith-Schlick
//! geometry term.

use std::f32::consts::PI;

use lumo_core::{Color, Material};
use lumo_math::Vec3;

/// Floor applied to cosines so grazing angles never divide by zero.
pub const COSINE_EPSILON: f32 = 0.01;

/// Fresnel reflectance of dielectrics at normal incidence.
const DIELECTRIC_F0: f32 = 0.04;

/// Smallest GGX alpha; a perfectly smooth surface would be a delta lobe.
const MIN_ALPHA: f32 = 1e-3;

/// Surface parameters seen by the BRDF.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceParams {
    pub diffuse: Color,
    pub specular: Color,
    pub rugosity: f32,
    pub metal_factor: f32,
}

impl SurfaceParams {
    pub fn new(material: &Material, rugosity: f32, metal_factor: f32) -> Self {
        Self {
            diffuse: material.diffuse,
            specular: material.specular,
            rugosity,
            metal_factor,
        }
    }

    /// Lambertian term; metals have no diffuse lobe.
    pub fn diffuse_brdf(&self) -> Color {
        self.diffuse * (1.0 - self.metal_factor) / PI
    }

    /// Cook-Torrance specular term for unit normal `n`, view `v` and light `l`.
    pub fn specular_brdf(&self, n: Vec3, v: Vec3, l: Vec3) -> Color {
        let h = (l + v).normalize_or_zero();
        let n_dot_l = n.dot(l).max(COSINE_EPSILON);
        let n_dot_v = n.dot(v).max(COSINE_EPSILON);
        let n_dot_h = n.dot(h).max(COSINE_EPSILON);
        let l_dot_h = l.dot(h).max(COSINE_EPSILON);

        let f0 = lerp3(Color::splat(DIELECTRIC_F0), self.specular, self.metal_factor);
        let f = schlick_fresnel3(f0, l_dot_h);
        let d = ggx_d(n_dot_h, self.rugosity);
        let g = smith_g_schlick(n_dot_l, n_dot_v, self.rugosity);

        f * (g * d / (4.0 * n_dot_l * n_dot_v))
    }

    /// Full BRDF times the clamped cosine, before the light color.
    pub fn reflectance(&self, n: Vec3, v: Vec3, l: Vec3) -> Color {
        let n_dot_l = n.dot(l).max(COSINE_EPSILON);
        (self.diffuse_brdf() + self.specular_brdf(n, v, l)) * n_dot_l
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Linear interpolation for colors.
#[inline]
fn lerp3(a: Color, b: Color, t: f32) -> Color {
    a + t * (b - a)
}

/// (1 - cos_theta)^5
#[inline]
fn schlick_weight(cos_theta: f32) -> f32 {
    let x = (1.0 - cos_theta).clamp(0.0, 1.0);
    let x2 = x * x;
    x2 * x2 * x
}

/// Schlick Fresnel approximation.
#[inline]
pub fn schlick_fresnel3(f0: Color, cos_theta: f32) -> Color {
    f0 + (Color::ONE - f0) * schlick_weight(cos_theta)
}

/// GGX/Trowbridge-Reitz distribution with alpha = rugosity^2.
#[inline]
pub fn ggx_d(n_dot_h: f32, rugosity: f32) -> f32 {
    let alpha = (rugosity * rugosity).max(MIN_ALPHA);
    let a2 = alpha * alpha;
    let denom = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom)
}

/// Smith geometry term with the Schlick-GGX approximation, k = (r + 1)^2 / 8.
#[inline]
pub fn smith_g_schlick(n_dot_l: f32, n_dot_v: f32, rugosity: f32) -> f32 {
    let r = rugosity + 1.0;
    let k = r * r / 8.0;
    let g1_l = n_dot_l / (n_dot_l * (1.0 - k) + k);
    let g1_v = n_dot_v / (n_dot_v * (1.0 - k) + k);
    g1_l * g1_v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schlick_weight() {
        assert!((schlick_weight(1.0) - 0.0).abs() < 0.001);
        assert!((schlick_weight(0.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_fresnel_limits() {
        let f0 = Color::new(0.9, 0.6, 0.2);
        assert!((schlick_fresnel3(f0, 1.0) - f0).length() < 1e-6);
        assert!((schlick_fresnel3(f0, 0.0) - Color::ONE).length() < 1e-6);
    }

    #[test]
    fn test_ggx_peak() {
        // At n.h = 1 the distribution is 1 / (pi * alpha^2)
        let d = ggx_d(1.0, 0.5);
        assert!((d - 1.0 / (PI * 0.0625)).abs() < 1e-3);

        // Rougher surfaces have a lower peak
        assert!(ggx_d(1.0, 0.9) < d);
        assert!(ggx_d(1.0, 0.0).is_finite());
    }

    #[test]
    fn test_smith_bounds() {
        assert!((smith_g_schlick(1.0, 1.0, 0.5) - 1.0).abs() < 1e-6);
        let g = smith_g_schlick(0.1, 0.3, 0.7);
        assert!(g > 0.0 && g < 1.0);
    }

    #[test]
    fn test_metal_has_no_diffuse() {
        let material = Material::new("gold", Color::new(1.0, 0.8, 0.3));
        let metal = SurfaceParams::new(&material, 0.3, 1.0);
        assert_eq!(metal.diffuse_brdf(), Color::ZERO);

        let plastic = SurfaceParams::new(&material, 0.3, 0.0);
        assert!((plastic.diffuse_brdf() - material.diffuse / PI).length() < 1e-6);
    }

    #[test]
    fn test_head_on_reflectance() {
        // Light, view and normal aligned: F = 0.04, G = 1, D = 1 / (pi alpha^2)
        let material = Material::new("grey", Color::splat(0.5));
        let surface = SurfaceParams::new(&material, 0.5, 0.0);
        let r = surface.reflectance(Vec3::Y, Vec3::Y, Vec3::Y) * PI;
        let expected = 0.5 + 0.04 / (4.0 * 0.0625);
        assert!((r - Color::splat(expected)).length() < 1e-4);
    }

    #[test]
    fn test_grazing_light_stays_finite() {
        let surface = SurfaceParams::new(&Material::default(), 0.2, 0.5);
        let r = surface.reflectance(Vec3::Y, Vec3::Y, Vec3::X);
        assert!(r.is_finite());
        let opposite = surface.reflectance(Vec3::Y, Vec3::Y, Vec3::NEG_Y);
        assert!(opposite.is_finite());
    }
}

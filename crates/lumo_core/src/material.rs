//! Surface material parameters.

use lumo_math::Vec3;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Phong-style material description.
///
/// The ray caster reads `ambient`, `diffuse` and `specular`; `shininess`,
/// `transparency` and `ior` are carried for editors and the preview path.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Material name (for scene dumps and lookups)
    pub name: String,

    /// Reflectance under ambient light
    pub ambient: Color,

    /// Diffuse/albedo color (RGB, 0-1)
    pub diffuse: Color,

    /// Specular color; Fresnel reflectance at normal incidence for metals
    pub specular: Color,

    /// Phong exponent
    pub shininess: f32,

    /// Transmitted color (black = opaque)
    pub transparency: Color,

    /// Index of refraction
    pub ior: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", Color::new(1.0, 1.0, 1.0))
    }
}

impl Material {
    /// Material with the usual defaults derived from one base color:
    /// ambient is a fifth of the color, specular is white.
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            ambient: color * 0.2,
            diffuse: color,
            specular: Color::ONE,
            shininess: 20.0,
            transparency: Color::ZERO,
            ior: 1.0,
        }
    }

    /// Builder method to set the specular color.
    pub fn with_specular(mut self, specular: Color) -> Self {
        self.specular = specular;
        self
    }

    /// Builder method to set the ambient color.
    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn is_opaque(&self) -> bool {
        self.transparency == Color::ZERO
    }
}

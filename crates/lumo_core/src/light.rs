//! Punctual light sources.

use lumo_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::Color;

/// How a light is placed in the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightType {
    /// Emits in every direction from `position`.
    #[default]
    Point,
    /// Parallel rays travelling along `direction`, infinitely far away.
    Directional,
    /// Point light restricted to a cone around `direction`.
    Spot,
}

/// Intensity attenuation with distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Falloff {
    #[default]
    Constant,
    Linear,
    Quadratic,
}

/// What a light delivers to one surface point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSample {
    /// Unit vector from the point towards the light.
    pub direction: Vec3,
    /// Distance to the light; infinite for directional lights.
    pub distance: f32,
    /// Light color after falloff.
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    /// Emission direction for directional and spot lights.
    pub direction: Vec3,
    pub color: Color,
    pub light_type: LightType,
    pub falloff: Falloff,
    /// Full cone angle of a spot light, in degrees.
    pub spot_angle: f32,
    /// Lights that are off contribute nothing.
    pub on: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            color: Color::ONE,
            light_type: LightType::Point,
            falloff: Falloff::Constant,
            spot_angle: 60.0,
            on: true,
        }
    }
}

impl Light {
    pub fn point(position: Vec3, color: Color) -> Self {
        Self {
            position,
            color,
            ..Default::default()
        }
    }

    pub fn directional(direction: Vec3, color: Color) -> Self {
        Self {
            direction: direction.normalize(),
            color,
            light_type: LightType::Directional,
            ..Default::default()
        }
    }

    pub fn spot(position: Vec3, direction: Vec3, angle: f32, color: Color) -> Self {
        Self {
            position,
            direction: direction.normalize(),
            color,
            light_type: LightType::Spot,
            spot_angle: angle,
            ..Default::default()
        }
    }

    pub fn with_falloff(mut self, falloff: Falloff) -> Self {
        self.falloff = falloff;
        self
    }

    /// Light color reaching distance `d`.
    pub fn attenuated_color(&self, d: f32) -> Color {
        match self.falloff {
            Falloff::Constant => self.color,
            Falloff::Linear => self.color / d,
            Falloff::Quadratic => self.color / (d * d),
        }
    }

    /// Direction, distance and color of this light as seen from `p`.
    ///
    /// Returns `None` when the light is off or `p` is outside a spot cone.
    pub fn sample(&self, p: Vec3) -> Option<LightSample> {
        if !self.on {
            return None;
        }

        if self.light_type == LightType::Directional {
            return Some(LightSample {
                direction: -self.direction,
                distance: f32::INFINITY,
                color: self.color,
            });
        }

        let to_light = self.position - p;
        let distance = to_light.length();
        let direction = to_light / distance;

        if self.light_type == LightType::Spot {
            let cos_half = (self.spot_angle.to_radians() * 0.5).cos();
            if (-direction).dot(self.direction) < cos_half {
                return None;
            }
        }

        Some(LightSample {
            direction,
            distance,
            color: self.attenuated_color(distance),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falloff() {
        let light = Light::point(Vec3::ZERO, Color::splat(4.0));
        assert_eq!(light.attenuated_color(2.0), Color::splat(4.0));

        let linear = light.clone().with_falloff(Falloff::Linear);
        assert_eq!(linear.attenuated_color(2.0), Color::splat(2.0));

        let quadratic = light.with_falloff(Falloff::Quadratic);
        assert_eq!(quadratic.attenuated_color(2.0), Color::splat(1.0));
    }

    #[test]
    fn test_point_sample() {
        let light = Light::point(Vec3::new(0.0, 4.0, 0.0), Color::ONE);
        let s = light.sample(Vec3::ZERO).expect("light is on");
        assert_eq!(s.direction, Vec3::Y);
        assert_eq!(s.distance, 4.0);
        assert_eq!(s.color, Color::ONE);
    }

    #[test]
    fn test_off_light_contributes_nothing() {
        let mut light = Light::point(Vec3::Y, Color::ONE);
        light.on = false;
        assert!(light.sample(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_directional_sample() {
        let light = Light::directional(Vec3::new(0.0, -2.0, 0.0), Color::ONE);
        let s = light.sample(Vec3::new(5.0, 0.0, 3.0)).expect("light is on");
        assert_eq!(s.direction, Vec3::Y);
        assert!(s.distance.is_infinite());
    }

    #[test]
    fn test_spot_cone() {
        let light = Light::spot(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y, 30.0, Color::ONE);
        assert!(light.sample(Vec3::ZERO).is_some());
        assert!(light.sample(Vec3::new(10.0, 0.0, 0.0)).is_none());
    }
}

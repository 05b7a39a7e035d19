//! JSON scene description.
//!
//! Every section is optional; missing values fall back to the same defaults
//! the library uses. Vectors are written as `[x, y, z]` arrays and angles
//! in degrees.

use std::collections::HashMap;
use std::sync::Arc;

use lumo_core::{Actor, BoxShape, Color, Falloff, Light, LightType, Material, Plane, Scene, Shape, Sphere};
use lumo_math::{Vec2, Vec3};
use lumo_renderer::{BvhConfig, Camera, RenderConfig, SplitMethod};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub image: ImageDesc,
    pub camera: CameraDesc,
    pub render: RenderDesc,
    pub background: [f32; 3],
    pub ambient: [f32; 3],
    pub materials: Vec<MaterialDesc>,
    pub actors: Vec<ActorDesc>,
    pub lights: Vec<LightDesc>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            image: ImageDesc::default(),
            camera: CameraDesc::default(),
            render: RenderDesc::default(),
            background: [0.0; 3],
            ambient: [0.2; 3],
            materials: Vec::new(),
            actors: Vec::new(),
            lights: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageDesc {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CameraDesc {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 5.0],
            target: [0.0; 3],
            up: [0.0, 1.0, 0.0],
            fov: 45.0,
            near: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDesc {
    Median,
    #[default]
    Sah,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderDesc {
    pub use_bvh: bool,
    pub max_leaf_size: usize,
    pub split: SplitDesc,
    pub shadow_bias: f32,
}

impl Default for RenderDesc {
    fn default() -> Self {
        let config = RenderConfig::default();
        Self {
            use_bvh: config.use_bvh,
            max_leaf_size: config.bvh.max_leaf_size,
            split: SplitDesc::Sah,
            shadow_bias: config.shadow_bias,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MaterialDesc {
    pub name: String,
    pub color: [f32; 3],
    pub ambient: Option<[f32; 3]>,
    pub specular: Option<[f32; 3]>,
    pub shininess: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ShapeDesc {
    Sphere {
        center: [f32; 3],
        radius: f32,
    },
    Plane {
        point: [f32; 3],
        /// Facing direction; takes precedence over `angles`
        normal: Option<[f32; 3]>,
        #[serde(default)]
        angles: [f32; 3],
        #[serde(default = "unit_size")]
        size: [f32; 2],
    },
    Box {
        min: [f32; 3],
        max: [f32; 3],
    },
}

fn unit_size() -> [f32; 2] {
    [1.0, 1.0]
}

#[derive(Debug, Deserialize)]
pub struct ActorDesc {
    #[serde(flatten)]
    pub shape: ShapeDesc,
    pub name: Option<String>,
    pub material: Option<String>,
    pub rugosity: Option<f32>,
    pub metal: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LightDesc {
    #[serde(rename = "type")]
    pub light_type: LightType,
    pub position: [f32; 3],
    pub direction: [f32; 3],
    pub color: [f32; 3],
    pub falloff: Falloff,
    /// Spot cone angle in degrees
    pub angle: f32,
    pub on: bool,
}

impl Default for LightDesc {
    fn default() -> Self {
        let light = Light::default();
        Self {
            light_type: light.light_type,
            position: light.position.to_array(),
            direction: light.direction.to_array(),
            color: light.color.to_array(),
            falloff: light.falloff,
            angle: light.spot_angle,
            on: light.on,
        }
    }
}

impl ShapeDesc {
    fn to_shape(&self) -> Box<dyn Shape> {
        match self {
            ShapeDesc::Sphere { center, radius } => {
                Box::new(Sphere::at(Vec3::from_array(*center), *radius))
            }
            ShapeDesc::Plane {
                point,
                normal,
                angles,
                size,
            } => {
                let point = Vec3::from_array(*point);
                let size = Vec2::from_array(*size);
                match normal {
                    Some(n) => Box::new(Plane::through(point, Vec3::from_array(*n), size)),
                    None => {
                        let radians = Vec3::from_array(*angles) * std::f32::consts::PI / 180.0;
                        Box::new(Plane::with_pose(point, radians, size))
                    }
                }
            }
            ShapeDesc::Box { min, max } => Box::new(BoxShape::from_corners(
                Vec3::from_array(*min),
                Vec3::from_array(*max),
            )),
        }
    }
}

impl LightDesc {
    fn to_light(&self) -> Light {
        Light {
            position: Vec3::from_array(self.position),
            direction: Vec3::from_array(self.direction).normalize(),
            color: Color::from_array(self.color),
            light_type: self.light_type,
            falloff: self.falloff,
            spot_angle: self.angle,
            on: self.on,
        }
    }
}

impl SceneDescription {
    pub fn render_config(&self) -> RenderConfig {
        let split_method = match self.render.split {
            SplitDesc::Median => SplitMethod::Median,
            SplitDesc::Sah => SplitMethod::Sah,
        };
        RenderConfig::default()
            .with_resolution(self.image.width, self.image.height)
            .with_bvh(self.render.use_bvh)
            .with_bvh_config(
                BvhConfig::default()
                    .with_max_leaf_size(self.render.max_leaf_size)
                    .with_split_method(split_method),
            )
            .with_shadow_bias(self.render.shadow_bias)
    }

    pub fn camera(&self) -> Camera {
        let c = &self.camera;
        Camera::new()
            .with_position(
                Vec3::from_array(c.eye),
                Vec3::from_array(c.target),
                Vec3::from_array(c.up),
            )
            .with_view_angle(c.fov)
            .with_near_plane(c.near)
            .with_aspect_ratio(self.image.width as f32 / self.image.height.max(1) as f32)
    }

    /// Build the scene. Actors naming an unknown material get the default one.
    pub fn scene(&self) -> Scene {
        let mut scene = Scene::new();
        scene.set_background_color(Color::from_array(self.background));
        scene.set_ambient_light(Color::from_array(self.ambient));

        let materials: HashMap<&str, Arc<Material>> = self
            .materials
            .iter()
            .map(|m| {
                let mut material = Material::new(m.name.clone(), Color::from_array(m.color));
                if let Some(ambient) = m.ambient {
                    material = material.with_ambient(Color::from_array(ambient));
                }
                if let Some(specular) = m.specular {
                    material = material.with_specular(Color::from_array(specular));
                }
                if let Some(shininess) = m.shininess {
                    material = material.with_shininess(shininess);
                }
                (m.name.as_str(), Arc::new(material))
            })
            .collect();
        let fallback = Arc::new(Material::default());

        for desc in &self.actors {
            let material = match desc.material.as_deref() {
                Some(name) => match materials.get(name) {
                    Some(m) => m.clone(),
                    None => {
                        log::warn!("Unknown material '{}', using default", name);
                        fallback.clone()
                    }
                },
                None => fallback.clone(),
            };

            let mut actor = Actor::from_boxed(desc.shape.to_shape(), material);
            if let Some(name) = &desc.name {
                actor = actor.with_name(name.clone());
            }
            if let Some(rugosity) = desc.rugosity {
                actor.set_rugosity(rugosity);
            }
            if let Some(metal) = desc.metal {
                actor.set_metal_factor(metal);
            }
            scene.add_actor(actor);
        }

        for light in &self.lights {
            scene.add_light(light.to_light());
        }

        if scene.actor_count() == 0 {
            log::warn!("Scene has no actors; the image will be background only");
        }
        if scene.light_count() == 0 {
            log::warn!("Scene has no lights; only ambient light will show");
        }

        scene
    }
}

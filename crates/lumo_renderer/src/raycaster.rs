//! Direct-lighting ray caster.
//!
//! One primary ray per pixel, one shadow ray per light. The raycaster keeps
//! a shared snapshot of the scene and a BVH built over its actors; edits go
//! through [`Raycaster::edit_scene`] so the two never drift apart.

use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Instant;

use lumo_core::{Actor, ActorId, Color, Scene};
use lumo_math::{Interval, Ray, Vec3};
use rayon::prelude::*;

use crate::bvh::{intersect_linear, occluded_linear, Bvh, BvhConfig};
use crate::camera::Camera;
use crate::image::ImageBuffer;
use crate::shading::SurfaceParams;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Use the BVH instead of testing every actor
    pub use_bvh: bool,
    /// BVH build settings
    pub bvh: BvhConfig,
    /// Shadow ray origin offset along the surface normal
    pub shadow_bias: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            use_bvh: true,
            bvh: BvhConfig::default(),
            shadow_bias: 1e-3,
        }
    }
}

impl RenderConfig {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_bvh(mut self, use_bvh: bool) -> Self {
        self.use_bvh = use_bvh;
        self
    }

    pub fn with_bvh_config(mut self, bvh: BvhConfig) -> Self {
        self.bvh = bvh;
        self
    }

    pub fn with_shadow_bias(mut self, shadow_bias: f32) -> Self {
        self.shadow_bias = shadow_bias;
        self
    }

    /// Width over height of the image.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Closest actor hit by a ray.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    pub actor: &'a Actor,
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

pub struct Raycaster {
    scene: Arc<Scene>,
    camera: Camera,
    config: RenderConfig,
    bvh: Option<Bvh>,
}

impl Raycaster {
    pub fn new(scene: Arc<Scene>, camera: Camera, config: RenderConfig) -> Self {
        let mut raycaster = Self {
            scene,
            camera,
            config,
            bvh: None,
        };
        raycaster.rebuild();
        raycaster
    }

    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The acceleration structure, if one is in use.
    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    pub fn set_scene(&mut self, scene: Arc<Scene>) {
        self.scene = scene;
        self.rebuild();
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
        self.rebuild();
    }

    /// Apply `edit` to the scene and rebuild the BVH.
    ///
    /// The scene is copied first if another owner still holds it.
    pub fn edit_scene<R>(&mut self, edit: impl FnOnce(&mut Scene) -> R) -> R {
        let result = edit(Arc::make_mut(&mut self.scene));
        self.rebuild();
        result
    }

    fn rebuild(&mut self) {
        self.bvh = None;
        if !self.config.use_bvh {
            return;
        }
        if self.scene.actor_count() == 0 {
            log::debug!("Empty scene, no BVH built");
            return;
        }

        match Bvh::build(self.scene.actors(), &self.config.bvh) {
            Ok(bvh) => self.bvh = Some(bvh),
            Err(e) => log::warn!("BVH build failed, falling back to linear scan: {}", e),
        }
    }

    /// Primary ray through pixel `(i, j)`, `j = 0` at the top.
    pub fn make_ray(&self, i: u32, j: u32) -> Ray {
        self.camera
            .make_ray(i, j, self.config.width, self.config.height)
    }

    /// Closest actor along `ray`.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let actors = self.scene.actors();
        let hit = match &self.bvh {
            Some(bvh) => bvh.intersect(actors, ray),
            None => intersect_linear(actors, ray),
        }?;

        let actor = &actors[hit.primitive];
        let point = ray.at(hit.distance);
        Some(Intersection {
            actor,
            distance: hit.distance,
            point,
            normal: actor.shape().normal_at(point),
        })
    }

    /// True if any actor blocks `ray` within its range.
    pub fn occluded(&self, ray: &Ray) -> bool {
        let actors = self.scene.actors();
        match &self.bvh {
            Some(bvh) => bvh.occluded(actors, ray),
            None => occluded_linear(actors, ray),
        }
    }

    /// Color seen along `ray`.
    pub fn shoot(&self, ray: &Ray) -> Color {
        match self.intersect(ray) {
            Some(hit) => self.shade(&hit, ray),
            None => self.scene.background_color,
        }
    }

    fn shade(&self, hit: &Intersection<'_>, ray: &Ray) -> Color {
        let material = hit.actor.material();
        let surface = SurfaceParams::new(material, hit.actor.rugosity(), hit.actor.metal_factor());
        let n = hit.normal;
        let v = -ray.direction.normalize();
        let shadow_origin = hit.point + n * self.config.shadow_bias;

        let base = material.ambient * self.scene.ambient_light;

        let mut direct = Color::ZERO;
        for light in self.scene.lights() {
            let Some(sample) = light.sample(hit.point) else {
                continue;
            };

            let shadow_ray = Ray::new(shadow_origin, sample.direction).with_max(sample.distance);
            if self.occluded(&shadow_ray) {
                continue;
            }

            direct += sample.color * surface.reflectance(n, v, sample.direction);
        }

        (base + direct * PI).map(|c| Interval::UNIT.clamp(c))
    }

    /// Actor visible at pixel `(i, j)`, `j = 0` at the top.
    pub fn pick(&self, i: u32, j: u32) -> Option<ActorId> {
        self.intersect(&self.make_ray(i, j)).map(|hit| hit.actor.id())
    }

    /// Render the whole image on the calling thread.
    pub fn render(&self) -> ImageBuffer {
        let (width, height) = (self.config.width, self.config.height);
        let start = Instant::now();

        let mut image = ImageBuffer::new(width, height);
        for j in 0..height {
            for i in 0..width {
                let color = self.shoot(&self.make_ray(i, j));
                image.set(i, height - 1 - j, color);
            }
        }

        log::info!("Rendered {}x{} in {:.2?}", width, height, start.elapsed());
        image
    }

    /// Render with one rayon task per image row. Produces the same buffer
    /// as [`Raycaster::render`].
    pub fn render_parallel(&self) -> ImageBuffer {
        let (width, height) = (self.config.width, self.config.height);
        let mut image = ImageBuffer::new(width, height);
        if width == 0 || height == 0 {
            return image;
        }

        let start = Instant::now();
        image
            .pixels
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(row, pixels)| {
                let j = height - 1 - row as u32;
                for (i, pixel) in pixels.iter_mut().enumerate() {
                    *pixel = self.shoot(&self.make_ray(i as u32, j));
                }
            });

        log::info!(
            "Rendered {}x{} on {} threads in {:.2?}",
            width,
            height,
            rayon::current_num_threads(),
            start.elapsed()
        );
        image
    }
}

//! Scene model: actors, lights, and the global colors the ray caster reads.
//!
//! A [`Scene`] is plain data. The renderer snapshots actor bounds into its
//! acceleration structure, so edits made here only show up after the
//! renderer rebuilds.

use std::fmt;
use std::sync::Arc;

use lumo_math::{Bounds3, Transform, Vec2, Vec3};
use thiserror::Error;

use crate::{BoxShape, Color, Light, Material, Plane, Shape, Sphere};

/// Errors raised by scene edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("No actor with id {0}")]
    ActorNotFound(ActorId),

    #[error("No light with id {0}")]
    LightNotFound(LightId),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Stable handle to an actor; survives removal of other actors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

/// Stable handle to a light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A shape with a material and two shading parameters.
#[derive(Clone, Debug)]
pub struct Actor {
    id: ActorId,

    /// Actor name (optional, for picking feedback and logs)
    pub name: String,

    shape: Box<dyn Shape>,

    /// Shared material
    material: Arc<Material>,

    /// Microfacet roughness (0=smooth, 1=rough)
    rugosity: f32,

    /// Metalness (0=dielectric, 1=metal)
    metal_factor: f32,
}

impl Actor {
    pub fn new(shape: impl Shape + 'static, material: Arc<Material>) -> Self {
        Self::from_boxed(Box::new(shape), material)
    }

    pub fn from_boxed(shape: Box<dyn Shape>, material: Arc<Material>) -> Self {
        Self {
            id: ActorId::default(),
            name: String::new(),
            shape,
            material,
            rugosity: 0.5,
            metal_factor: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder method to set roughness and metalness.
    pub fn with_shading(mut self, rugosity: f32, metal_factor: f32) -> Self {
        self.set_rugosity(rugosity);
        self.set_metal_factor(metal_factor);
        self
    }

    /// Id assigned when the actor was added to a scene.
    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }

    /// Swap the geometry, keeping material and shading parameters.
    pub fn set_shape(&mut self, shape: Box<dyn Shape>) {
        self.shape = shape;
    }

    pub fn transform(&self) -> &Transform {
        self.shape.transform()
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.shape.set_transform(transform);
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn set_material(&mut self, material: Arc<Material>) {
        self.material = material;
    }

    /// Edit this actor's material; other actors sharing it keep the original.
    pub fn material_mut(&mut self) -> &mut Material {
        Arc::make_mut(&mut self.material)
    }

    pub fn rugosity(&self) -> f32 {
        self.rugosity
    }

    pub fn set_rugosity(&mut self, rugosity: f32) {
        self.rugosity = rugosity.clamp(0.0, 1.0);
    }

    pub fn metal_factor(&self) -> f32 {
        self.metal_factor
    }

    pub fn set_metal_factor(&mut self, metal_factor: f32) {
        self.metal_factor = metal_factor.clamp(0.0, 1.0);
    }

    pub fn bounds(&self) -> Bounds3 {
        self.shape.bounds()
    }
}

/// Actors, lights and the colors used where nothing is hit or lit.
#[derive(Clone, Debug)]
pub struct Scene {
    actors: Vec<Actor>,
    lights: Vec<(LightId, Light)>,

    /// Color of pixels whose ray hits nothing
    pub background_color: Color,

    /// Ambient light multiplied by each material's ambient color
    pub ambient_light: Color,

    next_actor_id: u32,
    next_light_id: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            actors: Vec::new(),
            lights: Vec::new(),
            background_color: Color::ZERO,
            ambient_light: Color::splat(0.2),
            next_actor_id: 0,
            next_light_id: 0,
        }
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor and return its id.
    pub fn add_actor(&mut self, mut actor: Actor) -> ActorId {
        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;
        actor.id = id;
        log::debug!("Added {} actor {}", actor.shape.name(), id);
        self.actors.push(actor);
        id
    }

    /// Remove an actor, returning it.
    pub fn remove_actor(&mut self, id: ActorId) -> SceneResult<Actor> {
        let index = self
            .actors
            .iter()
            .position(|a| a.id == id)
            .ok_or(SceneError::ActorNotFound(id))?;
        Ok(self.actors.remove(index))
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> SceneResult<&mut Actor> {
        self.actors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(SceneError::ActorNotFound(id))
    }

    /// Actors in insertion order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        let id = LightId(self.next_light_id);
        self.next_light_id += 1;
        self.lights.push((id, light));
        id
    }

    pub fn remove_light(&mut self, id: LightId) -> SceneResult<Light> {
        let index = self
            .lights
            .iter()
            .position(|(lid, _)| *lid == id)
            .ok_or(SceneError::LightNotFound(id))?;
        Ok(self.lights.remove(index).1)
    }

    pub fn light_mut(&mut self, id: LightId) -> SceneResult<&mut Light> {
        self.lights
            .iter_mut()
            .find(|(lid, _)| *lid == id)
            .map(|(_, light)| light)
            .ok_or(SceneError::LightNotFound(id))
    }

    /// Lights in insertion order.
    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter().map(|(_, light)| light)
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    pub fn set_ambient_light(&mut self, color: Color) {
        self.ambient_light = color;
    }

    /// Add a sphere actor centered at `center`.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: Arc<Material>) -> ActorId {
        self.add_actor(Actor::new(Sphere::at(center, radius), material))
    }

    /// Add a plane patch actor; see [`Plane::with_pose`].
    pub fn add_plane(
        &mut self,
        point: Vec3,
        angles: Vec3,
        scale: Vec2,
        material: Arc<Material>,
    ) -> ActorId {
        self.add_actor(Actor::new(Plane::with_pose(point, angles, scale), material))
    }

    /// Add a box actor between two opposite corners.
    pub fn add_box(&mut self, p1: Vec3, p2: Vec3, material: Arc<Material>) -> ActorId {
        self.add_actor(Actor::new(BoxShape::from_corners(p1, p2), material))
    }

    /// Add an always-on point light with constant falloff.
    pub fn add_point_light(&mut self, position: Vec3, color: Color) -> LightId {
        self.add_light(Light::point(position, color))
    }

    /// Union of all actor bounds; empty for an empty scene.
    pub fn world_bounds(&self) -> Bounds3 {
        self.actors
            .iter()
            .fold(Bounds3::EMPTY, |acc, actor| acc.union(&actor.bounds()))
    }
}

//! Lumo Core - scene model and analytic shapes for the Lumo ray caster.
//!
//! This crate provides:
//!
//! - **Shapes**: the [`Shape`] trait and its [`Sphere`], [`Plane`] and
//!   [`BoxShape`] implementations (intersection, normals, world bounds)
//! - **Scene model**: [`Material`], [`Light`], [`Actor`], [`Scene`]
//!
//! # Example
//!
//! ```ignore
//! use lumo_core::{Color, Material, Scene};
//!
//! let mut scene = Scene::new();
//! let red = Arc::new(Material::new("red", Color::new(1.0, 0.0, 0.0)));
//! scene.add_sphere(Vec3::ZERO, 1.0, red);
//! scene.add_point_light(Vec3::new(2.0, 5.0, 2.0), Color::ONE);
//! ```

pub mod box_shape;
pub mod light;
pub mod material;
pub mod plane;
pub mod scene;
pub mod shape;
pub mod sphere;

// Re-export commonly used types
pub use box_shape::BoxShape;
pub use light::{Falloff, Light, LightSample, LightType};
pub use material::{Color, Material};
pub use plane::Plane;
pub use scene::{Actor, ActorId, LightId, Scene, SceneError, SceneResult};
pub use shape::{Shape, HIT_EPSILON};
pub use sphere::Sphere;

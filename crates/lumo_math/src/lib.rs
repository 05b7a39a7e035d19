//! Lumo math - vectors, rays, bounds and transforms for the ray caster.
//!
//! Re-exports glam so downstream crates share a single vector type.

// Re-export glam for convenience
pub use glam::*;

mod bounds;
mod interval;
mod ray;
mod transform;

pub use bounds::Bounds3;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Transform;

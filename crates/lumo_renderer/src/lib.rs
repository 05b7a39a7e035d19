//! Lumo Renderer - BVH-accelerated CPU ray casting.
//!
//! One primary ray per pixel through a pinhole [`Camera`], direct lighting
//! from every light with shadow rays, and a microfacet BRDF. No recursion:
//! reflections and refraction are out of scope.

mod bvh;
mod camera;
mod image;
mod raycaster;
mod shading;

pub use bvh::{
    intersect_linear, occluded_linear, Bvh, BvhConfig, BvhError, BvhResult, Hit, NodeView,
    Primitive, SplitMethod,
};
pub use camera::Camera;
pub use image::{to_byte, ImageBuffer, RenderError, RenderResult};
pub use raycaster::{Intersection, RenderConfig, Raycaster};
pub use shading::{ggx_d, schlick_fresnel3, smith_g_schlick, SurfaceParams, COSINE_EPSILON};

/// Re-export common math types from lumo_math
pub use lumo_math::{Bounds3, Ray, Vec3};

//! Simple ray caster example.
//!
//! Renders a floor, a row of spheres with varying roughness, a few boxes and
//! two lights, then saves the result as PPM.

use std::sync::Arc;

use lumo_core::{Color, Falloff, Light, Material, Scene};
use lumo_renderer::{Camera, RenderConfig, Raycaster, Vec3};
use lumo_math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() {
    env_logger::init();

    println!("Lumo Ray Caster - Simple Example");
    println!("================================");

    let start = std::time::Instant::now();
    let scene = build_scene();
    println!(
        "Scene built in {:?}: {} actors, {} lights",
        start.elapsed(),
        scene.actor_count(),
        scene.light_count()
    );

    let config = RenderConfig::default().with_resolution(800, 450);
    let camera = Camera::new()
        .with_position(
            Vec3::new(0.0, 4.0, 14.0), // eye
            Vec3::new(0.0, 1.0, 0.0),  // target
            Vec3::new(0.0, 1.0, 0.0),  // up
        )
        .with_view_angle(40.0)
        .with_aspect_ratio(config.aspect_ratio());

    println!("Rendering {}x{}...", config.width, config.height);
    let raycaster = Raycaster::new(Arc::new(scene), camera, config);

    let start = std::time::Instant::now();
    let image = raycaster.render_parallel();
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    image.save_ppm(filename).expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();
    scene.set_background_color(Color::new(0.5, 0.7, 1.0));
    scene.set_ambient_light(Color::splat(0.3));

    // Ground
    let ground = Arc::new(Material::new("ground", Color::new(0.5, 0.5, 0.5)));
    scene.add_plane(Vec3::ZERO, Vec3::ZERO, Vec2::new(20.0, 20.0), ground);

    // Five spheres from mirror-smooth metal to rough plastic
    let gold = Arc::new(
        Material::new("gold", Color::new(1.0, 0.78, 0.34)).with_specular(Color::new(1.0, 0.78, 0.34)),
    );
    for k in 0..5 {
        let t = k as f32 / 4.0;
        let id = scene.add_sphere(Vec3::new(-6.0 + 3.0 * k as f32, 1.0, 0.0), 1.0, gold.clone());
        if let Ok(actor) = scene.actor_mut(id) {
            actor.set_rugosity(0.1 + 0.8 * t);
            actor.set_metal_factor(1.0 - t);
        }
    }

    // A few randomly tinted boxes behind them
    let mut rng = StdRng::seed_from_u64(2024);
    for k in 0..6 {
        let color = Color::new(rng.gen(), rng.gen(), rng.gen());
        let material = Arc::new(Material::new(format!("box{}", k), color));
        let corner = Vec3::new(-7.5 + 2.5 * k as f32, 0.0, -4.0 - rng.gen::<f32>() * 2.0);
        let size = Vec3::new(1.5, 1.0 + rng.gen::<f32>() * 2.0, 1.5);
        scene.add_box(corner, corner + size, material);
    }

    scene.add_point_light(Vec3::new(5.0, 10.0, 8.0), Color::splat(0.8));
    scene.add_light(
        Light::spot(Vec3::new(-6.0, 8.0, 4.0), Vec3::new(0.5, -1.0, -0.4), 50.0, Color::splat(30.0))
            .with_falloff(Falloff::Quadratic),
    );

    scene
}

//! Lumo command line renderer.
//!
//! Usage: lumo <scene.json> <out.ppm> [out.png]

mod description;

use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use lumo_renderer::Raycaster;

use crate::description::SceneDescription;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <scene.json> <out.ppm> [out.png]", args[0]);
        std::process::exit(1);
    }

    let scene_path = &args[1];
    let text = fs::read_to_string(scene_path)
        .with_context(|| format!("Failed to read scene file {}", scene_path))?;
    let desc: SceneDescription = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse scene file {}", scene_path))?;

    let scene = desc.scene();
    let config = desc.render_config();
    log::info!(
        "Loaded {}: {} actors, {} lights, {}x{}",
        scene_path,
        scene.actor_count(),
        scene.light_count(),
        config.width,
        config.height
    );

    let raycaster = Raycaster::new(Arc::new(scene), desc.camera(), config);
    let output = raycaster.render_parallel();

    let ppm_path = &args[2];
    output
        .save_ppm(ppm_path)
        .with_context(|| format!("Failed to write {}", ppm_path))?;
    log::info!("Saved {}", ppm_path);

    if let Some(png_path) = args.get(3) {
        let buffer = image::RgbImage::from_raw(output.width, output.height, output.to_rgb8())
            .context("Image buffer size does not match its dimensions")?;
        buffer
            .save(png_path)
            .with_context(|| format!("Failed to write {}", png_path))?;
        log::info!("Saved {}", png_path);
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scene::{Material, Scene};

/// Convert a glTF 2.0 asset into a packed scene file.
#[derive(Parser)]
#[command(name = "asset_builder")]
struct Args {
    /// Input .gltf or .glb file
    input: PathBuf,

    /// Output packed scene file
    output: PathBuf,

    /// Uniform scale applied to every vertex
    #[arg(long, default_value_t = 1.0)]
    scale: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    let materials = vec![Material::default_with_id(0)];
    let meshes = asset::import_gltf(&args.input, args.scale, &materials)
        .with_context(|| format!("Failed to import {}", args.input.display()))?;

    let scene = Scene {
        meshes,
        materials,
        textures: Vec::new(),
    };

    let vertices: usize = scene.meshes.iter().map(|m| m.vertex_count()).sum();
    let triangles: usize = scene.meshes.iter().map(|m| m.triangle_count()).sum();
    info!("Scene: {} meshes, {} vertices, {} triangles", scene.meshes.len(), vertices, triangles);

    asset::save_scene_file(&args.output, &scene)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use math::{
    vec::Vec4,
    mat::Mat4,
};
use scene::{Material, Scene};

/// Load a glTF asset (or a packed .scene file) the way the ray tracer does and
/// report what ends up in memory.
#[derive(Parser)]
#[command(name = "raytrace")]
struct Args {
    /// .gltf, .glb or packed .scene file
    #[arg(default_value = "res/scene.glb")]
    path: PathBuf,

    /// Uniform scale applied to glTF vertices
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Rotate y up assets into the renderer's z up frame
    #[arg(long)]
    z_up: bool,
}

fn load(args: &Args) -> Result<Scene> {
    if asset::file_extension(&args.path.to_string_lossy()) == "scene" {
        return asset::load_scene_file(&args.path)
            .with_context(|| format!("Failed to open scene file {}", args.path.display()));
    }

    let mut scene = Scene::new();
    scene.materials.push(Material::default_with_id(0));

    if !asset::load_gltf(&args.path, args.scale, &mut scene.meshes, &scene.materials, &mut scene.textures) {
        bail!("Failed to load glTF {}", args.path.display());
    }
    Ok(scene)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut scene = load(&args)?;

    if args.z_up {
        let to_z_up = Mat4::from_columns(&[
            Vec4::new(1., 0., 0., 0.),
            Vec4::new(0., 0., 1., 0.),
            Vec4::new(0., 1., 0., 0.),
            Vec4::new(0., 0., 0., 1.),
        ]).transpose();

        for m in scene.meshes.iter_mut() {
            m.pivot_xform = to_z_up * m.pivot_xform;
        }
    }

    for m in &scene.meshes {
        info!(
            "{:<24} {:>8} vertices {:>8} triangles  pivot {:.3}  extents {:.3}",
            m.name,
            m.vertex_count(),
            m.triangle_count(),
            m.pivot_xform.get_translation(),
            m.bounds().extents(),
        );
    }

    let triangles: usize = scene.meshes.iter().map(|m| m.triangle_count()).sum();
    info!("Scene: {} meshes, {} triangles, {} materials", scene.meshes.len(), triangles, scene.materials.len());

    Ok(())
}

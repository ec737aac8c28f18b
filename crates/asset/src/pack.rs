use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use scene::{Deserialize, Scene, Serialize};
use tracing::info;

use crate::error::AssetError;

// lz4 blocks are limited to i32 sizes.
const CHUNK_SIZE: usize = 1024 * 1024 * 1024;

/// Writes `scene` as a sequence of `[u32 compressed size][lz4 block]` chunks.
/// Each block carries its uncompressed size in its first 4 bytes.
pub fn save_scene_file(path: &Path, scene: &Scene) -> Result<(), AssetError> {
    let io_error = |e: std::io::Error| AssetError::Io(path.to_path_buf(), e);

    let data = scene.serialize();
    let mut file = BufWriter::new(File::create(path).map_err(io_error)?);
    let mut written = 0;
    for c in data.chunks(CHUNK_SIZE) {
        let compressed = lz4::block::compress(c, None, true).map_err(io_error)?;
        file.write_all(&(compressed.len() as u32).to_le_bytes()).map_err(io_error)?;
        file.write_all(&compressed).map_err(io_error)?;
        written += 4 + compressed.len();
    }
    file.flush().map_err(io_error)?;

    info!(
        "wrote scene '{}': {} meshes, {} bytes ({} uncompressed)",
        path.display(),
        scene.meshes.len(),
        written,
        data.len()
    );
    Ok(())
}

fn decompress_chunks(mut view: &[u8]) -> Result<Vec<u8>, String> {
    let mut data = Vec::new();
    while !view.is_empty() {
        if view.len() < 4 {
            return Err(format!("truncated chunk header ({} bytes)", view.len()));
        }
        let mut header = [0u8; 4];
        header.copy_from_slice(&view[..4]);
        let c_size = u32::from_le_bytes(header) as usize;

        let block = view
            .get(4..4 + c_size)
            .ok_or_else(|| format!("chunk of {} bytes, {} available", c_size, view.len() - 4))?;
        if block.len() < 4 {
            return Err(format!("chunk of {} bytes has no size prefix", block.len()));
        }
        header.copy_from_slice(&block[..4]);
        let size = u32::from_le_bytes(header) as usize;
        if size > CHUNK_SIZE {
            return Err(format!("chunk size {size} exceeds {CHUNK_SIZE}"));
        }

        let chunk = lz4::block::decompress(&block[4..], Some(size as i32)).map_err(|e| e.to_string())?;
        data.extend_from_slice(&chunk);

        view = &view[4 + c_size..];
    }
    Ok(data)
}

pub fn load_scene_file(path: &Path) -> Result<Scene, AssetError> {
    let compressed = std::fs::read(path).map_err(|e| AssetError::Io(path.to_path_buf(), e))?;
    let data = decompress_chunks(&compressed)
        .map_err(|msg| AssetError::Corrupt(path.to_path_buf(), msg))?;

    let mut view = &data[..];
    let scene = Scene::deserialize(&mut view)?;
    if !view.is_empty() {
        return Err(AssetError::Corrupt(
            path.to_path_buf(),
            format!("{} trailing bytes", view.len()),
        ));
    }

    info!("loaded scene '{}': {} meshes", path.display(), scene.meshes.len());
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use math::{mat::Mat4, vec::Vec3};
    use scene::{Material, Mesh};

    fn scene() -> Scene {
        let mut mesh = Mesh::new("tri");
        mesh.vertices = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        mesh.faces = vec![0, 1, 2];
        mesh.material_ids = vec![3; 3];
        mesh.pivot_xform = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));

        Scene {
            meshes: vec![mesh],
            materials: vec![Material::default_with_id(3)],
            textures: Vec::new(),
        }
    }

    #[test]
    fn scene_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.scene");

        save_scene_file(&path, &scene()).unwrap();
        assert_eq!(load_scene_file(&path).unwrap(), scene());
    }

    #[test]
    fn truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.scene");
        save_scene_file(&path, &scene()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

        assert!(matches!(load_scene_file(&path), Err(AssetError::Corrupt(..))));
    }

    #[test]
    fn trailing_chunk_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.scene");
        save_scene_file(&path, &scene()).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes.extend_from_slice(&[1, 0]);
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(load_scene_file(&path), Err(AssetError::Corrupt(..))));
    }

    #[test]
    fn oversized_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.scene");
        save_scene_file(&path, &scene()).unwrap();

        // uncompressed size prefix of the first block
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[4..8].copy_from_slice(&(CHUNK_SIZE as u32 + 1).to_le_bytes());
        std::fs::write(&path, &bytes).unwrap();

        match load_scene_file(&path) {
            Err(AssetError::Corrupt(_, msg)) => assert!(msg.contains("exceeds"), "{msg}"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn missing_file() {
        let err = load_scene_file(Path::new("/nonexistent/tri.scene")).unwrap_err();
        assert!(matches!(err, AssetError::Io(..)));
    }
}

//! Asset loading for the ray tracer: glTF 2.0 meshes and packed scene files.

pub mod accessor;
mod error;
pub mod gltf;
mod pack;

pub use crate::error::AssetError;
pub use crate::gltf::{file_extension, import_gltf, load_gltf, LoadKind};
pub use crate::pack::{load_scene_file, save_scene_file};

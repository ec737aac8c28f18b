use std::path::PathBuf;

/// Errors that can occur while loading or packing assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("I/O error on '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to load glTF '{0}': {1}")]
    Gltf(PathBuf, #[source] gltf::Error),

    #[error("at least one material is required")]
    NoMaterials,

    #[error("buffer {0} referenced by an accessor was not loaded")]
    MissingBuffer(usize),

    #[error("accessor needs {count} elements of {element_size} bytes with stride {stride}, only {available} bytes available")]
    AccessorOutOfBounds {
        count: usize,
        element_size: usize,
        stride: usize,
        available: usize,
    },

    #[error("byte stride {stride} is smaller than the element size {element_size}")]
    BadStride { stride: usize, element_size: usize },

    #[error("negative index {value} at position {position}")]
    NegativeIndex { position: usize, value: i64 },

    #[error("corrupt scene file '{0}': {1}")]
    Corrupt(PathBuf, String),

    #[error("failed to decode scene: {0}")]
    Decode(#[from] scene::DecodeError),
}

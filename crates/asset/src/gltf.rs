use std::path::Path;

use gltf::accessor::Dimensions;
use gltf::mesh::{Mode, Semantic};
use gltf::{buffer, Document};
use tracing::{debug, error, info, trace, warn};

use math::{
    vec::Vec3,
    mat::Mat4,
    bounds::Bounds3,
};
use scene::{Material, Mesh, Texture};

use crate::accessor::{
    accessor_view, ComponentType, IndexArray, StridedView, TypedView, Vec2Array, Vec3Array,
};
use crate::error::AssetError;

/// Everything after the last `.` of the path, or an empty string.
pub fn file_extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(i) => &path[i + 1..],
        None => "",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Binary,
    Text,
}

impl LoadKind {
    /// `.glb` (exact, case sensitive) is binary, anything else is JSON.
    pub fn for_path(path: &Path) -> Self {
        if file_extension(&path.to_string_lossy()) == "glb" {
            LoadKind::Binary
        } else {
            LoadKind::Text
        }
    }
}

/// A parsed glTF document with its buffers resolved.
pub struct Model {
    pub document: Document,
    pub buffers: Vec<buffer::Data>,
}

pub fn read_model(path: &Path) -> Result<Model, AssetError> {
    let kind = LoadKind::for_path(path);
    let bytes = std::fs::read(path).map_err(|e| AssetError::Io(path.to_path_buf(), e))?;
    let gltf_error = |e: gltf::Error| AssetError::Gltf(path.to_path_buf(), e);

    let (document, blob) = match kind {
        LoadKind::Binary => {
            let glb = gltf::binary::Glb::from_slice(&bytes).map_err(gltf_error)?;
            let root = gltf::json::Root::from_slice(&glb.json)
                .map_err(|e| gltf_error(gltf::Error::Deserialize(e)))?;
            let document = Document::from_json(root).map_err(gltf_error)?;
            (document, glb.bin.map(|bin| bin.into_owned()))
        }
        LoadKind::Text => {
            let root = gltf::json::Root::from_slice(&bytes)
                .map_err(|e| gltf_error(gltf::Error::Deserialize(e)))?;
            (Document::from_json(root).map_err(gltf_error)?, None)
        }
    };

    let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(gltf_error)?;

    info!(
        "loaded glTF '{}' ({:?}): {} accessors, {} animations, {} buffers, {} bufferViews, \
         {} materials, {} meshes, {} nodes, {} textures, {} images, {} skins, {} samplers, \
         {} cameras, {} scenes, {} lights",
        path.display(),
        kind,
        document.accessors().count(),
        document.animations().count(),
        document.buffers().count(),
        document.views().count(),
        document.materials().count(),
        document.meshes().count(),
        document.nodes().count(),
        document.textures().count(),
        document.images().count(),
        document.skins().count(),
        document.samplers().count(),
        document.cameras().count(),
        document.scenes().count(),
        document.lights().map(|lights| lights.count()).unwrap_or(0),
    );

    Ok(Model { document, buffers })
}

fn read_indices(model: &Model, primitive: &gltf::Primitive) -> Result<Option<Vec<u32>>, AssetError> {
    let Some(accessor) = primitive.indices() else {
        return Ok(None);
    };
    let Some(view) = accessor_view(&accessor, &model.buffers)? else {
        debug!("index accessor {} has no buffer view", accessor.index());
        return Ok(None);
    };

    let component = ComponentType::from(accessor.data_type());
    match IndexArray::new(component, view) {
        Some(indices) => indices.to_u32().map(Some),
        None => {
            debug!(?component, "unsupported index component type");
            Ok(None)
        }
    }
}

fn declared_bounds(accessor: &gltf::Accessor, scale: f32) -> Option<Bounds3> {
    fn to_vec3(value: gltf::json::Value) -> Option<Vec3> {
        let v = value.as_array()?;
        if v.len() < 3 {
            return None;
        }
        Some(Vec3::new(v[0].as_f64()? as f32, v[1].as_f64()? as f32, v[2].as_f64()? as f32))
    }

    let min = to_vec3(accessor.min()?)?;
    let max = to_vec3(accessor.max()?)?;

    // A negative scale swaps the corners.
    let mut bounds = Bounds3::empty();
    bounds.extend(min * scale);
    bounds.extend(max * scale);
    Some(bounds)
}

fn read_positions(
    accessor: &gltf::Accessor,
    view: StridedView<'_>,
    scale: f32,
    mesh: &mut Mesh,
    bounds: &mut Bounds3,
) {
    let component = ComponentType::from(accessor.data_type());
    let Some(positions) = Vec3Array::new(component, accessor.dimensions(), view) else {
        debug!(?component, dimensions = ?accessor.dimensions(), "skipping POSITION");
        return;
    };

    let mut decoded = Bounds3::empty();
    for p in positions.iter() {
        trace!("position ({}, {}, {})", p.x, p.y, p.z);
        let p = p * scale;
        decoded.extend(p);
        mesh.vertices.extend_from_slice(&p.to_slice());
    }

    bounds.union(&declared_bounds(accessor, scale).unwrap_or(decoded));
}

fn read_normals(accessor: &gltf::Accessor, view: StridedView<'_>, mesh: &mut Mesh) {
    let component = ComponentType::from(accessor.data_type());
    match (component, accessor.dimensions()) {
        (ComponentType::F32, Dimensions::Vec3) => {
            let Some(normals) = TypedView::<[f32; 3]>::new(view) else {
                return;
            };
            for n in normals.iter() {
                trace!("normal ({}, {}, {})", n[0], n[1], n[2]);
                mesh.facevarying_normals.extend_from_slice(&n);
            }
        }
        (ComponentType::F32, Dimensions::Vec4) => {
            debug!("NORMAL stored as vec4, not converted");
        }
        (component, dimensions) => {
            debug!(?component, ?dimensions, "skipping NORMAL");
        }
    }
}

fn read_uvs(accessor: &gltf::Accessor, view: StridedView<'_>, mesh: &mut Mesh) {
    let component = ComponentType::from(accessor.data_type());
    let Some(uvs) = Vec2Array::new(component, accessor.dimensions(), view) else {
        debug!(?component, dimensions = ?accessor.dimensions(), "skipping TEXCOORD_0");
        return;
    };

    for uv in uvs.iter() {
        trace!("uv ({}, {})", uv.x, uv.y);
        mesh.facevarying_uvs.extend_from_slice(&uv.to_slice());
    }
}

fn read_triangle_attributes(
    model: &Model,
    primitive: &gltf::Primitive,
    scale: f32,
    mesh: &mut Mesh,
    bounds: &mut Bounds3,
) -> Result<(), AssetError> {
    for (semantic, accessor) in primitive.attributes() {
        let Some(view) = accessor_view(&accessor, &model.buffers)? else {
            debug!(?semantic, "attribute without buffer view, skipping");
            continue;
        };

        match semantic {
            Semantic::Positions => read_positions(&accessor, view, scale, mesh, bounds),
            Semantic::Normals => read_normals(&accessor, view, mesh),
            Semantic::TexCoords(0) => read_uvs(&accessor, view, mesh),
            other => trace!(?other, "attribute not used"),
        }
    }

    Ok(())
}

/// Converts one glTF mesh. Indices of every primitive are appended in order,
/// as stored, whatever the primitive mode. Only triangle lists contribute
/// vertex attributes. The result is recentered around the
/// middle of its bounding box, which is kept in `pivot_xform`.
pub fn convert_mesh(
    model: &Model,
    gltf_mesh: &gltf::Mesh,
    scale: f32,
    material_id: u32,
) -> Result<Mesh, AssetError> {
    let mut mesh = Mesh::new(gltf_mesh.name().unwrap_or_default());
    let mut bounds = Bounds3::empty();

    debug!("mesh '{}' has {} primitives", mesh.name, gltf_mesh.primitives().len());

    for primitive in gltf_mesh.primitives() {
        let indices = match read_indices(model, &primitive)? {
            Some(indices) if !indices.is_empty() => indices,
            _ => {
                debug!("primitive {} has no indices, skipping", primitive.index());
                continue;
            }
        };
        trace!(?indices);

        mesh.faces.extend_from_slice(&indices);

        match primitive.mode() {
            Mode::Triangles => {
                read_triangle_attributes(model, &primitive, scale, &mut mesh, &mut bounds)?;
            }
            mode @ (Mode::TriangleStrip | Mode::TriangleFan) => {
                warn!(?mode, "primitive mode not implemented");
            }
            mode @ (Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip) => {
                debug!(?mode, "primitive is not triangle based, ignoring");
            }
        }
    }

    let center = bounds.center();
    for v in mesh.vertices.chunks_exact_mut(3) {
        v[0] -= center.x;
        v[1] -= center.y;
        v[2] -= center.z;
    }
    mesh.pivot_xform = Mat4::translation(center);
    mesh.material_ids = vec![material_id; mesh.faces.len()];

    Ok(mesh)
}

/// Loads every mesh of a `.gltf`/`.glb` file. Every face gets the id of
/// `materials[0]`.
pub fn import_gltf(path: &Path, scale: f32, materials: &[Material]) -> Result<Vec<Mesh>, AssetError> {
    let material_id = materials.first().ok_or(AssetError::NoMaterials)?.id;
    let model = read_model(path)?;

    model
        .document
        .meshes()
        .map(|mesh| convert_mesh(&model, &mesh, scale, material_id))
        .collect()
}

/// Appends the meshes of `path` to `meshes`. Returns `true` if at least one
/// mesh was appended; on failure the error is logged and `meshes` is left
/// as it was. Textures are not loaded.
pub fn load_gltf(
    path: impl AsRef<Path>,
    scale: f32,
    meshes: &mut Vec<Mesh>,
    materials: &[Material],
    _textures: &mut Vec<Texture>,
) -> bool {
    let path = path.as_ref();
    match import_gltf(path, scale, materials) {
        Ok(loaded) => {
            let appended = !loaded.is_empty();
            meshes.extend(loaded);
            appended
        }
        Err(e) => {
            error!("failed to load glTF '{}': {e}", path.display());
            false
        }
    }
}

use math::{
    vec::{Vec2, Vec3, Vec4},
    mat::Mat4,
    bounds::Bounds3,
};

mod serialize;

pub use serialize::*;

/// Triangle mesh as consumed by the ray tracer. Attributes are stored flat and
/// facevarying: `vertices` and `facevarying_normals` hold 3 floats per vertex,
/// `facevarying_uvs` holds 2.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<f32>,
    pub facevarying_normals: Vec<f32>,
    pub facevarying_uvs: Vec<f32>,
    pub faces: Vec<u32>,
    pub material_ids: Vec<u32>,

    /// Translation that was removed from `vertices` when recentering.
    pub pivot_xform: Mat4,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            facevarying_normals: Vec::new(),
            facevarying_uvs: Vec::new(),
            faces: Vec::new(),
            material_ids: Vec::new(),
            pivot_xform: Mat4::identity(),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 3
    }

    pub fn vertex(&self, i: usize) -> Option<Vec3> {
        let v = self.vertices.get(3 * i..3 * i + 3)?;
        Some(Vec3::new(v[0], v[1], v[2]))
    }

    /// Bounds of the stored (already scaled and recentered) vertices.
    pub fn bounds(&self) -> Bounds3 {
        let mut b = Bounds3::empty();
        for v in self.vertices.chunks_exact(3) {
            b.extend(Vec3::new(v[0], v[1], v[2]));
        }
        b
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Format {
    RGBA8,
    SRGBA8,
}

impl From<Format> for u32 {
    fn from(f: Format) -> u32 {
        match f {
            Format::RGBA8 => 0,
            Format::SRGBA8 => 1,
        }
    }
}

impl TryFrom<u32> for Format {
    type Error = DecodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Format::RGBA8),
            1 => Ok(Format::SRGBA8),
            _ => Err(DecodeError::UnknownTag { what: "format", tag: value }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub format: Format,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialParameter {
    None,
    Texture(u32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl From<MaterialParameter> for u32 {
    fn from(p: MaterialParameter) -> u32 {
        match p {
            MaterialParameter::None       => 0,
            MaterialParameter::Texture(_) => 1,
            MaterialParameter::Vec2(_)    => 2,
            MaterialParameter::Vec3(_)    => 3,
            MaterialParameter::Vec4(_)    => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: u32,
    pub name: String,
    pub base_color: MaterialParameter,
    pub emissive:   MaterialParameter,
}

impl Material {
    /// Plain grey diffuse material, used when the caller has nothing better.
    pub fn default_with_id(id: u32) -> Self {
        Self {
            id,
            name: String::from("default"),
            base_color: MaterialParameter::Vec3(Vec3::from_scalar(0.8)),
            emissive: MaterialParameter::None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_counts() {
        let mut m = Mesh::new("tri");
        m.vertices = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0];
        m.faces = vec![0, 1, 2];

        assert_eq!(m.vertex_count(), 3);
        assert_eq!(m.triangle_count(), 1);
        assert_eq!(m.vertex(2), Some(Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(m.vertex(3), None);
        assert_eq!(m.bounds().max, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(m.pivot_xform, Mat4::identity());
    }

    #[test]
    fn format_tags() {
        assert_eq!(Format::try_from(u32::from(Format::SRGBA8)).unwrap(), Format::SRGBA8);
        assert!(matches!(Format::try_from(7), Err(DecodeError::UnknownTag { tag: 7, .. })));
    }
}

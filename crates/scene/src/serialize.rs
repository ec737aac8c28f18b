use bytemuck::{bytes_of, cast_slice, Pod, pod_read_unaligned};

use math::{
    vec::{Vec2, Vec3, Vec4},
    mat::Mat4,
};

use crate::{Format, Material, MaterialParameter, Mesh, Scene, Texture};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of data: needed {needed} bytes, {available} left")]
    UnexpectedEof { needed: usize, available: usize },

    #[error("unknown {what} tag {tag}")]
    UnknownTag { what: &'static str, tag: u32 },

    #[error("array of {size} bytes is not a multiple of the element size {element}")]
    BadArrayLength { size: usize, element: usize },

    #[error("invalid utf-8 in string")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub trait Serialize {
    fn serialize_buf(&self, buf: &mut Vec<u8>);
    fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_buf(&mut buf);
        buf
    }
}

pub trait Deserialize: Sized {
    fn deserialize(buf: &mut &[u8]) -> Result<Self, DecodeError>;
}

fn take<'a>(buf: &mut &'a [u8], n: usize) -> Result<&'a [u8], DecodeError> {
    if buf.len() < n {
        return Err(DecodeError::UnexpectedEof { needed: n, available: buf.len() });
    }
    let (head, tail) = buf.split_at(n);
    *buf = tail;
    Ok(head)
}

pub fn read_pod<T: Pod>(buf: &mut &[u8]) -> Result<T, DecodeError> {
    Ok(pod_read_unaligned(take(buf, core::mem::size_of::<T>())?))
}

impl<T: Pod> Serialize for &T {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(bytes_of(*self));
    }
}

// Arrays are prefixed with their size in bytes.
impl<T: Pod> Serialize for Vec<T> {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        let size = (self.len() * core::mem::size_of::<T>()) as u64;
        buf.extend_from_slice(&size.to_le_bytes());
        buf.extend_from_slice(cast_slice(self));
    }
}

impl<T: Pod> Deserialize for Vec<T> {
    fn deserialize(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let size = read_pod::<u64>(buf)? as usize;
        let element = core::mem::size_of::<T>();
        if element == 0 || size % element != 0 {
            return Err(DecodeError::BadArrayLength { size, element });
        }
        let bytes = take(buf, size)?;
        Ok(bytes.chunks_exact(element).map(pod_read_unaligned).collect())
    }
}

impl Serialize for String {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        let size = self.len() as u64;
        buf.extend_from_slice(&size.to_le_bytes());
        buf.extend_from_slice(self.as_bytes());
    }
}

impl Deserialize for String {
    fn deserialize(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let bytes = Vec::<u8>::deserialize(buf)?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl Serialize for MaterialParameter {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        let typ: u32 = (*self).into();
        (&typ).serialize_buf(buf);

        match self {
            MaterialParameter::None => {},
            MaterialParameter::Texture(v) => v.serialize_buf(buf),
            MaterialParameter::Vec2(v)    => v.serialize_buf(buf),
            MaterialParameter::Vec3(v)    => v.serialize_buf(buf),
            MaterialParameter::Vec4(v)    => v.serialize_buf(buf),
        }
    }
}

impl Deserialize for MaterialParameter {
    fn deserialize(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let typ = read_pod::<u32>(buf)?;
        Ok(match typ {
            0 => MaterialParameter::None,
            1 => MaterialParameter::Texture(read_pod(buf)?),
            2 => MaterialParameter::Vec2(read_pod::<Vec2>(buf)?),
            3 => MaterialParameter::Vec3(read_pod::<Vec3>(buf)?),
            4 => MaterialParameter::Vec4(read_pod::<Vec4>(buf)?),
            _ => return Err(DecodeError::UnknownTag { what: "material parameter", tag: typ }),
        })
    }
}

impl Serialize for Material {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        (&self.id).serialize_buf(buf);
        self.name.serialize_buf(buf);
        self.base_color.serialize_buf(buf);
        self.emissive.serialize_buf(buf);
    }
}

impl Deserialize for Material {
    fn deserialize(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Material {
            id:         read_pod(buf)?,
            name:       String::deserialize(buf)?,
            base_color: MaterialParameter::deserialize(buf)?,
            emissive:   MaterialParameter::deserialize(buf)?,
        })
    }
}

impl Serialize for Texture {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        (&self.width).serialize_buf(buf);
        (&self.height).serialize_buf(buf);
        (&u32::from(self.format)).serialize_buf(buf);
        self.data.serialize_buf(buf);
    }
}

impl Deserialize for Texture {
    fn deserialize(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Texture {
            width:  read_pod(buf)?,
            height: read_pod(buf)?,
            format: Format::try_from(read_pod::<u32>(buf)?)?,
            data:   Vec::<u8>::deserialize(buf)?,
        })
    }
}

impl Serialize for Mesh {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        self.name.serialize_buf(buf);
        self.vertices.serialize_buf(buf);
        self.facevarying_normals.serialize_buf(buf);
        self.facevarying_uvs.serialize_buf(buf);
        self.faces.serialize_buf(buf);
        self.material_ids.serialize_buf(buf);
        (&self.pivot_xform).serialize_buf(buf);
    }
}

impl Deserialize for Mesh {
    fn deserialize(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Mesh {
            name:                String::deserialize(buf)?,
            vertices:            Vec::<f32>::deserialize(buf)?,
            facevarying_normals: Vec::<f32>::deserialize(buf)?,
            facevarying_uvs:     Vec::<f32>::deserialize(buf)?,
            faces:               Vec::<u32>::deserialize(buf)?,
            material_ids:        Vec::<u32>::deserialize(buf)?,
            pivot_xform:         read_pod::<Mat4>(buf)?,
        })
    }
}

fn serialize_list<T: Serialize>(items: &[T], buf: &mut Vec<u8>) {
    let count = items.len() as u64;
    (&count).serialize_buf(buf);
    for item in items {
        item.serialize_buf(buf);
    }
}

fn deserialize_list<T: Deserialize>(buf: &mut &[u8]) -> Result<Vec<T>, DecodeError> {
    let count = read_pod::<u64>(buf)?;
    // The count comes from the file; cap the reservation by what is left.
    let mut items = Vec::with_capacity((count as usize).min(buf.len()));
    for _ in 0..count {
        items.push(T::deserialize(buf)?);
    }
    Ok(items)
}

impl Serialize for Scene {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        serialize_list(&self.meshes, buf);
        serialize_list(&self.materials, buf);
        serialize_list(&self.textures, buf);
    }
}

impl Deserialize for Scene {
    fn deserialize(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Scene {
            meshes:    deserialize_list(buf)?,
            materials: deserialize_list(buf)?,
            textures:  deserialize_list(buf)?,
        })
    }
}

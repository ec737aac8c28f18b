//! Typed, bounds-checked views over glTF accessor data.
//!
//! An accessor describes `count` elements of `element_size` bytes laid out
//! every `stride` bytes inside a buffer view. [`StridedView`] captures that
//! triple over a byte slice and validates every read; [`TypedView`] decodes
//! elements as a [`Pod`] type. The enums on top select the element type from
//! the accessor's component type and shape.

use std::marker::PhantomData;

use bytemuck::{pod_read_unaligned, Pod};
use gltf::accessor::{DataType, Dimensions};
use gltf::buffer;

use math::vec::{Vec2, Vec3};

use crate::error::AssetError;

/// Component type of accessor data. `I32` and `F64` are not core glTF 2.0 and
/// are never produced from a parsed document; views of them can still be
/// decoded when built directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl From<DataType> for ComponentType {
    fn from(t: DataType) -> Self {
        match t {
            DataType::I8 => ComponentType::I8,
            DataType::U8 => ComponentType::U8,
            DataType::I16 => ComponentType::I16,
            DataType::U16 => ComponentType::U16,
            DataType::U32 => ComponentType::U32,
            DataType::F32 => ComponentType::F32,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StridedView<'a> {
    data: &'a [u8],
    element_size: usize,
    stride: usize,
    count: usize,
}

impl<'a> StridedView<'a> {
    /// A stride of 0 means tightly packed elements.
    pub fn new(
        data: &'a [u8],
        element_size: usize,
        stride: usize,
        count: usize,
    ) -> Result<Self, AssetError> {
        let stride = if stride == 0 { element_size } else { stride };
        if stride < element_size {
            return Err(AssetError::BadStride { stride, element_size });
        }

        if count > 0 {
            let end = (count - 1)
                .checked_mul(stride)
                .and_then(|offset| offset.checked_add(element_size));
            if !matches!(end, Some(end) if end <= data.len()) {
                return Err(AssetError::AccessorOutOfBounds {
                    count,
                    element_size,
                    stride,
                    available: data.len(),
                });
            }
        }

        Ok(Self { data, element_size, stride, count })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    #[inline]
    pub fn element(&self, i: usize) -> Option<&'a [u8]> {
        if i >= self.count {
            return None;
        }
        let start = i.checked_mul(self.stride)?;
        self.data.get(start..start.checked_add(self.element_size)?)
    }

    /// Every element in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let Self { data, element_size, stride, count } = *self;
        // `new` checked that the last element ends inside `data`.
        (0..count).map(move |i| &data[i * stride..i * stride + element_size])
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TypedView<'a, T> {
    view: StridedView<'a>,
    _marker: PhantomData<T>,
}

impl<'a, T: Pod> TypedView<'a, T> {
    /// `None` if the view's element size does not match `T`.
    pub fn new(view: StridedView<'a>) -> Option<Self> {
        if view.element_size() != core::mem::size_of::<T>() {
            return None;
        }
        Some(Self { view, _marker: PhantomData })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.view.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<T> {
        self.view.element(i).map(pod_read_unaligned)
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        self.view.iter().map(pod_read_unaligned)
    }
}

/// Index data of any integer component type.
#[derive(Debug, Clone, Copy)]
pub enum IndexArray<'a> {
    I8(TypedView<'a, i8>),
    U8(TypedView<'a, u8>),
    I16(TypedView<'a, i16>),
    U16(TypedView<'a, u16>),
    I32(TypedView<'a, i32>),
    U32(TypedView<'a, u32>),
}

impl<'a> IndexArray<'a> {
    /// `None` for float component types or a view of the wrong width.
    pub fn new(component: ComponentType, view: StridedView<'a>) -> Option<Self> {
        Some(match component {
            ComponentType::I8 => IndexArray::I8(TypedView::new(view)?),
            ComponentType::U8 => IndexArray::U8(TypedView::new(view)?),
            ComponentType::I16 => IndexArray::I16(TypedView::new(view)?),
            ComponentType::U16 => IndexArray::U16(TypedView::new(view)?),
            ComponentType::I32 => IndexArray::I32(TypedView::new(view)?),
            ComponentType::U32 => IndexArray::U32(TypedView::new(view)?),
            ComponentType::F32 | ComponentType::F64 => return None,
        })
    }

    pub fn len(&self) -> usize {
        match self {
            IndexArray::I8(v) => v.len(),
            IndexArray::U8(v) => v.len(),
            IndexArray::I16(v) => v.len(),
            IndexArray::U16(v) => v.len(),
            IndexArray::I32(v) => v.len(),
            IndexArray::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<i64> {
        match self {
            IndexArray::I8(v) => v.get(i).map(i64::from),
            IndexArray::U8(v) => v.get(i).map(i64::from),
            IndexArray::I16(v) => v.get(i).map(i64::from),
            IndexArray::U16(v) => v.get(i).map(i64::from),
            IndexArray::I32(v) => v.get(i).map(i64::from),
            IndexArray::U32(v) => v.get(i).map(i64::from),
        }
    }

    /// Expands every index in order. Negative values are rejected.
    pub fn to_u32(&self) -> Result<Vec<u32>, AssetError> {
        match *self {
            IndexArray::I8(v) => widen(v),
            IndexArray::U8(v) => widen(v),
            IndexArray::I16(v) => widen(v),
            IndexArray::U16(v) => widen(v),
            IndexArray::I32(v) => widen(v),
            IndexArray::U32(v) => widen(v),
        }
    }
}

fn widen<T: Pod + Into<i64>>(view: TypedView<'_, T>) -> Result<Vec<u32>, AssetError> {
    view.iter()
        .enumerate()
        .map(|(position, value)| {
            let value: i64 = value.into();
            u32::try_from(value).map_err(|_| AssetError::NegativeIndex { position, value })
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub enum Vec3Array<'a> {
    F32(TypedView<'a, [f32; 3]>),
    F64(TypedView<'a, [f64; 3]>),
}

impl<'a> Vec3Array<'a> {
    pub fn new(component: ComponentType, dimensions: Dimensions, view: StridedView<'a>) -> Option<Self> {
        match (component, dimensions) {
            (ComponentType::F32, Dimensions::Vec3) => Some(Vec3Array::F32(TypedView::new(view)?)),
            (ComponentType::F64, Dimensions::Vec3) => Some(Vec3Array::F64(TypedView::new(view)?)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Vec3Array::F32(v) => v.len(),
            Vec3Array::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<Vec3> {
        match self {
            Vec3Array::F32(v) => v.get(i).map(|e| Vec3::from_slice(&e)),
            Vec3Array::F64(v) => v.get(i).map(|e| Vec3::new(e[0] as f32, e[1] as f32, e[2] as f32)),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Vec3> + 'a> {
        match *self {
            Vec3Array::F32(v) => Box::new(v.iter().map(|e| Vec3::from_slice(&e))),
            Vec3Array::F64(v) => Box::new(v.iter().map(|e| Vec3::new(e[0] as f32, e[1] as f32, e[2] as f32))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Vec2Array<'a> {
    F32(TypedView<'a, [f32; 2]>),
    F64(TypedView<'a, [f64; 2]>),
}

impl<'a> Vec2Array<'a> {
    pub fn new(component: ComponentType, dimensions: Dimensions, view: StridedView<'a>) -> Option<Self> {
        match (component, dimensions) {
            (ComponentType::F32, Dimensions::Vec2) => Some(Vec2Array::F32(TypedView::new(view)?)),
            (ComponentType::F64, Dimensions::Vec2) => Some(Vec2Array::F64(TypedView::new(view)?)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Vec2Array::F32(v) => v.len(),
            Vec2Array::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<Vec2> {
        match self {
            Vec2Array::F32(v) => v.get(i).map(|e| Vec2::from_slice(&e)),
            Vec2Array::F64(v) => v.get(i).map(|e| Vec2::new(e[0] as f32, e[1] as f32)),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Vec2> + 'a> {
        match *self {
            Vec2Array::F32(v) => Box::new(v.iter().map(|e| Vec2::from_slice(&e))),
            Vec2Array::F64(v) => Box::new(v.iter().map(|e| Vec2::new(e[0] as f32, e[1] as f32))),
        }
    }
}

/// Resolves the bytes behind `accessor`. Returns `None` for accessors without
/// a buffer view (sparse-only or all zeros), which are not decoded here.
pub fn accessor_view<'a>(
    accessor: &gltf::Accessor,
    buffers: &'a [buffer::Data],
) -> Result<Option<StridedView<'a>>, AssetError> {
    let Some(view) = accessor.view() else {
        return Ok(None);
    };

    let buffer_index = view.buffer().index();
    let buffer: &[u8] = buffers
        .get(buffer_index)
        .ok_or(AssetError::MissingBuffer(buffer_index))?;

    let element_size = accessor.size();
    let stride = view.stride().unwrap_or(element_size);
    let out_of_bounds = || AssetError::AccessorOutOfBounds {
        count: accessor.count(),
        element_size,
        stride,
        available: buffer.len(),
    };

    let bytes = view
        .offset()
        .checked_add(view.length())
        .and_then(|end| buffer.get(view.offset()..end))
        .and_then(|bytes| bytes.get(accessor.offset()..))
        .ok_or_else(out_of_bounds)?;

    StridedView::new(bytes, element_size, stride, accessor.count()).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn component_types() {
        assert_eq!(ComponentType::from(DataType::I8), ComponentType::I8);
        assert_eq!(ComponentType::from(DataType::U16), ComponentType::U16);
        assert_eq!(ComponentType::from(DataType::F32), ComponentType::F32);
    }

    #[test]
    fn view_rejects_short_buffers() {
        let data = [0u8; 10];
        assert!(StridedView::new(&data, 4, 4, 2).is_ok());
        assert!(matches!(
            StridedView::new(&data, 4, 4, 3),
            Err(AssetError::AccessorOutOfBounds { count: 3, available: 10, .. })
        ));
        assert!(matches!(
            StridedView::new(&data, 4, 2, 1),
            Err(AssetError::BadStride { stride: 2, element_size: 4 })
        ));
        assert!(StridedView::new(&data, 4, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn element_access_is_checked() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let view = StridedView::new(&data, 2, 4, 2).unwrap();

        assert_eq!(view.element(0), Some(&data[0..2]));
        assert_eq!(view.element(1), Some(&data[4..6]));
        assert_eq!(view.element(2), None);

        let elements: Vec<&[u8]> = view.iter().collect();
        assert_eq!(elements, vec![&data[0..2], &data[4..6]]);
    }

    #[test]
    fn interleaved_positions() {
        // position (vec3) followed by one padding float
        let data = f32_bytes(&[1.0, 2.0, 3.0, -1.0, 4.0, 5.0, 6.0]);
        let view = StridedView::new(&data, 12, 16, 2).unwrap();
        let positions = Vec3Array::new(ComponentType::F32, Dimensions::Vec3, view).unwrap();

        let decoded: Vec<Vec3> = positions.iter().collect();
        assert_eq!(decoded, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
    }

    #[test]
    fn double_precision_attributes() {
        let data: Vec<u8> = [0.5f64, -2.0, 8.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let view = StridedView::new(&data, 24, 0, 1).unwrap();

        let positions = Vec3Array::new(ComponentType::F64, Dimensions::Vec3, view).unwrap();
        assert_eq!(positions.get(0), Some(Vec3::new(0.5, -2.0, 8.0)));

        assert!(Vec3Array::new(ComponentType::F64, Dimensions::Vec4, view).is_none());
        assert!(Vec3Array::new(ComponentType::F32, Dimensions::Vec3, view).is_none());

        let uv_view = StridedView::new(&data[..16], 16, 0, 1).unwrap();
        let uvs = Vec2Array::new(ComponentType::F64, Dimensions::Vec2, uv_view).unwrap();
        assert_eq!(uvs.get(0), Some(Vec2::new(0.5, -2.0)));
    }

    #[test]
    fn indices_of_every_width() {
        let bytes = [0u8, 1, 2, 0, 0, 0, 0, 0];

        let u8_view = StridedView::new(&bytes[..3], 1, 0, 3).unwrap();
        let indices = IndexArray::new(ComponentType::U8, u8_view).unwrap();
        assert_eq!(indices.to_u32().unwrap(), vec![0, 1, 2]);

        let u16_data: Vec<u8> = [7u16, 65535].iter().flat_map(|v| v.to_le_bytes()).collect();
        let u16_view = StridedView::new(&u16_data, 2, 0, 2).unwrap();
        let indices = IndexArray::new(ComponentType::U16, u16_view).unwrap();
        assert_eq!(indices.to_u32().unwrap(), vec![7, 65535]);

        let u32_data: Vec<u8> = [70000u32].iter().flat_map(|v| v.to_le_bytes()).collect();
        let u32_view = StridedView::new(&u32_data, 4, 0, 1).unwrap();
        let indices = IndexArray::new(ComponentType::U32, u32_view).unwrap();
        assert_eq!(indices.to_u32().unwrap(), vec![70000]);

        assert!(IndexArray::new(ComponentType::F32, u32_view).is_none());
        assert!(IndexArray::new(ComponentType::U16, u32_view).is_none());
    }

    #[test]
    fn negative_signed_index() {
        let bytes = [3u8, 0xff];
        let view = StridedView::new(&bytes, 1, 0, 2).unwrap();
        let indices = IndexArray::new(ComponentType::I8, view).unwrap();

        assert_eq!(indices.get(1), Some(-1));
        assert!(matches!(
            indices.to_u32(),
            Err(AssetError::NegativeIndex { position: 1, value: -1 })
        ));
    }
}

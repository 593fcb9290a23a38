//! Append-only binary buffer with accessor bookkeeping
//!
//! Every pack call appends one 4-byte aligned buffer view and one accessor
//! describing it. Nothing is ever removed or reordered, so indices handed
//! out earlier stay valid.

use crate::attributes::AttributeData;
use crate::utils::{align_buffer, compute_bounds};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Element layout of one accessor
struct Layout {
    component_type: json::accessor::ComponentType,
    type_: json::accessor::Type,
    normalized: bool,
    target: Option<json::buffer::Target>,
}

impl Layout {
    const fn float(type_: json::accessor::Type) -> Self {
        Self {
            component_type: json::accessor::ComponentType::F32,
            type_,
            normalized: false,
            target: Some(json::buffer::Target::ArrayBuffer),
        }
    }
}

/// Builder for the binary blob, its views and accessors
#[derive(Debug, Clone, Default)]
pub struct BufferBuilder {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    /// Create a new empty buffer builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current accessor count
    pub fn accessor_count(&self) -> u32 {
        self.accessors.len() as u32
    }

    /// Get the binary buffer data
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer views
    pub fn views(&self) -> &[json::buffer::View] {
        &self.views
    }

    /// Get the accessors
    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    /// Raw bytes referenced by an accessor's buffer view
    pub fn accessor_bytes(&self, index: AccessorIndex) -> Option<&[u8]> {
        let accessor = self.accessors.get(index.0 as usize)?;
        let view = self.views.get(accessor.buffer_view?.value())?;
        let start = view.byte_offset.map(|o| o.0 as usize).unwrap_or(0);
        let end = start + view.byte_length.0 as usize;
        self.buffer.get(start..end)
    }

    /// Pack triangle indices as a flat u32 scalar accessor
    pub fn pack_indices_u32(&mut self, faces: &[[u32; 3]]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(faces),
            faces.len() * 3,
            Layout {
                component_type: json::accessor::ComponentType::U32,
                type_: json::accessor::Type::Scalar,
                normalized: false,
                target: Some(json::buffer::Target::ElementArrayBuffer),
            },
            None,
        )
    }

    /// Pack Vec3 positions with bounds calculation
    pub fn pack_positions(&mut self, positions: &[[f32; 3]]) -> AccessorIndex {
        let (min, max) = compute_bounds(positions);
        let bounds = (
            json::Value::Array(min.into_iter().map(json::Value::from).collect()),
            json::Value::Array(max.into_iter().map(json::Value::from).collect()),
        );
        self.push(
            bytemuck::cast_slice(positions),
            positions.len(),
            Layout::float(json::accessor::Type::Vec3),
            Some(bounds),
        )
    }

    /// Pack scalar f32 data
    pub fn pack_scalars(&mut self, data: &[f32]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            Layout::float(json::accessor::Type::Scalar),
            None,
        )
    }

    /// Pack Vec2 data (texture coordinates)
    pub fn pack_vec2(&mut self, data: &[[f32; 2]]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            Layout::float(json::accessor::Type::Vec2),
            None,
        )
    }

    /// Pack Vec3 data (normals, etc.)
    pub fn pack_vec3(&mut self, data: &[[f32; 3]]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            Layout::float(json::accessor::Type::Vec3),
            None,
        )
    }

    /// Pack Vec4 data
    pub fn pack_vec4(&mut self, data: &[[f32; 4]]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            Layout::float(json::accessor::Type::Vec4),
            None,
        )
    }

    /// Pack RGBA8 colors as a normalized unsigned byte accessor
    pub fn pack_colors_unorm8(&mut self, colors: &[[u8; 4]]) -> AccessorIndex {
        self.pack_u8x4(colors, true)
    }

    /// Pack any attribute with the accessor type matching its shape
    pub fn pack_attribute(&mut self, data: &AttributeData) -> AccessorIndex {
        match data {
            AttributeData::Scalar(v) => self.pack_scalars(v),
            AttributeData::Vec2(v) => self.pack_vec2(v),
            AttributeData::Vec3(v) => self.pack_vec3(v),
            AttributeData::Vec4(v) => self.pack_vec4(v),
            AttributeData::Rgba8(v) => self.pack_u8x4(v, false),
        }
    }

    fn pack_u8x4(&mut self, data: &[[u8; 4]], normalized: bool) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            Layout {
                component_type: json::accessor::ComponentType::U8,
                type_: json::accessor::Type::Vec4,
                normalized,
                target: Some(json::buffer::Target::ArrayBuffer),
            },
            None,
        )
    }

    fn push(
        &mut self,
        bytes: &[u8],
        count: usize,
        layout: Layout,
        bounds: Option<(json::Value, json::Value)>,
    ) -> AccessorIndex {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: bytes.len().into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: layout.target.map(Valid),
        });

        let (min, max) = match bounds {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };
        let accessor_idx = self.accessors.len() as u32;
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(layout.component_type)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(layout.type_),
            min,
            max,
            name: None,
            normalized: layout.normalized,
            sparse: None,
        });

        align_buffer(&mut self.buffer);
        AccessorIndex(accessor_idx)
    }
}

//! Per-vertex attribute storage
//!
//! Two kinds of attribute containers exist:
//! - [`VertexAttributeSet`]: the fixed set of attributes a texture visual
//!   recognizes (`color`, `uv`, `uv1`..`uv3`), indexed by [`VisualAttribute`].
//! - [`CustomAttributes`]: free-form named attributes on the mesh itself,
//!   exported verbatim under an underscore-prefixed name.

/// Typed per-vertex attribute data
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    Scalar(Vec<f32>),
    Vec2(Vec<[f32; 2]>),
    Vec3(Vec<[f32; 3]>),
    Vec4(Vec<[f32; 4]>),
    Rgba8(Vec<[u8; 4]>),
}

impl AttributeData {
    /// Number of elements (vertices)
    pub fn len(&self) -> usize {
        match self {
            AttributeData::Scalar(v) => v.len(),
            AttributeData::Vec2(v) => v.len(),
            AttributeData::Vec3(v) => v.len(),
            AttributeData::Vec4(v) => v.len(),
            AttributeData::Rgba8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First two components of each element
    ///
    /// `None` for data with fewer than two components.
    pub fn to_vec2(&self) -> Option<Vec<[f32; 2]>> {
        match self {
            AttributeData::Vec2(v) => Some(v.clone()),
            AttributeData::Vec3(v) => Some(v.iter().map(|e| [e[0], e[1]]).collect()),
            AttributeData::Vec4(v) => Some(v.iter().map(|e| [e[0], e[1]]).collect()),
            AttributeData::Scalar(_) | AttributeData::Rgba8(_) => None,
        }
    }

    /// Convert to 8-bit RGBA
    ///
    /// Float components are in 0..255 and are truncated and saturated;
    /// RGB data gets an opaque alpha.
    pub fn to_rgba8(&self) -> Option<Vec<[u8; 4]>> {
        match self {
            AttributeData::Rgba8(v) => Some(v.clone()),
            AttributeData::Vec3(v) => Some(
                v.iter()
                    .map(|c| [c[0] as u8, c[1] as u8, c[2] as u8, u8::MAX])
                    .collect(),
            ),
            AttributeData::Vec4(v) => Some(
                v.iter()
                    .map(|c| [c[0] as u8, c[1] as u8, c[2] as u8, c[3] as u8])
                    .collect(),
            ),
            AttributeData::Scalar(_) | AttributeData::Vec2(_) => None,
        }
    }
}

impl From<Vec<[f32; 2]>> for AttributeData {
    fn from(value: Vec<[f32; 2]>) -> Self {
        AttributeData::Vec2(value)
    }
}

impl From<Vec<[f32; 3]>> for AttributeData {
    fn from(value: Vec<[f32; 3]>) -> Self {
        AttributeData::Vec3(value)
    }
}

impl From<Vec<[u8; 4]>> for AttributeData {
    fn from(value: Vec<[u8; 4]>) -> Self {
        AttributeData::Rgba8(value)
    }
}

/// Attributes recognized on a texture visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VisualAttribute {
    Color,
    /// Primary texture coordinates (channel 0)
    Uv,
    Uv1,
    Uv2,
    Uv3,
}

impl VisualAttribute {
    pub const ALL: [VisualAttribute; 5] = [
        VisualAttribute::Color,
        VisualAttribute::Uv,
        VisualAttribute::Uv1,
        VisualAttribute::Uv2,
        VisualAttribute::Uv3,
    ];

    /// Texture coordinate channels in slot order
    pub const CHANNELS: [VisualAttribute; 4] = [
        VisualAttribute::Uv,
        VisualAttribute::Uv1,
        VisualAttribute::Uv2,
        VisualAttribute::Uv3,
    ];

    /// Attribute for texture coordinate slot `index` (0..=3)
    pub fn channel(index: usize) -> Option<Self> {
        Self::CHANNELS.get(index).copied()
    }

    /// Texture coordinate slot, if this is a channel
    pub fn channel_index(self) -> Option<u32> {
        match self {
            VisualAttribute::Color => None,
            VisualAttribute::Uv => Some(0),
            VisualAttribute::Uv1 => Some(1),
            VisualAttribute::Uv2 => Some(2),
            VisualAttribute::Uv3 => Some(3),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VisualAttribute::Color => "color",
            VisualAttribute::Uv => "uv",
            VisualAttribute::Uv1 => "uv1",
            VisualAttribute::Uv2 => "uv2",
            VisualAttribute::Uv3 => "uv3",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Read access to visual attributes
pub trait VertexAttributes {
    fn get(&self, attribute: VisualAttribute) -> Option<&AttributeData>;

    fn has(&self, attribute: VisualAttribute) -> bool {
        self.get(attribute).is_some()
    }
}

/// Fixed-slot storage for [`VisualAttribute`]s
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexAttributeSet {
    slots: [Option<AttributeData>; 5],
}

impl VertexAttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, returning the previous value
    pub fn insert(
        &mut self,
        attribute: VisualAttribute,
        data: impl Into<AttributeData>,
    ) -> Option<AttributeData> {
        self.slots[attribute.slot()].replace(data.into())
    }

    pub fn remove(&mut self, attribute: VisualAttribute) -> Option<AttributeData> {
        self.slots[attribute.slot()].take()
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, attribute: VisualAttribute, data: impl Into<AttributeData>) -> Self {
        self.insert(attribute, data);
        self
    }
}

impl VertexAttributes for VertexAttributeSet {
    fn get(&self, attribute: VisualAttribute) -> Option<&AttributeData> {
        self.slots[attribute.slot()].as_ref()
    }
}

/// Named mesh-level attributes, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomAttributes {
    entries: Vec<(String, AttributeData)>,
}

impl CustomAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced entry keeps its position
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<AttributeData>) {
        let name = name.into();
        let data = data.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = data,
            None => self.entries.push((name, data)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeData> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, data)| data)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeData> {
        let pos = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeData)> {
        self.entries.iter().map(|(key, data)| (key.as_str(), data))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! In-memory mesh representation handed to the serializer
//!
//! This is the contract with whatever loaded the asset: positions, triangle
//! faces, a visual (colors or texture attributes plus material), optional
//! cached normals, free-form attributes and metadata.

use glam::Vec3;

use crate::attributes::{AttributeData, CustomAttributes, VertexAttributeSet, VertexAttributes, VisualAttribute};
use crate::material::Material;
use crate::metadata::Metadata;

/// How a color visual was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorKind {
    Vertex,
    /// Face colors, already expanded to vertices by the loader
    Face,
}

/// Per-vertex coloring without a material
#[derive(Debug, Clone, PartialEq)]
pub struct ColorVisual {
    pub kind: ColorKind,
    pub vertex_colors: AttributeData,
}

/// Material plus texture-space attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureVisual {
    pub material: Option<Material>,
    pub attributes: VertexAttributeSet,
}

impl TextureVisual {
    pub fn new(material: Material) -> Self {
        Self {
            material: Some(material),
            attributes: VertexAttributeSet::new(),
        }
    }

    /// Builder-style attribute insert
    pub fn with(mut self, attribute: VisualAttribute, data: impl Into<AttributeData>) -> Self {
        self.attributes.insert(attribute, data);
        self
    }
}

/// Appearance attached to a mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Visual {
    #[default]
    None,
    Color(ColorVisual),
    Texture(TextureVisual),
}

impl Visual {
    pub fn material(&self) -> Option<&Material> {
        match self {
            Visual::Texture(tex) => tex.material.as_ref(),
            _ => None,
        }
    }

    /// Vertex colors, whether declared by a color visual or carried as a
    /// texture visual's `color` attribute
    pub fn vertex_colors(&self) -> Option<&AttributeData> {
        match self {
            Visual::None => None,
            Visual::Color(color) => Some(&color.vertex_colors),
            Visual::Texture(tex) => tex.attributes.get(VisualAttribute::Color),
        }
    }
}

impl VertexAttributes for Visual {
    fn get(&self, attribute: VisualAttribute) -> Option<&AttributeData> {
        match (self, attribute) {
            (Visual::None, _) => None,
            (Visual::Color(color), VisualAttribute::Color) => Some(&color.vertex_colors),
            (Visual::Color(_), _) => None,
            (Visual::Texture(tex), attr) => tex.attributes.get(attr),
        }
    }
}

/// Triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
    pub visual: Visual,
    /// Cached vertex normals, if the loader provided or computed them
    pub vertex_normals: Option<Vec<[f32; 3]>>,
    pub vertex_attributes: CustomAttributes,
    pub metadata: Metadata,
    pub units: Option<String>,
}

impl Mesh {
    pub fn new(vertices: Vec<[f32; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            ..Default::default()
        }
    }

    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = visual;
        self
    }

    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.vertex_normals = Some(normals);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Cached normals, or area-weighted normals computed from the faces
    ///
    /// Faces with out-of-range indices are ignored.
    pub fn normals_or_computed(&self) -> Vec<[f32; 3]> {
        match &self.vertex_normals {
            Some(normals) if normals.len() == self.vertices.len() => normals.clone(),
            _ => compute_vertex_normals(&self.vertices, &self.faces),
        }
    }
}

/// Sum unnormalized face normals per vertex, then normalize
///
/// Vertices without a non-degenerate face stay zero.
pub fn compute_vertex_normals(vertices: &[[f32; 3]], faces: &[[u32; 3]]) -> Vec<[f32; 3]> {
    let mut sums = vec![Vec3::ZERO; vertices.len()];
    for face in faces {
        let [a, b, c] = face.map(|i| i as usize);
        if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
            continue;
        }
        let pa = Vec3::from_array(vertices[a]);
        let pb = Vec3::from_array(vertices[b]);
        let pc = Vec3::from_array(vertices[c]);
        // Cross product length is twice the face area
        let n = (pb - pa).cross(pc - pa);
        sums[a] += n;
        sums[b] += n;
        sums[c] += n;
    }
    sums.into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}

/// Normalize vectors whose length is off by more than `tolerance`
///
/// Already-unit vectors are passed through bit-for-bit; zero vectors stay zero.
pub fn unitize_normals(normals: &[[f32; 3]], tolerance: f32) -> Vec<[f32; 3]> {
    normals
        .iter()
        .map(|n| {
            let v = Vec3::from_array(*n);
            let length = v.length();
            if (length - 1.0).abs() <= tolerance || length == 0.0 {
                *n
            } else {
                (v / length).to_array()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_compute_vertex_normals_triangle() {
        let mesh = triangle();
        let normals = mesh.normals_or_computed();
        assert_eq!(normals, vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn test_cached_normals_preferred() {
        let mesh = triangle().with_normals(vec![[0.0, 1.0, 0.0]; 3]);
        assert_eq!(mesh.normals_or_computed(), vec![[0.0, 1.0, 0.0]; 3]);
    }

    #[test]
    fn test_compute_vertex_normals_isolated_vertex() {
        let normals = compute_vertex_normals(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 5.0, 5.0]],
            &[[0, 1, 2], [0, 1, 9]],
        );
        assert_eq!(normals[3], [0.0, 0.0, 0.0]);
        assert_eq!(normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unitize_normals_only_touches_off_unit() {
        let almost = [0.0, 0.0, 1.00005];
        let normals = unitize_normals(&[[0.0, 0.0, 2.0], almost, [0.0, 0.0, 0.0]], 1e-4);
        assert_eq!(normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(normals[1], almost);
        assert_eq!(normals[2], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_visual_vertex_colors() {
        let colors = AttributeData::Rgba8(vec![[255, 0, 0, 255]; 3]);
        let color_visual = Visual::Color(ColorVisual {
            kind: ColorKind::Face,
            vertex_colors: colors.clone(),
        });
        assert_eq!(color_visual.vertex_colors(), Some(&colors));
        assert!(color_visual.material().is_none());
        assert!(!color_visual.has(VisualAttribute::Uv));

        let tex = Visual::Texture(TextureVisual::new(Material::default()));
        assert!(tex.vertex_colors().is_none());
        assert!(tex.material().is_some());

        let tex = Visual::Texture(
            TextureVisual::new(Material::default()).with(VisualAttribute::Color, colors.clone()),
        );
        assert_eq!(tex.vertex_colors(), Some(&colors));
    }
}

//! Append-only glTF document fragment
//!
//! Collects accessors, buffer views, materials and meshes across all meshes
//! of one export. Entries are only ever appended, so an index handed to one
//! mesh stays valid while later meshes are added.

use gltf_json as json;

use crate::buffer::BufferBuilder;
use crate::error::ExportError;
use crate::utils::assemble_glb;

/// Index of a mesh in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshIndex(pub u32);

/// Document state shared by every mesh of an export
#[derive(Debug, Clone, Default)]
pub struct MeshDocument {
    buffer: BufferBuilder,
    materials: Vec<json::Material>,
    meshes: Vec<json::Mesh>,
}

impl MeshDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &BufferBuilder {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut BufferBuilder {
        &mut self.buffer
    }

    pub fn materials(&self) -> &[json::Material] {
        &self.materials
    }

    pub fn meshes(&self) -> &[json::Mesh] {
        &self.meshes
    }

    /// Append a material, returning its index
    pub fn push_material(&mut self, material: json::Material) -> u32 {
        self.materials.push(material);
        self.materials.len() as u32 - 1
    }

    /// Append a mesh node, returning its index
    pub fn push_mesh(&mut self, mesh: json::Mesh) -> MeshIndex {
        self.meshes.push(mesh);
        MeshIndex(self.meshes.len() as u32 - 1)
    }

    /// Build the final glTF root
    ///
    /// Each mesh gets one node; a single scene lists every node.
    pub fn build(&self, generator: &str) -> json::Root {
        let nodes: Vec<json::Node> = self
            .meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| json::Node {
                camera: None,
                children: None,
                extensions: Default::default(),
                extras: Default::default(),
                matrix: None,
                mesh: Some(json::Index::new(i as u32)),
                name: mesh.name.clone(),
                rotation: None,
                scale: None,
                skin: None,
                translation: None,
                weights: None,
            })
            .collect();

        let scenes = if nodes.is_empty() {
            Vec::new()
        } else {
            vec![json::Scene {
                extensions: Default::default(),
                extras: Default::default(),
                name: Some("Scene".to_string()),
                nodes: (0..nodes.len() as u32).map(json::Index::new).collect(),
            }]
        };

        let buffers = if self.buffer.data().is_empty() {
            Vec::new()
        } else {
            vec![json::Buffer {
                byte_length: self.buffer.data().len().into(),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                uri: None,
            }]
        };

        json::Root {
            accessors: self.buffer.accessors().to_vec(),
            animations: Vec::new(),
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers,
            buffer_views: self.buffer.views().to_vec(),
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: Vec::new(),
            extras: Default::default(),
            images: Vec::new(),
            materials: self.materials.clone(),
            meshes: self.meshes.clone(),
            nodes,
            samplers: Vec::new(),
            scene: if scenes.is_empty() {
                None
            } else {
                Some(json::Index::new(0))
            },
            scenes,
            skins: Vec::new(),
            textures: Vec::new(),
        }
    }

    /// Serialize the document as a GLB container
    pub fn to_glb(&self, generator: &str) -> Result<Vec<u8>, ExportError> {
        assemble_glb(&self.build(generator), self.buffer.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf_json::validation::Checked::Valid;
    use std::collections::BTreeMap;

    fn triangle_mesh(doc: &mut MeshDocument) -> json::Mesh {
        let positions = doc
            .buffer_mut()
            .pack_positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]);
        let indices = doc.buffer_mut().pack_indices_u32(&[[0, 1, 2]]);
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Valid(json::mesh::Semantic::Positions),
            positions.as_json_index(),
        );
        json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some("Triangle".to_string()),
            primitives: vec![json::mesh::Primitive {
                attributes,
                extensions: Default::default(),
                extras: Default::default(),
                indices: Some(indices.as_json_index()),
                material: None,
                mode: Valid(json::mesh::Mode::Triangles),
                targets: None,
            }],
            weights: None,
        }
    }

    #[test]
    fn test_build_basic() {
        let mut doc = MeshDocument::new();
        let mesh = triangle_mesh(&mut doc);
        assert_eq!(doc.push_mesh(mesh), MeshIndex(0));

        let root = doc.build("test");
        assert_eq!(root.meshes.len(), 1);
        assert_eq!(root.nodes.len(), 1);
        assert_eq!(root.scenes.len(), 1);
        assert_eq!(root.buffers.len(), 1);
        assert_eq!(root.accessors.len(), 2);
        assert_eq!(root.asset.version, "2.0");
        assert_eq!(root.asset.generator.as_deref(), Some("test"));
    }

    #[test]
    fn test_build_empty() {
        let root = MeshDocument::new().build("test");
        assert!(root.meshes.is_empty());
        assert!(root.scenes.is_empty());
        assert!(root.buffers.is_empty());
        assert!(root.scene.is_none());
    }

    #[test]
    fn test_to_glb_header() {
        let mut doc = MeshDocument::new();
        let mesh = triangle_mesh(&mut doc);
        doc.push_mesh(mesh);

        let glb = doc.to_glb("test").unwrap();
        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(glb[4..8].try_into().unwrap()), 2);
        assert_eq!(
            u32::from_le_bytes(glb[8..12].try_into().unwrap()) as usize,
            glb.len()
        );
        assert_eq!(glb.len() % 4, 0);
    }
}

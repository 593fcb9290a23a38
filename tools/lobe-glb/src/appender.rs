//! Mesh serialization strategies
//!
//! A [`MeshAppender`] turns one [`Mesh`] into accessors, an optional
//! material and a mesh entry in a [`MeshDocument`]. Accessors are assigned
//! in a fixed order:
//!
//! 1. indices, positions
//! 2. vertex colors
//! 3. texture coordinate channels, in slot order
//! 4. normals
//! 5. custom attributes, in insertion order
//!
//! Geometry is validated before anything is written, so a failed append
//! leaves the document untouched.

use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use serde_json::value::RawValue;
use std::collections::BTreeMap;

use crate::attributes::{VertexAttributes, VisualAttribute};
use crate::config::{AppenderKind, ExportOptions};
use crate::document::{MeshDocument, MeshIndex};
use crate::error::ExportError;
use crate::material::{Material, MaterialCache};
use crate::mesh::{unitize_normals, Mesh, Visual};
use crate::metadata::mesh_extras;

/// Normals within this distance of unit length are left untouched
pub const NORMAL_TOLERANCE: f32 = 1e-4;

/// Strategy for appending a mesh to a document
pub trait MeshAppender {
    /// Append `mesh` under `name`
    ///
    /// Returns `Ok(None)` when the mesh is empty and was skipped.
    fn append_mesh(
        &self,
        document: &mut MeshDocument,
        materials: &mut MaterialCache,
        mesh: &Mesh,
        name: &str,
        options: &ExportOptions,
    ) -> Result<Option<MeshIndex>, ExportError>;
}

/// Writes up to four texture coordinate channels (`uv`, `uv1`, `uv2`, `uv3`)
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiChannelAppender;

/// Writes only the primary texture coordinate channel
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleChannelAppender;

impl MeshAppender for MultiChannelAppender {
    fn append_mesh(
        &self,
        document: &mut MeshDocument,
        materials: &mut MaterialCache,
        mesh: &Mesh,
        name: &str,
        options: &ExportOptions,
    ) -> Result<Option<MeshIndex>, ExportError> {
        append_with_channels(document, materials, mesh, name, options, &VisualAttribute::CHANNELS)
    }
}

impl MeshAppender for SingleChannelAppender {
    fn append_mesh(
        &self,
        document: &mut MeshDocument,
        materials: &mut MaterialCache,
        mesh: &Mesh,
        name: &str,
        options: &ExportOptions,
    ) -> Result<Option<MeshIndex>, ExportError> {
        append_with_channels(document, materials, mesh, name, options, &[VisualAttribute::Uv])
    }
}

/// Appender selected by configuration
pub fn appender_for(kind: AppenderKind) -> Box<dyn MeshAppender + Send + Sync> {
    match kind {
        AppenderKind::MultiChannel => Box::new(MultiChannelAppender),
        AppenderKind::SingleChannel => Box::new(SingleChannelAppender),
    }
}

fn append_with_channels(
    document: &mut MeshDocument,
    materials: &mut MaterialCache,
    mesh: &Mesh,
    name: &str,
    options: &ExportOptions,
    channels: &[VisualAttribute],
) -> Result<Option<MeshIndex>, ExportError> {
    if mesh.is_empty() {
        tracing::debug!("Skipping empty mesh '{}'", name);
        return Ok(None);
    }
    validate_geometry(mesh, name)?;
    let extras = build_extras(mesh, name)?;

    let vertex_count = mesh.vertices.len();
    let mut attributes = BTreeMap::new();

    let indices = document.buffer_mut().pack_indices_u32(&mesh.faces);
    let positions = document.buffer_mut().pack_positions(&mesh.vertices);
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        positions.as_json_index(),
    );

    if let Some(colors) = vertex_colors(&mesh.visual, vertex_count, name) {
        let acc = document.buffer_mut().pack_colors_unorm8(&colors);
        attributes.insert(Valid(json::mesh::Semantic::Colors(0)), acc.as_json_index());
    }

    let mut material = None;
    if let Some(mat) = mesh.visual.material() {
        let mat_index = append_material(document, materials, mat);
        for &channel in channels {
            let Some(slot) = channel.channel_index() else {
                continue;
            };
            let Some(coords) = channel_coords(&mesh.visual, channel, vertex_count, name) else {
                continue;
            };
            let acc = document.buffer_mut().pack_vec2(&coords);
            attributes.insert(
                Valid(json::mesh::Semantic::TexCoords(slot)),
                acc.as_json_index(),
            );
            // Untextured geometry must not reference the material
            if slot == 0 {
                material = Some(json::Index::new(mat_index));
            }
        }
    }

    let include_normals = options
        .include_normals
        .unwrap_or(mesh.vertex_normals.is_some());
    if include_normals {
        let mut normals = mesh.normals_or_computed();
        if options.unitize_normals {
            normals = unitize_normals(&normals, NORMAL_TOLERANCE);
        }
        let acc = document.buffer_mut().pack_vec3(&normals);
        attributes.insert(Valid(json::mesh::Semantic::Normals), acc.as_json_index());
    }

    for (key, data) in mesh.vertex_attributes.iter() {
        if data.len() != vertex_count {
            tracing::warn!(
                "Mesh '{}': attribute '{}' has {} values for {} vertices, skipping",
                name,
                key,
                data.len(),
                vertex_count
            );
            continue;
        }
        let semantic = Valid(custom_semantic(key));
        if attributes.contains_key(&semantic) {
            tracing::warn!(
                "Mesh '{}': attribute '{}' collides with an earlier attribute, skipping",
                name,
                key
            );
            continue;
        }
        let acc = document.buffer_mut().pack_attribute(data);
        attributes.insert(semantic, acc.as_json_index());
    }

    let texcoords: Vec<u32> = attributes
        .keys()
        .filter_map(|semantic| match semantic {
            Valid(json::mesh::Semantic::TexCoords(slot)) => Some(*slot),
            _ => None,
        })
        .collect();

    let index = document.push_mesh(json::Mesh {
        extensions: Default::default(),
        extras,
        name: Some(name.to_string()),
        primitives: vec![json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: Some(indices.as_json_index()),
            material,
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        }],
        weights: None,
    });

    tracing::info!(
        "Appended mesh '{}': {} vertices, {} faces, texcoord channels {:?}",
        name,
        vertex_count,
        mesh.faces.len(),
        texcoords
    );

    Ok(Some(index))
}

/// Check everything that would make the required accessors invalid
fn validate_geometry(mesh: &Mesh, name: &str) -> Result<(), ExportError> {
    let vertex_count = mesh.vertices.len();
    if vertex_count > u32::MAX as usize {
        return Err(ExportError::TooManyVertices {
            mesh: name.to_string(),
            vertex_count,
        });
    }

    if let Some((vertex, position)) = mesh
        .vertices
        .iter()
        .enumerate()
        .find(|(_, p)| !p.iter().all(|c| c.is_finite()))
    {
        return Err(ExportError::NonFinitePosition {
            mesh: name.to_string(),
            vertex,
            position: *position,
        });
    }

    for (face, indices) in mesh.faces.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(ExportError::FaceIndexOutOfRange {
                mesh: name.to_string(),
                face,
                index,
                vertex_count,
            });
        }
    }

    Ok(())
}

/// Metadata as raw `extras` JSON; unrepresentable metadata is dropped
fn build_extras(mesh: &Mesh, name: &str) -> Result<Option<Box<RawValue>>, ExportError> {
    match mesh_extras(&mesh.metadata, mesh.units.as_deref()) {
        Ok(map) if map.is_empty() => Ok(None),
        Ok(map) => {
            let text = serde_json::to_string(&map)?;
            Ok(Some(RawValue::from_string(text)?))
        }
        Err(err) => {
            tracing::warn!("Mesh '{}': metadata not serializable, dropping: {}", name, err);
            Ok(None)
        }
    }
}

fn vertex_colors(visual: &Visual, vertex_count: usize, name: &str) -> Option<Vec<[u8; 4]>> {
    let data = visual.vertex_colors()?;
    let Some(colors) = data.to_rgba8() else {
        tracing::warn!("Mesh '{}': color attribute is not RGB/RGBA, skipping", name);
        return None;
    };
    if colors.len() != vertex_count {
        tracing::debug!(
            "Mesh '{}': {} colors for {} vertices, skipping",
            name,
            colors.len(),
            vertex_count
        );
        return None;
    }
    Some(colors)
}

fn channel_coords(
    visual: &Visual,
    channel: VisualAttribute,
    vertex_count: usize,
    name: &str,
) -> Option<Vec<[f32; 2]>> {
    let data = visual.get(channel)?;
    if data.len() != vertex_count {
        tracing::debug!(
            "Mesh '{}': channel '{}' has {} values for {} vertices, skipping",
            name,
            channel.name(),
            data.len(),
            vertex_count
        );
        return None;
    }
    let coords = data.to_vec2();
    if coords.is_none() {
        tracing::debug!(
            "Mesh '{}': channel '{}' has fewer than 2 components, skipping",
            name,
            channel.name()
        );
    }
    coords
}

fn append_material(document: &mut MeshDocument, cache: &mut MaterialCache, material: &Material) -> u32 {
    if let Some(index) = cache.lookup(material) {
        tracing::debug!("Reusing material {}", index);
        return index;
    }
    let index = document.push_material(material.to_json());
    cache.record(material, index)
}

/// Custom attributes are exported with a leading underscore
///
/// `Semantic::Extras` holds the name without it.
fn custom_semantic(key: &str) -> json::mesh::Semantic {
    let bare = key.strip_prefix('_').unwrap_or(key);
    json::mesh::Semantic::Extras(bare.to_string())
}

//! Moves lobe attributes into texture coordinate channels
//!
//! Loaders expose lobe parameters as plain mesh attributes (`_sg_mean_0`,
//! `_sg_color_0`, `_sg_scale_0`, ...). [`prepare_lobe_mesh`] packs lobe `i`
//! into channel `i` and rewrites the mesh visual so the serializer emits the
//! channels as `TEXCOORD_i`.

use lobe_common::encode_lobe_channel;

use crate::attributes::{AttributeData, VisualAttribute};
use crate::config::LobeLayout;
use crate::material::Material;
use crate::mesh::{Mesh, TextureVisual, Visual};

/// Result of [`prepare_lobe_mesh`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobeOutcome {
    /// These lobes were packed, lobe `i` into channel `i`
    Encoded(Vec<usize>),
    /// No lobe had all three attributes; the mesh was not modified
    NoLobes,
}

/// Pack every complete lobe of `mesh` into its texture channel
///
/// A lobe is complete when its mean (3 components), color (3 components) and
/// scale (scalar) attributes all exist with one value per vertex. Consumed
/// attributes are removed from the mesh; existing vertex colors and material
/// carry over to the new texture visual.
pub fn prepare_lobe_mesh(mesh: &mut Mesh, layout: &LobeLayout) -> LobeOutcome {
    let vertex_count = mesh.vertices.len();
    let mut encoded = Vec::new();

    for lobe in 0..layout.count {
        let Some(channel) = VisualAttribute::channel(lobe) else {
            tracing::warn!("Lobe {} has no texture channel available, ignoring", lobe);
            continue;
        };
        let names = [layout.mean_name(lobe), layout.color_name(lobe), layout.scale_name(lobe)];
        let Some((means, colors, scales)) = lobe_attributes(mesh, &names, vertex_count) else {
            tracing::debug!("Lobe {} incomplete, skipping", lobe);
            continue;
        };
        let coords = encode_lobe_channel(&means, &colors, &scales);
        encoded.push((lobe, channel, names, coords));
    }

    if encoded.is_empty() {
        return LobeOutcome::NoLobes;
    }

    let (material, colors) = match std::mem::take(&mut mesh.visual) {
        Visual::None => (Material::default(), None),
        Visual::Color(color) => (Material::default(), Some(color.vertex_colors)),
        Visual::Texture(mut tex) => (
            tex.material.take().unwrap_or_default(),
            tex.attributes.remove(VisualAttribute::Color),
        ),
    };

    let mut visual = TextureVisual::new(material);
    if let Some(colors) = colors {
        visual.attributes.insert(VisualAttribute::Color, colors);
    }

    let mut lobes = Vec::with_capacity(encoded.len());
    for (lobe, channel, names, coords) in encoded {
        for name in &names {
            mesh.vertex_attributes.remove(name);
        }
        visual.attributes.insert(channel, coords);
        lobes.push(lobe);
    }
    mesh.visual = Visual::Texture(visual);

    LobeOutcome::Encoded(lobes)
}

type LobeData = (Vec<[f32; 3]>, Vec<[f32; 3]>, Vec<f32>);

fn lobe_attributes(mesh: &Mesh, names: &[String; 3], vertex_count: usize) -> Option<LobeData> {
    let means = vec3_values(mesh.vertex_attributes.get(&names[0])?)?;
    let colors = vec3_values(mesh.vertex_attributes.get(&names[1])?)?;
    let scales = scalar_values(mesh.vertex_attributes.get(&names[2])?)?;
    if means.len() != vertex_count || colors.len() != vertex_count || scales.len() != vertex_count {
        return None;
    }
    Some((means, colors, scales))
}

fn vec3_values(data: &AttributeData) -> Option<Vec<[f32; 3]>> {
    match data {
        AttributeData::Vec3(v) => Some(v.clone()),
        AttributeData::Vec4(v) => Some(v.iter().map(|e| [e[0], e[1], e[2]]).collect()),
        AttributeData::Rgba8(v) => Some(
            v.iter()
                .map(|e| [e[0] as f32, e[1] as f32, e[2] as f32])
                .collect(),
        ),
        AttributeData::Scalar(_) | AttributeData::Vec2(_) => None,
    }
}

fn scalar_values(data: &AttributeData) -> Option<Vec<f32>> {
    match data {
        AttributeData::Scalar(v) => Some(v.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::VertexAttributes;
    use crate::mesh::{ColorKind, ColorVisual};

    fn lobe_triangle(lobes: &[usize]) -> Mesh {
        let mut mesh = Mesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 2]],
        );
        for &lobe in lobes {
            mesh.vertex_attributes.insert(
                format!("_sg_mean_{lobe}"),
                AttributeData::Vec3(vec![[10.0, 20.0, 30.0]; 3]),
            );
            mesh.vertex_attributes.insert(
                format!("_sg_color_{lobe}"),
                AttributeData::Vec3(vec![[40.0, 50.0, 60.0]; 3]),
            );
            mesh.vertex_attributes
                .insert(format!("_sg_scale_{lobe}"), AttributeData::Scalar(vec![7.0; 3]));
        }
        mesh
    }

    #[test]
    fn test_lobe_zero_only() {
        let mut mesh = lobe_triangle(&[0]);
        let outcome = prepare_lobe_mesh(&mut mesh, &LobeLayout::default());
        assert_eq!(outcome, LobeOutcome::Encoded(vec![0]));
        assert!(mesh.vertex_attributes.is_empty());
        assert!(mesh.visual.material().is_some());

        let Some(AttributeData::Vec2(uv)) = mesh.visual.get(VisualAttribute::Uv) else {
            panic!("expected primary channel");
        };
        assert_eq!(uv.len(), 3);
        assert_eq!(uv[0][0].to_le_bytes(), [10, 20, 30, 0x67]);
        assert_eq!(uv[0][1].to_le_bytes(), [40, 50, 60, 0x60]);
        assert!(!mesh.visual.has(VisualAttribute::Uv1));
        assert!(!mesh.visual.has(VisualAttribute::Uv2));
    }

    #[test]
    fn test_all_lobes_fill_channels() {
        let mut mesh = lobe_triangle(&[0, 1, 2]);
        mesh.vertex_attributes
            .insert("occlusion", AttributeData::Scalar(vec![1.0; 3]));
        let outcome = prepare_lobe_mesh(&mut mesh, &LobeLayout::default());

        assert_eq!(outcome, LobeOutcome::Encoded(vec![0, 1, 2]));
        assert!(mesh.visual.has(VisualAttribute::Uv));
        assert!(mesh.visual.has(VisualAttribute::Uv1));
        assert!(mesh.visual.has(VisualAttribute::Uv2));
        assert!(!mesh.visual.has(VisualAttribute::Uv3));
        // Unrelated attributes survive
        assert_eq!(mesh.vertex_attributes.len(), 1);
        assert!(mesh.vertex_attributes.contains("occlusion"));
    }

    #[test]
    fn test_incomplete_lobe_left_alone() {
        let mut mesh = lobe_triangle(&[1]);
        mesh.vertex_attributes.remove("_sg_scale_1");
        let before = mesh.clone();

        assert_eq!(prepare_lobe_mesh(&mut mesh, &LobeLayout::default()), LobeOutcome::NoLobes);
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_length_mismatch_not_encoded() {
        let mut mesh = lobe_triangle(&[0]);
        mesh.vertex_attributes
            .insert("_sg_scale_0", AttributeData::Scalar(vec![7.0; 2]));
        assert_eq!(prepare_lobe_mesh(&mut mesh, &LobeLayout::default()), LobeOutcome::NoLobes);
    }

    #[test]
    fn test_vertex_colors_carried_over() {
        let colors = AttributeData::Rgba8(vec![[1, 2, 3, 4]; 3]);
        let mut mesh = lobe_triangle(&[2]).with_visual(Visual::Color(ColorVisual {
            kind: ColorKind::Vertex,
            vertex_colors: colors.clone(),
        }));

        assert_eq!(
            prepare_lobe_mesh(&mut mesh, &LobeLayout::default()),
            LobeOutcome::Encoded(vec![2])
        );
        assert_eq!(mesh.visual.vertex_colors(), Some(&colors));
        assert!(mesh.visual.has(VisualAttribute::Uv2));
        assert!(!mesh.visual.has(VisualAttribute::Uv));
    }
}

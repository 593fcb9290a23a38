//! Multi-channel GLB serializer for lobe-encoded meshes
//!
//! Writes meshes with up to four texture coordinate channels so that lobe
//! parameters packed by `lobe-common` survive tools that drop custom vertex
//! attributes but keep UV sets:
//! - BufferBuilder: Pack binary data with automatic alignment
//! - MeshDocument: Append-only accessors, materials and meshes
//! - MeshAppender: Per-mesh serialization strategy
//! - ExportSession: Ties a document, material cache and config together
//!
//! # Example
//!
//! ```no_run
//! use lobe_glb::*;
//!
//! let mut mesh = Mesh::new(
//!     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]],
//!     vec![[0, 1, 2]],
//! );
//! mesh.vertex_attributes.insert("_sg_mean_0", AttributeData::Vec3(vec![[10.0, 20.0, 30.0]; 3]));
//! mesh.vertex_attributes.insert("_sg_color_0", AttributeData::Vec3(vec![[40.0, 50.0, 60.0]; 3]));
//! mesh.vertex_attributes.insert("_sg_scale_0", AttributeData::Scalar(vec![7.0; 3]));
//!
//! let mut session = ExportSession::new(ExportConfig::default());
//! session.add_lobe_mesh("Triangle", mesh)?;
//! session.write_glb(std::path::Path::new("triangle.glb"))?;
//! # Ok::<(), ExportError>(())
//! ```

pub mod appender;
pub mod attributes;
pub mod buffer;
pub mod config;
pub mod document;
pub mod error;
pub mod lobes;
pub mod material;
pub mod mesh;
pub mod metadata;
pub mod session;
pub mod utils;

pub use appender::{appender_for, MeshAppender, MultiChannelAppender, SingleChannelAppender};
pub use attributes::{
    AttributeData, CustomAttributes, VertexAttributeSet, VertexAttributes, VisualAttribute,
};
pub use buffer::{AccessorIndex, BufferBuilder};
pub use config::{AppenderKind, ExportConfig, ExportOptions, LobeLayout};
pub use document::{MeshDocument, MeshIndex};
pub use error::{ConfigError, ExportError, MetadataError};
pub use lobes::{prepare_lobe_mesh, LobeOutcome};
pub use material::{AlphaMode, Material, MaterialCache};
pub use mesh::{ColorKind, ColorVisual, Mesh, TextureVisual, Visual};
pub use metadata::{Metadata, MetadataValue};
pub use session::ExportSession;
pub use utils::{align_buffer, assemble_glb, compute_bounds};

// Re-export commonly used gltf-json types
pub use gltf_json as json;

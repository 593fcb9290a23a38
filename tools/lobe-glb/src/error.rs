//! Error types for mesh export

use std::path::PathBuf;

/// Fatal export error
///
/// Geometry variants abort only the named mesh; the document is left as it
/// was before the call.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("mesh '{mesh}': face {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        mesh: String,
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("mesh '{mesh}': vertex {vertex} has a non-finite position {position:?}")]
    NonFinitePosition {
        mesh: String,
        vertex: usize,
        position: [f32; 3],
    },

    #[error("mesh '{mesh}': {vertex_count} vertices exceed the u32 index range")]
    TooManyVertices { mesh: String, vertex_count: usize },

    #[error("failed to serialize glTF JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error loading an export configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("lobe attribute pattern '{0}' must contain a '{{}}' placeholder")]
    MissingPlaceholder(String),
}

/// Metadata that cannot be represented as glTF extras
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata key '{key}' holds a non-finite float ({value})")]
    NonFiniteFloat { key: String, value: f64 },
}

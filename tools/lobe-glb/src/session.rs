//! Export session: one document, one material cache, one writer

use std::path::Path;

use crate::appender::{appender_for, MeshAppender};
use crate::config::ExportConfig;
use crate::document::{MeshDocument, MeshIndex};
use crate::error::ExportError;
use crate::lobes::{prepare_lobe_mesh, LobeOutcome};
use crate::material::MaterialCache;
use crate::mesh::Mesh;

/// Builds one GLB from a sequence of meshes
///
/// Meshes are appended in call order; the session is the only writer of its
/// document, so callers producing meshes in parallel must funnel them
/// through a single session (or build separate sessions).
pub struct ExportSession {
    config: ExportConfig,
    appender: Box<dyn MeshAppender + Send + Sync>,
    document: MeshDocument,
    materials: MaterialCache,
    skipped: usize,
}

impl ExportSession {
    /// Session using the appender named in `config`
    pub fn new(config: ExportConfig) -> Self {
        let appender = appender_for(config.export.appender);
        Self::with_appender(config, appender)
    }

    /// Session using an explicit appender
    pub fn with_appender(config: ExportConfig, appender: Box<dyn MeshAppender + Send + Sync>) -> Self {
        Self {
            config,
            appender,
            document: MeshDocument::new(),
            materials: MaterialCache::new(),
            skipped: 0,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn document(&self) -> &MeshDocument {
        &self.document
    }

    /// Number of meshes skipped as empty
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Append a mesh as-is
    ///
    /// On error the document is unchanged and the caller may continue with
    /// the next mesh.
    pub fn add_mesh(&mut self, name: &str, mesh: &Mesh) -> Result<Option<MeshIndex>, ExportError> {
        let result = self.appender.append_mesh(
            &mut self.document,
            &mut self.materials,
            mesh,
            name,
            &self.config.export,
        )?;
        if result.is_none() {
            self.skipped += 1;
        }
        Ok(result)
    }

    /// Pack lobe attributes into texture channels, then append
    ///
    /// Meshes without any complete lobe are dropped and reported as skipped.
    pub fn add_lobe_mesh(&mut self, name: &str, mut mesh: Mesh) -> Result<Option<MeshIndex>, ExportError> {
        match prepare_lobe_mesh(&mut mesh, &self.config.lobes) {
            LobeOutcome::Encoded(lobes) => {
                tracing::debug!("Mesh '{}': packed lobes {:?}", name, lobes);
                self.add_mesh(name, &mesh)
            }
            LobeOutcome::NoLobes => {
                tracing::info!("Mesh '{}' has no lobe attributes, dropping", name);
                self.skipped += 1;
                Ok(None)
            }
        }
    }

    /// Assemble the GLB container
    pub fn to_glb(&self) -> Result<Vec<u8>, ExportError> {
        let glb = self.document.to_glb(&self.config.export.generator)?;
        tracing::info!(
            "Assembled GLB: {} meshes, {} materials, {} accessors, {} bytes ({} skipped)",
            self.document.meshes().len(),
            self.document.materials().len(),
            self.document.buffer().accessor_count(),
            glb.len(),
            self.skipped
        );
        Ok(glb)
    }

    /// Assemble and write the GLB container to `path`
    pub fn write_glb(&self, path: &Path) -> Result<(), ExportError> {
        let glb = self.to_glb()?;
        std::fs::write(path, glb).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Consume the session, returning its document
    pub fn into_document(self) -> MeshDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appender::SingleChannelAppender;
    use crate::attributes::AttributeData;

    fn lobe_mesh() -> Mesh {
        let mut mesh = Mesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 2]],
        );
        for lobe in 0..2 {
            mesh.vertex_attributes.insert(
                format!("_sg_mean_{lobe}"),
                AttributeData::Vec3(vec![[1.0, 2.0, 3.0]; 3]),
            );
            mesh.vertex_attributes.insert(
                format!("_sg_color_{lobe}"),
                AttributeData::Vec3(vec![[4.0, 5.0, 6.0]; 3]),
            );
            mesh.vertex_attributes
                .insert(format!("_sg_scale_{lobe}"), AttributeData::Scalar(vec![0.0; 3]));
        }
        mesh
    }

    #[test]
    fn test_add_lobe_mesh() {
        let mut session = ExportSession::new(ExportConfig::default());
        let index = session.add_lobe_mesh("lobes", lobe_mesh()).unwrap();
        assert_eq!(index, Some(MeshIndex(0)));

        let plain = Mesh::new(vec![[0.0; 3]; 3], vec![[0, 1, 2]]);
        assert_eq!(session.add_lobe_mesh("plain", plain).unwrap(), None);
        assert_eq!(session.skipped(), 1);
        assert_eq!(session.document().meshes().len(), 1);
        assert_eq!(session.document().materials().len(), 1);
    }

    #[test]
    fn test_error_does_not_poison_session() {
        let mut session = ExportSession::new(ExportConfig::default());
        let broken = Mesh::new(vec![[0.0; 3]; 3], vec![[0, 1, 7]]);
        assert!(session.add_mesh("broken", &broken).is_err());

        let index = session.add_mesh("ok", &lobe_mesh()).unwrap();
        assert_eq!(index, Some(MeshIndex(0)));
        assert_eq!(session.document().buffer().accessors()[0].count.0, 3);
    }

    #[test]
    fn test_explicit_appender() {
        let mut session =
            ExportSession::with_appender(ExportConfig::default(), Box::new(SingleChannelAppender));
        session.add_lobe_mesh("lobes", lobe_mesh()).unwrap();
        let attributes = &session.document().meshes()[0].primitives[0].attributes;
        let texcoords = attributes
            .keys()
            .filter(|s| matches!(s, gltf_json::validation::Checked::Valid(gltf_json::mesh::Semantic::TexCoords(_))))
            .count();
        assert_eq!(texcoords, 1);
    }

    #[test]
    fn test_write_glb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.glb");
        let mut session = ExportSession::new(ExportConfig::default());
        session.add_lobe_mesh("lobes", lobe_mesh()).unwrap();
        session.write_glb(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"glTF");

        let err = session
            .write_glb(&dir.path().join("missing").join("out.glb"))
            .unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}

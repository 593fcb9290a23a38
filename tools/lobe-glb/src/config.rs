//! Export configuration
//!
//! Parsed from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! [export]
//! include_normals = true
//! unitize_normals = true
//! appender = "multi-channel"
//!
//! [lobes]
//! mean = "_sg_mean_{}"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub export: ExportOptions,
    #[serde(default)]
    pub lobes: LobeLayout,
}

impl ExportConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ExportConfig = toml::from_str(text)?;
        config.lobes.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Which [`MeshAppender`](crate::MeshAppender) the session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppenderKind {
    /// `TEXCOORD_0` through `TEXCOORD_3`
    #[default]
    MultiChannel,
    /// `TEXCOORD_0` only
    SingleChannel,
}

/// Per-mesh serialization options
#[derive(Debug, Clone, Deserialize)]
pub struct ExportOptions {
    /// `Some(true)` always writes normals (computing them if needed),
    /// `Some(false)` never does, `None` writes them only if cached on the mesh.
    #[serde(default)]
    pub include_normals: Option<bool>,
    /// Rescale normals that are not unit length
    #[serde(default = "default_true")]
    pub unitize_normals: bool,
    /// Value of `asset.generator`
    #[serde(default = "default_generator")]
    pub generator: String,
    #[serde(default)]
    pub appender: AppenderKind,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_normals: None,
            unitize_normals: true,
            generator: default_generator(),
            appender: AppenderKind::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_generator() -> String {
    concat!("lobe-glb ", env!("CARGO_PKG_VERSION")).to_string()
}

/// Attribute naming for lobe parameters
///
/// Patterns contain a `{}` placeholder replaced with the lobe index.
#[derive(Debug, Clone, Deserialize)]
pub struct LobeLayout {
    #[serde(default = "default_lobe_count")]
    pub count: usize,
    #[serde(default = "default_mean_pattern")]
    pub mean: String,
    #[serde(default = "default_color_pattern")]
    pub color: String,
    #[serde(default = "default_scale_pattern")]
    pub scale: String,
}

impl LobeLayout {
    pub fn mean_name(&self, lobe: usize) -> String {
        self.mean.replacen("{}", &lobe.to_string(), 1)
    }

    pub fn color_name(&self, lobe: usize) -> String {
        self.color.replacen("{}", &lobe.to_string(), 1)
    }

    pub fn scale_name(&self, lobe: usize) -> String {
        self.scale.replacen("{}", &lobe.to_string(), 1)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for pattern in [&self.mean, &self.color, &self.scale] {
            if !pattern.contains("{}") {
                return Err(ConfigError::MissingPlaceholder(pattern.clone()));
            }
        }
        Ok(())
    }
}

impl Default for LobeLayout {
    fn default() -> Self {
        Self {
            count: default_lobe_count(),
            mean: default_mean_pattern(),
            color: default_color_pattern(),
            scale: default_scale_pattern(),
        }
    }
}

fn default_lobe_count() -> usize {
    lobe_common::LOBE_COUNT
}

fn default_mean_pattern() -> String {
    "_sg_mean_{}".to_string()
}

fn default_color_pattern() -> String {
    "_sg_color_{}".to_string()
}

fn default_scale_pattern() -> String {
    "_sg_scale_{}".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ExportConfig::from_toml_str("").unwrap();
        assert_eq!(config.export.include_normals, None);
        assert!(config.export.unitize_normals);
        assert_eq!(config.export.appender, AppenderKind::MultiChannel);
        assert_eq!(config.lobes.count, 3);
        assert_eq!(config.lobes.mean_name(1), "_sg_mean_1");
        assert_eq!(config.lobes.scale_name(2), "_sg_scale_2");
    }

    #[test]
    fn test_parse_full_config() {
        let text = r#"
[export]
include_normals = false
unitize_normals = false
generator = "custom"
appender = "single-channel"

[lobes]
count = 2
mean = "lobe{}_mean"
color = "lobe{}_color"
scale = "lobe{}_scale"
"#;
        let config = ExportConfig::from_toml_str(text).unwrap();
        assert_eq!(config.export.include_normals, Some(false));
        assert!(!config.export.unitize_normals);
        assert_eq!(config.export.generator, "custom");
        assert_eq!(config.export.appender, AppenderKind::SingleChannel);
        assert_eq!(config.lobes.count, 2);
        assert_eq!(config.lobes.color_name(0), "lobe0_color");
    }

    #[test]
    fn test_pattern_without_placeholder_rejected() {
        let err = ExportConfig::from_toml_str("[lobes]\nmean = \"_sg_mean\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingPlaceholder(p) if p == "_sg_mean"));
    }

    #[test]
    fn test_malformed_config_rejected() {
        let err = ExportConfig::from_toml_str("[export]\nappender = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.toml");
        std::fs::write(&path, "[export]\ninclude_normals = true\n").unwrap();

        let config = ExportConfig::load(&path).unwrap();
        assert_eq!(config.export.include_normals, Some(true));

        let missing = ExportConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}

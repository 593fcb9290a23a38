//! Materials and the session-scoped material cache

use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use hashbrown::HashMap;
use xxhash_rust::xxh3::Xxh3;

/// Alpha blending mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// Factor-only PBR metallic-roughness material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub base_color_factor: [f32; 4],
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub emissive_factor: [f32; 3],
    pub alpha_mode: AlphaMode,
    /// Only written for [`AlphaMode::Mask`]
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            emissive_factor: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

impl Material {
    /// Content hash used for deduplication
    ///
    /// Floats are hashed by bit pattern, so `0.0` and `-0.0` differ.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        match &self.name {
            Some(name) => {
                hasher.update(&[1]);
                hasher.update(&(name.len() as u64).to_le_bytes());
                hasher.update(name.as_bytes());
            }
            None => hasher.update(&[0]),
        }
        let [r, g, b, a] = self.base_color_factor;
        let [er, eg, eb] = self.emissive_factor;
        let factors = [
            r,
            g,
            b,
            a,
            self.metallic_factor,
            self.roughness_factor,
            er,
            eg,
            eb,
            self.alpha_cutoff,
        ];
        for factor in factors {
            hasher.update(&factor.to_bits().to_le_bytes());
        }
        hasher.update(&[self.alpha_mode as u8, self.double_sided as u8]);
        hasher.digest()
    }

    /// Convert to a glTF material
    pub fn to_json(&self) -> json::Material {
        let alpha_mode = match self.alpha_mode {
            AlphaMode::Opaque => json::material::AlphaMode::Opaque,
            AlphaMode::Mask => json::material::AlphaMode::Mask,
            AlphaMode::Blend => json::material::AlphaMode::Blend,
        };
        let alpha_cutoff = match self.alpha_mode {
            AlphaMode::Mask => Some(json::material::AlphaCutoff(self.alpha_cutoff)),
            _ => None,
        };

        json::Material {
            alpha_cutoff,
            alpha_mode: Valid(alpha_mode),
            double_sided: self.double_sided,
            name: self.name.clone(),
            pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                base_color_factor: json::material::PbrBaseColorFactor(self.base_color_factor),
                metallic_factor: json::material::StrengthFactor(self.metallic_factor),
                roughness_factor: json::material::StrengthFactor(self.roughness_factor),
                ..Default::default()
            },
            emissive_factor: json::material::EmissiveFactor(self.emissive_factor),
            ..Default::default()
        }
    }
}

/// Maps material content hashes to document material indices
///
/// Owned by the export session and passed by reference into each append,
/// so it lives exactly as long as the document it indexes.
#[derive(Debug, Default)]
pub struct MaterialCache {
    by_hash: HashMap<u64, u32>,
}

impl MaterialCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of a previously appended material with the same content
    pub fn lookup(&self, material: &Material) -> Option<u32> {
        self.by_hash.get(&material.content_hash()).copied()
    }

    /// Record a newly appended material; the first index for a hash wins
    pub fn record(&mut self, material: &Material, index: u32) -> u32 {
        *self.by_hash.entry(material.content_hash()).or_insert(index)
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_stable_and_sensitive() {
        let a = Material::default();
        let b = Material::default();
        assert_eq!(a.content_hash(), b.content_hash());

        let c = Material {
            roughness_factor: 0.5,
            ..Material::default()
        };
        assert_ne!(a.content_hash(), c.content_hash());

        let d = Material {
            name: Some("lobes".to_string()),
            ..Material::default()
        };
        assert_ne!(a.content_hash(), d.content_hash());
    }

    #[test]
    fn test_cache_keeps_first_index() {
        let mut cache = MaterialCache::new();
        let mat = Material::default();
        assert_eq!(cache.lookup(&mat), None);

        assert_eq!(cache.record(&mat, 0), 0);
        assert_eq!(cache.record(&mat, 5), 0);
        assert_eq!(cache.lookup(&mat), Some(0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_to_json_alpha_cutoff_only_for_mask() {
        let opaque = Material::default().to_json();
        assert!(opaque.alpha_cutoff.is_none());

        let masked = Material {
            alpha_mode: AlphaMode::Mask,
            alpha_cutoff: 0.25,
            ..Material::default()
        }
        .to_json();
        assert_eq!(masked.alpha_cutoff.map(|c| c.0), Some(0.25));
        assert_eq!(masked.pbr_metallic_roughness.base_color_factor.0, [1.0; 4]);
    }
}

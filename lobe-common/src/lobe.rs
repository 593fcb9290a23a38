//! Per-vertex lobe encoding
//!
//! A lobe is one directional radiance parameter set: a mean direction, a
//! color and a scalar scale, all already quantized to bytes.

use rayon::prelude::*;

use crate::packing::{pack_lobe, quantize_byte, quantize_vec3};

/// Number of lobes carried per vertex
pub const LOBE_COUNT: usize = 3;

/// One lobe of one vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lobe {
    pub mean: [u8; 3],
    pub color: [u8; 3],
    pub scale: u8,
}

impl Lobe {
    /// Quantize raw attribute values (see [`quantize_byte`])
    pub fn from_raw(mean: [f32; 3], color: [f32; 3], scale: f32) -> Self {
        Self {
            mean: quantize_vec3(mean),
            color: quantize_vec3(color),
            scale: quantize_byte(scale),
        }
    }

    /// Pack into a UV pair
    #[inline]
    pub fn pack(&self) -> [f32; 2] {
        pack_lobe(self.mean, self.color, self.scale)
    }
}

/// Encode one lobe's per-vertex attributes into a UV channel
///
/// The three slices are zipped; the output has the length of the shortest.
/// Output order matches vertex order.
pub fn encode_lobe_channel(means: &[[f32; 3]], colors: &[[f32; 3]], scales: &[f32]) -> Vec<[f32; 2]> {
    means
        .par_iter()
        .zip(colors.par_iter())
        .zip(scales.par_iter())
        .map(|((mean, color), scale)| Lobe::from_raw(*mean, *color, *scale).pack())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lobe_from_raw() {
        let lobe = Lobe::from_raw([10.0, 20.7, 30.0], [40.0, 50.0, 60.0], 7.0);
        assert_eq!(lobe.mean, [10, 20, 30]);
        assert_eq!(lobe.color, [40, 50, 60]);
        assert_eq!(lobe.scale, 7);
    }

    #[test]
    fn test_encode_lobe_channel_preserves_order() {
        let means: Vec<[f32; 3]> = (0..64).map(|i| [i as f32, 0.0, 0.0]).collect();
        let colors = vec![[1.0, 2.0, 3.0]; 64];
        let scales = vec![0x3C as f32; 64];

        let channel = encode_lobe_channel(&means, &colors, &scales);

        assert_eq!(channel.len(), 64);
        for (i, uv) in channel.iter().enumerate() {
            assert_eq!(uv[0].to_le_bytes(), [i as u8, 0, 0, 0x6C]);
            assert_eq!(uv[1].to_le_bytes(), [1, 2, 3, 0x63]);
        }
    }

    #[test]
    fn test_encode_lobe_channel_shortest_input() {
        let channel = encode_lobe_channel(&[[0.0; 3]; 4], &[[0.0; 3]; 2], &[0.0; 3]);
        assert_eq!(channel.len(), 2);
    }
}

//! Float bit-packing utilities
//!
//! Packs raw bytes into the bit pattern of an IEEE 754 binary32 so that
//! a pair of UV floats can carry a lobe's mean, color and scale through
//! tools that only preserve standard texture coordinates.
//!
//! Wire layout per lobe (little-endian bytes of each float):
//! - `uv.x` = `[mean_x, mean_y, mean_z, exp_low]`
//! - `uv.y` = `[color_x, color_y, color_z, exp_high]`
//!
//! where `exp_low`/`exp_high` are the scale nibbles biased by [`EXPONENT_BIAS`].

// ============================================================================
// Constants
// ============================================================================

/// Bias OR'd into each exponent nibble.
///
/// With the most-significant byte in `0x60..=0x6F` the biased exponent field
/// is in `192..=223`, so the float is normal and finite for any low 3 bytes.
pub const EXPONENT_BIAS: u8 = 0x60;

/// Mask selecting the payload bits of a biased exponent byte
pub const NIBBLE_MASK: u8 = 0x0F;

// ============================================================================
// Byte Packing
// ============================================================================

/// Reinterpret four bytes as the little-endian layout of an `f32`
///
/// No arithmetic is performed: `pack_float32_quad(a, b, c, d).to_le_bytes()`
/// is always `[a, b, c, d]`. The result is only meaningful as a bit pattern.
/// Callers must pass a biased exponent byte (see [`pack_nibbles_into_exponent`])
/// as `b3` if the value has to survive tools that reject NaN, Inf or
/// subnormal floats.
#[inline]
pub const fn pack_float32_quad(b0: u8, b1: u8, b2: u8, b3: u8) -> f32 {
    f32::from_bits(u32::from_le_bytes([b0, b1, b2, b3]))
}

/// Split one byte into two biased exponent bytes `(low, high)`
///
/// Each half keeps its 4 payload bits in the low nibble; `byte & NIBBLE_MASK`
/// recovers them.
#[inline]
pub const fn pack_nibbles_into_exponent(value: u8) -> (u8, u8) {
    (
        (value & NIBBLE_MASK) | EXPONENT_BIAS,
        ((value >> 4) & NIBBLE_MASK) | EXPONENT_BIAS,
    )
}

/// Pack one lobe into a UV pair
///
/// The scale byte is split across the exponent bytes of both coordinates.
#[inline]
pub const fn pack_lobe(mean: [u8; 3], color: [u8; 3], scale: u8) -> [f32; 2] {
    let (exp_low, exp_high) = pack_nibbles_into_exponent(scale);
    [
        pack_float32_quad(mean[0], mean[1], mean[2], exp_low),
        pack_float32_quad(color[0], color[1], color[2], exp_high),
    ]
}

// ============================================================================
// Quantization
// ============================================================================

/// Convert an attribute value to a raw byte
///
/// Truncates toward zero, then wraps modulo 256 (`300.0 -> 44`, `-1.0 -> 255`).
/// Out-of-range values are deliberately not clamped so that existing encoded
/// assets stay bit-compatible. NaN maps to 0.
#[inline]
pub fn quantize_byte(value: f32) -> u8 {
    (value as i64) as u8
}

/// Quantize a 3-component attribute value
#[inline]
pub fn quantize_vec3(value: [f32; 3]) -> [u8; 3] {
    [
        quantize_byte(value[0]),
        quantize_byte(value[1]),
        quantize_byte(value[2]),
    ]
}

//! Shared codec for lobe-encoded meshes
//!
//! Provides the float bit-packing used to hide per-vertex lobe parameters
//! inside texture coordinate channels. Used by `lobe-glb` when preparing
//! meshes for export.

pub mod lobe;
pub mod packing;

pub use lobe::{encode_lobe_channel, Lobe, LOBE_COUNT};
pub use packing::{
    pack_float32_quad, pack_lobe, pack_nibbles_into_exponent, quantize_byte, quantize_vec3,
    EXPONENT_BIAS, NIBBLE_MASK,
};

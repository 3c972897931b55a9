//! Depth key encoding.
//!
//! The radix sort orders raw `u32` keys. Depths are signed floats, so they are
//! mapped to keys whose unsigned order is the float order: positive floats get
//! their sign bit set, negative floats get every bit flipped.
//!
//! `common::depth_key` in the shader package is the GPU side of
//! [`depth_key`].

const SIGN_BIT: u32 = 1 << 31;

/// Encode a depth as an order-preserving key.
///
/// For any non-NaN `a < b`, `depth_key(a) < depth_key(b)`. `-0.0` sorts just
/// before `0.0`.
pub fn depth_key(depth: f32) -> u32 {
    let bits = depth.to_bits();
    if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits | SIGN_BIT
    }
}

/// Decode a key produced by [`depth_key`].
pub fn depth_from_key(key: u32) -> f32 {
    let bits = if key & SIGN_BIT != 0 {
        key & !SIGN_BIT
    } else {
        !key
    };
    f32::from_bits(bits)
}

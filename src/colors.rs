//! Packed ARGB8888 colors.

use crate::math::vec3::Vec3;

pub const BACKGROUND: u32 = 0xFFFFFFFF;
pub const WIREFRAME: u32 = 0xFF000000;

/// Packs an RGB color in [0, 1] into ARGB8888 with full alpha.
///
/// Channels outside [0, 1] are clamped first.
#[inline]
pub fn to_argb(color: Vec3) -> u32 {
    let c = color.clamp(0.0, 1.0);
    let r = (c.x * 255.0).round() as u32;
    let g = (c.y * 255.0).round() as u32;
    let b = (c.z * 255.0).round() as u32;
    0xFF000000 | (r << 16) | (g << 8) | b
}

/// Unpacks the RGB channels of an ARGB8888 value into [0, 1].
#[inline]
pub fn from_argb(argb: u32) -> Vec3 {
    Vec3::new(
        ((argb >> 16) & 0xFF) as f32,
        ((argb >> 8) & 0xFF) as f32,
        (argb & 0xFF) as f32,
    ) / 255.0
}

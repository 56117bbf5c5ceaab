//! Vector and matrix math shared by every stage of the pipeline.

pub mod mat4;
pub mod vec3;
pub mod vec4;

use std::cmp::Ordering;

/// Tolerance used for every depth and scanline comparison.
pub const FLOAT_TOL: f32 = 1e-6;

/// Three-way float comparison with a tolerance.
///
/// Values closer than `epsilon` compare [`Ordering::Equal`]. All depth tests
/// and edge ordering go through this instead of `<` / `==` so accumulated
/// interpolation error does not cause z-fighting.
#[inline]
pub fn compare(a: f32, b: f32, epsilon: f32) -> Ordering {
    if (a - b).abs() < epsilon {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

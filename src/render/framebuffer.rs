//! Frame buffer abstraction for 2D pixel access.
//!
//! Provides a safe view into color and depth buffers with bounds-checked access.
//! The depth buffer enables proper hidden surface removal via z-buffer algorithm.

use std::cmp::Ordering;

use crate::math::{compare, FLOAT_TOL};

/// A view into color and depth buffers.
///
/// Wraps 1D slices with width/height metadata to enable safe 2D pixel access.
/// This is a borrowed view, not an owning type - it's meant to be created
/// temporarily when you need to pass buffers + dimensions together.
///
/// # Depth Buffer
///
/// The depth buffer stores post-divide depth in [0, 1]: 0 on the near plane,
/// 1 on the far plane. Smaller values are closer to the camera, and a fresh
/// buffer holds 1.0 everywhere.
pub struct FrameBuffer<'a> {
    color_buffer: &'a mut [u32],
    depth_buffer: &'a mut [f32],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    /// Create a new FrameBuffer view from buffer slices and dimensions.
    pub fn new(
        color_buffer: &'a mut [u32],
        depth_buffer: &'a mut [f32],
        width: u32,
        height: u32,
    ) -> Self {
        debug_assert_eq!(
            color_buffer.len(),
            (width * height) as usize,
            "Color buffer size doesn't match dimensions"
        );
        debug_assert_eq!(
            depth_buffer.len(),
            (width * height) as usize,
            "Depth buffer size doesn't match dimensions"
        );
        Self {
            color_buffer,
            depth_buffer,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }

    /// Whether `depth` is strictly nearer than what (x, y) holds, compared
    /// with the float tolerance. False outside the buffer.
    #[inline]
    pub fn passes_depth_test(&self, x: i32, y: i32, depth: f32) -> bool {
        self.index(x, y)
            .is_some_and(|idx| compare(depth, self.depth_buffer[idx], FLOAT_TOL) == Ordering::Less)
    }

    /// Set a pixel at (x, y) with depth testing.
    ///
    /// The pixel and its depth are written only if `depth` is strictly
    /// nearer than the stored depth. Depths within the tolerance of the
    /// stored one lose, so the first writer keeps the pixel.
    /// Returns whether the pixel was written; out-of-bounds coordinates are ignored.
    #[inline]
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, depth: f32, color: u32) -> bool {
        match self.index(x, y) {
            Some(idx) if compare(depth, self.depth_buffer[idx], FLOAT_TOL) == Ordering::Less => {
                self.depth_buffer[idx] = depth;
                self.color_buffer[idx] = color;
                true
            }
            _ => false,
        }
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.color_buffer[idx])
    }

    /// Get the stored depth at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_depth(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|idx| self.depth_buffer[idx])
    }
}

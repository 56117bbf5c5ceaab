//! Low-level rendering primitives.
//!
//! Provides the [`Renderer`] struct which owns the color and depth buffers
//! and implements the drawing operations that bypass the scanline fill:
//! clearing, single pixels and wireframe lines.

use std::path::Path;

use image::{ImageBuffer, Rgb};

use super::framebuffer::FrameBuffer;
use crate::colors;
use crate::math::vec3::Vec3;

/// Depth of an empty pixel: the far plane.
pub const FAR_DEPTH: f32 = 1.0;

pub struct Renderer {
    color_buffer: Vec<u32>,
    depth_buffer: Vec<f32>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            color_buffer: vec![colors::BACKGROUND; size],
            depth_buffer: vec![FAR_DEPTH; size],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width * height) as usize;
        self.color_buffer = vec![colors::BACKGROUND; size];
        self.depth_buffer = vec![FAR_DEPTH; size];
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
    }

    /// Clear the depth buffer to prepare for a new frame.
    /// Sets all depths to the far plane.
    #[inline]
    pub fn clear_depth(&mut self) {
        self.depth_buffer.fill(FAR_DEPTH);
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            let index = (y as u32 * self.width + x as u32) as usize;
            self.color_buffer[index] = color;
        }
    }

    /// Draws a line between two screen points using Bresenham's line algorithm.
    ///
    /// The line is first clipped to the buffer, then its endpoints are
    /// rounded to pixel centers; depth is ignored so wireframes always show
    /// every edge.
    ///
    /// Bresenham's algorithm determines which pixels to illuminate using only
    /// integer arithmetic. It tracks an "error" term that represents the
    /// distance between the ideal line and the current pixel, and steps
    /// diagonally instead of straight once that error exceeds a threshold.
    pub fn draw_line(&mut self, from: Vec3, to: Vec3, color: u32) {
        let Some(((x0, y0), (x1, y1))) = self.clip_line((from.x, from.y), (to.x, to.y)) else {
            return;
        };
        let (x0, y0) = (x0.round() as i32, y0.round() as i32);
        let (x1, y1) = (x1.round() as i32, y1.round() as i32);

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let x_step = if x0 < x1 { 1 } else { -1 };
        let y_step = if y0 < y1 { 1 } else { -1 };

        // Positive error favors x movement, negative favors y.
        let mut err = dx - dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += x_step;
            }
            // Both branches may run: a diagonal step.
            if e2 < dx {
                err += dx;
                y += y_step;
            }
        }
    }

    /// Cohen-Sutherland clip of a segment to the pixel centers of the buffer.
    ///
    /// Returns `None` when nothing of the segment is visible or an endpoint
    /// is not finite.
    fn clip_line(&self, from: (f32, f32), to: (f32, f32)) -> Option<((f32, f32), (f32, f32))> {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const TOP: u8 = 4;
        const BOTTOM: u8 = 8;

        if self.width == 0 || self.height == 0 {
            return None;
        }
        if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
            return None;
        }

        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let outcode = |(x, y): (f32, f32)| -> u8 {
            let mut code = INSIDE;
            if x < 0.0 {
                code |= LEFT;
            } else if x > max_x {
                code |= RIGHT;
            }
            if y < 0.0 {
                code |= TOP;
            } else if y > max_y {
                code |= BOTTOM;
            }
            code
        };

        let (mut a, mut b) = (from, to);
        let (mut code_a, mut code_b) = (outcode(a), outcode(b));

        // Each pass moves one endpoint onto a buffer side, so four suffice.
        for _ in 0..4 {
            if code_a | code_b == INSIDE {
                return Some((a, b));
            }
            if code_a & code_b != INSIDE {
                return None;
            }

            let code_out = if code_a != INSIDE { code_a } else { code_b };
            let (dx, dy) = (b.0 - a.0, b.1 - a.1);
            // The side tests above guarantee a non-zero delta on the clipped axis.
            let point = if code_out & BOTTOM != 0 {
                (a.0 + dx * (max_y - a.1) / dy, max_y)
            } else if code_out & TOP != 0 {
                (a.0 + dx * (0.0 - a.1) / dy, 0.0)
            } else if code_out & RIGHT != 0 {
                (max_x, a.1 + dy * (max_x - a.0) / dx)
            } else {
                (0.0, a.1 + dy * (0.0 - a.0) / dx)
            };

            if code_out == code_a {
                a = point;
                code_a = outcode(a);
            } else {
                b = point;
                code_b = outcode(b);
            }
        }

        (code_a | code_b == INSIDE).then_some((a, b))
    }

    /// Draws the closed outline through `points`.
    pub fn draw_polygon_outline(&mut self, points: &[Vec3], color: u32) {
        for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
            self.draw_line(*a, *b, color);
        }
    }

    pub fn color_buffer(&self) -> &[u32] {
        &self.color_buffer
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth_buffer
    }

    /// Color buffer as bytes, four per pixel in native-endian ARGB8888
    /// (BGRA on little-endian targets), for streaming into a display texture.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.color_buffer
            .iter()
            .flat_map(|pixel| pixel.to_ne_bytes())
            .collect()
    }

    /// Encodes the color buffer as an RGB image, row 0 at the top.
    pub fn to_image(&self) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let argb = self.color_buffer[(y * self.width + x) as usize];
            Rgb([(argb >> 16) as u8, (argb >> 8) as u8, argb as u8])
        })
    }

    /// Writes the color buffer to an image file; the format follows the
    /// extension.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        self.to_image().save(path)
    }

    /// Get a mutable FrameBuffer view into the color and depth buffers.
    pub fn as_framebuffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(
            &mut self.color_buffer,
            &mut self.depth_buffer,
            self.width,
            self.height,
        )
    }
}

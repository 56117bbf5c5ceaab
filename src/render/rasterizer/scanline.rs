//! Scanline polygon fill over an Edge Table / Active Edge Table.
//!
//! # Algorithm Overview
//!
//! 1. **Build edges**: every polygon side that is not horizontal after
//!    rounding becomes an [`Edge`] holding its starting x, depth and
//!    attributes plus their per-scanline increments.
//! 2. **Bucket** edges in the [`EdgeTable`] by the first scanline they cover.
//! 3. **Sweep** scanlines top to bottom. Each scanline moves its bucket
//!    into the [`ActiveEdgeTable`], pairs the active edges left to right
//!    into spans, then steps every surviving edge to the next scanline.
//! 4. **Fill** each span, interpolating depth and attributes linearly in
//!    screen space and depth testing every pixel.
//!
//! The sweep runs to completion before any pixel is written, so a polygon
//! whose active edges fail to pair is rejected without touching the buffer.
//!
//! # Edge Coverage
//!
//! An edge covers scanlines `[y_min, y_max)`. Where two edges meet at a
//! vertex one ends and the next begins on the same row, so the active count
//! stays even. Edges ending on the polygon's bottom row also cover that row.
//!
//! ```text
//!          (150,50)            row 50: one pixel, 150..=150
//!            /\
//!           /  \
//!          /    \
//!   (100,100)----(200,100)     row 100: 100..=200
//! ```
//!
//! # References
//!
//! - Foley, van Dam et al., "Computer Graphics: Principles and Practice"

use log::trace;

use super::edge::Edge;
use super::edge_table::{ActiveEdgeTable, EdgeTable};
use super::shader::{Fragment, PixelShader};
use super::{EdgeSample, RasterError, ScreenVertex, Span};
use crate::math::vec3::Vec3;
use crate::render::framebuffer::FrameBuffer;

/// Largest screen coordinate magnitude, in pixels, a polygon may have.
///
/// Every integer below it is exact in `f32`, and rows and columns within
/// twice its range fit an `i32`. Vertices just in front of the camera plane
/// project far beyond it; such polygons are rejected instead of stepped.
pub const GUARD_BAND: f32 = 16_777_216.0;

/// Edge Table based polygon rasterizer.
///
/// Holds a span buffer that is reused from one polygon to the next.
#[derive(Debug, Default)]
pub struct ScanlineRasterizer {
    spans: Vec<Span>,
}

impl ScanlineRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the spans of a polygon on a target `rows` pixels tall.
    ///
    /// Scanlines above row 0 are stepped over without producing spans, and
    /// the sweep ends at the last row. Vertices beyond [`GUARD_BAND`] reject
    /// the polygon. `interpolate` controls whether the
    /// `vec`/`vert` attributes are carried along.
    pub fn scan(
        vertices: &[ScreenVertex],
        interpolate: bool,
        rows: u32,
    ) -> Result<Vec<Span>, RasterError> {
        let mut spans = Vec::new();
        Self::scan_into(vertices, interpolate, rows, &mut spans)?;
        Ok(spans)
    }

    fn scan_into(
        vertices: &[ScreenVertex],
        interpolate: bool,
        rows: u32,
        spans: &mut Vec<Span>,
    ) -> Result<(), RasterError> {
        if vertices.len() < 3 {
            return Err(RasterError::TooFewVertices {
                count: vertices.len(),
            });
        }

        if let Some(vertex) = vertices.iter().position(|v| {
            !(v.position.x.abs() <= GUARD_BAND && v.position.y.abs() <= GUARD_BAND)
        }) {
            return Err(RasterError::OutOfRange { vertex });
        }

        let edges: Vec<(i32, Edge)> = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .filter_map(|(a, b)| Edge::between(a, b, interpolate))
            .collect();

        // Every side horizontal: the polygon covers no scanline crossing.
        let Some(bottom) = edges.iter().map(|(_, e)| e.y_max).max() else {
            return Ok(());
        };

        let mut et = EdgeTable::new();
        for (scanline, mut edge) in edges {
            if edge.y_max == bottom {
                edge.close();
            }
            et.insert(scanline, edge);
        }

        let mut aet = ActiveEdgeTable::new();
        let mut y = match et.first_scanline() {
            Some(first) => first,
            None => return Ok(()),
        };

        if y < 0 {
            for (start, bucket) in et.take_before(0) {
                for mut edge in bucket {
                    if edge.last_scanline() >= 0 {
                        edge.skip(-start);
                        aet.insert(edge);
                    }
                }
            }
            y = 0;
        }

        let rows = rows.min(i32::MAX as u32) as i32;
        while y < rows && !(et.is_empty() && aet.is_empty()) {
            if let Some(bucket) = et.take(y) {
                aet.extend(bucket);
            }

            for pair in aet.pairs(y)? {
                let (x_start, left) = &pair[0];
                let (x_end, right) = &pair[1];
                spans.push(Span {
                    y,
                    x_start: *x_start,
                    x_end: *x_end,
                    left: left.sample(),
                    right: right.sample(),
                });
            }

            aet.advance(y);
            y += 1;
        }
        Ok(())
    }

    /// Fills a convex polygon into `buffer` with a depth test per pixel.
    ///
    /// Returns the number of pixels written. On error nothing is written.
    pub fn fill_polygon<S: PixelShader>(
        &mut self,
        vertices: &[ScreenVertex],
        shader: &S,
        buffer: &mut FrameBuffer,
    ) -> Result<usize, RasterError> {
        self.spans.clear();
        Self::scan_into(vertices, S::INTERPOLATES, buffer.height(), &mut self.spans)?;

        let width = buffer.width() as i32;
        let mut written = 0;
        for span in &self.spans {
            written += fill_span(span, width, shader, buffer);
        }
        trace!("{} spans, {} pixels written", self.spans.len(), written);
        Ok(written)
    }
}

/// Fills the visible part of one span, returning the pixels written.
#[inline]
fn fill_span<S: PixelShader>(span: &Span, width: i32, shader: &S, buffer: &mut FrameBuffer) -> usize {
    if span.x_end < 0 || span.x_start >= width {
        return 0;
    }

    let (left, right): (&EdgeSample, &EdgeSample) = (&span.left, &span.right);
    let length = (span.x_end - span.x_start) as f32;
    let (dz, dvec, dvert) = if length > 0.0 {
        (
            (right.z - left.z) / length,
            (right.vec - left.vec) / length,
            (right.vert - left.vert) / length,
        )
    } else {
        (0.0, Vec3::ZERO, Vec3::ZERO)
    };

    let x0 = span.x_start.max(0);
    let x1 = span.x_end.min(width - 1);
    let offset = (x0 - span.x_start) as f32;

    let mut z = left.z + dz * offset;
    let mut vec = left.vec + dvec * offset;
    let mut vert = left.vert + dvert * offset;
    let mut written = 0;

    for x in x0..=x1 {
        if buffer.passes_depth_test(x, span.y, z) {
            let fragment = Fragment {
                x,
                y: span.y,
                depth: z,
                vec,
                vert,
            };
            buffer.set_pixel_with_depth(x, span.y, z, shader.shade(&fragment));
            written += 1;
        }
        z += dz;
        if S::INTERPOLATES {
            vec += dvec;
            vert += dvert;
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::rasterizer::shader::{FlatShader, GouraudShader};
    use crate::render::renderer::Renderer;
    use approx::assert_relative_eq;

    fn screen(x: f32, y: f32, z: f32) -> ScreenVertex {
        ScreenVertex::new(Vec3::new(x, y, z), Vec3::ZERO, Vec3::ZERO)
    }

    fn triangle(z: f32) -> [ScreenVertex; 3] {
        [
            screen(100.0, 100.0, z),
            screen(200.0, 100.0, z),
            screen(150.0, 50.0, z),
        ]
    }

    #[test]
    fn triangle_spans_from_apex_to_base() {
        let spans = ScanlineRasterizer::scan(&triangle(0.5), false, 300).unwrap();

        assert_eq!(spans.len(), 51);
        let top = spans.first().unwrap();
        assert_eq!((top.y, top.x_start, top.x_end), (50, 150, 150));
        let bottom = spans.last().unwrap();
        assert_eq!((bottom.y, bottom.x_start, bottom.x_end), (100, 100, 200));

        for (i, span) in spans.iter().enumerate() {
            let dy = i as i32;
            assert_eq!(span.y, 50 + dy);
            assert_eq!((span.x_start, span.x_end), (150 - dy, 150 + dy));
        }
    }

    #[test]
    fn convex_polygons_always_pair() {
        // Regular polygons at assorted sizes, rotations and sub-pixel offsets.
        for sides in 3..=12 {
            for step in 0..8 {
                let rotation = step as f32 * 0.37;
                let radius = 20.0 + 11.0 * step as f32;
                let center = (160.3 + step as f32 * 0.25, 120.7);
                let polygon: Vec<ScreenVertex> = (0..sides)
                    .map(|i| {
                        let a = rotation + i as f32 * std::f32::consts::TAU / sides as f32;
                        screen(center.0 + radius * a.cos(), center.1 + radius * a.sin(), 0.5)
                    })
                    .collect();

                let spans = ScanlineRasterizer::scan(&polygon, false, 480).unwrap();
                // One span per covered row.
                for pair in spans.windows(2) {
                    assert_eq!(pair[1].y, pair[0].y + 1, "{} sides, step {}", sides, step);
                }
            }
        }
    }

    #[test]
    fn concave_polygon_splits_rows_into_two_spans() {
        // A "V" notch cut into the top edge.
        let polygon = [
            screen(0.0, 0.0, 0.5),
            screen(20.0, 10.0, 0.5),
            screen(40.0, 0.0, 0.5),
            screen(40.0, 30.0, 0.5),
            screen(0.0, 30.0, 0.5),
        ];
        let spans = ScanlineRasterizer::scan(&polygon, false, 100).unwrap();
        assert_eq!(spans.iter().filter(|s| s.y == 4).count(), 2);
        assert_eq!(spans.iter().filter(|s| s.y == 20).count(), 1);
    }

    #[test]
    fn fewer_than_three_vertices_is_an_error() {
        let err = ScanlineRasterizer::scan(&triangle(0.5)[..2], false, 300).unwrap_err();
        assert_eq!(err, RasterError::TooFewVertices { count: 2 });
    }

    #[test]
    fn flat_polygon_produces_no_spans() {
        let line = [screen(0.0, 5.0, 0.5), screen(9.0, 5.2, 0.5), screen(20.0, 4.9, 0.5)];
        assert!(ScanlineRasterizer::scan(&line, false, 10).unwrap().is_empty());
    }

    #[test]
    fn rows_outside_target_are_not_emitted() {
        let tall = [
            screen(10.0, -50.0, 0.5),
            screen(30.0, 60.0, 0.5),
            screen(-10.0, 60.0, 0.5),
        ];
        let spans = ScanlineRasterizer::scan(&tall, false, 40).unwrap();
        assert_eq!(spans.first().map(|s| s.y), Some(0));
        assert_eq!(spans.last().map(|s| s.y), Some(39));

        // Starting mid-edge matches stepping from the apex.
        let full = ScanlineRasterizer::scan(&tall, false, 200).unwrap();
        let row0 = full.iter().find(|s| s.y == 0).unwrap();
        assert_eq!((row0.x_start, row0.x_end), (spans[0].x_start, spans[0].x_end));
    }

    #[test]
    fn vertices_beyond_guard_band_reject_the_polygon() {
        let spike = [
            screen(10.0, -3.0e9, 0.5),
            screen(30.0, 60.0, 0.5),
            screen(-10.0, 60.0, 0.5),
        ];
        let err = ScanlineRasterizer::scan(&spike, false, 40).unwrap_err();
        assert_eq!(err, RasterError::OutOfRange { vertex: 0 });

        let undefined = [screen(0.0, 0.0, 0.5), screen(f32::NAN, 5.0, 0.5), screen(5.0, 5.0, 0.5)];
        let err = ScanlineRasterizer::scan(&undefined, false, 40).unwrap_err();
        assert_eq!(err, RasterError::OutOfRange { vertex: 1 });

        let wide = [screen(-3.0e9, 5.0, 0.5), screen(30.0, 0.0, 0.5), screen(30.0, 10.0, 0.5)];
        let mut renderer = Renderer::new(40, 20);
        let mut fb = renderer.as_framebuffer();
        let err = ScanlineRasterizer::new()
            .fill_polygon(&wide, &FlatShader::new(0xFFFF0000), &mut fb)
            .unwrap_err();
        assert_eq!(err, RasterError::OutOfRange { vertex: 0 });
        assert!(renderer.depth_buffer().iter().all(|d| *d == 1.0));
    }

    #[test]
    fn large_polygon_inside_guard_band_covers_target() {
        let cover = [
            screen(-1.0e6, -1.0e6, 0.5),
            screen(1.0e6, -1.0e6, 0.5),
            screen(0.0, 1.0e6, 0.5),
        ];
        let mut renderer = Renderer::new(10, 10);
        let mut fb = renderer.as_framebuffer();
        let written = ScanlineRasterizer::new()
            .fill_polygon(&cover, &FlatShader::new(0xFFFF0000), &mut fb)
            .unwrap();
        assert_eq!(written, 100);
    }

    #[test]
    fn nearer_triangle_wins_regardless_of_order() {
        let near = triangle(0.2);
        let far = [
            screen(120.0, 60.0, 0.6),
            screen(220.0, 110.0, 0.6),
            screen(90.0, 110.0, 0.6),
        ];
        let (red, blue) = (0xFFFF0000, 0xFF0000FF);

        let mut results = Vec::new();
        for order in [[(&near, red), (&far, blue)], [(&far, blue), (&near, red)]] {
            let mut renderer = Renderer::new(300, 200);
            let mut rasterizer = ScanlineRasterizer::new();
            let mut fb = renderer.as_framebuffer();
            for (polygon, color) in order {
                rasterizer
                    .fill_polygon(&polygon[..], &FlatShader::new(color), &mut fb)
                    .unwrap();
            }
            assert_eq!(fb.get_pixel(150, 90), Some(red));
            assert_eq!(fb.get_depth(150, 90), Some(0.2));
            assert_eq!(fb.get_pixel(210, 108), Some(blue));
            results.push(renderer.color_buffer().to_vec());
        }
        assert_eq!(results[0], results[1]);
    }

    #[test]
    fn span_interpolates_attributes_linearly() {
        let polygon = [
            ScreenVertex::new(Vec3::new(0.0, 0.0, 0.2), Vec3::new(0.0, 0.0, 0.0), Vec3::ZERO),
            ScreenVertex::new(Vec3::new(10.0, 0.0, 0.6), Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
            ScreenVertex::new(Vec3::new(10.0, 10.0, 0.6), Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
            ScreenVertex::new(Vec3::new(0.0, 10.0, 0.2), Vec3::new(0.0, 0.0, 0.0), Vec3::ZERO),
        ];
        let mut renderer = Renderer::new(16, 16);
        let mut fb = renderer.as_framebuffer();
        let written = ScanlineRasterizer::new()
            .fill_polygon(&polygon, &GouraudShader, &mut fb)
            .unwrap();
        assert_eq!(written, 11 * 11);

        assert_relative_eq!(fb.get_depth(2, 3).unwrap(), 0.28, epsilon = 1e-5);
        let red = (fb.get_pixel(2, 3).unwrap() >> 16) & 0xFF;
        assert_eq!(red, 51);
    }

    #[test]
    fn clipped_span_keeps_interpolation_offset() {
        let polygon = [
            screen(-10.0, 0.0, 0.0),
            screen(10.0, 0.0, 0.8),
            screen(10.0, 4.0, 0.8),
            screen(-10.0, 4.0, 0.0),
        ];
        let mut renderer = Renderer::new(8, 8);
        let mut fb = renderer.as_framebuffer();
        ScanlineRasterizer::new()
            .fill_polygon(&polygon, &FlatShader::new(1), &mut fb)
            .unwrap();
        assert_relative_eq!(fb.get_depth(0, 2).unwrap(), 0.4, epsilon = 1e-5);
        assert_relative_eq!(fb.get_depth(5, 2).unwrap(), 0.6, epsilon = 1e-5);
    }
}

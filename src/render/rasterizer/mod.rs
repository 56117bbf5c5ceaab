//! Polygon rasterization.
//!
//! [`ScanlineRasterizer`] fills convex polygons with the Edge Table / Active
//! Edge Table algorithm, carrying depth and two vector attributes along each
//! edge and across each span. What color a covered pixel gets is decided by
//! a [`PixelShader`].

mod edge;
mod edge_table;
mod scanline;
mod shader;

pub use edge::Edge;
pub use edge_table::{ActiveEdgeTable, EdgeTable};
pub use scanline::{ScanlineRasterizer, GUARD_BAND};
pub use shader::{
    DepthShader, EnvironmentShader, FlatShader, Fragment, GouraudShader, Lighting, NormalShader,
    PhongShader, PixelShader, TextureShader,
};

use std::fmt;

use crate::math::vec3::Vec3;

/// A polygon vertex after projection to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenVertex {
    /// Pixel column, pixel row and depth in [0, 1].
    pub position: Vec3,
    /// Shading attribute interpolated across the polygon.
    pub vec: Vec3,
    /// Model-space position, interpolated for texture lookups.
    pub vert: Vec3,
}

impl ScreenVertex {
    pub fn new(position: Vec3, vec: Vec3, vert: Vec3) -> Self {
        Self { position, vec, vert }
    }
}

/// Interpolated values where a span meets one of its edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSample {
    pub z: f32,
    pub vec: Vec3,
    pub vert: Vec3,
}

/// One horizontal run of a polygon, inclusive at both ends.
///
/// Columns are not clipped to the target; filling does that.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub y: i32,
    pub x_start: i32,
    pub x_end: i32,
    pub left: EdgeSample,
    pub right: EdgeSample,
}

/// Reasons a polygon cannot be rasterized. The whole polygon is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    TooFewVertices { count: usize },
    /// A vertex lies outside the guard band around the target, or is not
    /// finite.
    OutOfRange { vertex: usize },
    /// The active edges at a scanline did not pair into spans.
    UnpairedEdges { scanline: i32, count: usize },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::TooFewVertices { count } => {
                write!(f, "polygon has {} vertices, need at least 3", count)
            }
            RasterError::OutOfRange { vertex } => {
                write!(f, "vertex {} lies outside the rasterizer guard band", vertex)
            }
            RasterError::UnpairedEdges { scanline, count } => write!(
                f,
                "{} active edges on scanline {} cannot be paired into spans",
                count, scanline
            ),
        }
    }
}

impl std::error::Error for RasterError {}

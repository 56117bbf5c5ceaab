//! One polygon edge prepared for incremental scanline traversal.

use super::{EdgeSample, ScreenVertex};
use crate::math::vec3::Vec3;

/// A non-horizontal polygon edge with per-scanline increments.
///
/// All `*_min` values are the edge's state at the scanline it currently sits
/// on; [`Edge::step`] moves it down one row. Attribute increments are zero
/// when the edge was built without interpolation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// Scanline of the lower endpoint (the larger row index).
    pub y_max: i32,
    pub x_min: f32,
    /// Change in x per scanline.
    pub inv_slope: f32,
    pub z_min: f32,
    pub delta_z: f32,
    /// Interpolated shading attribute (normal or Gouraud color).
    pub vec_min: Vec3,
    pub delta_vec: Vec3,
    /// Interpolated model-space position.
    pub vert_min: Vec3,
    pub delta_vert: Vec3,
    /// Whether the edge also covers `y_max` itself.
    closes: bool,
}

impl Edge {
    /// Builds the edge between two screen vertices.
    ///
    /// Returns the first scanline the edge covers together with the edge, or
    /// `None` when both endpoints round to the same scanline. Slopes use the
    /// unrounded endpoints; starting values are evaluated at the rounded
    /// upper scanline.
    pub fn between(a: &ScreenVertex, b: &ScreenVertex, interpolate: bool) -> Option<(i32, Edge)> {
        let (ya, yb) = (a.position.y.round(), b.position.y.round());
        if ya == yb {
            return None;
        }
        let (lo, hi, y_lo, y_hi) = if ya < yb { (a, b, ya, yb) } else { (b, a, yb, ya) };

        let dy = hi.position.y - lo.position.y;
        let offset = y_lo - lo.position.y;

        let inv_slope = (hi.position.x - lo.position.x) / dy;
        let delta_z = (hi.position.z - lo.position.z) / dy;

        let (vec_min, delta_vec, vert_min, delta_vert) = if interpolate {
            let delta_vec = (hi.vec - lo.vec) / dy;
            let delta_vert = (hi.vert - lo.vert) / dy;
            (
                lo.vec + delta_vec * offset,
                delta_vec,
                lo.vert + delta_vert * offset,
                delta_vert,
            )
        } else {
            (Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::ZERO)
        };

        let edge = Edge {
            y_max: y_hi as i32,
            x_min: lo.position.x + inv_slope * offset,
            inv_slope,
            z_min: lo.position.z + delta_z * offset,
            delta_z,
            vec_min,
            delta_vec,
            vert_min,
            delta_vert,
            closes: false,
        };
        Some((y_lo as i32, edge))
    }

    /// Extends coverage to include `y_max`. Set on the edges that end on a
    /// polygon's bottom row so that row is filled.
    pub fn close(&mut self) {
        self.closes = true;
    }

    /// Last scanline this edge takes part in.
    #[inline]
    pub fn last_scanline(&self) -> i32 {
        if self.closes {
            self.y_max
        } else {
            self.y_max - 1
        }
    }

    /// Moves every interpolated value down one scanline.
    #[inline]
    pub fn step(&mut self) {
        self.x_min += self.inv_slope;
        self.z_min += self.delta_z;
        self.vec_min += self.delta_vec;
        self.vert_min += self.delta_vert;
    }

    /// Moves every interpolated value down `rows` scanlines at once.
    pub fn skip(&mut self, rows: i32) {
        let n = rows as f32;
        self.x_min += self.inv_slope * n;
        self.z_min += self.delta_z * n;
        self.vec_min += self.delta_vec * n;
        self.vert_min += self.delta_vert * n;
    }

    /// X position rounded to the pixel column the edge crosses.
    #[inline]
    pub fn column(&self) -> i32 {
        self.x_min.round() as i32
    }

    pub fn sample(&self) -> EdgeSample {
        EdgeSample {
            z: self.z_min,
            vec: self.vec_min,
            vert: self.vert_min,
        }
    }
}

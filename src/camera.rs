//! Look-at camera
//!
//! # Coordinate System
//!
//! World space is **right-handed**:
//! - X: positive right
//! - Y: positive up
//! - Z: positive toward the viewer
//!
//! Camera space has x along [`Camera::right`], y along [`Camera::up`] and z
//! along [`Camera::forward`], so points in front of the camera have positive z.
//!
//! # Orientation
//!
//! The basis is rebuilt from `position` and `look_at` whenever either one
//! changes. There is no incremental update.

use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::projection::Projection;

/// Camera defined by an eye position, a target point and a perspective frustum.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    look_at: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    projection: Projection,
}

impl Camera {
    /// Creates a camera at `position` looking toward `look_at`.
    pub fn new(position: Vec3, look_at: Vec3, projection: Projection) -> Self {
        let mut camera = Self {
            position,
            look_at,
            forward: Vec3::FORWARD,
            right: Vec3::RIGHT,
            up: Vec3::UP,
            projection,
        };
        camera.update_basis();
        camera
    }

    /// Rebuilds the orthonormal basis.
    ///
    /// A camera looking straight along the world up axis uses world -Z as the
    /// reference up instead. A camera sitting on its target looks down -Z.
    fn update_basis(&mut self) {
        let mut forward = (self.look_at - self.position).normalize();
        if forward == Vec3::ZERO {
            forward = -Vec3::FORWARD;
        }

        let mut right = forward.cross(Vec3::UP).normalize();
        if right == Vec3::ZERO {
            right = forward.cross(-Vec3::FORWARD).normalize();
        }

        self.forward = forward;
        self.right = right;
        self.up = right.cross(forward);
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Moves the camera, keeping its target.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_basis();
    }

    /// Points the camera at a world position.
    pub fn set_look_at(&mut self, target: Vec3) {
        self.look_at = target;
        self.update_basis();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut Projection {
        &mut self.projection
    }

    // =========================================================================
    // Matrix Generation
    // =========================================================================

    /// World to camera space: `R * T(-position)` where the rows of `R` are
    /// the basis vectors.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::view(self.right, self.up, self.forward, self.position)
    }

    /// Camera space to clip space.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }
}

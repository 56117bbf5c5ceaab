//! Model transform of a mesh.
//!
//! Holds the scale, rotation and translation matrices separately along with
//! the composed model matrix `T * R * S`. Every setter overwrites its matrix
//! from scratch: calling [`Transform::set_rotation`] twice keeps only the
//! second rotation.
//!
//! ```ignore
//! transform
//!     .set_scale(16.0)
//!     .set_rotation(0.0, angle, 0.0)
//!     .set_translation(Vec3::new(10.0, 0.0, 0.0));
//! ```

use crate::math::{mat4::Mat4, vec3::Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    scale: Mat4,
    rotation: Mat4,
    translation: Mat4,
    model: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Mat4::identity(),
            rotation: Mat4::identity(),
            translation: Mat4::identity(),
            model: Mat4::identity(),
        }
    }
}

impl Transform {
    /// Identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the uniform scale factor.
    pub fn set_scale(&mut self, factor: f32) -> &mut Self {
        self.scale = Mat4::scaling(factor, factor, factor);
        self.compose()
    }

    /// Sets the absolute rotation from Euler angles in radians, applied
    /// about X first, then Y, then Z.
    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.rotation = Mat4::rotation_zyx(x, y, z);
        self.compose()
    }

    /// Sets the absolute translation.
    pub fn set_translation(&mut self, offset: Vec3) -> &mut Self {
        self.translation = Mat4::translation(offset.x, offset.y, offset.z);
        self.compose()
    }

    fn compose(&mut self) -> &mut Self {
        self.model = self.translation * self.rotation * self.scale;
        self
    }

    pub fn scale_matrix(&self) -> Mat4 {
        self.scale
    }

    pub fn rotation_matrix(&self) -> Mat4 {
        self.rotation
    }

    pub fn translation_matrix(&self) -> Mat4 {
        self.translation
    }

    /// Composed model matrix `T * R * S`.
    pub fn model_matrix(&self) -> Mat4 {
        self.model
    }

    /// Matrix that carries model-space normals into world space.
    ///
    /// This is the inverse transpose of the rotation+scale matrix (excludes translation).
    /// A zero scale has no inverse and falls back to the rotation alone.
    pub fn normal_matrix(&self) -> Mat4 {
        (self.rotation * self.scale)
            .inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn assert_identity(m: &Mat4) {
        let identity = Mat4::identity();
        for row in 0..4 {
            for col in 0..4 {
                assert_relative_eq!(m.get(row, col), identity.get(row, col), epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.model_matrix(), Mat4::identity());
    }

    #[test]
    fn rotation_is_absolute_not_accumulated() {
        let mut t = Transform::new();
        t.set_rotation(0.0, PI, 0.0).set_rotation(0.0, 0.0, 0.0);
        assert_identity(&t.rotation_matrix());
        assert_identity(&t.model_matrix());
    }

    #[test]
    fn model_applies_scale_then_rotation_then_translation() {
        let mut t = Transform::new();
        t.set_scale(2.0)
            .set_rotation(0.0, 0.0, PI / 2.0)
            .set_translation(Vec3::new(10.0, 0.0, 0.0));

        // (1,0,0) -> scale (2,0,0) -> rotate (0,2,0) -> translate (10,2,0)
        let p = t.model_matrix() * Vec3::RIGHT;
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_scale_overwrites() {
        let mut t = Transform::new();
        t.set_scale(3.0).set_scale(2.0);
        assert_eq!(t.scale_matrix(), Mat4::scaling(2.0, 2.0, 2.0));
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular_under_scale() {
        let mut t = Transform::new();
        t.set_scale(16.0).set_rotation(0.0, PI / 2.0, 0.0);
        let n = t.normal_matrix().transform_direction(Vec3::FORWARD).normalize();
        assert_relative_eq!(n.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(n.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn normal_matrix_ignores_translation() {
        let mut t = Transform::new();
        t.set_translation(Vec3::new(5.0, -3.0, 2.0));
        assert_identity(&t.normal_matrix());
    }
}

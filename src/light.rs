//! Lighting types for the renderer.

use crate::math::vec3::Vec3;

/// A point light with a single color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    /// Light color in [0, 1] per channel, used for the specular highlight.
    pub color: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 40.0), Vec3::ONE)
    }
}

impl Light {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Light { position, color }
    }

    /// Unit vector from `point` toward the light.
    pub fn direction_to(&self, point: Vec3) -> Vec3 {
        (self.position - point).normalize()
    }
}

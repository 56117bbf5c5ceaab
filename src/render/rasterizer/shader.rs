//! Pixel shaders for polygon rasterization.
//!
//! This module provides a trait-based abstraction for per-pixel shading computations,
//! similar to how GPUs separate the fixed-function rasterizer from programmable
//! fragment/pixel shaders.
//!
//! # Architecture
//!
//! The rasterizer handles:
//! - Edge table construction and the scanline sweep
//! - Interpolation of depth, `vec` and `vert` along edges and spans
//! - The depth test
//!
//! The shader handles:
//! - Normalizing interpolated normals
//! - Texture sampling
//! - Final color computation

use crate::colors;
use crate::light::Light;
use crate::material::Material;
use crate::math::{mat4::Mat4, vec3::Vec3};
use crate::projection::Projection;
use crate::texture::Texture;

/// Interpolated values at one covered pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub y: i32,
    /// Post-divide depth in [0, 1].
    pub depth: f32,
    /// Interpolated shading attribute.
    pub vec: Vec3,
    /// Interpolated model-space position.
    pub vert: Vec3,
}

/// Trait for per-pixel shading computations.
///
/// The rasterizer calls `shade()` for each pixel that passes the depth test.
pub trait PixelShader {
    /// Whether `vec` and `vert` must be interpolated for this shader. When
    /// false the rasterizer leaves them at zero.
    const INTERPOLATES: bool;

    /// Compute the ARGB color of a fragment.
    fn shade(&self, fragment: &Fragment) -> u32;
}

/// Everything needed to evaluate the illumination model at a pixel.
#[derive(Clone, Copy)]
pub struct Lighting<'a> {
    pub material: &'a Material,
    pub light: &'a Light,
    /// Camera position in world space.
    pub eye: Vec3,
    /// Model matrix of the object being drawn.
    pub model: Mat4,
}

impl<'a> Lighting<'a> {
    pub fn new(material: &'a Material, light: &'a Light, eye: Vec3, model: Mat4) -> Self {
        Self {
            material,
            light,
            eye,
            model,
        }
    }

    /// Lit color of `surface` at a world position with a unit world normal.
    #[inline]
    pub fn illuminate(&self, surface: Vec3, world: Vec3, normal: Vec3) -> Vec3 {
        let view = (self.eye - world).normalize();
        let light_dir = self.light.direction_to(world);
        self.material
            .illuminate(surface, view, normal, light_dir, self.light)
    }

    #[inline]
    fn world(&self, vert: Vec3) -> Vec3 {
        self.model * vert
    }
}

/// Flat shader - returns a constant color for all pixels.
///
/// Used for the random face colors and for flat lighting, where the face's
/// color is computed once before the fill.
pub struct FlatShader {
    color: u32,
}

impl FlatShader {
    pub fn new(color: u32) -> Self {
        Self { color }
    }
}

impl PixelShader for FlatShader {
    const INTERPOLATES: bool = false;

    #[inline]
    fn shade(&self, _fragment: &Fragment) -> u32 {
        self.color
    }
}

/// Grey level from view-space distance, bright near the object's front.
pub struct DepthShader {
    projection: Projection,
    near: f32,
    far: f32,
}

impl DepthShader {
    /// `near` and `far` bound the camera-space distance of the object.
    pub fn new(projection: Projection, near: f32, far: f32) -> Self {
        Self {
            projection,
            near,
            far,
        }
    }
}

impl PixelShader for DepthShader {
    const INTERPOLATES: bool = false;

    #[inline]
    fn shade(&self, fragment: &Fragment) -> u32 {
        let range = self.far - self.near;
        let distance = self.projection.linearize_depth(fragment.depth);
        let t = if range > f32::EPSILON {
            (distance - self.near) / range
        } else {
            0.0
        };
        colors::to_argb(Vec3::splat(1.0 - t))
    }
}

/// Gouraud shader - `vec` already holds the lit vertex color.
pub struct GouraudShader;

impl PixelShader for GouraudShader {
    const INTERPOLATES: bool = true;

    #[inline]
    fn shade(&self, fragment: &Fragment) -> u32 {
        colors::to_argb(fragment.vec)
    }
}

/// Phong shader - `vec` holds the world normal, lit per pixel.
pub struct PhongShader<'a> {
    lighting: Lighting<'a>,
}

impl<'a> PhongShader<'a> {
    pub fn new(lighting: Lighting<'a>) -> Self {
        Self { lighting }
    }
}

impl PixelShader for PhongShader<'_> {
    const INTERPOLATES: bool = true;

    #[inline]
    fn shade(&self, fragment: &Fragment) -> u32 {
        let normal = fragment.vec.normalize();
        let world = self.lighting.world(fragment.vert);
        let color = self
            .lighting
            .illuminate(self.lighting.material.color, world, normal);
        colors::to_argb(color)
    }
}

/// Normal shader - maps the world normal from [-1, 1] to RGB.
pub struct NormalShader;

impl PixelShader for NormalShader {
    const INTERPOLATES: bool = true;

    #[inline]
    fn shade(&self, fragment: &Fragment) -> u32 {
        colors::to_argb(fragment.vec.normalize() * 0.5 + Vec3::splat(0.5))
    }
}

/// Texture shader - samples the texture at the direction of the model-space
/// position and lights the sample like a base color.
pub struct TextureShader<'a> {
    lighting: Lighting<'a>,
    texture: &'a Texture,
}

impl<'a> TextureShader<'a> {
    pub fn new(lighting: Lighting<'a>, texture: &'a Texture) -> Self {
        Self { lighting, texture }
    }
}

impl PixelShader for TextureShader<'_> {
    const INTERPOLATES: bool = true;

    #[inline]
    fn shade(&self, fragment: &Fragment) -> u32 {
        let normal = fragment.vec.normalize();
        let surface = self.texture.sample(fragment.vert.normalize());
        let world = self.lighting.world(fragment.vert);
        colors::to_argb(self.lighting.illuminate(surface, world, normal))
    }
}

/// Environment shader - samples the texture along the view direction
/// reflected about the surface normal.
pub struct EnvironmentShader<'a> {
    lighting: Lighting<'a>,
    texture: &'a Texture,
}

impl<'a> EnvironmentShader<'a> {
    pub fn new(lighting: Lighting<'a>, texture: &'a Texture) -> Self {
        Self { lighting, texture }
    }
}

impl PixelShader for EnvironmentShader<'_> {
    const INTERPOLATES: bool = true;

    #[inline]
    fn shade(&self, fragment: &Fragment) -> u32 {
        let normal = fragment.vec.normalize();
        let world = self.lighting.world(fragment.vert);
        let view = (self.lighting.eye - world).normalize();
        let reflected = normal * (2.0 * normal.dot(view)) - view;
        let surface = self.texture.sample(reflected.normalize());
        colors::to_argb(self.lighting.illuminate(surface, world, normal))
    }
}

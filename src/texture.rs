use std::f32::consts::PI;
use std::path::Path;

use image::error::{LimitError, LimitErrorKind};
use image::{ImageError, RgbaImage};
use log::warn;

use crate::colors;
use crate::math::vec3::Vec3;

/// Represents a 2D texture for spherical texture and environment mapping.
///
/// Rows are stored bottom-up, so row 0 is the bottom of the image and
/// latitude grows with the row index.
#[derive(Debug, Clone)]
pub struct Texture {
    data: Vec<u32>, // The pixel data of the texture in ARGB format.
    width: u32,     // The width of the texture in pixels.
    height: u32,    // The height of the texture in pixels.
}

impl Texture {
    /// Load a texture from an image file (PNG, JPG, etc.)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        Self::from_rgba(image::open(path)?.to_rgba8())
    }

    /// Converts a decoded image, stored top row first, into a texture.
    ///
    /// An image without pixels is rejected with a dimension error.
    pub fn from_rgba(mut img: RgbaImage) -> Result<Self, ImageError> {
        image::imageops::flip_vertical_in_place(&mut img);
        let (width, height) = img.dimensions();

        // Convert RGBA bytes to ARGB u32
        let data: Vec<u32> = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
            })
            .collect();

        Self::from_pixels(width, height, data).ok_or_else(|| {
            ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError))
        })
    }

    /// Wraps already decoded ARGB pixels, stored bottom row first.
    ///
    /// Returns `None` when the dimensions are zero or do not match `data`.
    pub fn from_pixels(width: u32, height: u32, data: Vec<u32>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Texel column and row for a unit direction under the spherical
    /// (longitude/latitude) mapping.
    ///
    /// Indices that land outside the image are clamped to the nearest edge
    /// and logged.
    pub fn texel_coords(&self, direction: Vec3) -> (u32, u32) {
        let longitude = 0.5 - direction.z.atan2(direction.x) / (2.0 * PI);
        let latitude = 0.5 + direction.y.clamp(-1.0, 1.0).asin() / PI;

        let x = ((self.width - 1) as f32 * longitude).round() as i64;
        let y = ((self.height - 1) as f32 * latitude).round() as i64;

        let max_x = i64::from(self.width) - 1;
        let max_y = i64::from(self.height) - 1;
        if !(0..=max_x).contains(&x) || !(0..=max_y).contains(&y) {
            warn!(
                "texel ({}, {}) outside {}x{} texture for direction {:?}, clamping",
                x, y, self.width, self.height, direction
            );
        }

        (x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32)
    }

    /// Samples the texture along a unit direction, returning RGB in [0, 1].
    #[inline]
    pub fn sample(&self, direction: Vec3) -> Vec3 {
        let (x, y) = self.texel_coords(direction);
        colors::from_argb(self.texel(x, y))
    }

    /// Raw ARGB value at a column and row (row 0 is the bottom).
    pub fn texel(&self, x: u32, y: u32) -> u32 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Texture {
        let data = (0..width * height).map(|i| 0xFF000000 | i).collect();
        Texture::from_pixels(width, height, data).unwrap()
    }

    #[test]
    fn texel_index_follows_longitude() {
        let tex = gradient(101, 51);
        // atan2(0, 1) = 0, so +x sits at longitude 0.5.
        let (x, y) = tex.texel_coords(Vec3::RIGHT);
        assert_eq!(x, (100.0_f32 * 0.5).round() as u32);
        assert_eq!(y, 25);

        // +z is a quarter turn around, longitude 0.25.
        let (x, _) = tex.texel_coords(Vec3::FORWARD);
        assert_eq!(x, (100.0_f32 * 0.25).round() as u32);
    }

    #[test]
    fn decoded_images_are_flipped_and_must_have_pixels() {
        let mut img = RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        let tex = Texture::from_rgba(img).unwrap();
        // The top row of the image becomes the last texture row.
        assert_eq!(tex.texel(0, 0), 0xFF0000FF);
        assert_eq!(tex.texel(0, 1), 0xFFFF0000);

        let err = Texture::from_rgba(RgbaImage::new(0, 0)).unwrap_err();
        assert!(matches!(err, ImageError::Limits(_)));
    }

    #[test]
    fn poles_map_to_first_and_last_rows() {
        let tex = gradient(8, 8);
        assert_eq!(tex.texel_coords(Vec3::UP).1, 7);
        assert_eq!(tex.texel_coords(-Vec3::UP).1, 0);
    }

    #[test]
    fn sample_normalizes_channels() {
        let tex = Texture::from_pixels(1, 1, vec![0xFFFF8000]).unwrap();
        let c = tex.sample(Vec3::RIGHT);
        assert_eq!(c.x, 1.0);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 0.0);
    }

    #[test]
    fn out_of_range_direction_is_clamped() {
        let tex = gradient(4, 4);
        // Not a unit vector: asin(3) would be NaN.
        let (_, y) = tex.texel_coords(Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(y, 3);
    }

    #[test]
    fn from_pixels_rejects_mismatched_size() {
        assert!(Texture::from_pixels(2, 2, vec![0; 3]).is_none());
        assert!(Texture::from_pixels(0, 2, Vec::new()).is_none());
    }
}

//! Surface materials and the illumination models that shade them.
//!
//! A [`Material`] carries a base color, Phong reflectance coefficients and an
//! optional texture. [`Material::illuminate`] evaluates either continuous
//! Phong reflection or four-band cartoon shading, depending on the
//! material's [`IlluminationModel`].

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::light::Light;
use crate::math::{compare, vec3::Vec3, FLOAT_TOL};
use crate::mesh::LoadError;
use crate::texture::Texture;

/// Cartoon bands as `(threshold, color)`, brightest first. A diffuse term
/// above the threshold selects the band.
const CARTOON_BANDS: [(f32, [u8; 3]); 3] = [
    (0.7, [247, 181, 56]),
    (0.5, [216, 87, 42]),
    (0.1, [195, 47, 39]),
];
const CARTOON_SHADOW: [u8; 3] = [120, 1, 22];

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialError {
    /// A reflectance coefficient lies outside [0, 1].
    CoefficientOutOfRange { name: &'static str, value: f32 },
    /// Ambient, diffuse and specular add up to more than 1.
    EnergyExceeded { sum: f32 },
}

impl fmt::Display for MaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialError::CoefficientOutOfRange { name, value } => {
                write!(f, "{} coefficient {} is outside [0, 1]", name, value)
            }
            MaterialError::EnergyExceeded { sum } => {
                write!(f, "reflectance coefficients sum to {}, more than 1", sum)
            }
        }
    }
}

impl std::error::Error for MaterialError {}

/// How a material turns light into color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IlluminationModel {
    #[default]
    Phong,
    /// Diffuse term quantized into four fixed color bands.
    Cartoon,
}

/// Named coefficient sets selectable from the command line and config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MaterialPreset {
    Metal,
    #[default]
    Plastic,
    Matte,
    Marble,
    Cartoon,
}

impl MaterialPreset {
    /// `(ambient, diffuse, specular, shininess)` for the preset.
    pub fn coefficients(self) -> (f32, f32, f32, i32) {
        match self {
            MaterialPreset::Metal => (0.45, 0.05, 0.5, 30),
            MaterialPreset::Plastic => (0.3, 0.3, 0.4, 30),
            MaterialPreset::Matte | MaterialPreset::Cartoon => (0.4, 0.5, 0.1, 3),
            MaterialPreset::Marble => (0.4, 0.3, 0.3, 15),
        }
    }

    pub fn illumination_model(self) -> IlluminationModel {
        match self {
            MaterialPreset::Cartoon => IlluminationModel::Cartoon,
            _ => IlluminationModel::Phong,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    /// Base surface color in [0, 1] per channel.
    pub color: Vec3,
    k_ambient: f32,
    k_diffuse: f32,
    k_specular: f32,
    shininess: i32,
    model: IlluminationModel,
    texture: Option<Texture>,
}

impl Default for Material {
    /// Red Phong material.
    fn default() -> Self {
        Self {
            color: Vec3::new(1.0, 0.0, 0.0),
            k_ambient: 0.3,
            k_diffuse: 0.4,
            k_specular: 0.3,
            shininess: 20,
            model: IlluminationModel::Phong,
            texture: None,
        }
    }
}

impl Material {
    /// Creates a Phong material, checking that every coefficient is in
    /// [0, 1] and that together they do not exceed 1.
    pub fn new(
        color: Vec3,
        k_ambient: f32,
        k_diffuse: f32,
        k_specular: f32,
        shininess: i32,
    ) -> Result<Self, MaterialError> {
        for (name, value) in [
            ("ambient", k_ambient),
            ("diffuse", k_diffuse),
            ("specular", k_specular),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MaterialError::CoefficientOutOfRange { name, value });
            }
        }

        let sum = k_ambient + k_diffuse + k_specular;
        if compare(sum, 1.0, FLOAT_TOL) == Ordering::Greater {
            return Err(MaterialError::EnergyExceeded { sum });
        }

        Ok(Self {
            color,
            k_ambient,
            k_diffuse,
            k_specular,
            shininess,
            model: IlluminationModel::Phong,
            texture: None,
        })
    }

    pub fn from_preset(preset: MaterialPreset, color: Vec3) -> Self {
        let (k_ambient, k_diffuse, k_specular, shininess) = preset.coefficients();
        Self {
            color,
            k_ambient,
            k_diffuse,
            k_specular,
            shininess,
            model: preset.illumination_model(),
            texture: None,
        }
    }

    pub fn set_texture(&mut self, texture: Texture) {
        self.texture = Some(texture);
    }

    /// Decodes an image file and attaches it as this material's texture.
    pub fn load_texture<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        let texture = Texture::from_file(path)?;
        info!(
            "Loaded texture {} ({}x{})",
            path.display(),
            texture.width(),
            texture.height()
        );
        self.set_texture(texture);
        Ok(())
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn model(&self) -> IlluminationModel {
        self.model
    }

    pub fn k_ambient(&self) -> f32 {
        self.k_ambient
    }

    pub fn k_diffuse(&self) -> f32 {
        self.k_diffuse
    }

    pub fn k_specular(&self) -> f32 {
        self.k_specular
    }

    pub fn shininess(&self) -> i32 {
        self.shininess
    }

    /// Color reflected toward the viewer.
    ///
    /// `view`, `normal` and `light_dir` must be unit vectors pointing away
    /// from the surface. The result is not clamped.
    pub fn illuminate(
        &self,
        surface: Vec3,
        view: Vec3,
        normal: Vec3,
        light_dir: Vec3,
        light: &Light,
    ) -> Vec3 {
        match self.model {
            IlluminationModel::Phong => self.phong(surface, view, normal, light_dir, light),
            IlluminationModel::Cartoon => cartoon(normal, light_dir),
        }
    }

    fn phong(&self, surface: Vec3, view: Vec3, normal: Vec3, light_dir: Vec3, light: &Light) -> Vec3 {
        let n_dot_l = normal.dot(light_dir);
        let reflected = normal * (2.0 * n_dot_l) - light_dir;

        let ambient = surface * self.k_ambient;
        let diffuse = surface * (self.k_diffuse * n_dot_l.max(0.0));

        let v_dot_r = view.dot(reflected);
        let specular = if v_dot_r > 0.0 {
            light.color * (self.k_specular * v_dot_r.powi(self.shininess))
        } else {
            Vec3::ZERO
        };

        ambient + diffuse + specular
    }
}

fn cartoon(normal: Vec3, light_dir: Vec3) -> Vec3 {
    let diffuse = normal.dot(light_dir).max(0.0);
    let rgb = CARTOON_BANDS
        .iter()
        .find(|(threshold, _)| diffuse > *threshold)
        .map_or(CARTOON_SHADOW, |(_, rgb)| *rgb);
    Vec3::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32) / 255.0
}

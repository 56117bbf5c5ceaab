//! TOML configuration.
//!
//! Every field has a default, so an empty file (or no file) describes the
//! stock scene: one red plastic cube spinning in front of the camera, lit
//! from the eye, drawn with Phong shading at 800x600.
//!
//! ```toml
//! [render]
//! mode = "gouraud"
//! backface_culling = false
//!
//! [[objects]]
//! model = "assets/teapot.d"
//! material = "metal"
//! offset = [-10.0, 0.0, 0.0]
//!
//! [[objects]]
//! material = "cartoon"
//! offset = [10.0, 0.0, 0.0]
//! spin = -1.0
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::camera::Camera;
use crate::engine::RenderMode;
use crate::light::Light;
use crate::material::{Material, MaterialPreset};
use crate::math::vec3::Vec3;
use crate::mesh::{LoadError, Mesh};
use crate::projection::Projection;
use crate::scene::{Scene, SceneObject};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub animation: AnimationConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub objects: Vec<ObjectConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            animation: AnimationConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            objects: vec![ObjectConfig::default()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub mode: RenderMode,
    pub backface_culling: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            mode: RenderMode::default(),
            backface_culling: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    /// Radians added to the animation angle per frame.
    pub rotation_speed: f32,
    /// Frame rate cap of the window loop.
    pub fps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rotation_speed: 0.05,
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 40.0],
            look_at: [0.0, 0.0, 0.0],
            fov: 90.0,
            near: 1.0,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        let light = Light::default();
        Self {
            position: to_array(light.position),
            color: to_array(light.color),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    /// `.d` or `.obj` file; the built-in cube when absent.
    pub model: Option<PathBuf>,
    /// Image for the texture and environment modes.
    pub texture: Option<PathBuf>,
    pub material: MaterialPreset,
    pub color: [f32; 3],
    pub offset: [f32; 3],
    pub spin: f32,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            model: None,
            texture: None,
            material: MaterialPreset::default(),
            color: [1.0, 0.0, 0.0],
            offset: [0.0, 0.0, 0.0],
            spin: 1.0,
        }
    }
}

fn to_array(v: Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

fn to_vec3(a: [f32; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn camera(&self) -> Camera {
        let c = &self.camera;
        let aspect = self.render.width as f32 / self.render.height.max(1) as f32;
        Camera::new(
            to_vec3(c.position),
            to_vec3(c.look_at),
            Projection::from_degrees(c.fov, aspect, c.near, c.far),
        )
    }

    pub fn light(&self) -> Light {
        Light::new(to_vec3(self.light.position), to_vec3(self.light.color))
    }

    /// Loads every object's model and texture and assembles the scene.
    pub fn build_scene(&self) -> Result<Scene, LoadError> {
        let mut scene = Scene::new(self.camera(), self.light());
        for object in &self.objects {
            scene.add(object.load()?);
        }
        info!("scene ready with {} object(s)", scene.objects.len());
        Ok(scene)
    }
}

impl ObjectConfig {
    pub fn load(&self) -> Result<SceneObject, LoadError> {
        let mesh = match &self.model {
            Some(path) => Mesh::load(path)?,
            None => Mesh::cube(),
        };

        let mut material = Material::from_preset(self.material, to_vec3(self.color));
        if let Some(path) = &self.texture {
            material.load_texture(path)?;
        }

        Ok(SceneObject::new(mesh, material)
            .with_spin(self.spin)
            .with_offset(to_vec3(self.offset)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::IlluminationModel;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!((config.render.width, config.render.height), (800, 600));
        assert_eq!(config.render.mode, RenderMode::Phong);
        assert!(config.render.backface_culling);
        assert_eq!(config.animation.fps, 60);
        assert_eq!(config.objects.len(), 1);
        assert_eq!(config.objects[0].material, MaterialPreset::Plastic);
        assert_eq!(config.light.position, [0.0, 0.0, 40.0]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [render]
            mode = "environment"

            [camera]
            fov = 60.0

            [[objects]]
            material = "cartoon"
            spin = -1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.render.mode, RenderMode::Environment);
        assert_eq!(config.render.width, 800);
        assert_eq!(config.camera.fov, 60.0);
        assert_eq!(config.camera.far, 100.0);
        assert_eq!(config.objects[0].material, MaterialPreset::Cartoon);
        assert_eq!(config.objects[0].color, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = Config::from_toml("[render]\nmode = \"raytrace\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("no/such/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn default_scene_is_one_cube() {
        let scene = Config::default().build_scene().unwrap();
        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.objects[0].mesh.faces().len(), 6);
        assert_eq!(scene.camera.position(), Vec3::new(0.0, 0.0, 40.0));
    }

    #[test]
    fn object_material_follows_preset() {
        let object = ObjectConfig {
            material: MaterialPreset::Cartoon,
            offset: [10.0, 0.0, 0.0],
            ..ObjectConfig::default()
        }
        .load()
        .unwrap();
        assert_eq!(object.material.model(), IlluminationModel::Cartoon);
        assert_eq!(object.offset, Vec3::new(10.0, 0.0, 0.0));
    }
}

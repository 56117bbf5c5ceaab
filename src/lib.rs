//! A CPU scanline polygon rasterizer.
//!
//! Meshes are transformed through model, view and perspective matrices and
//! filled with an Edge Table / Active Edge Table sweep that interpolates
//! depth, normals or colors and model-space positions across every span.
//! Pixels pass a depth test before a pixel shader picks their color: flat,
//! Gouraud, Phong, normal, depth, or a spherical texture/environment lookup.
//!
//! SDL2 is used only to present frames and only with the `window` feature;
//! everything else runs headless.
//!
//! # Quick Start
//!
//! ```ignore
//! use scanfill::prelude::*;
//!
//! let scene = Config::default().build_scene()?;
//! let mut engine = Engine::new(800, 600, scene);
//! engine.set_render_mode(RenderMode::Gouraud);
//! engine.animate(0.5);
//! engine.render();
//! engine.save_png("frame.png")?;
//! ```

// Public API - exposed to library consumers
pub mod camera;
pub mod colors;
pub mod config;
pub mod engine;
pub mod light;
pub mod material;
pub mod math;
pub mod mesh;
pub mod projection;
pub mod render;
pub mod scene;
pub mod texture;
pub mod transform;
#[cfg(feature = "window")]
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use config::{Config, ConfigError};
pub use engine::{Engine, FrameStats, RenderMode};
pub use material::{Material, MaterialError, MaterialPreset};
pub use mesh::{LoadError, Mesh};
pub use projection::Projection;
pub use scene::{Scene, SceneObject};
pub use transform::Transform;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use scanfill::prelude::*;
/// ```
pub mod prelude {
    // Scene
    pub use crate::camera::Camera;
    pub use crate::light::Light;
    pub use crate::material::{Material, MaterialPreset};
    pub use crate::mesh::Mesh;
    pub use crate::scene::{Scene, SceneObject};
    pub use crate::texture::Texture;

    // Engine
    pub use crate::config::Config;
    pub use crate::engine::{Engine, FrameStats, RenderMode};

    // Projection
    pub use crate::projection::{Projection, Viewport};

    // Transform
    pub use crate::transform::Transform;

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;

    // Window & Input
    #[cfg(feature = "window")]
    pub use crate::window::{FrameLimiter, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::rasterizer::{FlatShader, GouraudShader};
    pub use crate::render::{Renderer, ScanlineRasterizer, ScreenVertex};
}

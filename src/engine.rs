//! Core rendering engine.
//!
//! The [`Engine`] struct is the main entry point for the renderer. It owns the
//! [`Scene`], the pixel buffers and the rasterizer, and runs one frame at a
//! time:
//!
//! 1. Every vertex of an object is transformed once: world position, world
//!    normal, clip coordinates and screen position.
//! 2. Faces touching the camera plane are skipped, back faces are culled.
//! 3. The remaining faces go to the shading strategy of the current
//!    [`RenderMode`].

use std::cmp::Ordering;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::colors;
use crate::light::Light;
use crate::math::{compare, mat4::Mat4, vec3::Vec3, vec4::Vec4, FLOAT_TOL};
use crate::projection::{Projection, Viewport};
use crate::render::rasterizer::{
    DepthShader, EnvironmentShader, FlatShader, GouraudShader, Lighting, NormalShader,
    PhongShader, PixelShader, TextureShader,
};
use crate::render::{RasterError, Renderer, ScanlineRasterizer, ScreenVertex};
use crate::scene::{Scene, SceneObject};

/// Clip-space `w` at or below this puts a vertex on or behind the camera plane.
const MIN_CLIP_W: f32 = 1e-6;

/// How faces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Polygon outlines, no depth test.
    Wireframe,
    /// Each face filled with its random color.
    Faces,
    /// Grey level from camera distance, bright in front.
    Depth,
    /// One lit color per face.
    Flat,
    /// Lit per vertex, color interpolated.
    Gouraud,
    /// Normal interpolated, lit per pixel.
    #[default]
    Phong,
    /// World normal as RGB.
    Normal,
    /// Spherical texture lookup at the surface position.
    Texture,
    /// Spherical texture lookup along the reflected view ray.
    Environment,
}

impl RenderMode {
    pub fn uses_texture(self) -> bool {
        matches!(self, RenderMode::Texture | RenderMode::Environment)
    }
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces_drawn: usize,
    pub faces_culled: usize,
    /// Faces touching the camera plane or rejected by the rasterizer.
    pub faces_skipped: usize,
    pub pixels_written: usize,
}

/// Transformed vertices of the object being drawn, indexed like the mesh.
#[derive(Debug, Default)]
struct VertexCache {
    world: Vec<Vec3>,
    normals: Vec<Vec3>,
    screen: Vec<Vec3>,
    clip_w: Vec<f32>,
    /// Nearest and farthest camera distance among vertices in front of the camera.
    depth_range: (f32, f32),
}

impl VertexCache {
    fn rebuild(&mut self, object: &SceneObject, view_projection: Mat4, viewport: &Viewport) {
        let transform = object.mesh.transform();
        let model = transform.model_matrix();
        let normal_matrix = transform.normal_matrix();

        self.world.clear();
        self.normals.clear();
        self.screen.clear();
        self.clip_w.clear();
        let mut range = (f32::INFINITY, f32::NEG_INFINITY);

        for (&vertex, &normal) in object.mesh.vertices().iter().zip(object.mesh.vertex_normals()) {
            let world = model * vertex;
            let clip = view_projection * Vec4::point(world);
            // w is the camera-space depth.
            if clip.w > MIN_CLIP_W {
                range = (range.0.min(clip.w), range.1.max(clip.w));
            }

            self.world.push(world);
            self.normals.push(normal_matrix.transform_direction(normal).normalize());
            self.screen.push(viewport.to_screen(clip.to_vec3_perspective()));
            self.clip_w.push(clip.w);
        }
        self.depth_range = range;
    }

    fn screen_vertex(&self, index: usize, vec: Vec3, vert: Vec3) -> ScreenVertex {
        ScreenVertex::new(self.screen[index], vec, vert)
    }
}

/// Where filled faces end up.
struct Target<'a> {
    renderer: &'a mut Renderer,
    rasterizer: &'a mut ScanlineRasterizer,
    polygon: &'a mut Vec<ScreenVertex>,
}

impl Target<'_> {
    fn fill<S: PixelShader>(
        &mut self,
        vertices: impl Iterator<Item = ScreenVertex>,
        shader: &S,
    ) -> Result<usize, RasterError> {
        self.polygon.clear();
        self.polygon.extend(vertices);
        self.rasterizer
            .fill_polygon(self.polygon.as_slice(), shader, &mut self.renderer.as_framebuffer())
    }
}

/// Per-object state shared by all of its faces.
struct ObjectPass<'a> {
    object: &'a SceneObject,
    cache: &'a VertexCache,
    light: &'a Light,
    projection: Projection,
    eye: Vec3,
    model: Mat4,
    normal_matrix: Mat4,
    mode: RenderMode,
    culling: bool,
}

impl ObjectPass<'_> {
    fn draw_face(&self, face: usize, target: &mut Target, stats: &mut FrameStats) {
        let mesh = &self.object.mesh;
        let indices = &mesh.faces()[face].indices;

        if indices.iter().any(|&i| self.cache.clip_w[i] <= MIN_CLIP_W) {
            debug!("face {} of '{}' reaches behind the camera, skipped", face, mesh.name());
            stats.faces_skipped += 1;
            return;
        }

        let normal = self
            .normal_matrix
            .transform_direction(mesh.face_normals()[face])
            .normalize();
        if self.culling {
            let to_eye = self.eye - self.cache.world[indices[0]];
            if compare(normal.dot(to_eye), 0.0, FLOAT_TOL) != Ordering::Greater {
                stats.faces_culled += 1;
                return;
            }
        }

        match self.shade_face(face, indices, normal, target) {
            Ok(pixels) => {
                stats.faces_drawn += 1;
                stats.pixels_written += pixels;
            }
            Err(e) => {
                debug!("face {} of '{}' skipped: {}", face, mesh.name(), e);
                stats.faces_skipped += 1;
            }
        }
    }

    fn shade_face(
        &self,
        face: usize,
        indices: &[usize],
        normal: Vec3,
        target: &mut Target,
    ) -> Result<usize, RasterError> {
        let mesh = &self.object.mesh;
        let material = &self.object.material;
        let cache = self.cache;
        let lighting = Lighting::new(material, self.light, self.eye, self.model);

        let positions =
            move || indices.iter().map(move |&i| cache.screen_vertex(i, Vec3::ZERO, Vec3::ZERO));
        let normals = move || {
            indices
                .iter()
                .map(move |&i| cache.screen_vertex(i, cache.normals[i], mesh.vertices()[i]))
        };

        match self.mode {
            RenderMode::Wireframe => {
                let outline: Vec<Vec3> = indices.iter().map(|&i| cache.screen[i]).collect();
                target.renderer.draw_polygon_outline(&outline, colors::WIREFRAME);
                Ok(0)
            }
            RenderMode::Faces => {
                let color = colors::to_argb(mesh.face_colors()[face]);
                target.fill(positions(), &FlatShader::new(color))
            }
            RenderMode::Depth => {
                let (near, far) = cache.depth_range;
                target.fill(positions(), &DepthShader::new(self.projection, near, far))
            }
            RenderMode::Flat => {
                let centroid = self.model * mesh.face_centroid(face);
                let color = lighting.illuminate(material.color, centroid, normal);
                target.fill(positions(), &FlatShader::new(colors::to_argb(color)))
            }
            RenderMode::Gouraud => {
                let lit = indices.iter().map(|&i| {
                    let color = lighting.illuminate(material.color, cache.world[i], cache.normals[i]);
                    cache.screen_vertex(i, color, mesh.vertices()[i])
                });
                target.fill(lit, &GouraudShader)
            }
            RenderMode::Phong => target.fill(normals(), &PhongShader::new(lighting)),
            RenderMode::Normal => target.fill(normals(), &NormalShader),
            RenderMode::Texture => match material.texture() {
                Some(texture) => target.fill(normals(), &TextureShader::new(lighting, texture)),
                None => target.fill(normals(), &PhongShader::new(lighting)),
            },
            RenderMode::Environment => match material.texture() {
                Some(texture) => target.fill(normals(), &EnvironmentShader::new(lighting, texture)),
                None => target.fill(normals(), &PhongShader::new(lighting)),
            },
        }
    }
}

pub struct Engine {
    renderer: Renderer,
    rasterizer: ScanlineRasterizer,
    scene: Scene,
    viewport: Viewport,
    render_mode: RenderMode,
    cache: VertexCache,
    polygon: Vec<ScreenVertex>,
    pub backface_culling: bool,
}

impl Engine {
    /// Creates an engine drawing `scene` into a `width` x `height` target.
    /// The camera's aspect ratio is set to match.
    pub fn new(width: u32, height: u32, mut scene: Scene) -> Self {
        let viewport = Viewport::new(width, height);
        scene
            .camera
            .projection_mut()
            .set_aspect_ratio(viewport.aspect_ratio());

        Self {
            renderer: Renderer::new(width, height),
            rasterizer: ScanlineRasterizer::new(),
            scene,
            viewport,
            render_mode: RenderMode::default(),
            cache: VertexCache::default(),
            polygon: Vec::new(),
            backface_culling: true,
        }
    }

    /// Texture modes fall back to Phong shading for objects without a texture.
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if mode.uses_texture() {
            for object in self.scene.objects.iter().filter(|o| o.material.texture().is_none()) {
                warn!(
                    "'{}' has no texture, {:?} mode draws it with Phong shading",
                    object.mesh.name(),
                    mode
                );
            }
        }
        self.render_mode = mode;
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn width(&self) -> u32 {
        self.viewport.width
    }

    pub fn height(&self) -> u32 {
        self.viewport.height
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.renderer.resize(width, height);
        self.scene
            .camera
            .projection_mut()
            .set_aspect_ratio(self.viewport.aspect_ratio());
    }

    /// Poses the scene's objects for animation angle `angle`.
    pub fn animate(&mut self, angle: f32) {
        self.scene.animate(angle);
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Returns the rendered frame as bytes (ARGB8888 format)
    pub fn frame_buffer(&self) -> Vec<u8> {
        self.renderer.as_bytes()
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        self.renderer.save_png(path)
    }

    /// Clears the buffers and draws every object of the scene.
    pub fn render(&mut self) -> FrameStats {
        self.renderer.clear(colors::BACKGROUND);
        self.renderer.clear_depth();

        let camera = &self.scene.camera;
        let view_projection = camera.projection_matrix() * camera.view_matrix();
        let mut stats = FrameStats::default();
        let mut target = Target {
            renderer: &mut self.renderer,
            rasterizer: &mut self.rasterizer,
            polygon: &mut self.polygon,
        };

        for object in &self.scene.objects {
            self.cache.rebuild(object, view_projection, &self.viewport);
            let transform = object.mesh.transform();
            let pass = ObjectPass {
                object,
                cache: &self.cache,
                light: &self.scene.light,
                projection: *camera.projection(),
                eye: camera.position(),
                model: transform.model_matrix(),
                normal_matrix: transform.normal_matrix(),
                mode: self.render_mode,
                culling: self.backface_culling,
            };
            for face in 0..object.mesh.faces().len() {
                pass.draw_face(face, &mut target, &mut stats);
            }
        }

        debug!(
            "frame: {} faces drawn, {} culled, {} skipped, {} pixels",
            stats.faces_drawn, stats.faces_culled, stats.faces_skipped, stats.pixels_written
        );
        stats
    }
}

//! Pixel and depth buffers plus the polygon rasterizer that writes them.

pub mod framebuffer;
pub mod rasterizer;
pub mod renderer;

pub use framebuffer::FrameBuffer;
pub use rasterizer::{RasterError, ScanlineRasterizer, ScreenVertex};
pub use renderer::Renderer;

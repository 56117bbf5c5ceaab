//! SDL2 presentation window.
//!
//! Streams the engine's ARGB8888 color buffer into a window texture and
//! turns keyboard input into [`WindowEvent`]s:
//!
//! | Key | Event |
//! |---|---|
//! | `1`..`9` | render mode, in [`RenderMode`] declaration order |
//! | `C` | toggle backface culling |
//! | `Space` | pause or resume the animation |
//! | `Esc` | quit |

use std::time::Duration;

use clap::ValueEnum;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::WindowContext;

use crate::engine::RenderMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    Resize(u32, u32),
    SelectMode(RenderMode),
    ToggleCulling,
    ToggleAnimation,
}

fn mode_for_key(key: Keycode) -> Option<RenderMode> {
    let slot = match key {
        Keycode::Num1 => 0,
        Keycode::Num2 => 1,
        Keycode::Num3 => 2,
        Keycode::Num4 => 3,
        Keycode::Num5 => 4,
        Keycode::Num6 => 5,
        Keycode::Num7 => 6,
        Keycode::Num8 => 7,
        Keycode::Num9 => 8,
        _ => return None,
    };
    RenderMode::value_variants().get(slot).copied()
}

/// Caps the frame rate by sleeping out the rest of each frame.
pub struct FrameLimiter {
    frame_time_ms: u64,
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window, fps: u32) -> Self {
        Self {
            frame_time_ms: 1000 / u64::from(fps.max(1)),
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Waits if necessary to maintain frame rate and returns the delta time in milliseconds.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < self.frame_time_ms {
            std::thread::sleep(Duration::from_millis(self.frame_time_ms - delta_time));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time
    }
}

pub struct Window {
    canvas: Canvas<sdl2::video::Window>,
    // Declared before `texture_creator` so it is dropped first.
    texture: Texture<'static>,
    texture_creator: Box<TextureCreator<WindowContext>>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;
        let texture = streaming_texture(&texture_creator, width, height)?;

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump,
            timer_subsystem,
            width,
            height,
        })
    }

    /// Returns the first event that needs handling, or `WindowEvent::None`.
    pub fn poll_events(&mut self) -> WindowEvent {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return WindowEvent::Quit,
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } => return WindowEvent::Resize(w.max(1) as u32, h.max(1) as u32),
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match key {
                    Keycode::C => return WindowEvent::ToggleCulling,
                    Keycode::Space => return WindowEvent::ToggleAnimation,
                    _ => {
                        if let Some(mode) = mode_for_key(key) {
                            return WindowEvent::SelectMode(mode);
                        }
                    }
                },
                _ => {}
            }
        }
        WindowEvent::None
    }

    /// Shows a `width * height * 4` byte ARGB8888 frame.
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.texture = streaming_texture(&self.texture_creator, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) {
        // Only fails on interior NUL bytes.
        let _ = self.canvas.window_mut().set_title(title);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}

fn streaming_texture(
    creator: &TextureCreator<WindowContext>,
    width: u32,
    height: u32,
) -> Result<Texture<'static>, String> {
    // SAFETY: the creator is boxed inside `Window` and never moves or drops
    // before the texture, which the field order guarantees.
    let creator: &'static TextureCreator<WindowContext> = unsafe { &*(creator as *const _) };
    creator
        .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
        .map_err(|e| e.to_string())
}

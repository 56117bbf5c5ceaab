use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use scanfill::{Config, Engine, MaterialPreset, RenderMode};

#[derive(Parser, Debug)]
#[command(name = "scanfill")]
#[command(about = "Scanline polygon rasterizer")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Model to draw (.d or .obj); replaces the configured objects
    #[arg(short, long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Texture image for every object
    #[arg(short, long, value_name = "FILE")]
    texture: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<RenderMode>,

    /// Material preset for every object
    #[arg(long, value_enum)]
    material: Option<MaterialPreset>,

    /// Draw back faces too
    #[arg(long)]
    no_cull: bool,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Frames to render headless; the last one is saved
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Image written by the headless renderer
    #[arg(short, long, default_value = "frame.png")]
    output: PathBuf,

    /// Open an SDL2 window instead of writing an image
    #[arg(long)]
    window: bool,
}

impl Cli {
    /// Applies the command-line overrides on top of the file settings.
    fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            let mut object = config.objects.first().cloned().unwrap_or_default();
            object.model = Some(model.clone());
            object.offset = [0.0, 0.0, 0.0];
            config.objects = vec![object];
        }
        for object in &mut config.objects {
            if let Some(texture) = &self.texture {
                object.texture = Some(texture.clone());
            }
            if let Some(material) = self.material {
                object.material = material;
            }
        }
        if let Some(mode) = self.mode {
            config.render.mode = mode;
        }
        if self.no_cull {
            config.render.backface_culling = false;
        }
        if let Some(width) = self.width {
            config.render.width = width.max(1);
        }
        if let Some(height) = self.height {
            config.render.height = height.max(1);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("loading config {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };
    cli.apply(&mut config);

    let scene = config.build_scene()?;
    let mut engine = Engine::new(config.render.width, config.render.height, scene);
    engine.set_render_mode(config.render.mode);
    engine.backface_culling = config.render.backface_culling;

    if cli.window {
        return run_window(&mut engine, &config);
    }

    let mut angle = 0.0;
    for _ in 0..cli.frames.max(1) {
        engine.animate(angle);
        let stats = engine.render();
        info!(
            "{} faces drawn, {} culled, {} skipped",
            stats.faces_drawn, stats.faces_culled, stats.faces_skipped
        );
        if config.animation.enabled {
            angle += config.animation.rotation_speed;
        }
    }
    engine.save_png(&cli.output)?;
    info!("wrote {}", cli.output.display());
    Ok(())
}

#[cfg(feature = "window")]
fn run_window(engine: &mut Engine, config: &Config) -> Result<(), Box<dyn Error>> {
    use scanfill::window::{FrameLimiter, Window, WindowEvent};

    let mut window = Window::new("scanfill", engine.width(), engine.height())?;
    let mut limiter = FrameLimiter::new(&window, config.animation.fps);
    let mut animating = config.animation.enabled;
    let mut angle = 0.0;

    loop {
        match window.poll_events() {
            WindowEvent::Quit => break,
            WindowEvent::Resize(w, h) => {
                window.resize(w, h)?;
                engine.resize(w, h);
            }
            WindowEvent::SelectMode(mode) => {
                info!("render mode {:?}", mode);
                engine.set_render_mode(mode);
            }
            WindowEvent::ToggleCulling => {
                engine.backface_culling = !engine.backface_culling;
                info!("backface culling {}", engine.backface_culling);
            }
            WindowEvent::ToggleAnimation => animating = !animating,
            WindowEvent::None => {}
        }

        engine.animate(angle);
        engine.render();
        window.present(&engine.frame_buffer())?;

        let delta = limiter.wait_and_get_delta(&window);
        window.set_title(&format!(
            "scanfill - {:?} - {:.0} fps",
            engine.render_mode(),
            1000.0 / delta.max(1) as f32
        ));
        if animating {
            angle += config.animation.rotation_speed;
        }
    }
    Ok(())
}

#[cfg(not(feature = "window"))]
fn run_window(_engine: &mut Engine, _config: &Config) -> Result<(), Box<dyn Error>> {
    Err("built without the `window` feature; rebuild with --features window".into())
}

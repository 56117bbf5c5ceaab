use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scanfill::bench::{FlatShader, GouraudShader, Renderer, ScanlineRasterizer, ScreenVertex};
use scanfill::math::vec3::Vec3;
use scanfill::{Config, Engine, RenderMode};

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;

fn vertex(x: f32, y: f32, z: f32, color: Vec3) -> ScreenVertex {
    ScreenVertex::new(Vec3::new(x, y, z), color, Vec3::ZERO)
}

fn small_triangle() -> Vec<ScreenVertex> {
    vec![
        vertex(100.0, 100.0, 0.5, Vec3::new(1.0, 0.0, 0.0)),
        vertex(120.0, 100.0, 0.5, Vec3::new(0.0, 1.0, 0.0)),
        vertex(110.0, 120.0, 0.5, Vec3::new(0.0, 0.0, 1.0)),
    ]
}

fn large_triangle() -> Vec<ScreenVertex> {
    vec![
        vertex(50.0, 50.0, 0.2, Vec3::new(1.0, 0.0, 0.0)),
        vertex(750.0, 100.0, 0.5, Vec3::new(0.0, 1.0, 0.0)),
        vertex(400.0, 550.0, 0.8, Vec3::new(0.0, 0.0, 1.0)),
    ]
}

/// Regular polygon centered on the buffer.
fn polygon(sides: usize, radius: f32) -> Vec<ScreenVertex> {
    (0..sides)
        .map(|i| {
            let a = i as f32 * std::f32::consts::TAU / sides as f32;
            vertex(
                400.0 + radius * a.cos(),
                300.0 + radius * a.sin(),
                0.5,
                Vec3::splat(a / std::f32::consts::TAU),
            )
        })
        .collect()
}

fn benchmark_single_polygon(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_polygon");

    for (name, vertices) in [
        ("small_triangle", small_triangle()),
        ("large_triangle", large_triangle()),
        ("hexagon", polygon(6, 200.0)),
        ("32_gon", polygon(32, 250.0)),
    ] {
        group.bench_with_input(BenchmarkId::new("flat", name), &vertices, |b, vertices| {
            let mut renderer = Renderer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
            let mut rasterizer = ScanlineRasterizer::new();
            let shader = FlatShader::new(0xFFFF0000);
            b.iter(|| {
                renderer.clear_depth();
                let mut fb = renderer.as_framebuffer();
                rasterizer.fill_polygon(black_box(vertices), &shader, &mut fb)
            });
        });

        group.bench_with_input(BenchmarkId::new("gouraud", name), &vertices, |b, vertices| {
            let mut renderer = Renderer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
            let mut rasterizer = ScanlineRasterizer::new();
            b.iter(|| {
                renderer.clear_depth();
                let mut fb = renderer.as_framebuffer();
                rasterizer.fill_polygon(black_box(vertices), &GouraudShader, &mut fb)
            });
        });
    }

    group.finish();
}

fn benchmark_many_quads(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_quads");

    // A 20x20 grid of small quads
    let quads: Vec<Vec<ScreenVertex>> = (0..20)
        .flat_map(|row| {
            (0..20).map(move |col| {
                let x = col as f32 * 40.0;
                let y = row as f32 * 30.0;
                let color = Vec3::new(1.0, 0.5, 0.0);
                vec![
                    vertex(x, y, 0.5, color),
                    vertex(x + 35.0, y + 2.0, 0.5, color),
                    vertex(x + 33.0, y + 25.0, 0.5, color),
                    vertex(x + 1.0, y + 24.0, 0.5, color),
                ]
            })
        })
        .collect();

    group.bench_function("scanline_400_quads", |b| {
        let mut renderer = Renderer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
        let mut rasterizer = ScanlineRasterizer::new();
        let shader = FlatShader::new(0xFFFF0000);
        b.iter(|| {
            renderer.clear_depth();
            let mut fb = renderer.as_framebuffer();
            for quad in &quads {
                let _ = rasterizer.fill_polygon(black_box(quad), &shader, &mut fb);
            }
        });
    });

    group.finish();
}

fn benchmark_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");

    for mode in [RenderMode::Flat, RenderMode::Gouraud, RenderMode::Phong] {
        let scene = Config::default()
            .build_scene()
            .expect("default scene uses the built-in cube");
        let mut engine = Engine::new(BUFFER_WIDTH, BUFFER_HEIGHT, scene);
        engine.set_render_mode(mode);
        engine.animate(0.6);

        group.bench_function(format!("cube_{:?}", mode).to_lowercase(), |b| {
            b.iter(|| engine.render());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_polygon,
    benchmark_many_quads,
    benchmark_frame
);
criterion_main!(benches);

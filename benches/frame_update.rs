use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cube_scene::animation::{advance, light_sample, FrameDriver, SceneRenderer};
use cube_scene::core::{Button, Controller, Viewport};
use cube_scene::frame::FrameInfo;
use cube_scene::geometry::MeshData;
use cube_scene::orbit::OrbitControls;
use cube_scene::renderer::{globals_uniform, object_uniform};
use cube_scene::scene::{Geometry, SceneState, DEFAULT_SHADOW_MAP_SIZE};
use glam::Vec3;

/// Left button held, constant drag
struct Dragging;

impl Controller for Dragging {
    fn is_down(&self, button: Button) -> bool {
        button == Button::MouseLeft
    }

    fn pointer_delta(&self) -> (f32, f32) {
        (3.0, 1.0)
    }

    fn scroll_delta(&self) -> f32 {
        0.0
    }
}

/// Builds the GPU-side uniforms without touching a device
struct UniformsOnly;

impl SceneRenderer for UniformsOnly {
    type Error = ();

    fn draw(&mut self, scene: &SceneState) -> Result<(), ()> {
        black_box(globals_uniform(scene, 1.0 / DEFAULT_SHADOW_MAP_SIZE as f32));
        for mesh in &scene.meshes {
            black_box(object_uniform(mesh));
        }
        Ok(())
    }
}

const EPOCH_MS: i64 = 1_790_000_000_000;

fn bench_light_sample(c: &mut Criterion) {
    c.bench_function("light_sample", |b| {
        let mut t = EPOCH_MS;
        b.iter(|| {
            t += 16;
            black_box(light_sample(black_box(t)))
        })
    });
}

fn bench_advance(c: &mut Criterion) {
    c.bench_function("advance", |b| {
        let mut scene = SceneState::bootstrap(Viewport::new(800, 600), DEFAULT_SHADOW_MAP_SIZE);
        let mut number = 0u64;
        b.iter(|| {
            number += 1;
            let frame = FrameInfo::new(number, EPOCH_MS + number as i64 * 16);
            advance(&mut scene, black_box(&frame));
        })
    });
}

fn bench_frame_driver(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_driver");

    for damping in [false, true] {
        group.bench_with_input(BenchmarkId::new("damping", damping), &damping, |b, &damping| {
            let mut scene = SceneState::bootstrap(Viewport::new(800, 600), DEFAULT_SHADOW_MAP_SIZE);
            let mut controls = OrbitControls::new(Vec3::ZERO);
            controls.enable_damping = damping;
            controls.damping_factor = 0.25;
            let mut driver = FrameDriver::new(controls);
            let mut renderer = UniformsOnly;
            let mut number = 0u64;

            b.iter(|| {
                number += 1;
                let frame = FrameInfo::new(number, EPOCH_MS + number as i64 * 16);
                driver
                    .frame(&mut scene, &frame, &Dragging, &mut renderer)
                    .ok();
            })
        });
    }

    group.finish();
}

fn bench_mesh_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_data");

    group.bench_function("box", |b| {
        b.iter(|| black_box(MeshData::from_geometry(black_box(&Geometry::unit_box()))))
    });
    group.bench_function("plane", |b| {
        let plane = Geometry::Plane { width: 100.0, height: 100.0 };
        b.iter(|| black_box(MeshData::from_geometry(black_box(&plane))))
    });

    group.finish();
}

criterion_group!(benches, bench_light_sample, bench_advance, bench_frame_driver, bench_mesh_data);
criterion_main!(benches);

//! Benchmarks for the per-frame simulators
//!
//! Run with: cargo bench -p neon-effects --bench simulation

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use neon_effects::effects::{
    FloatingGeometry, GeometryParams, MatrixRain, ParticleBuffers, ParticleParams, RainParams,
};
use neon_effects::{Vec3, make_rng};
use neon_theme::{ThemeId, get_theme};
use std::hint::black_box;

fn bench_particles(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation/particles");
    for id in ThemeId::ALL {
        let params = ParticleParams::from_theme(get_theme(id));
        let mut rng = make_rng(Some(1));
        let mut buffers = ParticleBuffers::initialize(&params, &mut rng);
        let mut time = 0.0f32;
        group.bench_with_input(BenchmarkId::from_parameter(id), &params, |b, params| {
            b.iter(|| {
                time += 1.0 / 60.0;
                buffers.update(
                    black_box(time),
                    Vec3::new(0.0, 0.0, 30.0),
                    params.intensity,
                    params.animation_speed,
                );
            })
        });
    }
    group.finish();
}

fn bench_particle_init(c: &mut Criterion) {
    let params = ParticleParams::from_theme(get_theme(ThemeId::Zeus));
    c.bench_function("simulation/particles_initialize", |b| {
        let mut rng = make_rng(Some(2));
        b.iter(|| ParticleBuffers::initialize(black_box(&params), &mut rng))
    });
}

fn bench_matrix(c: &mut Criterion) {
    let mut rain = MatrixRain::new(RainParams::default(), Some(3));
    c.bench_function("simulation/matrix_advance", |b| {
        b.iter(|| rain.advance(black_box(1.0 / 60.0)))
    });
}

fn bench_geometry(c: &mut Criterion) {
    let mut geometry = FloatingGeometry::new(GeometryParams::default(), Some(4));
    let mut time = 0.0f32;
    c.bench_function("simulation/geometry_step", |b| {
        b.iter(|| {
            time += 1.0 / 60.0;
            geometry.step(black_box(time));
            geometry.items().iter().map(|item| item.position_at(time)).count()
        })
    });
}

criterion_group!(
    benches,
    bench_particles,
    bench_particle_init,
    bench_matrix,
    bench_geometry
);
criterion_main!(benches);

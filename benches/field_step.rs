//! Benchmarks for the per-frame simulate-and-render pass.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;

use particle_field::render;
use particle_field::{Canvas, FieldConfig, ParticleField, RecordingCanvas, Rgb};

const BOUNDS: Vec2 = Vec2::new(1920.0, 1080.0);

fn field(count: usize) -> ParticleField {
    ParticleField::new(FieldConfig::new().with_count(count).with_seed(42), BOUNDS)
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_step");

    for count in [50, 500, 2000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut field = field(count);
            let mut canvas = RecordingCanvas::new();
            b.iter(|| black_box(field.step(Vec2::splat(0.5), &mut canvas)))
        });
    }

    group.finish();
}

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");

    for count in [500, 2000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut field = field(count);
            b.iter(|| field.simulate(black_box(BOUNDS * 0.5)))
        });
    }

    group.finish();
}

fn bench_links(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw_links");

    for count in [500, 2000] {
        let mut field = field(count);
        field.simulate(BOUNDS * 0.5);

        group.bench_with_input(BenchmarkId::new("grid", count), &field, |b, field| {
            let mut canvas = RecordingCanvas::new();
            b.iter(|| {
                let drawn = render::draw_links(
                    field.particles(),
                    field.grid(),
                    field.config().link_dist,
                    Rgb::CYAN,
                    &mut canvas,
                );
                canvas.clear();
                black_box(drawn)
            })
        });

        // all-pairs baseline the grid is meant to beat
        group.bench_with_input(BenchmarkId::new("all_pairs", count), &field, |b, field| {
            let particles = field.particles();
            let max_sq = field.config().link_dist * field.config().link_dist;
            b.iter(|| {
                let mut close = 0usize;
                for i in 0..particles.len() {
                    for j in i + 1..particles.len() {
                        if particles[i].position.distance_squared(particles[j].position) < max_sq {
                            close += 1;
                        }
                    }
                }
                black_box(close)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_simulate, bench_links);
criterion_main!(benches);

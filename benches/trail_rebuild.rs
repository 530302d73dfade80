//! Benchmarks for history commits and trail reconstruction.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dotrail::curve::Curve;
use dotrail::dot::Dot;
use dotrail::history::History;
use dotrail::prelude::*;
use dotrail::trail::TrailRenderer;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn random_dots(count: usize, rng: &mut SmallRng) -> Vec<Dot> {
    (0..count)
        .map(|_| Dot {
            seed: rng.gen(),
            lifetime: rng.gen_range(0.0..200.0),
            position: Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            ),
            rotation: Quat::from_rotation_y(rng.gen_range(0.0..6.28)),
            opacity: rng.gen_range(0.1..1.0),
            hue: rng.gen_range(0.0..360.0),
        })
        .collect()
}

fn filled_history(particles: usize, frames: usize) -> History<Dot> {
    let mut rng = SmallRng::seed_from_u64(11);
    let mut history = History::new(Dot::default, 300, particles);
    for _ in 0..frames {
        let dots = random_dots(particles, &mut rng);
        history.put_snapshot(&dots, |src, dst| *dst = *src);
    }
    history
}

fn bench_put_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_snapshot");

    for &particles in &[100usize, 1_000, 4_000] {
        let mut rng = SmallRng::seed_from_u64(3);
        let dots = random_dots(particles, &mut rng);
        let mut history = History::new(Dot::default, 300, particles);

        group.bench_with_input(BenchmarkId::from_parameter(particles), &dots, |b, dots| {
            b.iter(|| black_box(history.put_snapshot(dots, |src, dst| *dst = *src)))
        });
    }

    group.finish();
}

fn bench_update_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_state");

    for &length in &[10.0f32, 60.0, 200.0] {
        let history = filled_history(400, 300);
        let mut trails = TrailRenderer::new();
        trails.point_options = PointTrailOptions {
            trail_length: length,
            trail_diffusion_scale: 0.4,
            trail_diffusion_shakiness: 1.0,
            trail_diffusion_transition: Curve::Ease(2.0),
            ..PointTrailOptions::default()
        };
        trails.shape_options = ShapeTrailOptions {
            trail_length: length,
            trail_step: 3.0,
            ..ShapeTrailOptions::default()
        };

        group.bench_with_input(BenchmarkId::new("trail_length", length as u32), &history, |b, history| {
            b.iter(|| black_box(trails.update_state(history)))
        });
    }

    group.finish();
}

fn bench_session_tick(c: &mut Criterion) {
    c.bench_function("session_tick", |b| {
        let config = SessionConfig {
            particle_capacity: 1_024,
            ..SessionConfig::default()
        };
        let mut session = match Session::new(PresetCompiler::with_seed(1), &config) {
            Ok(session) => session,
            Err(err) => panic!("default preset failed to compile: {err}"),
        };
        b.iter(|| black_box(session.tick(1.0)))
    });
}

criterion_group!(benches, bench_put_snapshot, bench_update_state, bench_session_tick);
criterion_main!(benches);

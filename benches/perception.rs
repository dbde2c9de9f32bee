//! Benchmark for the perception-heavy simulation tick.

use criterion::{criterion_group, criterion_main, Criterion};
use glam::Vec3;
use ironline_sim::{SimWorld, Team};

fn contested_field(units_per_side: u32) -> SimWorld {
    let mut sim = SimWorld::new();
    for i in 0..units_per_side {
        let z = (i as f32 - units_per_side as f32 / 2.0) * 6.0;
        sim.spawn_ai_unit(i, Team::Blue, Vec3::new(-30.0, 0.0, z));
        sim.spawn_ai_unit(1000 + i, Team::Red, Vec3::new(30.0, 0.0, z));
    }
    for i in 0..10 {
        sim.spawn_obstacle(Vec3::new(0.0, 0.0, (i as f32 - 5.0) * 20.0), 4.0);
    }
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for units_per_side in [25u32, 100] {
        group.bench_function(format!("{}v{}", units_per_side, units_per_side), |b| {
            let mut sim = contested_field(units_per_side);
            b.iter(|| sim.step(1.0 / 30.0));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);

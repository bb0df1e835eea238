//! Benchmarks for the divide-stability pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ridgeline_algorithms::divide::{divide_stability, SilentObserver, StabilityParams};
use ridgeline_algorithms::hydrology::{flow_direction, priority_flood, PriorityFloodParams};
use ridgeline_core::{GeoTransform, Raster};

/// Ridge-and-valley terrain tilted south, 30 m cells
fn create_ridged_dem(size: usize) -> Raster<f64> {
    let mut dem = Raster::new(size, size);
    dem.set_transform(GeoTransform::new(0.0, size as f64 * 30.0, 30.0, -30.0));
    for row in 0..size {
        for col in 0..size {
            let x = col as f64 / size as f64;
            let tilt = (size - row) as f64 * 2.0;
            let ridges = 40.0 * (x * std::f64::consts::TAU * 3.0).cos();
            let noise = ((row * 7 + col * 13) % 17) as f64 * 0.05;
            dem.set(row, col, 500.0 + tilt + ridges + noise).unwrap();
        }
    }
    dem
}

fn prepared(size: usize) -> (Raster<f64>, Raster<u8>) {
    let dem = priority_flood(&create_ridged_dem(size), PriorityFloodParams::default()).unwrap();
    let fdir = flow_direction(&dem).unwrap();
    (dem, fdir)
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("divide/divide_stability");
    group.sample_size(10);
    let params = StabilityParams {
        min_channel_area: 30.0 * 30.0 * 50.0,
        relief_radius: 150.0,
        ..Default::default()
    };
    for size in [128, 256, 512] {
        let (dem, fdir) = prepared(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                divide_stability(black_box(&dem), black_box(&fdir), &params, &mut SilentObserver)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_conditioning(c: &mut Criterion) {
    let mut group = c.benchmark_group("divide/conditioning");
    for size in [256, 512, 1024] {
        let dem = create_ridged_dem(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let filled = priority_flood(black_box(&dem), PriorityFloodParams::default()).unwrap();
                flow_direction(&filled).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_conditioning);
criterion_main!(benches);

//! Performance Benchmarks for DELTASIM-RS
//!
//! Run with: cargo bench
//!
//! Benchmarks cover:
//! - Envelope merge of two tabulated cross sections
//! - Full majorant pipeline on the pin cell
//! - Delta-tracking throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use deltasim_rs::particle::ParticleSource;
use deltasim_rs::problems::{pin_cell, synthetic_library, u238};
use deltasim_rs::{majorant_from_geometry, merge_max, DeltaTracker, TransportSettings};

// ═══════════════════════════════════════════════════════════════════════════
// MAJORANT BENCHMARKS
// ═══════════════════════════════════════════════════════════════════════════

fn bench_merge_max(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_max");
    for points in [200usize, 2000, 20000] {
        let nuclide = u238();
        let (Ok(cold), Ok(hot)) = (nuclide.tabulate(294.0, points), nuclide.tabulate(900.0, points)) else {
            continue;
        };
        group.throughput(Throughput::Elements((cold.len() + hot.len()) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |b, _| {
            b.iter(|| merge_max(black_box(&cold), black_box(&hot)))
        });
    }
    group.finish();
}

fn bench_pin_cell_majorant(c: &mut Criterion) {
    let library = synthetic_library(2000).expect("synthetic library");
    let geometry = pin_cell();

    c.bench_function("pin_cell_majorant", |b| {
        b.iter(|| majorant_from_geometry(black_box(&geometry), &library))
    });
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSPORT BENCHMARKS
// ═══════════════════════════════════════════════════════════════════════════

fn bench_delta_tracking(c: &mut Criterion) {
    let library = synthetic_library(2000).expect("synthetic library");
    let mut geometry = pin_cell();
    geometry.tabulate_cross_sections(&library).expect("tabulated cells");
    let majorant = majorant_from_geometry(&geometry, &library)
        .and_then(|m| m.into_function())
        .expect("majorant");
    let source = ParticleSource::new();

    let mut group = c.benchmark_group("delta_tracking");
    group.sample_size(20);
    for n in [10usize, 100] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut tracker =
                    DeltaTracker::new(&majorant, &geometry, TransportSettings::default())
                        .expect("tracker");
                tracker.run(&source, black_box(n)).map(|h| h.len())
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_merge_max,
    bench_pin_cell_majorant,
    bench_delta_tracking,
);
criterion_main!(benches);

//! Performance benchmarks for cat-roulette.
//!
//! Run with: cargo bench
//!
//! These benchmarks measure key performance metrics:
//! - Spin planning (rotation draw plus segment selection)
//! - Placeholder synthesis for the fallback image
//! - Config load/save

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use tempfile::TempDir;

use cat_roulette::assets::synthesize_placeholder;
use cat_roulette::catalog::{Item, ItemCatalog};
use cat_roulette::config::RouletteConfig;
use cat_roulette::wheel::{generate_rotation, normalize_angle, select_index, SeededRandom};

// ============================================================================
// Wheel benchmarks
// ============================================================================

fn bench_generate_rotation(c: &mut Criterion) {
    let mut rng = SeededRandom::from_seed(42);

    c.bench_function("generate_rotation", |b| {
        b.iter(|| {
            let rotation = generate_rotation(&mut rng, black_box(3.0), black_box(6.0)).unwrap();
            black_box(rotation)
        })
    });
}

fn bench_select_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_index");

    for count in [2usize, 8, 64, 1024].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut angle = 0.0;
            b.iter(|| {
                angle = normalize_angle(angle + 137.5);
                let index = select_index(black_box(angle + 1800.0), count).unwrap();
                black_box(index)
            })
        });
    }

    group.finish();
}

fn bench_plan_spin(c: &mut Criterion) {
    let catalog = ItemCatalog::default_cats();
    let mut rng = SeededRandom::from_seed(7);

    c.bench_function("plan_spin", |b| {
        let mut current = 0.0;
        b.iter(|| {
            let delta = generate_rotation(&mut rng, 3.0, 6.0).unwrap();
            let final_angle = current + delta;
            let index = select_index(final_angle, catalog.len()).unwrap();
            current = normalize_angle(final_angle);
            black_box(catalog.get(index))
        })
    });
}

// ============================================================================
// Asset benchmarks
// ============================================================================

fn bench_synthesize_placeholder(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize_placeholder");

    for label_len in [8usize, 64, 512].iter() {
        let item = Item::new(1, "cat1.svg", "Cat & <friends> ".repeat(*label_len / 8));
        group.bench_with_input(BenchmarkId::from_parameter(label_len), &item, |b, item| {
            b.iter(|| {
                let handle = synthesize_placeholder(black_box(item)).unwrap();
                black_box(handle)
            })
        });
    }

    group.finish();
}

// ============================================================================
// Config benchmarks
// ============================================================================

fn bench_config_load(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join(".roulette");
    fs::create_dir_all(&dir).unwrap();
    let config_path = dir.join("config.json");
    RouletteConfig::default()
        .save(Some(config_path.as_path()))
        .unwrap();

    c.bench_function("config_load", |b| {
        b.iter(|| {
            let config = RouletteConfig::load(black_box(Some(config_path.as_path()))).unwrap();
            black_box(config)
        })
    });

    drop(temp);
}

fn bench_config_save(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join(".roulette").join("config.json");
    let config = RouletteConfig::default();

    c.bench_function("config_save", |b| {
        b.iter(|| {
            config.save(black_box(Some(config_path.as_path()))).unwrap();
        })
    });

    drop(temp);
}

criterion_group!(
    wheel_benches,
    bench_generate_rotation,
    bench_select_index,
    bench_plan_spin
);
criterion_group!(asset_benches, bench_synthesize_placeholder);
criterion_group!(config_benches, bench_config_load, bench_config_save);

criterion_main!(wheel_benches, asset_benches, config_benches);

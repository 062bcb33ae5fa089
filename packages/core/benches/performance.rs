//! Performance benchmarks for FairTree core operations
//!
//! Run with: `cargo bench -p fairtree-core`
//!
//! These benchmarks measure critical path performance:
//! - Compliance scoring over a few thousand nodes
//! - Listing import throughput
//! - Cycle-checked moves on deep chains

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fairtree_core::config::StoreConfig;
use fairtree_core::db::MemorySnapshotStore;
use fairtree_core::services::{score_nodes, TreeStore};
use fairtree_core::utils::parse_listing;
use std::sync::Arc;

/// Generate a listing with roughly `file_count` files spread over nested folders
fn generate_listing(file_count: usize) -> String {
    let mut listing = String::new();

    for i in 0..file_count {
        let project = i % 10;
        let dataset = (i / 10) % 8;
        let name = match i % 4 {
            0 => format!("survey_{:04}.csv", i),
            1 => format!("Raw Export {}", i),
            2 => format!("report_01-05-{:04}.pdf", 2000 + i % 24),
            _ => format!("analysis_2023-05-{:02}.ipynb", 1 + i % 28),
        };
        listing.push_str(&format!("~/project_{}/dataset {}/{}\n", project, dataset, name));
    }

    listing
}

fn bench_compliance_scoring(c: &mut Criterion) {
    let nodes = parse_listing(&generate_listing(2000));

    c.bench_function("score_2000_files", |b| {
        b.iter(|| black_box(score_nodes(black_box(&nodes))));
    });
}

fn bench_listing_import(c: &mut Criterion) {
    let listing = generate_listing(1000);

    let mut group = c.benchmark_group("listing_import");
    group.sample_size(20);

    group.bench_function("1000_files", |b| {
        b.iter(|| black_box(parse_listing(black_box(&listing))));
    });

    group.bench_function("1000_files_into_store", |b| {
        b.iter(|| {
            let store = TreeStore::open(
                StoreConfig::default(),
                Arc::new(MemorySnapshotStore::new()),
                black_box(&listing),
            )
            .unwrap();
            black_box(store.len())
        });
    });

    group.finish();
}

fn bench_cycle_checked_moves(c: &mut Criterion) {
    // Deep chain: each folder nested inside the previous one
    let mut store = TreeStore::new(StoreConfig::default(), Arc::new(MemorySnapshotStore::new()));
    let mut ids: Vec<String> = Vec::new();
    for i in 0..500 {
        let parent = ids.last().map(String::as_str);
        let node = store.create_folder(&format!("level_{}", i), parent).unwrap();
        ids.push(node.id);
    }
    let top = ids[0].clone();
    let bottom = ids[ids.len() - 1].clone();
    let spare = store.create_folder("spare", None).unwrap().id;

    let mut group = c.benchmark_group("moves");

    group.bench_function("rejected_cycle_500_deep", |b| {
        b.iter(|| black_box(store.move_node(black_box(&top), Some(&bottom)).is_err()));
    });

    group.bench_function("accepted_move_500_deep", |b| {
        b.iter(|| {
            store.move_node(&spare, Some(&bottom)).unwrap();
            store.move_node(&spare, None).unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_compliance_scoring,
    bench_listing_import,
    bench_cycle_checked_moves
);
criterion_main!(benches);

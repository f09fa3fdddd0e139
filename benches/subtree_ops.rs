//! Subtree operation benchmarks, with BTreeMap as a baseline.

use category_tree::{Category, CategoryTree};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// Shuffled so the unbalanced subtrees stay reasonably shallow.
fn generate_keys(n: usize) -> Vec<String> {
    let mut keys: Vec<String> = (0..n).map(|i| format!("user:{:08}", i)).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(7));
    keys
}

/// Odd multiplier: a bijection on 64-bit integers that scatters sequential ids.
fn signed_key(i: usize) -> i64 {
    (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) as i64
}

fn build(keys: &[String]) -> CategoryTree<u64> {
    let mut tree = CategoryTree::new();
    for (i, key) in keys.iter().enumerate() {
        tree.insert(key.as_str(), i as u64).unwrap();
        tree.insert(signed_key(i), i as u64).unwrap();
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [1_000, 10_000, 100_000].iter() {
        let keys = generate_keys(*size);

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), size, |b, _| {
            b.iter(|| {
                let mut map: BTreeMap<String, u64> = BTreeMap::new();
                for (i, key) in keys.iter().enumerate() {
                    map.insert(key.clone(), i as u64);
                }
                black_box(map)
            });
        });

        group.bench_with_input(BenchmarkId::new("CategoryTree", size), size, |b, _| {
            b.iter(|| {
                let mut tree: CategoryTree<u64> = CategoryTree::new();
                for (i, key) in keys.iter().enumerate() {
                    tree.insert(key.as_str(), i as u64).unwrap();
                }
                black_box(tree)
            });
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [1_000, 10_000, 100_000].iter() {
        let keys = generate_keys(*size);
        let tree = build(&keys);

        group.bench_with_input(BenchmarkId::new("string", size), size, |b, _| {
            b.iter(|| {
                for key in &keys {
                    black_box(tree.search(key.as_str()));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("signed", size), size, |b, &n| {
            b.iter(|| {
                for i in 0..n {
                    black_box(tree.search(signed_key(i)));
                }
            });
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");

    for size in [1_000, 10_000].iter() {
        let keys = generate_keys(*size);
        let tree = build(&keys);

        group.bench_with_input(BenchmarkId::new("string", size), size, |b, _| {
            b.iter_batched(
                || tree.clone(),
                |mut tree| {
                    for key in &keys {
                        black_box(tree.remove(key.as_str()));
                    }
                    tree
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_traverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("traverse");

    for size in [1_000, 10_000, 100_000].iter() {
        let keys = generate_keys(*size);
        let tree = build(&keys);

        group.bench_with_input(BenchmarkId::new("string", size), size, |b, _| {
            b.iter(|| black_box(tree.traverse(Category::String).unwrap().len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_search, bench_remove, bench_traverse);
criterion_main!(benches);

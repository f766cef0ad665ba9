// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pcb_rtree::{Aabb2D, Key, RTree, RTreeConfig, Visit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn gen_grid_rects_i64(n: usize, cell: i64) -> Vec<Aabb2D<i64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Aabb2D::<i64>::from_xywh(x as i64 * cell, y as i64 * cell, cell, cell));
        }
    }
    out
}

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Aabb2D::<f64>::from_xywh(x as f64 * cell, y as f64 * cell, cell, cell));
        }
    }
    out
}

fn gen_random_rects(count: usize, span: i64, max_size: i64) -> Vec<Aabb2D<i64>> {
    let mut rng = StdRng::seed_from_u64(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let x = rng.random_range(0..span);
            let y = rng.random_range(0..span);
            Aabb2D::<i64>::from_xywh(
                x,
                y,
                rng.random_range(1..=max_size),
                rng.random_range(1..=max_size),
            )
        })
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_i64_insert");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects_i64(n, 10);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("insert_grid_n{n}"), |b| {
            b.iter_batched(
                RTree::<i64, Aabb2D<i64>>::new,
                |mut tree| {
                    for r in &rects {
                        let _ = tree.insert_borrowed(r);
                    }
                    black_box(tree.height());
                },
                BatchSize::SmallInput,
            );
        });
    }
    let rects = gen_random_rects(4096, 2000, 24);
    group.bench_function("from_borrowed_random", |b| {
        b.iter(|| {
            let tree = RTree::from_borrowed(&rects);
            black_box(tree.node_count());
        });
    });
    for fan_out in [4, 6, 12] {
        let config = RTreeConfig::new()
            .with_fan_out(fan_out)
            .expect("fan-out in range");
        group.bench_function(format!("insert_random_fan_out_{fan_out}"), |b| {
            b.iter_batched(
                || RTree::<i64, Aabb2D<i64>>::with_config(config),
                |mut tree| {
                    for r in &rects {
                        let _ = tree.insert_borrowed(r);
                    }
                    black_box(tree.len());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_search");
    let rects = gen_grid_rects_i64(128, 8);
    let tree = RTree::from_borrowed(&rects);
    group.bench_function("many_small_queries_i64", |b| {
        b.iter(|| {
            let mut total = 0_usize;
            for q in 0..256_i64 {
                let x = (q % 64) * 8;
                let y = (q / 64) * 64;
                total += tree.count(Some(&Aabb2D::<i64>::from_xywh(x, y, 40, 40)));
            }
            black_box(total);
        });
    });
    group.bench_function("region_is_empty_i64", |b| {
        b.iter(|| {
            let mut free = 0_usize;
            for q in 0..256_i64 {
                let area = Aabb2D::<i64>::from_xywh(q * 4 - 8, -20, 6, 18);
                free += usize::from(tree.region_is_empty(&area));
            }
            black_box(free);
        });
    });
    group.bench_function("search_pt_i64", |b| {
        b.iter(|| {
            let mut total = 0_usize;
            for q in 0..256_i64 {
                total += tree.search_pt(q * 3, q * 2, 1, |_, _| Visit::Accept);
            }
            black_box(total);
        });
    });

    let frects = gen_grid_rects(128, 8.0);
    let ftree = RTree::from_borrowed(&frects);
    group.bench_function("large_query_f64", |b| {
        b.iter(|| {
            let hits = ftree.count(Some(&Aabb2D::<f64>::from_xywh(100.0, 100.0, 400.0, 400.0)));
            black_box(hits);
        });
    });
    group.bench_function("first_hit_f64", |b| {
        b.iter(|| {
            let hits = ftree.search(
                Some(&Aabb2D::<f64>::from_xywh(100.0, 100.0, 400.0, 400.0)),
                |_, _| Visit::AcceptAndStop,
            );
            black_box(hits);
        });
    });
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_i64_churn");
    let rects = gen_random_rects(4096, 2000, 24);
    group.bench_function("delete_then_reinsert_half", |b| {
        b.iter_batched(
            || {
                let mut tree = RTree::new();
                let keys: Vec<Key> = rects.iter().map(|r| tree.insert_borrowed(r)).collect();
                (tree, keys)
            },
            |(mut tree, keys)| {
                for k in keys.iter().step_by(2) {
                    let _ = tree.delete(*k);
                }
                for r in rects.iter().step_by(2) {
                    let _ = tree.insert_borrowed(r);
                }
                black_box(tree.len());
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function("move_every_entry", |b| {
        b.iter_batched(
            || {
                let mut tree = RTree::new();
                let keys: Vec<Key> = rects.iter().map(|r| tree.insert_owned(*r)).collect();
                (tree, keys)
            },
            |(mut tree, keys)| {
                for (j, k) in keys.into_iter().enumerate() {
                    if let Some(old) = tree.remove(k) {
                        let dx = (j as i64 % 5) - 2;
                        let dy = ((j * 7) as i64 % 5) - 2;
                        let moved = Aabb2D::new(
                            old.min_x + dx,
                            old.min_y + dy,
                            old.max_x + dx,
                            old.max_y + dy,
                        );
                        let _ = tree.insert_owned(moved);
                    }
                }
                black_box(tree.len());
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_search, bench_churn);
criterion_main!(benches);

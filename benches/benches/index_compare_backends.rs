// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use snapping_index::{Aabb2D, FlatIndex, Index};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<(Aabb2D, u32)> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push((Aabb2D::from_xywh(x0, y0, cell, cell), (y * n + x) as u32));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<(Aabb2D, u32)> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 2000.0, rng.next_f64() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            let id = out.len() as u32;
            out.push((Aabb2D::from_xywh(cx + dx, cy + dy, 12.0, 12.0), id));
        }
    }
    out
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("rtree_insert_n{n}"), |b| {
            b.iter_batched(
                Index::<u32>::new,
                |mut idx| {
                    for &(r, id) in &rects {
                        let _ = idx.insert(r, id);
                    }
                    black_box(idx.len());
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("rtree_bulk_load_n{n}"), |b| {
            b.iter(|| {
                let (idx, _) = Index::<u32>::from_entries(&rects);
                black_box(idx.len());
            });
        });
        group.bench_function(format!("flatvec_bulk_load_n{n}"), |b| {
            b.iter(|| {
                let (idx, _) = FlatIndex::<u32>::from_entries(&rects);
                black_box(idx.len());
            });
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let rects = gen_clustered_rects(40, 250, 300.0);
    let (rtree, _) = Index::<u32>::from_entries(&rects);
    let (flat, _) = FlatIndex::<u32>::from_entries(&rects);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    let probes: Vec<(f64, f64)> = (0..256)
        .map(|_| (rng.next_f64() * 2000.0, rng.next_f64() * 2000.0))
        .collect();
    group.throughput(Throughput::Elements(probes.len() as u64));

    group.bench_function("rtree_nearest_r20", |b| {
        b.iter(|| {
            let hits: usize = probes
                .iter()
                .map(|&(x, y)| rtree.query_nearest(x, y, 20.0).count())
                .sum();
            black_box(hits);
        });
    });
    group.bench_function("flatvec_nearest_r20", |b| {
        b.iter(|| {
            let hits: usize = probes
                .iter()
                .map(|&(x, y)| flat.query_nearest(x, y, 20.0).count())
                .sum();
            black_box(hits);
        });
    });
    group.bench_function("rtree_rect_50", |b| {
        b.iter(|| {
            let hits: usize = probes
                .iter()
                .map(|&(x, y)| rtree.query_rect(Aabb2D::from_xywh(x, y, 50.0, 50.0)).count())
                .sum();
            black_box(hits);
        });
    });
    group.bench_function("rtree_point", |b| {
        b.iter(|| {
            let hits: usize = probes
                .iter()
                .map(|&(x, y)| rtree.query_point(x, y).count())
                .sum();
            black_box(hits);
        });
    });
    group.finish();
}

fn bench_update_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_heavy");
    let rects = gen_grid_rects(64, 10.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("rtree_move_all", |b| {
        b.iter_batched(
            || Index::<u32>::from_entries(&rects),
            |(mut idx, keys)| {
                for (k, &(r, _)) in keys.iter().zip(&rects) {
                    let moved = Aabb2D::new(r.min_x + 3.0, r.min_y + 3.0, r.max_x + 3.0, r.max_y + 3.0);
                    let _ = idx.update(*k, moved);
                }
                black_box(idx.len());
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_queries, bench_update_heavy);
criterion_main!(benches);

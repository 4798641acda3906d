// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use snapping_index::FlatVec;
use snapping_locator::{Geometry, Identity, Locator, MatchKinds, MemoryLayer};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        ((x >> 11) as f64) / ((1u64 << 53) as f64)
    }

    fn point(&mut self, scale: f64) -> Point {
        Point::new(self.next_f64() * scale, self.next_f64() * scale)
    }
}

/// A street-map-like layer: short polylines and small square parcels.
fn gen_layer(count: usize) -> MemoryLayer {
    let mut rng = Rng(0x5EED_0F_CAFE);
    (0..count)
        .map(|i| {
            let origin = rng.point(5000.0);
            if i % 2 == 0 {
                Geometry::line((0..8).map(|_| origin + rng.point(40.0).to_vec2()))
            } else {
                Geometry::rect(Rect::from_origin_size(origin, (25.0, 25.0)))
            }
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("locator_build");
    for &n in &[1_000usize, 10_000] {
        let layer = gen_layer(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("init_n{n}"), |b| {
            b.iter_batched(
                || Locator::new(&layer),
                |mut loc| {
                    let _ = loc.init(None);
                    black_box(loc.cached_geometry_count());
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("locator_queries");
    let layer = gen_layer(10_000);
    let mut rtree = Locator::new(&layer);
    let mut flat = Locator::with_backend(&layer, Identity, FlatVec::default());
    let _ = rtree.init(None);
    let _ = flat.init(None);
    let mut rng = Rng(0xDEAD_BEEF);
    let probes: Vec<Point> = (0..256).map(|_| rng.point(5000.0)).collect();
    group.throughput(Throughput::Elements(probes.len() as u64));

    group.bench_function("rtree_nearest_vertex_t10", |b| {
        b.iter(|| {
            for &p in &probes {
                black_box(rtree.nearest_vertex(p, 10.0, None));
            }
        });
    });
    group.bench_function("flatvec_nearest_vertex_t10", |b| {
        b.iter(|| {
            for &p in &probes {
                black_box(flat.nearest_vertex(p, 10.0, None));
            }
        });
    });
    group.bench_function("rtree_nearest_edge_t10", |b| {
        b.iter(|| {
            for &p in &probes {
                black_box(rtree.nearest_edge(p, 10.0, None));
            }
        });
    });
    group.bench_function("rtree_snap_all_t10", |b| {
        b.iter(|| {
            for &p in &probes {
                black_box(rtree.snap(p, 10.0, MatchKinds::ALL, None));
            }
        });
    });
    group.bench_function("rtree_edges_around_t25", |b| {
        b.iter(|| {
            for &p in &probes {
                black_box(rtree.edges_around(p, 25.0, None).len());
            }
        });
    });
    group.bench_function("rtree_point_in_polygon", |b| {
        b.iter(|| {
            for &p in &probes {
                black_box(rtree.point_in_polygon(p).len());
            }
        });
    });
    group.finish();
}

fn bench_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("locator_edits");
    let layer = gen_layer(10_000);
    group.bench_function("move_100_features", |b| {
        b.iter_batched(
            || {
                let mut loc = Locator::new(layer.clone());
                let _ = loc.init(None);
                loc
            },
            |mut loc| {
                for id in 0..100 {
                    let moved = Geometry::Point(Point::new(id as f64, -10.0));
                    if let Some(ev) = loc.source_mut().change_geometry(id, moved) {
                        loc.notify(&ev);
                    }
                }
                black_box(loc.cached_geometry_count());
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_queries, bench_edits);
criterion_main!(benches);

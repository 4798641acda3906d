// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Snapping Index: insert, update, remove, and query.

use snapping_index::{Aabb2D, Index};

fn main() {
    let mut idx: Index<u32> = Index::new();
    let k1 = idx.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), 1);
    let k2 = idx.insert(Aabb2D::new(5.0, 5.0, 15.0, 15.0), 2);

    // Move box 1
    idx.update(k1, Aabb2D::new(20.0, 0.0, 30.0, 10.0));

    // Query a point
    let hits: Vec<_> = idx.query_point(6.0, 6.0).collect();
    println!("hits at (6,6): {:?}", hits);

    // Candidates within 8 units of a cursor, closest box first
    let near: Vec<_> = idx.query_nearest(17.0, 5.0, 8.0).collect();
    println!("near (17,5): {:?}", near);

    let _ = idx.remove(k2);
    println!("entries left: {}", idx.len());
}

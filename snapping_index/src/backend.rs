// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial indexing implementations.

use core::cmp::Ordering;
use core::fmt::Debug;

use crate::types::Aabb2D;

/// Spatial backend abstraction used by `IndexGeneric`.
///
/// Backends store one box per slot. Slots are managed by the index; a backend
/// never invents or reuses them on its own.
pub trait Backend: Debug {
    /// Insert a new slot into the spatial structure.
    fn insert(&mut self, slot: usize, aabb: Aabb2D);

    /// Update an existing slot's AABB.
    fn update(&mut self, slot: usize, aabb: Aabb2D);

    /// Remove a slot from the spatial structure.
    fn remove(&mut self, slot: usize);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Replace the current contents with `items` in one pass.
    ///
    /// The default implementation clears and inserts one by one; tree backends
    /// override it with a packed bulk load.
    fn bulk_load(&mut self, items: &[(usize, Aabb2D)]) {
        self.clear();
        for &(slot, aabb) in items {
            self.insert(slot, aabb);
        }
    }

    /// Query slots whose AABB contains the point.
    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a>;

    /// Query slots whose AABB intersects the rectangle. Order is unspecified.
    fn query_rect<'a>(&'a self, rect: Aabb2D) -> Box<dyn Iterator<Item = usize> + 'a>;

    /// Query slots whose AABB lies within `max_distance` of the point.
    ///
    /// Yields `(slot, box_distance)` ordered by increasing box-to-point
    /// distance; equal distances are ordered by ascending slot.
    fn query_nearest<'a>(
        &'a self,
        x: f64,
        y: f64,
        max_distance: f64,
    ) -> Box<dyn Iterator<Item = (usize, f64)> + 'a>;
}

/// Sort `(slot, distance_sq)` candidates and convert them to plain distances.
pub(crate) fn into_distance_order(mut hits: Vec<(usize, f64)>) -> Vec<(usize, f64)> {
    hits.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    for hit in &mut hits {
        hit.1 = hit.1.sqrt();
    }
    hits
}

/// Whether a squared box distance is within `max_distance`.
#[inline]
pub(crate) fn within(distance_sq: f64, max_distance: f64) -> bool {
    max_distance >= 0.0 && distance_sq <= max_distance * max_distance
}

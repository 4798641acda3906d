// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree backend built on the `rstar` crate (R*-tree inserts, STR bulk load).

use core::fmt::Debug;

use rstar::{AABB, RTree, RTreeObject};

use crate::backend::{Backend, into_distance_order, within};
use crate::types::Aabb2D;

#[derive(Copy, Clone, Debug, PartialEq)]
struct SlotBox {
    slot: usize,
    aabb: Aabb2D,
}

impl RTreeObject for SlotBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        to_envelope(&self.aabb)
    }
}

fn to_envelope(a: &Aabb2D) -> AABB<[f64; 2]> {
    AABB::from_corners([a.min_x, a.min_y], [a.max_x, a.max_y])
}

/// R-tree backend.
///
/// Keeps a slot → box table next to the tree so removals can locate the
/// stored object by its envelope.
pub struct RStar {
    tree: RTree<SlotBox>,
    slots: Vec<Option<Aabb2D>>,
}

impl Default for RStar {
    fn default() -> Self {
        Self {
            tree: RTree::new(),
            slots: Vec::new(),
        }
    }
}

impl RStar {
    fn set_slot(&mut self, slot: usize, aabb: Option<Aabb2D>) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = aabb;
    }

    fn take_from_tree(&mut self, slot: usize) {
        if let Some(aabb) = self.slots.get(slot).copied().flatten() {
            let _ = self.tree.remove(&SlotBox { slot, aabb });
        }
    }
}

impl Backend for RStar {
    fn insert(&mut self, slot: usize, aabb: Aabb2D) {
        self.take_from_tree(slot);
        self.set_slot(slot, Some(aabb));
        self.tree.insert(SlotBox { slot, aabb });
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D) {
        if self.slots.get(slot).copied().flatten() == Some(aabb) {
            return;
        }
        self.insert(slot, aabb);
    }

    fn remove(&mut self, slot: usize) {
        self.take_from_tree(slot);
        if let Some(s) = self.slots.get_mut(slot) {
            *s = None;
        }
    }

    fn clear(&mut self) {
        self.tree = RTree::new();
        self.slots.clear();
    }

    fn bulk_load(&mut self, items: &[(usize, Aabb2D)]) {
        self.slots.clear();
        for &(slot, aabb) in items {
            self.set_slot(slot, Some(aabb));
        }
        self.tree = RTree::bulk_load(
            items
                .iter()
                .map(|&(slot, aabb)| SlotBox { slot, aabb })
                .collect(),
        );
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        self.query_rect(Aabb2D::from_point(x, y))
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D) -> Box<dyn Iterator<Item = usize> + 'a> {
        let hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&to_envelope(&rect))
            .map(|b| b.slot)
            .collect();
        Box::new(hits.into_iter())
    }

    fn query_nearest<'a>(
        &'a self,
        x: f64,
        y: f64,
        max_distance: f64,
    ) -> Box<dyn Iterator<Item = (usize, f64)> + 'a> {
        if !within(0.0, max_distance) {
            return Box::new(core::iter::empty());
        }
        let search = to_envelope(&Aabb2D::around(x, y, max_distance));
        let hits: Vec<(usize, f64)> = self
            .tree
            .locate_in_envelope_intersecting(&search)
            .map(|b| (b.slot, b.aabb.distance_sq_to_point(x, y)))
            .filter(|&(_, d2)| within(d2, max_distance))
            .collect();
        Box::new(into_distance_order(hits).into_iter())
    }
}

impl Debug for RStar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|e| e.is_some()).count();
        f.debug_struct("RStar")
            .field("tree_size", &self.tree.size())
            .field("total_slots", &total)
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

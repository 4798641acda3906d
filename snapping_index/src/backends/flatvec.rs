// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for tiny sets.

use core::fmt::Debug;

use crate::backend::{Backend, into_distance_order, within};
use crate::types::Aabb2D;

/// Flat vector backend with linear scans.
#[derive(Default)]
pub struct FlatVec {
    entries: Vec<Option<Aabb2D>>,
}

impl Debug for FlatVec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entries.len();
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &total)
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl FlatVec {
    fn live(&self) -> impl Iterator<Item = (usize, &Aabb2D)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|a| (i, a)))
    }
}

impl Backend for FlatVec {
    fn insert(&mut self, slot: usize, aabb: Aabb2D) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(aabb);
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D) {
        if let Some(e) = self.entries.get_mut(slot) {
            *e = Some(aabb);
        }
    }

    fn remove(&mut self, slot: usize) {
        if let Some(e) = self.entries.get_mut(slot) {
            *e = None;
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.live()
                .filter(move |(_, a)| a.contains_point(x, y))
                .map(|(i, _)| i),
        )
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.live()
                .filter(move |(_, a)| a.intersects(&rect))
                .map(|(i, _)| i),
        )
    }

    fn query_nearest<'a>(
        &'a self,
        x: f64,
        y: f64,
        max_distance: f64,
    ) -> Box<dyn Iterator<Item = (usize, f64)> + 'a> {
        let hits: Vec<(usize, f64)> = self
            .live()
            .map(|(i, a)| (i, a.distance_sq_to_point(x, y)))
            .filter(|&(_, d2)| within(d2, max_distance))
            .collect();
        Box::new(into_distance_order(hits).into_iter())
    }
}

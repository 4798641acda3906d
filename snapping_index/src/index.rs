// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use core::fmt::Debug;

use crate::backend::Backend;
use crate::backends::flatvec::FlatVec;
use crate::backends::rtree::RStar;
use crate::types::Aabb2D;

/// Generational handle for entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are intentionally 32-bit; higher bits are truncated by design."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Entry<P> {
    generation: u32,
    aabb: Aabb2D,
    payload: P,
}

/// A keyed AABB index parameterized by a spatial backend.
///
/// Every mutation is applied to the backend before the call returns, so the
/// live entries and the backend's boxes always describe the same set.
#[derive(Debug)]
pub struct IndexGeneric<P: Copy + Debug, B: Backend> {
    entries: Vec<Option<Entry<P>>>,
    free_list: Vec<usize>,
    // Shared by all slots so keys stay stale across `clear` and `bulk_load`.
    next_generation: u32,
    len: usize,
    backend: B,
}

impl<P, B> IndexGeneric<P, B>
where
    P: Copy + Debug,
    B: Backend + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::with_backend(B::default())
    }

    /// Build an index in bulk from `(box, payload)` pairs.
    ///
    /// Keys are handed out in input order.
    pub fn from_entries(entries: &[(Aabb2D, P)]) -> (Self, Vec<Key>) {
        let mut idx = Self::new();
        let keys = idx.bulk_load(entries);
        (idx, keys)
    }
}

impl<P: Copy + Debug, B: Backend + Default> Default for IndexGeneric<P, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, B> IndexGeneric<P, B>
where
    P: Copy + Debug,
    B: Backend,
{
    /// Create an empty index over an explicit backend.
    pub fn with_backend(mut backend: B) -> Self {
        backend.clear();
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            next_generation: 1,
            len: 0,
            backend,
        }
    }

    /// Reserve space for at least `n` entries.
    pub fn reserve(&mut self, n: usize) {
        self.entries.reserve(n);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a new AABB with payload. Returns a stable handle `Key`.
    pub fn insert(&mut self, aabb: Aabb2D, payload: P) -> Key {
        let generation = self.bump_generation();
        let idx = match self.free_list.pop() {
            Some(idx) => idx,
            None => {
                self.entries.push(None);
                self.entries.len() - 1
            }
        };
        self.entries[idx] = Some(Entry {
            generation,
            aabb,
            payload,
        });
        self.backend.insert(idx, aabb);
        self.len += 1;
        Key::new(idx, generation)
    }

    /// Replace the whole content with `entries`, loading the backend in one pass.
    ///
    /// Previously issued keys become stale.
    pub fn bulk_load(&mut self, entries: &[(Aabb2D, P)]) -> Vec<Key> {
        self.clear();
        self.entries.reserve(entries.len());
        let mut pairs = Vec::with_capacity(entries.len());
        let mut keys = Vec::with_capacity(entries.len());
        for (i, &(aabb, payload)) in entries.iter().enumerate() {
            let generation = self.bump_generation();
            self.entries.push(Some(Entry {
                generation,
                aabb,
                payload,
            }));
            pairs.push((i, aabb));
            keys.push(Key::new(i, generation));
        }
        self.backend.bulk_load(&pairs);
        self.len = entries.len();
        keys
    }

    /// Update an existing AABB. Returns false if `key` is stale.
    pub fn update(&mut self, key: Key, aabb: Aabb2D) -> bool {
        let Some(e) = self.entry_mut(key) else {
            return false;
        };
        e.aabb = aabb;
        self.backend.update(key.idx(), aabb);
        true
    }

    /// Remove an existing AABB, returning its payload if `key` was live.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        let payload = self.entry_mut(key)?.payload;
        self.entries[key.idx()] = None;
        self.free_list.push(key.idx());
        self.backend.remove(key.idx());
        self.len -= 1;
        Some(payload)
    }

    /// Look up the box and payload stored under `key`.
    pub fn get(&self, key: Key) -> Option<(Aabb2D, P)> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        (e.generation == key.1).then_some((e.aabb, e.payload))
    }

    /// Clear the index. Outstanding keys become stale.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.free_list.clear();
        self.len = 0;
        self.backend.clear();
    }

    /// Query for entries whose AABB contains the point.
    pub fn query_point(&self, x: f64, y: f64) -> impl Iterator<Item = (Key, P)> + '_ {
        self.backend
            .query_point(x, y)
            .filter_map(move |i| self.live(i))
    }

    /// Query for entries whose AABB intersects the given rectangle.
    pub fn query_rect(&self, rect: Aabb2D) -> impl Iterator<Item = (Key, P)> + '_ {
        self.backend
            .query_rect(rect)
            .filter_map(move |i| self.live(i))
    }

    /// Query for entries whose AABB lies within `max_distance` of the point.
    ///
    /// Items come in increasing box distance, which is a lower bound on the
    /// distance to anything inside the box. Callers refining candidates can
    /// stop as soon as that bound exceeds their best exact distance.
    pub fn query_nearest(
        &self,
        x: f64,
        y: f64,
        max_distance: f64,
    ) -> impl Iterator<Item = (Key, P, f64)> + '_ {
        self.backend
            .query_nearest(x, y, max_distance)
            .filter_map(move |(i, d)| self.live(i).map(|(k, p)| (k, p, d)))
    }

    fn bump_generation(&mut self) -> u32 {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1).max(1);
        generation
    }

    fn live(&self, i: usize) -> Option<(Key, P)> {
        let e = self.entries.get(i)?.as_ref()?;
        Some((Key::new(i, e.generation), e.payload))
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut Entry<P>> {
        let e = self.entries.get_mut(key.idx())?.as_mut()?;
        if e.generation != key.1 {
            return None;
        }
        Some(e)
    }
}

/// Default index, backed by an R-tree.
pub type Index<P> = IndexGeneric<P, RStar>;

/// Index using linear scans; handy for tiny sets and as a test oracle.
pub type FlatIndex<P> = IndexGeneric<P, FlatVec>;

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry cache: per-feature working-coordinate geometry plus its box in the
//! bounding-box index.

use std::collections::BTreeMap;

use snapping_index::{Aabb2D, Backend, IndexGeneric, Key};

use crate::config::rect_to_aabb;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::transform::Transform;
use crate::types::FeatureId;

/// A geometry ready to be cached: transformed, rings closed, box computed.
#[derive(Clone, Debug)]
pub(crate) struct Prepared {
    pub(crate) geometry: Geometry,
    pub(crate) bbox: Aabb2D,
}

/// Transform a native geometry into working coordinates.
///
/// Returns `Ok(None)` for geometries without vertices.
pub(crate) fn prepare<X: Transform + ?Sized>(
    geometry: &Geometry,
    transform: &X,
) -> Result<Option<Prepared>> {
    if geometry.is_empty() {
        return Ok(None);
    }
    let mut geometry = geometry.try_map_points(|p| transform.transform(p))?;
    geometry.close_rings();
    Ok(geometry.bounding_box().map(|r| Prepared {
        bbox: rect_to_aabb(r),
        geometry,
    }))
}

#[derive(Debug)]
struct CachedGeometry {
    geometry: Geometry,
    key: Key,
}

/// Owns the cached geometries and keeps the box index in step with them.
///
/// Every method leaves the two structures describing the same feature set.
#[derive(Debug)]
pub(crate) struct SpatialCache<B: Backend> {
    geoms: BTreeMap<FeatureId, CachedGeometry>,
    index: IndexGeneric<FeatureId, B>,
}

impl<B: Backend> SpatialCache<B> {
    pub(crate) fn with_backend(backend: B) -> Self {
        Self {
            geoms: BTreeMap::new(),
            index: IndexGeneric::with_backend(backend),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.geoms.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.geoms.is_empty()
    }

    pub(crate) fn geometry(&self, id: FeatureId) -> Option<&Geometry> {
        self.geoms.get(&id).map(|c| &c.geometry)
    }

    pub(crate) fn index(&self) -> &IndexGeneric<FeatureId, B> {
        &self.index
    }

    /// Replace the whole content. Later duplicates of an id win.
    pub(crate) fn load(&mut self, features: Vec<(FeatureId, Prepared)>) {
        let mut by_id: BTreeMap<FeatureId, Prepared> = BTreeMap::new();
        by_id.extend(features);
        let boxes: Vec<_> = by_id.iter().map(|(&id, p)| (p.bbox, id)).collect();
        let keys = self.index.bulk_load(&boxes);
        self.geoms = by_id
            .into_iter()
            .zip(keys)
            .map(|((id, p), key)| {
                (
                    id,
                    CachedGeometry {
                        geometry: p.geometry,
                        key,
                    },
                )
            })
            .collect();
    }

    /// Insert a feature, or replace its geometry and box if already cached.
    pub(crate) fn upsert(&mut self, id: FeatureId, prepared: Prepared) {
        if let Some(cached) = self.geoms.get_mut(&id)
            && self.index.update(cached.key, prepared.bbox)
        {
            cached.geometry = prepared.geometry;
            return;
        }
        let key = self.index.insert(prepared.bbox, id);
        let stale = self.geoms.insert(
            id,
            CachedGeometry {
                geometry: prepared.geometry,
                key,
            },
        );
        if let Some(stale) = stale {
            let _ = self.index.remove(stale.key);
        }
    }

    /// Drop a feature. Returns false if it was not cached.
    pub(crate) fn remove(&mut self, id: FeatureId) -> bool {
        let Some(cached) = self.geoms.remove(&id) else {
            return false;
        };
        let _ = self.index.remove(cached.key);
        true
    }

    pub(crate) fn clear(&mut self) {
        self.geoms.clear();
        self.index.clear();
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.geoms.len(), self.index.len());
        for (&id, cached) in &self.geoms {
            let (bbox, payload) = self.index.get(cached.key).expect("live key");
            assert_eq!(payload, id);
            let expected = cached.geometry.bounding_box().map(rect_to_aabb);
            assert_eq!(Some(bbox), expected);
        }
    }
}

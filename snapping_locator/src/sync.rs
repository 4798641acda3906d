// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keeping the index in step with edits to the layer.
//!
//! Each handler either applies its edit to the cache completely or, if the
//! edit cannot be applied, discards the index so the next query rebuilds it.

use snapping_index::Backend;

use crate::cache::prepare;
use crate::geometry::Geometry;
use crate::locator::{Locator, State};
use crate::source::{FeatureEvent, FeatureSource};
use crate::transform::Transform;
use crate::types::FeatureId;

impl<S, X, B> Locator<S, X, B>
where
    S: FeatureSource,
    X: Transform,
    B: Backend,
{
    /// Apply one edit event from the layer.
    pub fn notify(&mut self, event: &FeatureEvent) {
        match event {
            FeatureEvent::Added(id) => self.on_feature_added(*id),
            FeatureEvent::Deleted(id) => self.on_feature_deleted(*id),
            FeatureEvent::GeometryChanged(id, geometry) => self.on_geometry_changed(*id, geometry),
        }
    }

    /// A feature was added to the layer; its geometry is read from the source.
    pub fn on_feature_added(&mut self, id: FeatureId) {
        tracing::trace!(feature = id, state = ?self.state, "feature added");
        match self.state {
            State::Built => match self.source.geometry(id) {
                Some(geometry) => self.apply(id, &geometry),
                None => tracing::trace!(feature = id, "added feature has no geometry"),
            },
            State::EmptyDataset => self.state = State::Uninitialized,
            State::Uninitialized | State::Failed => {}
        }
    }

    /// A feature was deleted from the layer.
    pub fn on_feature_deleted(&mut self, id: FeatureId) {
        tracing::trace!(feature = id, state = ?self.state, "feature deleted");
        if self.state == State::Built && self.cache.remove(id) {
            self.settle();
        }
    }

    /// A feature's geometry was replaced; `geometry` is in layer coordinates.
    pub fn on_geometry_changed(&mut self, id: FeatureId, geometry: &Geometry) {
        tracing::trace!(feature = id, state = ?self.state, "feature geometry changed");
        match self.state {
            State::Built => self.apply(id, geometry),
            State::EmptyDataset => self.state = State::Uninitialized,
            State::Uninitialized | State::Failed => {}
        }
    }

    /// Insert, replace, or drop one feature's cached geometry.
    fn apply(&mut self, id: FeatureId, geometry: &Geometry) {
        match prepare(geometry, &self.transform) {
            Ok(Some(prepared)) if self.config.admits(&prepared.bbox) => {
                self.cache.upsert(id, prepared);
            }
            Ok(_) => {
                if self.cache.remove(id) {
                    self.settle();
                }
            }
            Err(err) => {
                tracing::warn!(feature = id, error = %err, "cannot update locator index; discarding it");
                self.invalidate();
            }
        }
    }

    /// Record that the last indexed feature is gone.
    fn settle(&mut self) {
        if self.cache.is_empty() {
            self.state = State::EmptyDataset;
        }
    }
}

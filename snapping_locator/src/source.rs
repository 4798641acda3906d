// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer being indexed: feature enumeration, lookup, and edit events.

use std::collections::BTreeMap;

use crate::geometry::Geometry;
use crate::types::FeatureId;

/// Read access to the features of one vector layer, in its native coordinates.
pub trait FeatureSource {
    /// Every feature that has a geometry.
    fn features(&self) -> Box<dyn Iterator<Item = (FeatureId, Geometry)> + '_>;

    /// The current geometry of one feature, if it exists and has one.
    fn geometry(&self, id: FeatureId) -> Option<Geometry>;
}

impl<T: FeatureSource + ?Sized> FeatureSource for &T {
    fn features(&self) -> Box<dyn Iterator<Item = (FeatureId, Geometry)> + '_> {
        (**self).features()
    }

    fn geometry(&self, id: FeatureId) -> Option<Geometry> {
        (**self).geometry(id)
    }
}

/// An edit notification from the layer.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureEvent {
    /// A feature was added; fetch its geometry from the source.
    Added(FeatureId),
    /// A feature was deleted.
    Deleted(FeatureId),
    /// A feature's geometry was replaced, in native coordinates.
    GeometryChanged(FeatureId, Geometry),
}

impl FeatureEvent {
    /// The feature the event is about.
    pub fn feature_id(&self) -> FeatureId {
        match self {
            Self::Added(id) | Self::Deleted(id) | Self::GeometryChanged(id, _) => *id,
        }
    }
}

/// An in-memory layer whose edit methods report the matching [`FeatureEvent`].
///
/// Features may lack a geometry; those are skipped by [`FeatureSource::features`].
#[derive(Clone, Debug, Default)]
pub struct MemoryLayer {
    features: BTreeMap<FeatureId, Option<Geometry>>,
    next_id: FeatureId,
}

impl MemoryLayer {
    /// An empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of features, with or without geometry.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True if the layer has no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Add a feature under the next free id.
    pub fn add_feature(&mut self, geometry: impl Into<Option<Geometry>>) -> FeatureEvent {
        let id = self.next_id;
        self.insert_feature(id, geometry)
    }

    /// Add (or replace) a feature under an explicit id.
    pub fn insert_feature(
        &mut self,
        id: FeatureId,
        geometry: impl Into<Option<Geometry>>,
    ) -> FeatureEvent {
        self.features.insert(id, geometry.into());
        self.next_id = self.next_id.max(id + 1);
        FeatureEvent::Added(id)
    }

    /// Delete a feature. Returns `None` if it did not exist.
    pub fn delete_feature(&mut self, id: FeatureId) -> Option<FeatureEvent> {
        self.features.remove(&id)?;
        Some(FeatureEvent::Deleted(id))
    }

    /// Replace a feature's geometry. Returns `None` if it did not exist.
    pub fn change_geometry(&mut self, id: FeatureId, geometry: Geometry) -> Option<FeatureEvent> {
        let slot = self.features.get_mut(&id)?;
        *slot = Some(geometry.clone());
        Some(FeatureEvent::GeometryChanged(id, geometry))
    }
}

impl FromIterator<Geometry> for MemoryLayer {
    fn from_iter<I: IntoIterator<Item = Geometry>>(iter: I) -> Self {
        let mut layer = Self::new();
        for g in iter {
            let _ = layer.add_feature(g);
        }
        layer
    }
}

impl FeatureSource for MemoryLayer {
    fn features(&self) -> Box<dyn Iterator<Item = (FeatureId, Geometry)> + '_> {
        Box::new(
            self.features
                .iter()
                .filter_map(|(id, g)| g.clone().map(|g| (*id, g))),
        )
    }

    fn geometry(&self, id: FeatureId) -> Option<Geometry> {
        self.features.get(&id).cloned().flatten()
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Locator configuration.

use kurbo::Rect;
use snapping_index::Aabb2D;

/// What a [`Locator`](crate::Locator) indexes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocatorConfig {
    /// Only features whose bounding box intersects this rectangle (in working
    /// coordinates) are indexed. `None` indexes the whole layer.
    pub extent: Option<Rect>,
    /// Abort a build once more than this many features qualify. `None` is unlimited.
    ///
    /// Used by builds that the locator starts on its own (lazily, on first
    /// query); [`Locator::init`](crate::Locator::init) overrides it.
    pub max_features_to_index: Option<usize>,
}

impl LocatorConfig {
    /// Restrict indexing to `extent`.
    pub fn with_extent(mut self, extent: Rect) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Cap the number of indexed features.
    pub fn with_max_features(mut self, max: usize) -> Self {
        self.max_features_to_index = Some(max);
        self
    }

    /// Whether a feature with bounding box `bbox` belongs in the index.
    pub(crate) fn admits(&self, bbox: &Aabb2D) -> bool {
        self.extent
            .is_none_or(|extent| rect_to_aabb(extent.abs()).intersects(bbox))
    }
}

pub(crate) fn rect_to_aabb(r: Rect) -> Aabb2D {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The locator: lazy index building and the public query surface.

use kurbo::{Point, Rect};
use snapping_index::{Backend, RStar};

use crate::cache::{Prepared, SpatialCache, prepare};
use crate::config::LocatorConfig;
use crate::error::{LocatorError, Result};
use crate::source::FeatureSource;
use crate::transform::{Identity, Transform};
use crate::types::{FeatureId, Match, MatchFilter, MatchKinds};

/// Where the index stands.
///
/// The cache is empty in every state but `Built`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum State {
    /// Nothing built yet, or torn down. The next query builds.
    Uninitialized,
    /// The last build found nothing to index. Queries answer without building.
    EmptyDataset,
    /// The cache mirrors the layer.
    Built,
    /// The last build aborted. Only an explicit `init`/`build` retries.
    Failed,
}

/// Point locator over one vector layer.
///
/// Caches the layer's geometry in working coordinates together with an index
/// of per-feature bounding boxes, and answers snapping queries against them.
/// The index is built on first use; feed the layer's edit events to
/// [`Locator::notify`] to keep it current.
///
/// Queries take `&mut self` because they may build the index. Query points and
/// rectangles are in working coordinates; tolerances are in working units.
#[derive(Debug)]
pub struct Locator<S, X = Identity, B: Backend = RStar> {
    pub(crate) source: S,
    pub(crate) transform: X,
    pub(crate) config: LocatorConfig,
    pub(crate) state: State,
    pub(crate) cache: SpatialCache<B>,
}

impl<S: FeatureSource> Locator<S> {
    /// A locator over `source`, whose coordinates are already working coordinates.
    pub fn new(source: S) -> Self {
        Self::with_transform(source, Identity)
    }
}

impl<S: FeatureSource, X: Transform> Locator<S, X> {
    /// A locator that maps the layer's geometry through `transform`.
    pub fn with_transform(source: S, transform: X) -> Self {
        Self::with_backend(source, transform, RStar::default())
    }
}

impl<S, X, B> Locator<S, X, B>
where
    S: FeatureSource,
    X: Transform,
    B: Backend,
{
    /// A locator over an explicit bounding-box backend.
    pub fn with_backend(source: S, transform: X, backend: B) -> Self {
        Self {
            source,
            transform,
            config: LocatorConfig::default(),
            state: State::Uninitialized,
            cache: SpatialCache::with_backend(backend),
        }
    }

    /// Replace the configuration. Any built index is discarded.
    pub fn with_config(mut self, config: LocatorConfig) -> Self {
        self.config = config;
        self.invalidate();
        self
    }

    /// Build the index unless it is already built.
    ///
    /// Returns `Ok(false)` iff the build stopped because more than
    /// `max_features_to_index` features qualified; the locator then has no
    /// index and queries find nothing until the next `init`. The cap is kept
    /// for builds the locator starts on its own.
    pub fn init(&mut self, max_features_to_index: Option<usize>) -> Result<bool> {
        match self.build(max_features_to_index) {
            Ok(()) => Ok(true),
            Err(LocatorError::CapacityExceeded { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Like [`Locator::init`], but reports a capacity abort as an error.
    pub fn build(&mut self, max_features_to_index: Option<usize>) -> Result<()> {
        self.config.max_features_to_index = max_features_to_index;
        match self.state {
            State::Built | State::EmptyDataset => Ok(()),
            State::Uninitialized | State::Failed => self.rebuild(),
        }
    }

    fn rebuild(&mut self) -> Result<()> {
        self.cache.clear();
        let max = self.config.max_features_to_index;
        tracing::debug!(extent = ?self.config.extent, max_features = ?max, "building locator index");
        let prepared = match collect(&self.source, &self.transform, &self.config) {
            Ok(prepared) => prepared,
            Err(err) => {
                self.state = State::Failed;
                tracing::warn!(error = %err, "locator index build aborted");
                return Err(err);
            }
        };
        if prepared.is_empty() {
            self.state = State::EmptyDataset;
            tracing::debug!("no features to index");
            return Ok(());
        }
        let count = prepared.len();
        self.cache.load(prepared);
        self.state = State::Built;
        tracing::debug!(features = count, "locator index built");
        Ok(())
    }

    /// Make sure the index can answer a query, building it if needed.
    fn ready(&mut self) -> bool {
        if self.state == State::Uninitialized
            && let Err(err) = self.rebuild()
        {
            tracing::warn!(error = %err, "lazy index build failed; query finds nothing");
        }
        self.state == State::Built
    }

    /// Drop the cache and forget the build; the next query rebuilds.
    pub(crate) fn invalidate(&mut self) {
        self.cache.clear();
        self.state = State::Uninitialized;
    }

    /// Tear the index down. The next query (or `init`) rebuilds it.
    pub fn destroy_index(&mut self) {
        tracing::debug!(features = self.cache.len(), "destroying locator index");
        self.invalidate();
    }

    /// True once a build has succeeded and found features to index.
    pub fn has_index(&self) -> bool {
        self.state == State::Built
    }

    /// True if the last build found no features to index.
    pub fn is_empty_dataset(&self) -> bool {
        self.state == State::EmptyDataset
    }

    /// Number of cached geometries.
    pub fn cached_geometry_count(&self) -> usize {
        self.cache.len()
    }

    /// The indexing extent, if any.
    pub fn extent(&self) -> Option<Rect> {
        self.config.extent
    }

    /// Restrict indexing to `extent` (or lift the restriction with `None`).
    ///
    /// Discards the index; it is rebuilt on next use.
    pub fn set_extent(&mut self, extent: Option<Rect>) {
        self.config.extent = extent;
        self.invalidate();
    }

    /// Current configuration.
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// The indexed layer.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the indexed layer.
    ///
    /// Edits made through this reference must be reported with
    /// [`Locator::notify`] before the next query.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// The transform into working coordinates.
    pub fn transform(&self) -> &X {
        &self.transform
    }

    /// Nearest vertex within `tolerance`, or an invalid match.
    pub fn nearest_vertex(
        &mut self,
        point: Point,
        tolerance: f64,
        filter: Option<&dyn MatchFilter>,
    ) -> Match {
        if !self.ready() {
            return Match::invalid();
        }
        self.cache.nearest_vertex(point, tolerance, filter)
    }

    /// Nearest point on an edge within `tolerance`, or an invalid match.
    pub fn nearest_edge(
        &mut self,
        point: Point,
        tolerance: f64,
        filter: Option<&dyn MatchFilter>,
    ) -> Match {
        if !self.ready() {
            return Match::invalid();
        }
        self.cache.nearest_edge(point, tolerance, filter)
    }

    /// A polygon containing `point`, or failing that the nearest edge within
    /// `tolerance` (when positive).
    ///
    /// Check [`Match::kind`]: an area match means inside, an edge match means
    /// near a boundary. With overlapping polygons, which one is returned
    /// depends on index traversal order; it is stable until the index changes.
    pub fn nearest_area(
        &mut self,
        point: Point,
        tolerance: f64,
        filter: Option<&dyn MatchFilter>,
    ) -> Match {
        if !self.ready() {
            return Match::invalid();
        }
        self.cache.nearest_area(point, tolerance, filter)
    }

    /// Every edge intersecting `rect`.
    ///
    /// Each match carries distance zero and the midpoint of the part of the
    /// edge inside `rect`.
    pub fn edges_in_rect(&mut self, rect: Rect, filter: Option<&dyn MatchFilter>) -> Vec<Match> {
        if !self.ready() {
            return Vec::new();
        }
        self.cache.edges_in_rect(rect, filter)
    }

    /// Every edge intersecting the square of side `2 * tolerance` centered on `point`.
    pub fn edges_around(
        &mut self,
        point: Point,
        tolerance: f64,
        filter: Option<&dyn MatchFilter>,
    ) -> Vec<Match> {
        let rect = Rect::new(
            point.x - tolerance,
            point.y - tolerance,
            point.x + tolerance,
            point.y + tolerance,
        );
        self.edges_in_rect(rect, filter)
    }

    /// Every polygon containing `point`, as area matches.
    pub fn point_in_polygon(&mut self, point: Point) -> Vec<Match> {
        if !self.ready() {
            return Vec::new();
        }
        self.cache.point_in_polygon(point)
    }

    /// Snap `point` to the first kind in `kinds` that matches, trying
    /// vertices, then edges, then areas.
    ///
    /// Area snapping only considers containment; `tolerance` applies to
    /// vertices and edges.
    pub fn snap(
        &mut self,
        point: Point,
        tolerance: f64,
        kinds: MatchKinds,
        filter: Option<&dyn MatchFilter>,
    ) -> Match {
        if kinds.contains(MatchKinds::VERTEX) {
            let m = self.nearest_vertex(point, tolerance, filter);
            if m.is_valid() {
                return m;
            }
        }
        if kinds.contains(MatchKinds::EDGE) {
            let m = self.nearest_edge(point, tolerance, filter);
            if m.is_valid() {
                return m;
            }
        }
        if kinds.contains(MatchKinds::AREA) {
            return self.nearest_area(point, 0.0, filter);
        }
        Match::invalid()
    }
}

/// Read, transform, and extent-filter every feature of the layer.
fn collect<S, X>(
    source: &S,
    transform: &X,
    config: &LocatorConfig,
) -> Result<Vec<(FeatureId, Prepared)>>
where
    S: FeatureSource + ?Sized,
    X: Transform + ?Sized,
{
    let mut out = Vec::new();
    for (id, geometry) in source.features() {
        let Some(prepared) = prepare(&geometry, transform)? else {
            continue;
        };
        if !config.admits(&prepared.bbox) {
            continue;
        }
        if let Some(limit) = config.max_features_to_index
            && out.len() >= limit
        {
            return Err(LocatorError::CapacityExceeded { limit });
        }
        out.push((id, prepared));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::source::MemoryLayer;
    use crate::transform::FnTransform;
    use crate::types::MatchKind;
    use kurbo::{Affine, Vec2};
    use snapping_index::FlatVec;

    fn one_line() -> Locator<MemoryLayer> {
        let layer: MemoryLayer = [Geometry::line([(0.0, 0.0), (10.0, 0.0)])]
            .into_iter()
            .collect();
        Locator::new(layer)
    }

    fn points(n: usize) -> MemoryLayer {
        (0..n)
            .map(|i| Geometry::Point(Point::new(i as f64 * 10.0, 0.0)))
            .collect()
    }

    #[test]
    fn single_line_scenario() {
        let mut loc = one_line();
        let m = loc.nearest_vertex(Point::new(0.5, 0.0), 1.0, None);
        assert!(loc.has_index(), "the first query builds");
        assert_eq!(m.kind(), MatchKind::Vertex);
        assert_eq!(m.feature_id(), Some(0));
        assert_eq!(m.point(), Point::new(0.0, 0.0));
        assert_eq!(m.distance(), 0.5);

        assert!(!loc.nearest_vertex(Point::new(0.5, 0.0), 0.1, None).is_valid());

        let e = loc.nearest_edge(Point::new(5.0, 1.0), 2.0, None);
        assert!(e.has_edge());
        assert_eq!(e.point(), Point::new(5.0, 0.0));
        assert_eq!(e.distance(), 1.0);
        assert_eq!(
            e.edge_points(),
            Some((Point::new(0.0, 0.0), Point::new(10.0, 0.0)))
        );
    }

    #[test]
    fn capacity_abort_leaves_no_index() {
        let mut loc = Locator::new(points(10));
        assert_eq!(loc.init(Some(5)), Ok(false));
        assert!(!loc.has_index());
        assert_eq!(loc.cached_geometry_count(), 0);
        assert_eq!(
            loc.build(Some(5)),
            Err(LocatorError::CapacityExceeded { limit: 5 })
        );
        assert!(
            !loc.nearest_vertex(Point::ZERO, 1.0, None).is_valid(),
            "queries degrade instead of rebuilding"
        );
        assert_eq!(loc.cached_geometry_count(), 0);

        assert_eq!(loc.init(Some(10)), Ok(true), "exactly at the cap is fine");
        assert_eq!(loc.cached_geometry_count(), 10);
    }

    #[test]
    fn failing_init_repeats_its_answer() {
        let mut loc = Locator::new(points(10));
        assert_eq!(loc.init(Some(5)), Ok(false));
        assert_eq!(loc.init(Some(5)), Ok(false));
        assert!(!loc.has_index());
        assert_eq!(loc.cached_geometry_count(), 0);
    }

    #[test]
    fn init_is_idempotent() {
        let mut loc = Locator::new(points(3));
        assert_eq!(loc.init(None), Ok(true));
        let before = loc.nearest_vertex(Point::new(11.0, 0.0), 5.0, None);
        assert_eq!(loc.init(None), Ok(true));
        assert_eq!(loc.cached_geometry_count(), 3);
        assert_eq!(loc.nearest_vertex(Point::new(11.0, 0.0), 5.0, None), before);
        loc.cache.assert_consistent();
    }

    #[test]
    fn empty_layer_is_success_without_index() {
        let mut loc = Locator::new(MemoryLayer::new());
        assert_eq!(loc.init(Some(0)), Ok(true));
        assert!(loc.is_empty_dataset());
        assert!(!loc.has_index());
        assert!(loc.point_in_polygon(Point::ZERO).is_empty());
        assert!(loc.is_empty_dataset(), "queries do not rebuild an empty layer");
    }

    #[test]
    fn extent_limits_indexed_features() {
        let mut loc = Locator::new(points(10))
            .with_config(LocatorConfig::default().with_extent(Rect::new(15.0, -1.0, 40.0, 1.0)));
        assert_eq!(loc.init(None), Ok(true));
        assert_eq!(loc.cached_geometry_count(), 3, "x = 20, 30, 40");
        assert!(!loc.nearest_vertex(Point::ZERO, 1.0, None).is_valid());

        loc.set_extent(None);
        assert!(!loc.has_index());
        assert!(loc.nearest_vertex(Point::ZERO, 1.0, None).is_valid());
        assert_eq!(loc.cached_geometry_count(), 10);
    }

    #[test]
    fn cap_counts_only_features_in_extent() {
        let mut loc = Locator::new(points(10))
            .with_config(LocatorConfig::default().with_extent(Rect::new(0.0, -1.0, 20.0, 1.0)));
        assert_eq!(loc.init(Some(3)), Ok(true));
        assert_eq!(loc.cached_geometry_count(), 3);
    }

    #[test]
    fn transform_applies_to_geometry_only() {
        let layer: MemoryLayer = [Geometry::Point(Point::new(1.0, 1.0))].into_iter().collect();
        let mut loc = Locator::with_transform(layer, Affine::translate(Vec2::new(100.0, 0.0)));
        let m = loc.nearest_vertex(Point::new(101.0, 1.0), 0.5, None);
        assert_eq!(m.point(), Point::new(101.0, 1.0));
        assert!(!loc.nearest_vertex(Point::new(1.0, 1.0), 0.5, None).is_valid());
    }

    #[test]
    fn undefined_transform_fails_the_whole_build() {
        let layer: MemoryLayer = [
            Geometry::Point(Point::new(1.0, 1.0)),
            Geometry::Point(Point::new(-1.0, 1.0)),
        ]
        .into_iter()
        .collect();
        let t = FnTransform(|p: Point| (p.x >= 0.0).then_some(p));
        let mut loc = Locator::with_transform(layer, t);
        assert_eq!(
            loc.init(None),
            Err(LocatorError::ReprojectionUndefined { x: -1.0, y: 1.0 })
        );
        assert!(!loc.has_index());
        assert_eq!(loc.cached_geometry_count(), 0);
    }

    #[test]
    fn destroy_then_query_rebuilds() {
        let mut loc = one_line();
        assert_eq!(loc.init(None), Ok(true));
        loc.destroy_index();
        assert!(!loc.has_index());
        assert_eq!(loc.cached_geometry_count(), 0);
        assert!(loc.nearest_edge(Point::new(3.0, 0.5), 1.0, None).is_valid());
        assert!(loc.has_index());
    }

    #[test]
    fn snap_prefers_vertices_then_edges_then_areas() {
        let layer: MemoryLayer = [Geometry::rect(Rect::new(0.0, 0.0, 10.0, 10.0))]
            .into_iter()
            .collect();
        let mut loc = Locator::with_backend(layer, Identity, FlatVec::default());
        let p = Point::new(0.5, 0.5);
        assert!(loc.snap(p, 1.0, MatchKinds::ALL, None).has_vertex());
        assert!(loc.snap(p, 1.0, MatchKinds::EDGE | MatchKinds::AREA, None).has_edge());
        assert!(loc.snap(p, 0.1, MatchKinds::ALL, None).has_area());
        assert!(!loc.snap(p, 1.0, MatchKinds::empty(), None).is_valid());
        assert!(!loc.snap(Point::new(20.0, 0.0), 1.0, MatchKinds::ALL, None).is_valid());
    }

    #[test]
    fn edges_around_uses_a_square() {
        let mut loc = one_line();
        assert_eq!(loc.edges_around(Point::new(5.0, 1.0), 1.0, None).len(), 1);
        assert!(loc.edges_around(Point::new(5.0, 1.5), 1.0, None).is_empty());
        let m = &loc.edges_around(Point::new(5.0, 1.0), 1.0, None)[0];
        assert_eq!(m.point(), Point::new(5.0, 0.0));
    }
}

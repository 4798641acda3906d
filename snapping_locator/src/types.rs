// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for query results: match kinds, matches, and match filters.

use kurbo::{Line, Point};

/// Identifier of a feature in the indexed layer.
pub type FeatureId = i64;

/// What a [`Match`] snapped to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Nothing matched; every other field of the match is meaningless.
    #[default]
    Invalid,
    /// A vertex of a geometry.
    Vertex,
    /// A point on an edge (segment) of a geometry.
    Edge,
    /// The inside of a polygon.
    Area,
}

impl MatchKind {
    /// The flag corresponding to this kind. Empty for [`MatchKind::Invalid`].
    pub const fn flag(self) -> MatchKinds {
        match self {
            Self::Invalid => MatchKinds::empty(),
            Self::Vertex => MatchKinds::VERTEX,
            Self::Edge => MatchKinds::EDGE,
            Self::Area => MatchKinds::AREA,
        }
    }
}

bitflags::bitflags! {
    /// A set of match kinds, used to say which kinds a snap request accepts.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MatchKinds: u8 {
        /// Vertices.
        const VERTEX = 0b0000_0001;
        /// Edges.
        const EDGE   = 0b0000_0010;
        /// Areas.
        const AREA   = 0b0000_0100;
        /// Vertices, edges, and areas.
        const ALL    = Self::VERTEX.bits() | Self::EDGE.bits() | Self::AREA.bits();
    }
}

impl Default for MatchKinds {
    fn default() -> Self {
        Self::ALL
    }
}

/// Result of a locator query.
///
/// A match owns copies of every coordinate it reports, so it stays valid after
/// the locator's cache changes.
///
/// Equality compares every field, including the kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Match {
    kind: MatchKind,
    distance: f64,
    point: Point,
    feature_id: Option<FeatureId>,
    vertex_index: usize,
    edge: Option<Line>,
}

impl Match {
    /// An invalid match: the "nothing found" result.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// A vertex match.
    pub fn vertex(feature_id: FeatureId, distance: f64, point: Point, vertex_index: usize) -> Self {
        Self {
            kind: MatchKind::Vertex,
            distance,
            point,
            feature_id: Some(feature_id),
            vertex_index,
            edge: None,
        }
    }

    /// An edge match at `point` on `edge`, whose first vertex is `vertex_index`.
    pub fn edge(
        feature_id: FeatureId,
        distance: f64,
        point: Point,
        vertex_index: usize,
        edge: Line,
    ) -> Self {
        Self {
            kind: MatchKind::Edge,
            distance,
            point,
            feature_id: Some(feature_id),
            vertex_index,
            edge: Some(edge),
        }
    }

    /// An area match: `point` lies inside the polygon of `feature_id`.
    pub fn area(feature_id: FeatureId, point: Point) -> Self {
        Self {
            kind: MatchKind::Area,
            distance: 0.0,
            point,
            feature_id: Some(feature_id),
            vertex_index: 0,
            edge: None,
        }
    }

    /// Drop the owning feature, for matches synthesized from several features.
    pub fn without_feature(mut self) -> Self {
        self.feature_id = None;
        self
    }

    /// The kind of match.
    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    /// True unless this is the "nothing found" result.
    pub fn is_valid(&self) -> bool {
        self.kind != MatchKind::Invalid
    }

    /// True for a vertex match.
    pub fn has_vertex(&self) -> bool {
        self.kind == MatchKind::Vertex
    }

    /// True for an edge match.
    pub fn has_edge(&self) -> bool {
        self.kind == MatchKind::Edge
    }

    /// True for an area match.
    pub fn has_area(&self) -> bool {
        self.kind == MatchKind::Area
    }

    /// Planar distance from the query point, in working units.
    ///
    /// Meaningful for vertex and edge matches; zero for areas.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// The matched location: the vertex, the closest point on the edge, or the
    /// query point for an area.
    pub fn point(&self) -> Point {
        self.point
    }

    /// The feature the match belongs to, if any.
    pub fn feature_id(&self) -> Option<FeatureId> {
        self.feature_id
    }

    /// Index of the matched vertex, or of the first vertex of the matched edge.
    pub fn vertex_index(&self) -> usize {
        self.vertex_index
    }

    /// Endpoints of the matched edge in traversal order. `None` unless this is an edge match.
    pub fn edge_points(&self) -> Option<(Point, Point)> {
        self.edge.map(|l| (l.p0, l.p1))
    }
}

/// Rejects unwanted matches during a query.
///
/// A filter sees every candidate before it can become the result. Filters must
/// be pure; they have no way to report a failure mid-search.
///
/// Any `Fn(&Match) -> bool` is a filter:
///
/// ```
/// use snapping_locator::{Match, MatchFilter};
///
/// let not_seven = |m: &Match| m.feature_id() != Some(7);
/// assert!(!not_seven.accept_match(&Match::area(7, kurbo::Point::ZERO)));
/// ```
pub trait MatchFilter {
    /// Whether `m` may be returned.
    fn accept_match(&self, m: &Match) -> bool;
}

impl<F> MatchFilter for F
where
    F: Fn(&Match) -> bool,
{
    fn accept_match(&self, m: &Match) -> bool {
        self(m)
    }
}

#[inline]
pub(crate) fn accepts(filter: Option<&dyn MatchFilter>, m: &Match) -> bool {
    filter.is_none_or(|f| f.accept_match(m))
}

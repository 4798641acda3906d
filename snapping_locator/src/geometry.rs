// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feature geometry and the planar primitives the queries refine with.
//!
//! Vertices are numbered across the whole geometry in storage order: parts in
//! order, and within a polygon the exterior ring before the interior rings.
//! Edges are numbered by their first vertex. Rings are expected to be closed
//! (last point equal to the first); [`Geometry::close_rings`] fixes up open ones.

use kurbo::{Line, ParamCurve, ParamCurveNearest, Point, Rect};

/// A polygon: one exterior ring and any number of holes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    /// Outer boundary.
    pub exterior: Vec<Point>,
    /// Holes.
    pub interiors: Vec<Vec<Point>>,
}

impl Polygon {
    /// A polygon without holes.
    pub fn new(exterior: Vec<Point>) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
        }
    }

    /// Add a hole.
    pub fn with_hole(mut self, ring: Vec<Point>) -> Self {
        self.interiors.push(ring);
        self
    }

    fn rings(&self) -> impl Iterator<Item = &[Point]> {
        core::iter::once(self.exterior.as_slice()).chain(self.interiors.iter().map(Vec::as_slice))
    }

    /// Whether `p` lies inside the polygon or on its boundary.
    ///
    /// Uses even-odd crossings over all rings, so holes exclude their interior.
    pub fn contains_point(&self, p: Point) -> bool {
        let mut inside = false;
        for ring in self.rings() {
            for seg in ring_segments(ring) {
                if on_segment(seg, p) {
                    return true;
                }
                if crosses_ray(seg, p) {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// Geometry of one feature.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A single point.
    Point(Point),
    /// Several points.
    MultiPoint(Vec<Point>),
    /// A polyline.
    LineString(Vec<Point>),
    /// Several polylines.
    MultiLineString(Vec<Vec<Point>>),
    /// A polygon.
    Polygon(Polygon),
    /// Several polygons.
    MultiPolygon(Vec<Polygon>),
}

// One run of vertices; `linear` runs also contribute edges between neighbors.
#[derive(Copy, Clone)]
struct Path<'a> {
    points: &'a [Point],
    linear: bool,
}

impl<'a> Path<'a> {
    fn points(points: &'a [Point]) -> Self {
        Self {
            points,
            linear: false,
        }
    }

    fn linear(points: &'a [Point]) -> Self {
        Self {
            points,
            linear: true,
        }
    }
}

impl Geometry {
    /// A polyline through `points`.
    pub fn line<I, P>(points: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        Self::LineString(points.into_iter().map(Into::into).collect())
    }

    /// A hole-free polygon with the given exterior ring.
    pub fn polygon<I, P>(exterior: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        Self::Polygon(Polygon::new(exterior.into_iter().map(Into::into).collect()))
    }

    /// An axis-aligned rectangle as a closed polygon.
    pub fn rect(r: Rect) -> Self {
        let r = r.abs();
        Self::polygon([
            (r.x0, r.y0),
            (r.x1, r.y0),
            (r.x1, r.y1),
            (r.x0, r.y1),
            (r.x0, r.y0),
        ])
    }

    fn paths(&self) -> Vec<Path<'_>> {
        match self {
            Self::Point(p) => vec![Path::points(core::slice::from_ref(p))],
            Self::MultiPoint(pts) => vec![Path::points(pts)],
            Self::LineString(pts) => vec![Path::linear(pts)],
            Self::MultiLineString(parts) => parts.iter().map(|p| Path::linear(p)).collect(),
            Self::Polygon(poly) => poly.rings().map(Path::linear).collect(),
            Self::MultiPolygon(polys) => polys
                .iter()
                .flat_map(Polygon::rings)
                .map(Path::linear)
                .collect(),
        }
    }

    /// True for polygons and multipolygons.
    pub fn is_polygonal(&self) -> bool {
        matches!(self, Self::Polygon(_) | Self::MultiPolygon(_))
    }

    /// True if the geometry has no vertices.
    pub fn is_empty(&self) -> bool {
        self.paths().iter().all(|p| p.points.is_empty())
    }

    /// Number of vertices, counting the repeated closing vertex of each ring.
    pub fn vertex_count(&self) -> usize {
        self.paths().iter().map(|p| p.points.len()).sum()
    }

    /// All vertices in vertex-index order.
    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.paths().into_iter().flat_map(|p| p.points.iter().copied())
    }

    /// All edges as `(index of first vertex, segment)`.
    ///
    /// Points have no edges; ring closing segments are included.
    pub fn edges(&self) -> impl Iterator<Item = (usize, Line)> + '_ {
        let mut offset = 0;
        self.paths().into_iter().flat_map(move |path| {
            let start = offset;
            offset += path.points.len();
            let pts: &[Point] = if path.linear { path.points } else { &[] };
            pts.windows(2)
                .enumerate()
                .map(move |(i, w)| (start + i, Line::new(w[0], w[1])))
        })
    }

    /// Bounding rectangle, or `None` for an empty geometry.
    pub fn bounding_box(&self) -> Option<Rect> {
        let mut it = self.vertices();
        let first = it.next()?;
        Some(it.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
    }

    /// Whether `p` lies inside (or on the boundary of) any polygon.
    ///
    /// Always false for points and lines.
    pub fn contains_point(&self, p: Point) -> bool {
        match self {
            Self::Polygon(poly) => poly.contains_point(p),
            Self::MultiPolygon(polys) => polys.iter().any(|poly| poly.contains_point(p)),
            _ => false,
        }
    }

    /// Apply `f` to every vertex, stopping at the first error.
    pub fn try_map_points<E>(
        &self,
        mut f: impl FnMut(Point) -> Result<Point, E>,
    ) -> Result<Self, E> {
        let mut map_all = |pts: &[Point]| pts.iter().map(|&p| f(p)).collect::<Result<Vec<_>, E>>();
        Ok(match self {
            Self::Point(p) => Self::Point(map_all(core::slice::from_ref(p))?[0]),
            Self::MultiPoint(pts) => Self::MultiPoint(map_all(pts)?),
            Self::LineString(pts) => Self::LineString(map_all(pts)?),
            Self::MultiLineString(parts) => Self::MultiLineString(
                parts
                    .iter()
                    .map(|p| map_all(p))
                    .collect::<Result<_, E>>()?,
            ),
            Self::Polygon(poly) => Self::Polygon(map_polygon(poly, &mut map_all)?),
            Self::MultiPolygon(polys) => Self::MultiPolygon(
                polys
                    .iter()
                    .map(|poly| map_polygon(poly, &mut map_all))
                    .collect::<Result<_, E>>()?,
            ),
        })
    }

    /// Close every open polygon ring by repeating its first point.
    pub fn close_rings(&mut self) {
        fn close(ring: &mut Vec<Point>) {
            if let (Some(&first), Some(&last)) = (ring.first(), ring.last())
                && first != last
            {
                ring.push(first);
            }
        }
        let polys: &mut [Polygon] = match self {
            Self::Polygon(poly) => core::slice::from_mut(poly),
            Self::MultiPolygon(polys) => polys,
            _ => return,
        };
        for poly in polys {
            close(&mut poly.exterior);
            poly.interiors.iter_mut().for_each(close);
        }
    }
}

fn map_polygon<E>(
    poly: &Polygon,
    map_all: &mut impl FnMut(&[Point]) -> Result<Vec<Point>, E>,
) -> Result<Polygon, E> {
    Ok(Polygon {
        exterior: map_all(&poly.exterior)?,
        interiors: poly
            .interiors
            .iter()
            .map(|r| map_all(r))
            .collect::<Result<_, E>>()?,
    })
}

/// Segments of a ring, including the closing segment when the ring is open.
fn ring_segments(ring: &[Point]) -> impl Iterator<Item = Line> + '_ {
    let closing = match (ring.first(), ring.last()) {
        (Some(&a), Some(&b)) if a != b => Some(Line::new(b, a)),
        _ => None,
    };
    ring.windows(2)
        .map(|w| Line::new(w[0], w[1]))
        .chain(closing)
}

fn on_segment(seg: Line, p: Point) -> bool {
    let cross = (seg.p1 - seg.p0).cross(p - seg.p0);
    cross == 0.0
        && p.x >= seg.p0.x.min(seg.p1.x)
        && p.x <= seg.p0.x.max(seg.p1.x)
        && p.y >= seg.p0.y.min(seg.p1.y)
        && p.y <= seg.p0.y.max(seg.p1.y)
}

/// Whether a ray cast from `p` towards +x crosses the segment.
fn crosses_ray(seg: Line, p: Point) -> bool {
    let (a, b) = (seg.p0, seg.p1);
    if (a.y > p.y) == (b.y > p.y) {
        return false;
    }
    let x_at = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
    p.x < x_at
}

/// Closest point to `p` on the segment, clamped to its endpoints.
pub(crate) fn closest_point_on_segment(seg: Line, p: Point) -> Point {
    if seg.p0 == seg.p1 {
        return seg.p0;
    }
    seg.eval(seg.nearest(p, 0.0).t)
}

/// Whether any part of the segment lies in the closed rectangle.
pub(crate) fn segment_intersects_rect(seg: Line, rect: Rect) -> bool {
    clip_to_rect(seg, rect).is_some()
}

/// The part of the segment inside the closed rectangle (Liang-Barsky).
pub(crate) fn clip_to_rect(seg: Line, rect: Rect) -> Option<Line> {
    let rect = rect.abs();
    let d = seg.p1 - seg.p0;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let checks = [
        (-d.x, seg.p0.x - rect.x0),
        (d.x, rect.x1 - seg.p0.x),
        (-d.y, seg.p0.y - rect.y0),
        (d.y, rect.y1 - seg.p0.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    (t0 <= t1).then(|| Line::new(seg.eval(t0), seg.eval(t1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Geometry {
        Geometry::rect(Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn vertex_and_edge_numbering_spans_rings() {
        let g = Geometry::Polygon(
            Polygon::new(vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 0.0),
            ])
            .with_hole(vec![
                Point::new(6.0, 2.0),
                Point::new(8.0, 2.0),
                Point::new(8.0, 4.0),
                Point::new(6.0, 2.0),
            ]),
        );
        assert_eq!(g.vertex_count(), 8);
        let edges: Vec<_> = g.edges().map(|(i, _)| i).collect();
        assert_eq!(edges, vec![0, 1, 2, 4, 5, 6], "no edge bridges two rings");
        assert_eq!(g.vertices().nth(5), Some(Point::new(8.0, 2.0)));
    }

    #[test]
    fn points_have_vertices_but_no_edges() {
        let g = Geometry::MultiPoint(vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
        assert_eq!(g.vertices().count(), 2);
        assert_eq!(g.edges().count(), 0);
        assert_eq!(g.bounding_box(), Some(Rect::new(1.0, 1.0, 2.0, 2.0)));
    }

    #[test]
    fn containment_respects_holes_and_boundary() {
        let g = Geometry::Polygon(
            Polygon::new(vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ])
            .with_hole(vec![
                Point::new(4.0, 4.0),
                Point::new(6.0, 4.0),
                Point::new(6.0, 6.0),
                Point::new(4.0, 6.0),
            ]),
        );
        assert!(g.contains_point(Point::new(1.0, 1.0)));
        assert!(!g.contains_point(Point::new(5.0, 5.0)), "inside the hole");
        assert!(g.contains_point(Point::new(0.0, 5.0)), "boundary counts");
        assert!(g.contains_point(Point::new(4.0, 5.0)), "hole boundary counts");
        assert!(!g.contains_point(Point::new(11.0, 5.0)));
        assert!(!Geometry::line([(0.0, 0.0), (10.0, 0.0)]).contains_point(Point::new(5.0, 0.0)));
    }

    #[test]
    fn close_rings_appends_first_point() {
        let mut g = Geometry::polygon([(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)]);
        g.close_rings();
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.vertices().last(), Some(Point::new(0.0, 0.0)));
        let mut sq = square();
        sq.close_rings();
        assert_eq!(sq.vertex_count(), 5, "closed rings stay untouched");
    }

    #[test]
    fn closest_point_is_clamped() {
        let seg = Line::new((0.0, 0.0), (10.0, 0.0));
        assert_eq!(closest_point_on_segment(seg, Point::new(5.0, 3.0)), Point::new(5.0, 0.0));
        assert_eq!(closest_point_on_segment(seg, Point::new(-4.0, 3.0)), Point::new(0.0, 0.0));
        let dot = Line::new((2.0, 2.0), (2.0, 2.0));
        assert_eq!(closest_point_on_segment(dot, Point::new(5.0, 6.0)), Point::new(2.0, 2.0));
    }

    #[test]
    fn segment_rect_intersection() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(segment_intersects_rect(Line::new((-5.0, 5.0), (15.0, 5.0)), r), "crossing");
        assert!(segment_intersects_rect(Line::new((2.0, 2.0), (3.0, 3.0)), r), "inside");
        assert!(segment_intersects_rect(Line::new((-5.0, 10.0), (5.0, 10.0)), r), "on edge");
        assert!(!segment_intersects_rect(Line::new((-5.0, 0.0), (0.0, -5.0)), Rect::new(0.5, 0.5, 1.0, 1.0)));
        assert!(!segment_intersects_rect(Line::new((11.0, 0.0), (20.0, 9.0)), r), "diagonal miss");
        let clipped = clip_to_rect(Line::new((-5.0, 5.0), (15.0, 5.0)), r).unwrap();
        assert_eq!(clipped, Line::new((0.0, 5.0), (10.0, 5.0)));
    }

    #[test]
    fn failing_map_stops_early() {
        let g = Geometry::line([(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let mut seen = 0;
        let out = g.try_map_points(|p| {
            seen += 1;
            if p.x > 0.5 { Err(p) } else { Ok(p) }
        });
        assert_eq!(out, Err(Point::new(1.0, 1.0)));
        assert_eq!(seen, 2);
    }
}

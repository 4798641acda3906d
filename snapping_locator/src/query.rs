// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query engine: candidate boxes from the index, refined against cached geometry.

use kurbo::{Point, Rect};
use snapping_index::Backend;

use crate::cache::SpatialCache;
use crate::config::rect_to_aabb;
use crate::geometry::{Geometry, clip_to_rect, closest_point_on_segment};
use crate::types::{FeatureId, Match, MatchFilter, accepts};

impl<B: Backend> SpatialCache<B> {
    /// Closest vertex within `tolerance`.
    ///
    /// Candidates arrive in increasing box distance; the search stops once no
    /// remaining box can hold anything strictly closer than the current best.
    /// Equal distances keep the earlier candidate, so ties go to the feature
    /// visited first, then to the lower vertex index.
    pub(crate) fn nearest_vertex(
        &self,
        p: Point,
        tolerance: f64,
        filter: Option<&dyn MatchFilter>,
    ) -> Match {
        self.nearest_by(p, tolerance, |fid, geom, best| {
            for (i, v) in geom.vertices().enumerate() {
                let d = p.distance(v);
                if beats(d, tolerance, best) {
                    let m = Match::vertex(fid, d, v, i);
                    if accepts(filter, &m) {
                        *best = m;
                    }
                }
            }
        })
    }

    /// Closest point on any edge within `tolerance`.
    pub(crate) fn nearest_edge(
        &self,
        p: Point,
        tolerance: f64,
        filter: Option<&dyn MatchFilter>,
    ) -> Match {
        self.nearest_by(p, tolerance, |fid, geom, best| {
            for (i, seg) in geom.edges() {
                let q = closest_point_on_segment(seg, p);
                let d = p.distance(q);
                if beats(d, tolerance, best) {
                    let m = Match::edge(fid, d, q, i, seg);
                    if accepts(filter, &m) {
                        *best = m;
                    }
                }
            }
        })
    }

    fn nearest_by(
        &self,
        p: Point,
        tolerance: f64,
        mut refine: impl FnMut(FeatureId, &Geometry, &mut Match),
    ) -> Match {
        let mut best = Match::invalid();
        if tolerance.is_nan() || tolerance < 0.0 {
            return best;
        }
        // Box distances are computed differently from exact ones; widen the
        // candidate bound so geometry lying exactly at `tolerance` is refined.
        let bound = tolerance * (1.0 + 4.0 * f64::EPSILON);
        for (_, fid, box_distance) in self.index().query_nearest(p.x, p.y, bound) {
            if best.is_valid() && box_distance >= best.distance() {
                break;
            }
            if let Some(geom) = self.geometry(fid) {
                refine(fid, geom, &mut best);
            }
        }
        best
    }

    /// First accepted polygon containing `p`, else the nearest edge when
    /// `tolerance > 0`.
    ///
    /// "First" follows the index's traversal order: arbitrary, but stable for
    /// one build of the index.
    pub(crate) fn nearest_area(
        &self,
        p: Point,
        tolerance: f64,
        filter: Option<&dyn MatchFilter>,
    ) -> Match {
        let inside = self
            .containing(p)
            .map(|fid| Match::area(fid, p))
            .find(|m| accepts(filter, m));
        match inside {
            Some(m) => m,
            None if tolerance > 0.0 => self.nearest_edge(p, tolerance, filter),
            None => Match::invalid(),
        }
    }

    /// Every edge that touches `rect`, with the midpoint of the part inside it.
    pub(crate) fn edges_in_rect(&self, rect: Rect, filter: Option<&dyn MatchFilter>) -> Vec<Match> {
        let rect = rect.abs();
        let mut out = Vec::new();
        for (_, fid) in self.index().query_rect(rect_to_aabb(rect)) {
            let Some(geom) = self.geometry(fid) else {
                continue;
            };
            for (i, seg) in geom.edges() {
                let Some(inside) = clip_to_rect(seg, rect) else {
                    continue;
                };
                let m = Match::edge(fid, 0.0, inside.p0.midpoint(inside.p1), i, seg);
                if accepts(filter, &m) {
                    out.push(m);
                }
            }
        }
        out
    }

    /// Every polygon containing `p`, one area match per feature.
    pub(crate) fn point_in_polygon(&self, p: Point) -> Vec<Match> {
        self.containing(p).map(|fid| Match::area(fid, p)).collect()
    }

    fn containing(&self, p: Point) -> impl Iterator<Item = FeatureId> + '_ {
        self.index().query_point(p.x, p.y).filter_map(move |(_, fid)| {
            self.geometry(fid)
                .filter(|g| g.is_polygonal() && g.contains_point(p))
                .map(|_| fid)
        })
    }
}

fn beats(d: f64, tolerance: f64, best: &Match) -> bool {
    d <= tolerance && (!best.is_valid() || d < best.distance())
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive box type and helpers.

/// Axis-aligned bounding box in 2D, in working coordinates.
///
/// A degenerate box (zero width and/or height) is valid: point features and
/// axis-parallel segments produce them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2D {
    /// Minimum x
    pub min_x: f64,
    /// Minimum y
    pub min_y: f64,
    /// Maximum x
    pub max_x: f64,
    /// Maximum y
    pub max_y: f64,
}

impl Aabb2D {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create a degenerate AABB covering a single point.
    pub const fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Create a square AABB of half-width `radius` centered on a point.
    pub fn around(x: f64, y: f64, radius: f64) -> Self {
        Self::new(x - radius, y - radius, x + radius, y + radius)
    }

    /// Create an AABB from origin and size.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// Whether this AABB contains the point (boundary inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    /// Whether the two boxes share at least one point (boundary inclusive).
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// The smallest AABB covering both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow the box to cover the point.
    pub fn include_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Return true if the AABB is inverted. Degenerate boxes are not empty.
    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Squared distance from the point to the nearest point of the box.
    ///
    /// Zero when the point lies inside or on the boundary.
    pub fn distance_sq_to_point(&self, x: f64, y: f64) -> f64 {
        let dx = axis_gap(x, self.min_x, self.max_x);
        let dy = axis_gap(y, self.min_y, self.max_y);
        dx * dx + dy * dy
    }
}

#[inline]
fn axis_gap(v: f64, lo: f64, hi: f64) -> f64 {
    if v < lo {
        lo - v
    } else if v > hi {
        v - hi
    } else {
        0.0
    }
}

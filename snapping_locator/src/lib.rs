// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapping Locator: proximity and containment queries over one editable vector layer.
//!
//! A [`Locator`] caches the layer's geometry in working coordinates, indexes
//! each feature's bounding box (see `snapping_index`), and answers the
//! queries an interactive snapping tool needs:
//!
//! - [`Locator::nearest_vertex`] and [`Locator::nearest_edge`] within a tolerance.
//! - [`Locator::nearest_area`]: the polygon under the point, falling back to the nearest edge.
//! - [`Locator::edges_in_rect`] / [`Locator::edges_around`]: every edge touching a rectangle.
//! - [`Locator::point_in_polygon`]: every polygon under the point.
//! - [`Locator::snap`]: the first of vertex, edge, area that matches.
//!
//! Results are [`Match`] values that own their coordinates, so they stay
//! valid while the layer changes. Every query accepts an optional
//! [`MatchFilter`]; any `Fn(&Match) -> bool` will do.
//!
//! The index is built lazily on the first query, or explicitly with
//! [`Locator::init`], which can cap the number of features indexed. Builds can
//! be limited to an extent through [`LocatorConfig`]. After that, report each
//! edit of the layer with [`Locator::notify`] and the cache is patched in place.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use snapping_locator::{Geometry, Locator, Match, MemoryLayer};
//!
//! let layer: MemoryLayer = [
//!     Geometry::line([(0.0, 0.0), (10.0, 0.0)]),
//!     Geometry::rect(Rect::new(20.0, 0.0, 30.0, 10.0)),
//! ]
//! .into_iter()
//! .collect();
//! let mut locator = Locator::new(layer);
//!
//! // Vertex within tolerance.
//! let v = locator.nearest_vertex(Point::new(0.5, 0.0), 1.0, None);
//! assert_eq!(v.point(), Point::new(0.0, 0.0));
//! assert_eq!(v.distance(), 0.5);
//!
//! // Closest point on an edge.
//! let e = locator.nearest_edge(Point::new(5.0, 1.0), 2.0, None);
//! assert_eq!(e.point(), Point::new(5.0, 0.0));
//!
//! // Inside the square.
//! let a = locator.nearest_area(Point::new(25.0, 5.0), 1.0, None);
//! assert!(a.has_area());
//!
//! // Edit the layer and tell the locator about it.
//! let event = locator.source_mut().delete_feature(1).unwrap();
//! locator.notify(&event);
//! let skip_lines = |m: &Match| m.feature_id() != Some(0);
//! assert!(!locator.nearest_area(Point::new(25.0, 5.0), 1.0, Some(&skip_lines)).is_valid());
//! ```
//!
//! ## Coordinates
//!
//! A [`Transform`] maps the layer's native coordinates into working
//! coordinates before geometry is cached. Query points, rectangles, and
//! tolerances are taken in working coordinates as given.
//!
//! ## Failure
//!
//! Building can fail with [`LocatorError`]: too many features for the cap, or
//! a coordinate the transform cannot map. No partial index is kept. Queries
//! never fail; "nothing found" is an invalid [`Match`].

mod cache;
pub mod config;
pub mod error;
pub mod geometry;
mod locator;
mod query;
pub mod source;
mod sync;
pub mod transform;
pub mod types;

pub use config::LocatorConfig;
pub use error::{LocatorError, Result};
pub use geometry::{Geometry, Polygon};
pub use locator::Locator;
pub use source::{FeatureEvent, FeatureSource, MemoryLayer};
pub use transform::{FnTransform, Identity, Transform};
pub use types::{FeatureId, Match, MatchFilter, MatchKind, MatchKinds};

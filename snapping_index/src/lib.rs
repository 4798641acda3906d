// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapping Index: a keyed 2D AABB index (boundary index) for proximity queries.
//!
//! - Insert, update, and remove axis-aligned bounding boxes (AABBs) with user payloads.
//! - Query by point or intersecting rectangle.
//! - Enumerate candidates in increasing box-to-point distance, bounded by a
//!   maximum distance, for nearest-vertex and nearest-edge style refinement.
//!
//! It does not depend on any geometry crate; higher layers compute boxes in
//! their working coordinates and feed them here.
//!
//! Backends are pluggable via a simple trait so you can swap the spatial strategy without API churn.
//! The default backend is an R-tree supplied by the `rstar` crate.
//!
//! # Example
//!
//! ```rust
//! use snapping_index::{Aabb2D, Index};
//!
//! let mut idx: Index<u32> = Index::new();
//! let k1 = idx.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), 1);
//! let _k2 = idx.insert(Aabb2D::new(20.0, 0.0, 30.0, 10.0), 2);
//!
//! // Move the first box.
//! idx.update(k1, Aabb2D::new(40.0, 0.0, 50.0, 10.0));
//!
//! // Candidates near a point, closest box first.
//! let near: Vec<_> = idx.query_nearest(35.0, 5.0, 6.0).map(|(_, p, d)| (p, d)).collect();
//! assert_eq!(near, vec![(1, 5.0), (2, 5.0)]);
//! ```
//!
//! ## Choosing a backend
//!
//! - `RStar` (default): R-tree; good general-purpose index for irregular
//!   distributions with frequent updates, and bulk-loads quickly.
//! - `FlatVec`: linear scans. Good for very small sets, and as a reference
//!   when checking other backends.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs in coordinates. Boxes are closed: touching
//! boundaries intersect, and degenerate (zero-area) boxes are valid.

pub mod backend;
pub mod backends;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::flatvec::FlatVec;
pub use backends::rtree::RStar;
pub use index::{FlatIndex, Index, IndexGeneric, Key};
pub use types::Aabb2D;

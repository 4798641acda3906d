// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple, and the reference
//!   every other backend is checked against).
//! - `rtree`: R-tree from the `rstar` crate. Incremental inserts use R*
//!   reinsertion; [`Backend::bulk_load`](crate::Backend::bulk_load) packs the
//!   tree with sort-tile-recursive (STR) loading.
//!
//! Nearest queries
//! ---------------
//! Both backends answer `query_nearest` by collecting every box within the
//! distance bound and sorting by box-to-point distance. The sort key is
//! `(distance, slot)`, so traversal order is fully determined by the indexed
//! boxes and their slots.

pub mod flatvec;
pub mod rtree;

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for index construction and maintenance.
//!
//! Queries never fail: "nothing found" is an invalid [`Match`](crate::Match).

use thiserror::Error;

/// Locator errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocatorError {
    /// The build was aborted because more features qualified than the configured cap.
    ///
    /// This is a configured limit, not a defect: raise the cap or work without an index.
    #[error("capacity exceeded: more than {limit} features to index")]
    CapacityExceeded {
        /// The cap that was exceeded.
        limit: usize,
    },

    /// The transform into working coordinates is undefined for a coordinate.
    #[error("transform undefined for coordinate ({x}, {y})")]
    ReprojectionUndefined {
        /// Source x.
        x: f64,
        /// Source y.
        y: f64,
    },
}

/// Result type for locator operations.
pub type Result<T> = core::result::Result<T, LocatorError>;

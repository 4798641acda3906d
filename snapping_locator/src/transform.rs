// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transforms from a layer's native coordinates into working coordinates.

use core::fmt;

use kurbo::{Affine, Point};

use crate::error::{LocatorError, Result};

/// Maps native coordinates into working coordinates.
///
/// Applied to every vertex before it is cached. It must be a pure function of
/// its input so that repeated builds agree.
pub trait Transform {
    /// Transform one point, failing when the mapping is undefined there.
    fn transform(&self, p: Point) -> Result<Point>;
}

/// Native coordinates are already working coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity;

impl Transform for Identity {
    fn transform(&self, p: Point) -> Result<Point> {
        Ok(p)
    }
}

impl Transform for Affine {
    fn transform(&self, p: Point) -> Result<Point> {
        let out = *self * p;
        if out.is_finite() {
            Ok(out)
        } else {
            Err(undefined(p))
        }
    }
}

/// A transform given as a closure; `None` marks an undefined coordinate.
///
/// ```
/// use kurbo::Point;
/// use snapping_locator::{FnTransform, Transform};
///
/// // Only the upper half-plane can be mapped.
/// let t = FnTransform(|p: Point| (p.y >= 0.0).then(|| Point::new(p.x * 2.0, p.y)));
/// assert_eq!(t.transform(Point::new(1.0, 1.0)).unwrap(), Point::new(2.0, 1.0));
/// assert!(t.transform(Point::new(1.0, -1.0)).is_err());
/// ```
#[derive(Copy, Clone)]
pub struct FnTransform<F>(pub F);

impl<F> fmt::Debug for FnTransform<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnTransform").finish_non_exhaustive()
    }
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(Point) -> Option<Point>,
{
    fn transform(&self, p: Point) -> Result<Point> {
        (self.0)(p).ok_or_else(|| undefined(p))
    }
}

impl<T: Transform + ?Sized> Transform for &T {
    fn transform(&self, p: Point) -> Result<Point> {
        (**self).transform(p)
    }
}

fn undefined(p: Point) -> LocatorError {
    LocatorError::ReprojectionUndefined { x: p.x, y: p.y }
}

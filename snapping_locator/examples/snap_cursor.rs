// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snap a few cursor positions against a small layer, editing it in between.

use kurbo::{Point, Rect};
use snapping_locator::{Geometry, Locator, LocatorConfig, MatchKinds, MemoryLayer};

fn main() {
    let layer: MemoryLayer = [
        Geometry::line([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
        Geometry::rect(Rect::new(20.0, 0.0, 30.0, 10.0)),
    ]
    .into_iter()
    .collect();

    let mut locator = Locator::new(layer)
        .with_config(LocatorConfig::default().with_extent(Rect::new(-50.0, -50.0, 50.0, 50.0)));
    match locator.init(Some(10_000)) {
        Ok(true) => println!("indexed {} features", locator.cached_geometry_count()),
        Ok(false) => println!("too many features; snapping disabled"),
        Err(err) => println!("cannot index layer: {err}"),
    }

    for cursor in [
        Point::new(0.3, 0.2),
        Point::new(5.0, 0.8),
        Point::new(25.0, 5.0),
        Point::new(40.0, 40.0),
    ] {
        let m = locator.snap(cursor, 1.0, MatchKinds::ALL, None);
        println!("{cursor:?} -> {:?} {:?} at {:?}", m.kind(), m.feature_id(), m.point());
    }

    // Move the square and tell the locator.
    let moved = Geometry::rect(Rect::new(38.0, 38.0, 42.0, 42.0));
    if let Some(event) = locator.source_mut().change_geometry(1, moved) {
        locator.notify(&event);
    }
    let m = locator.snap(Point::new(40.0, 40.0), 1.0, MatchKinds::AREA, None);
    println!("after edit: {:?} {:?}", m.kind(), m.feature_id());

    let edges = locator.edges_around(Point::new(10.0, 5.0), 1.0, None);
    println!("{} edge(s) near (10, 5)", edges.len());
}

//! Grid-based duplicate filtering for insertion batches.
//!
//! Every coordinate is quantized to a grid of fixed cell size; two points
//! falling into the same cell are duplicates and only the first is kept. The
//! cell is a true `(i64, i64, i64)` key, so distinct cells never collide.
//! Points straddling a cell boundary are kept even when very close.

use crate::geometry::point::Point;
use std::collections::HashSet;

/// Grid cell a point falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridKey(i64, i64, i64);

impl GridKey {
    /// Quantizes `point` onto a grid with the given cell size.
    #[must_use]
    pub fn of(point: &Point, cell_size: f64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let quantize = |v: f64| (v / cell_size).floor() as i64;
        Self(quantize(point.x), quantize(point.y), quantize(point.z))
    }
}

/// Points that survived deduplication, plus how many were dropped.
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    /// First occurrence of every occupied grid cell, in input order
    pub unique: Vec<Point>,
    /// Number of inputs discarded as duplicates
    pub dropped: usize,
}

/// Keeps the first point of every grid cell, preserving input order.
#[must_use]
pub fn dedup_points(points: &[Point], cell_size: f64) -> Deduplicated {
    let mut occupied: HashSet<GridKey> = HashSet::with_capacity(points.len());
    let mut unique = Vec::with_capacity(points.len());

    for point in points {
        if occupied.insert(GridKey::of(point, cell_size)) {
            unique.push(*point);
        }
    }

    let dropped = points.len() - unique.len();
    Deduplicated { unique, dropped }
}

//! Read-only query interface for triangulations.
//!
//! Anything that can hand out its points and tetrahedra as slices gets the
//! derived operations in [`crate::geometry::operations`] for free.

use crate::geometry::point::{Point, Tetrahedron};

/// Read-only triangulation access.
pub trait TriangulationQuery {
    /// All points, including any bootstrap vertices still present.
    fn points(&self) -> &[Point];

    /// All tetrahedra.
    fn tetrahedra(&self) -> &[Tetrahedron];

    /// Number of points.
    fn point_count(&self) -> usize {
        self.points().len()
    }

    /// Number of tetrahedra.
    fn tetrahedron_count(&self) -> usize {
        self.tetrahedra().len()
    }
}

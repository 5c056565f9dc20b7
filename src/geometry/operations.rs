//! Derived triangulation operations.
//!
//! These work on any [`TriangulationQuery`] and never mutate it.

use super::circumsphere::Circumsphere;
use super::point::{Point, PointKey};
use super::traits::TriangulationQuery;
use std::collections::HashSet;

/// Common read-only operations on triangulations
pub trait TriangulationOps: TriangulationQuery {
    /// Unique edges of all tetrahedra, in first-seen order.
    fn edges(&self) -> Vec<[Point; 2]> {
        let mut seen: HashSet<(PointKey, PointKey)> = HashSet::new();
        let mut edges = Vec::new();

        for tetrahedron in self.tetrahedra() {
            let v = &tetrahedron.vertices;
            for i in 0..4 {
                for j in (i + 1)..4 {
                    let (a, b) = (v[i].key(), v[j].key());
                    let key = if a <= b { (a, b) } else { (b, a) };
                    if seen.insert(key) {
                        edges.push([v[i], v[j]]);
                    }
                }
            }
        }

        edges
    }

    /// Number of unique edges.
    fn edge_count(&self) -> usize {
        self.edges().len()
    }

    /// Sum of unsigned tetrahedron volumes.
    fn total_volume(&self) -> f64 {
        self.tetrahedra().iter().map(|t| t.volume()).sum()
    }

    /// Returns true if some tetrahedron repeats a vertex.
    fn has_degenerate_tetrahedra(&self) -> bool {
        self.tetrahedra().iter().any(|t| !t.has_distinct_vertices())
    }

    /// Checks the empty-circumsphere property: no point lies closer than
    /// `radius - tolerance` to the center of any tetrahedron's circumsphere.
    ///
    /// Tetrahedra too flat to have a finite sphere are skipped.
    fn is_delaunay(&self, tolerance: f64) -> bool {
        self.tetrahedra().iter().all(|tetrahedron| {
            let sphere = Circumsphere::of(tetrahedron);
            sphere.is_unbounded()
                || self.points().iter().all(|p| {
                    tetrahedron.contains_vertex(p)
                        || p.distance(&sphere.center) >= sphere.radius - tolerance
                })
        })
    }
}

// Blanket implementation for all types that implement TriangulationQuery
impl<T: TriangulationQuery> TriangulationOps for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Tetrahedron;
    use approx::assert_relative_eq;

    struct Fixture {
        points: Vec<Point>,
        tetrahedra: Vec<Tetrahedron>,
    }

    impl TriangulationQuery for Fixture {
        fn points(&self) -> &[Point] {
            &self.points
        }

        fn tetrahedra(&self) -> &[Tetrahedron] {
            &self.tetrahedra
        }
    }

    /// Two tetrahedra glued on the face `abc`.
    fn bipyramid() -> Fixture {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(1.0, 0.0, 0.0);
        let c = Point::new(0.0, 1.0, 0.0);
        let top = Point::new(0.2, 0.2, 1.0);
        let bottom = Point::new(0.2, 0.2, -1.0);
        Fixture {
            points: vec![a, b, c, top, bottom],
            tetrahedra: vec![Tetrahedron::new(a, b, c, top), Tetrahedron::new(a, b, c, bottom)],
        }
    }

    #[test]
    fn test_counts() {
        let fixture = bipyramid();
        assert_eq!(fixture.point_count(), 5);
        assert_eq!(fixture.tetrahedron_count(), 2);
    }

    #[test]
    fn test_shared_edges_are_counted_once() {
        // 6 edges per tetrahedron, 3 shared along the common face
        assert_eq!(bipyramid().edge_count(), 9);
    }

    #[test]
    fn test_total_volume() {
        // base area 0.5, heights 1 and 1
        assert_relative_eq!(bipyramid().total_volume(), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_detection() {
        let mut fixture = bipyramid();
        assert!(!fixture.has_degenerate_tetrahedra());

        let p = fixture.points[0];
        fixture
            .tetrahedra
            .push(Tetrahedron::new(p, p, fixture.points[1], fixture.points[2]));
        assert!(fixture.has_degenerate_tetrahedra());
    }

    #[test]
    fn test_delaunay_check_detects_intruder() {
        let mut fixture = bipyramid();
        assert!(fixture.is_delaunay(1e-9));

        let sphere = Circumsphere::of(&fixture.tetrahedra[0]);
        fixture.points.push(sphere.center);
        assert!(!fixture.is_delaunay(1e-9));
    }
}

//! Integration tests for delaunay3d.
//!
//! This module contains integration tests that verify complete insertion
//! workflows, mesh invariants after every batch, finalization and consistency
//! between sequential and parallel discovery.

use delaunay3d::util::{generate_seeded_points, load_points, normalize_points};
use delaunay3d::{
    Circumsphere, Delaunay3D, Phase, Point, TestConfig, TriangulationConfig, TriangulationOps,
};
use std::path::Path;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sequential(radius: f64) -> Delaunay3D {
        Delaunay3D::with_config(TriangulationConfig::new(radius).with_parallel(false))
            .expect("valid config")
    }

    fn assert_cache_parity(triangulation: &Delaunay3D) {
        assert_eq!(
            triangulation.circumspheres().len(),
            triangulation.tetrahedra().len(),
            "Cache must stay index-aligned with the tetrahedra"
        );
        for (tetrahedron, sphere) in triangulation
            .tetrahedra()
            .iter()
            .zip(triangulation.circumspheres())
        {
            assert_eq!(*sphere, Circumsphere::of(tetrahedron));
        }
    }

    fn sorted_keys(points: &[Point]) -> Vec<Point> {
        let mut sorted = points.to_vec();
        sorted.sort_by(Point::lex_cmp);
        sorted
    }

    #[test]
    fn test_one_point_per_batch_is_delaunay() {
        let points = generate_seeded_points(40, (-1.0, 1.0), 2024).expect("valid parameters");
        let mut triangulation = sequential(10.0);
        let initial_volume = triangulation.total_volume();

        for point in &points {
            let report = triangulation.insert_point(*point);
            assert_eq!(report.inserted, 1);
            assert_eq!(report.stale_tetrahedra, 0);
            assert_cache_parity(&triangulation);
        }

        assert_eq!(triangulation.points().len(), 44);
        assert!(!triangulation.has_degenerate_tetrahedra());
        assert_relative_eq!(
            triangulation.total_volume(),
            initial_volume,
            max_relative = 1e-9
        );
        assert!(
            triangulation.is_delaunay(1e-9),
            "Empty-circumsphere property should hold"
        );

        triangulation.remove_super_tetrahedron();
        assert!(triangulation.is_delaunay(1e-9));
        assert!(!triangulation.tetrahedra().is_empty());
    }

    #[test]
    fn test_parallel_and_sequential_insert_same_vertices() {
        let points = generate_seeded_points(100, (-1.0, 1.0), 5).expect("valid parameters");

        let mut parallel = Delaunay3D::new(10.0);
        let mut serial = sequential(10.0);
        let parallel_report = parallel.add_points_batch(&points);
        let serial_report = serial.add_points_batch(&points);

        assert_eq!(parallel_report.inserted, serial_report.inserted);
        assert_eq!(parallel_report.inserted, 100);
        assert_eq!(
            sorted_keys(parallel.points()),
            sorted_keys(serial.points()),
            "Vertex sets must not depend on merge order"
        );
        assert_cache_parity(&parallel);
        assert_cache_parity(&serial);
        assert!(!parallel.has_degenerate_tetrahedra());
        assert!(!serial.has_degenerate_tetrahedra());

        // One snapshot for the whole batch: later merges find parts of their
        // cavity already consumed, yet every point must still become a vertex.
        assert!(serial_report.stale_tetrahedra > 0);
        for triangulation in [&parallel, &serial] {
            for point in &triangulation.points()[4..] {
                assert!(
                    triangulation
                        .tetrahedra()
                        .iter()
                        .any(|tetrahedron| tetrahedron.contains_vertex(point)),
                    "Point {point:?} is not a vertex of any tetrahedron"
                );
            }
        }
    }

    #[test]
    fn test_duplicate_tolerance() {
        let mut triangulation = Delaunay3D::new(2.0);
        let base = Point::new(0.25, 0.25, 0.25);

        let report = triangulation.add_points_batch(&[base, Point::new(0.25 + 1e-7, 0.25, 0.25)]);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(triangulation.points().len(), 5);

        let mut triangulation = Delaunay3D::new(2.0);
        let report =
            triangulation.add_points_batch(&[base, Point::new(0.25 + 1.1e-5, 0.25, 0.25)]);
        assert_eq!(report.duplicates_dropped, 0);
        assert_eq!(triangulation.points().len(), 6);
    }

    #[test]
    fn test_batches_keep_invariants() {
        let points = generate_seeded_points(120, (-1.0, 1.0), 77).expect("valid parameters");
        let mut triangulation = Delaunay3D::new(10.0);

        for chunk in points.chunks(15) {
            let before = triangulation.points().len();
            let report = triangulation.add_points_batch(chunk);
            assert_eq!(triangulation.points().len(), before + report.inserted);
            assert_eq!(
                report.inserted + report.unplaced_points + report.duplicates_dropped,
                chunk.len()
            );
            assert_cache_parity(&triangulation);
            assert!(!triangulation.has_degenerate_tetrahedra());
        }

        assert_eq!(triangulation.diagnostics().batches, 8);
        assert_eq!(triangulation.phase(), Phase::Growing);
    }

    #[test]
    fn test_finalization_purges_super_vertices() {
        let points = generate_seeded_points(30, (-1.0, 1.0), 3).expect("valid parameters");
        let mut triangulation = sequential(10.0);
        triangulation.add_points_in_batches(&points, 1);
        let before = triangulation.tetrahedra().len();

        let removed = triangulation.remove_super_tetrahedron();

        assert_eq!(triangulation.tetrahedra().len(), before - removed);
        assert_eq!(triangulation.phase(), Phase::Finalized);
        for tetrahedron in triangulation.tetrahedra() {
            for vertex in triangulation.super_vertices() {
                assert!(!tetrahedron.contains_vertex(vertex));
            }
        }
        assert_cache_parity(&triangulation);
    }

    #[test]
    fn test_cube_fixture_fills_its_hull() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cube.txt");
        let mut points = load_points(&path).expect("fixture is readable");
        normalize_points(&mut points);
        assert_eq!(points.len(), 9);

        let mut triangulation = sequential(10.0);
        triangulation.add_points_in_batches(&points, 1);
        triangulation.remove_super_tetrahedron();

        // The normalized cube spans [-1, 1]^3.
        assert_relative_eq!(triangulation.total_volume(), 8.0, max_relative = 1e-9);
        assert!(triangulation.is_delaunay(1e-9));
    }

    #[test]
    fn test_coplanar_input_is_absorbed() {
        let mut triangulation = Delaunay3D::new(50.0);
        let hexagon: Vec<Point> = (0..6)
            .map(|i| {
                let angle = f64::from(i) * std::f64::consts::FRAC_PI_3;
                Point::new(5.0 * angle.cos(), 5.0 * angle.sin(), 0.0)
            })
            .chain(std::iter::once(Point::origin()))
            .collect();

        triangulation.add_points_in_batches(&hexagon, 1);
        assert_eq!(triangulation.points().len(), 11);
        assert!(!triangulation.has_degenerate_tetrahedra());
        assert_cache_parity(&triangulation);

        triangulation.remove_super_tetrahedron();
        assert_cache_parity(&triangulation);
    }

    #[test]
    fn test_nearest_point_tracks_insertions() {
        let mut triangulation = Delaunay3D::with_config(TestConfig::deterministic())
            .expect("valid config");
        triangulation.insert_point(Point::new(0.2, 0.1, 0.0));
        triangulation.insert_point(Point::new(-0.3, 0.0, 0.1));

        assert_eq!(
            triangulation.nearest_point(&Point::new(0.19, 0.12, 0.01)),
            Point::new(0.2, 0.1, 0.0)
        );
        assert_eq!(
            triangulation.nearest_point(&Point::new(-0.28, 0.01, 0.09)),
            Point::new(-0.3, 0.0, 0.1)
        );
    }
}

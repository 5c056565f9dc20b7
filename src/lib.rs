#![allow(clippy::multiple_crate_versions)]
#![warn(missing_docs)]

//! Incremental 3D Delaunay triangulation with batched parallel insertion.
//!
//! This library implements the Bowyer-Watson algorithm in three dimensions,
//! starting from an enclosing super-tetrahedron and inserting points in
//! batches. Each batch is tested against a cache of circumspheres by rayon
//! workers and merged back into the mesh one point at a time.
//!
//! # Key Features
//!
//! - Circumsphere cache with degenerate (flat) tetrahedra handled as unbounded
//! - k-d tree spatial index rebuilt after every batch
//! - Grid deduplication of near-identical input points
//! - Diagnostics and event history instead of hard failures
//! - Point file loading with per-axis normalization
//!
//! # Example
//!
//! ```rust
//! use delaunay3d::{Delaunay3D, Point, TriangulationOps};
//!
//! let mut triangulation = Delaunay3D::new(2.0);
//! triangulation.add_points_batch(&[Point::new(0.0, 0.0, 0.0)]);
//! assert_eq!(triangulation.tetrahedra().len(), 4);
//! assert!(triangulation.edge_count() > 0);
//! ```

use std::time::{Duration, Instant};

// Module declarations (avoiding mod.rs files)
/// Configuration for the engine and the command line.
pub mod config;

/// Error types for the delaunay3d library.
pub mod errors;

/// Random point generation and point file handling.
pub mod util;

/// Geometric primitives, predicates and spatial indexing.
pub mod geometry {
    /// Circumspheres and the per-tetrahedron circumsphere cache.
    pub mod circumsphere;
    /// k-d tree nearest-neighbour index.
    pub mod kd_tree;
    /// High-level triangulation operations.
    pub mod operations;
    /// Points, faces, tetrahedra and their canonical keys.
    pub mod point;
    /// Read-only triangulation traits.
    pub mod traits;
}

/// Bowyer-Watson insertion engine and its building blocks.
pub mod triangulation {
    /// Cavity boundary extraction and re-stitching.
    pub mod cavity;
    /// Grid deduplication of input batches.
    pub mod dedup;
    /// Batch reports, counters and event history.
    pub mod diagnostics;
    /// The triangulation engine.
    pub mod engine;
}

// Re-exports for convenience
pub use config::{Config, TestConfig, TriangulationConfig};
pub use errors::{DelaunayError, DelaunayResult};
pub use geometry::circumsphere::{Circumsphere, CircumsphereCache};
pub use geometry::kd_tree::KdTree;
pub use geometry::operations::TriangulationOps;
pub use geometry::point::{EPSILON, Face, Point, Tetrahedron};
pub use geometry::traits::TriangulationQuery;
pub use triangulation::diagnostics::{BatchReport, Diagnostics, Phase, TriangulationEvent};
pub use triangulation::engine::{Delaunay3D, super_tetrahedron_vertices};

/// Coordinate range for randomly generated points.
pub const RANDOM_RANGE: (f64, f64) = (-1.0, 1.0);

/// Outcome of a [`run`].
#[derive(Debug)]
pub struct RunSummary {
    /// The finalized triangulation
    pub triangulation: Delaunay3D,
    /// Combined report of every inserted batch
    pub report: BatchReport,
    /// Tetrahedra removed with the super-tetrahedron
    pub removed: usize,
    /// Number of unique edges after finalization
    pub edges: usize,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

/// Loads or generates the input batches described by `config`.
///
/// Every input file becomes one group of points, normalized to [-1, 1] per
/// axis unless `raw` is set. Random input is a single group. [`run`] splits
/// each group into insertion batches of `batch_size` points.
///
/// # Errors
///
/// Returns [`DelaunayError::PointFile`] if a file cannot be read, or
/// [`DelaunayError::InvalidParameters`] for a bad random point request.
pub fn load_batches(config: &Config) -> DelaunayResult<Vec<Vec<Point>>> {
    if let Some(count) = config.random {
        let count = count as usize;
        let points = match config.seed {
            Some(seed) => util::generate_seeded_points(count, RANDOM_RANGE, seed)?,
            None => util::generate_random_points(count, RANDOM_RANGE)?,
        };
        log::info!("Generated {count} random points");
        return Ok(vec![points]);
    }

    config
        .inputs
        .iter()
        .map(|path| -> DelaunayResult<Vec<Point>> {
            let mut points = util::load_points(path)?;
            if !config.raw {
                util::normalize_points(&mut points);
            }
            log::info!("Loaded {} points from {}", points.len(), path.display());
            Ok(points)
        })
        .collect()
}

/// Triangulates the input described by `config` and removes the
/// super-tetrahedron.
///
/// # Errors
///
/// Returns [`DelaunayError::InvalidParameters`] if the configuration is
/// invalid, [`DelaunayError::PointFile`] if an input file cannot be read, and
/// [`DelaunayError::EmptyInput`] if no points were loaded at all.
pub fn run(config: &Config) -> DelaunayResult<RunSummary> {
    let started = Instant::now();
    config.validate()?;

    let batches = load_batches(config)?;
    if batches.iter().all(Vec::is_empty) {
        return Err(DelaunayError::EmptyInput);
    }

    let mut triangulation = Delaunay3D::with_config(config.to_triangulation_config())?;
    log::info!(
        "Super-tetrahedron radius: {}, parallel discovery: {}",
        triangulation.radius(),
        triangulation.config().parallel
    );

    let mut report = BatchReport::default();
    for batch in batches.iter().filter(|b| !b.is_empty()) {
        report.absorb(&triangulation.add_points_in_batches(batch, config.batch_size as usize));
    }

    let removed = triangulation.remove_super_tetrahedron();
    let edges = triangulation.edge_count();

    log::info!(
        "Triangulation finalized: {} points, {} tetrahedra, {} edges",
        triangulation.point_count(),
        triangulation.tetrahedron_count(),
        edges
    );
    if report.unplaced_points > 0 {
        log::warn!(
            "{} points were outside every circumsphere; consider a larger radius",
            report.unplaced_points
        );
    }

    Ok(RunSummary {
        triangulation,
        report,
        removed,
        edges,
        elapsed: started.elapsed(),
    })
}

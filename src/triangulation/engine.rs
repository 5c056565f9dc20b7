//! Batched Bowyer-Watson triangulation engine.
//!
//! The engine starts from a single super-tetrahedron large enough to enclose
//! all input and grows by batches:
//!
//! 1. the batch is deduplicated on a fixed grid;
//! 2. every surviving point is tested against a frozen snapshot of the
//!    circumsphere cache, in parallel, each worker collecting its own results;
//! 3. the results are merged one point at a time inside a single critical
//!    section, which carves each point's cavity and stitches it back up;
//! 4. the spatial index and the circumsphere cache are rebuilt.
//!
//! All points of a batch see the same snapshot. When two of them invalidate
//! overlapping tetrahedra, whichever is merged first removes them; the other
//! finds them already gone (counted as stale) but is still stitched to the
//! boundary of its full snapshot cavity, so every inserted point becomes a
//! vertex. The resulting tetrahedra can overlap and depend on merge order.
//! Separate batches do not interfere because the cache is rebuilt in
//! between; inserting one point per batch gives an exact Delaunay
//! triangulation.

use super::cavity::{boundary_faces, stitch};
use super::dedup::dedup_points;
use super::diagnostics::{BatchReport, Diagnostics, Phase, TriangulationEvent};
use crate::config::TriangulationConfig;
use crate::errors::DelaunayResult;
use crate::geometry::circumsphere::{Circumsphere, CircumsphereCache};
use crate::geometry::kd_tree::KdTree;
use crate::geometry::point::{Point, Tetrahedron, TetrahedronKey};
use crate::geometry::traits::TriangulationQuery;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// The four corners of the super-tetrahedron for radius `r`.
#[must_use]
pub const fn super_tetrahedron_vertices(r: f64) -> [Point; 4] {
    [
        Point::new(-r, -r, -r),
        Point::new(r, -r, -r),
        Point::new(0.0, r, -r),
        Point::new(0.0, 0.0, r),
    ]
}

/// Incremental 3D Delaunay triangulation.
#[derive(Debug, Clone)]
pub struct Delaunay3D {
    points: Vec<Point>,
    tetrahedra: Vec<Tetrahedron>,
    cache: CircumsphereCache,
    index: KdTree,
    super_vertices: [Point; 4],
    config: TriangulationConfig,
    phase: Phase,
    diagnostics: Diagnostics,
    metadata: TriangulationMetadata,
}

/// Bookkeeping about a triangulation's lifetime.
#[derive(Debug, Clone)]
pub struct TriangulationMetadata {
    /// Time when this triangulation was created
    pub creation_time: Instant,
    /// Time of last structural change
    pub last_modified: Instant,
    /// Count of structural changes (batches and finalization)
    pub modification_count: u64,
    /// History of events
    pub history: Vec<TriangulationEvent>,
}

impl TriangulationMetadata {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            creation_time: now,
            last_modified: now,
            modification_count: 0,
            history: Vec::new(),
        }
    }

    fn touch(&mut self, event: TriangulationEvent) {
        self.last_modified = Instant::now();
        self.modification_count += 1;
        self.history.push(event);
    }
}

/// A point and the snapshot indices of the tetrahedra it invalidates.
#[derive(Debug)]
struct Candidate {
    point: Point,
    bad: Vec<usize>,
}

/// State mutated by the serialized merge of one batch.
struct Merge<'a> {
    points: &'a mut Vec<Point>,
    tetrahedra: &'a mut Vec<Tetrahedron>,
    snapshot: &'a [Tetrahedron],
    report: BatchReport,
}

impl Merge<'_> {
    fn apply(&mut self, candidate: Candidate) {
        let Candidate { point, bad } = candidate;
        self.points.push(point);
        self.report.inserted += 1;

        // The cavity is always the snapshot bad set; only its still-live
        // members can be removed.
        let cavity: Vec<Tetrahedron> = bad.iter().map(|&index| self.snapshot[index]).collect();
        let wanted: HashSet<TetrahedronKey> = cavity.iter().map(Tetrahedron::key).collect();
        let before = self.tetrahedra.len();
        self.tetrahedra
            .retain(|tetrahedron| !wanted.contains(&tetrahedron.key()));
        let removed = before - self.tetrahedra.len();

        self.report.stale_tetrahedra += wanted.len().saturating_sub(removed);
        self.report.tetrahedra_removed += removed;

        let stitched = stitch(&boundary_faces(&cavity), point);
        self.report.tetrahedra_created += stitched.created.len();
        self.report.degenerate_rejected += stitched.rejected;
        self.tetrahedra.extend(stitched.created);
    }
}

impl Delaunay3D {
    /// Creates a triangulation seeded with a super-tetrahedron of the given
    /// radius and default tolerances.
    ///
    /// The radius is not validated; use [`Delaunay3D::with_config`] for that.
    #[must_use]
    pub fn new(radius: f64) -> Self {
        Self::seeded(TriangulationConfig::new(radius))
    }

    /// Creates a triangulation from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DelaunayError::InvalidParameters`] if the configuration
    /// is invalid.
    pub fn with_config(config: TriangulationConfig) -> DelaunayResult<Self> {
        config.validate()?;
        Ok(Self::seeded(config))
    }

    fn seeded(config: TriangulationConfig) -> Self {
        let super_vertices = super_tetrahedron_vertices(config.radius);
        let [a, b, c, d] = super_vertices;

        let mut engine = Self {
            points: super_vertices.to_vec(),
            tetrahedra: vec![Tetrahedron::new(a, b, c, d)],
            cache: CircumsphereCache::new(config.degeneracy_threshold),
            index: KdTree::new(),
            super_vertices,
            config,
            phase: Phase::Seeded,
            diagnostics: Diagnostics::default(),
            metadata: TriangulationMetadata::new(),
        };
        engine.rebuild_index();
        engine.rebuild_cache();
        engine.metadata.history.push(TriangulationEvent::Created {
            radius: config.radius,
        });

        log::debug!("Seeded super-tetrahedron with radius {}", config.radius);
        engine
    }

    /// Inserts a batch of points.
    ///
    /// Duplicates (same grid cell) are dropped, points outside every
    /// circumsphere are skipped, and the remaining points are inserted with
    /// parallel discovery and a serialized merge. The index and cache are
    /// rebuilt afterwards. Never fails; see the returned report for what was
    /// absorbed.
    pub fn add_points_batch(&mut self, new_points: &[Point]) -> BatchReport {
        let started = Instant::now();
        if self.phase == Phase::Finalized {
            log::warn!(
                "Inserting {} points after finalization; no enclosing super-tetrahedron remains",
                new_points.len()
            );
        }

        let deduplicated = dedup_points(new_points, self.config.tolerance);
        let unique_count = deduplicated.unique.len();
        log::debug!(
            "Batch of {} points, {} unique after deduplication",
            new_points.len(),
            unique_count
        );

        let snapshot = self.tetrahedra.clone();
        let tolerance = self.config.tolerance;
        let parallel = self.config.parallel;
        let cache = &self.cache;
        let discover = |point: &Point| {
            let bad = cache.containing(point, tolerance);
            (!bad.is_empty()).then(|| Candidate { point: *point, bad })
        };

        let mut merge = Mutex::new(Merge {
            points: &mut self.points,
            tetrahedra: &mut self.tetrahedra,
            snapshot: &snapshot,
            report: BatchReport {
                submitted: new_points.len(),
                duplicates_dropped: deduplicated.dropped,
                ..BatchReport::default()
            },
        });

        if parallel {
            deduplicated
                .unique
                .par_iter()
                .fold(Vec::new, |mut found, point| {
                    found.extend(discover(point));
                    found
                })
                .for_each(|found| {
                    let mut merge = merge.lock().unwrap_or_else(PoisonError::into_inner);
                    for candidate in found {
                        merge.apply(candidate);
                    }
                });
        } else {
            let merge = merge.get_mut().unwrap_or_else(PoisonError::into_inner);
            for candidate in deduplicated.unique.iter().filter_map(discover) {
                merge.apply(candidate);
            }
        }

        let mut report = merge
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .report;
        report.unplaced_points = unique_count - report.inserted;

        self.rebuild_index();
        report.infinite_spheres = self.rebuild_cache();

        if self.phase == Phase::Seeded {
            self.phase = Phase::Growing;
        }
        self.diagnostics.record_batch(&report);
        let elapsed = started.elapsed();
        self.metadata.touch(TriangulationEvent::BatchInserted {
            batch: self.diagnostics.batches,
            report: report.clone(),
            elapsed,
        });

        log::info!(
            "Batch {}: inserted {} of {} points ({} duplicates, {} unplaced), {} tetrahedra in {:?}",
            self.diagnostics.batches,
            report.inserted,
            report.submitted,
            report.duplicates_dropped,
            report.unplaced_points,
            self.tetrahedra.len(),
            elapsed
        );
        if report.stale_tetrahedra > 0 {
            log::debug!(
                "{} bad tetrahedra were already consumed within the batch",
                report.stale_tetrahedra
            );
        }

        report
    }

    /// Inserts a single point as its own batch.
    pub fn insert_point(&mut self, point: Point) -> BatchReport {
        self.add_points_batch(&[point])
    }

    /// Inserts `points` in consecutive batches of at most `batch_size` points
    /// and returns the combined report. A `batch_size` of 0 is treated as 1.
    pub fn add_points_in_batches(&mut self, points: &[Point], batch_size: usize) -> BatchReport {
        let mut total = BatchReport::default();
        for chunk in points.chunks(batch_size.max(1)) {
            total.absorb(&self.add_points_batch(chunk));
        }
        total
    }

    /// Removes every tetrahedron touching a super-tetrahedron vertex and
    /// rebuilds the circumsphere cache. The super vertices stay in the point
    /// list. Returns the number of tetrahedra removed.
    pub fn remove_super_tetrahedron(&mut self) -> usize {
        let super_vertices = self.super_vertices;
        let before = self.tetrahedra.len();
        self.tetrahedra
            .retain(|t| !super_vertices.iter().any(|v| t.contains_vertex(v)));
        let removed = before - self.tetrahedra.len();

        self.rebuild_cache();
        self.phase = Phase::Finalized;
        self.metadata
            .touch(TriangulationEvent::Finalized { removed });

        log::info!(
            "Removed {removed} super-tetrahedron tetrahedra, {} remain",
            self.tetrahedra.len()
        );
        removed
    }

    /// Closest point in the spatial index, or `query` itself if the index is
    /// empty.
    #[must_use]
    pub fn nearest_point(&self, query: &Point) -> Point {
        self.index.find_nearest(query)
    }

    fn rebuild_index(&mut self) {
        self.index.build(self.points.clone());
    }

    fn rebuild_cache(&mut self) -> usize {
        let infinite = self.cache.rebuild(&self.tetrahedra, self.config.parallel);
        self.diagnostics.record_rebuild(infinite);
        if infinite > 0 {
            log::debug!("{infinite} tetrahedra have no trustworthy circumsphere");
        }
        infinite
    }

    /// All points, starting with the four super-tetrahedron vertices.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// All tetrahedra.
    #[must_use]
    pub fn tetrahedra(&self) -> &[Tetrahedron] {
        &self.tetrahedra
    }

    /// Circumspheres, index-aligned with [`Delaunay3D::tetrahedra`].
    #[must_use]
    pub fn circumspheres(&self) -> &[Circumsphere] {
        self.cache.entries()
    }

    /// The four super-tetrahedron vertices.
    #[must_use]
    pub const fn super_vertices(&self) -> &[Point; 4] {
        &self.super_vertices
    }

    /// Super-tetrahedron radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.config.radius
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &TriangulationConfig {
        &self.config
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Cumulative counters.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Creation time, modification count and event history.
    #[must_use]
    pub const fn metadata(&self) -> &TriangulationMetadata {
        &self.metadata
    }

    /// Event history.
    #[must_use]
    pub fn history(&self) -> &[TriangulationEvent] {
        &self.metadata.history
    }
}

impl TriangulationQuery for Delaunay3D {
    fn points(&self) -> &[Point] {
        &self.points
    }

    fn tetrahedra(&self) -> &[Tetrahedron] {
        &self.tetrahedra
    }
}

//! Insertion reports, cumulative counters and event history.
//!
//! Nothing here is fatal. The engine absorbs duplicate input, degenerate
//! candidates and flat tetrahedra numerically and records them so callers
//! can see what happened.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle phase of a triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Only the super-tetrahedron exists
    Seeded,
    /// At least one batch has been inserted
    Growing,
    /// Tetrahedra touching the super-tetrahedron have been removed
    Finalized,
}

/// Outcome of a single batch insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Points handed in by the caller
    pub submitted: usize,
    /// Points dropped by grid deduplication
    pub duplicates_dropped: usize,
    /// Points added to the point list
    pub inserted: usize,
    /// Points no circumsphere contained; these are not inserted
    pub unplaced_points: usize,
    /// Tetrahedra removed while carving cavities
    pub tetrahedra_removed: usize,
    /// Tetrahedra created while stitching cavities
    pub tetrahedra_created: usize,
    /// Stitching candidates discarded for repeating a vertex
    pub degenerate_rejected: usize,
    /// Bad tetrahedra already consumed by an earlier point of the same batch
    pub stale_tetrahedra: usize,
    /// Unbounded circumspheres in the cache after the batch
    pub infinite_spheres: usize,
}

impl BatchReport {
    /// Adds `other`'s counts into `self`.
    ///
    /// `infinite_spheres` takes `other`'s value since it describes the cache
    /// state after the latest batch.
    pub const fn absorb(&mut self, other: &Self) {
        self.submitted += other.submitted;
        self.duplicates_dropped += other.duplicates_dropped;
        self.inserted += other.inserted;
        self.unplaced_points += other.unplaced_points;
        self.tetrahedra_removed += other.tetrahedra_removed;
        self.tetrahedra_created += other.tetrahedra_created;
        self.degenerate_rejected += other.degenerate_rejected;
        self.stale_tetrahedra += other.stale_tetrahedra;
        self.infinite_spheres = other.infinite_spheres;
    }
}

/// Counters accumulated over the lifetime of a triangulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Batches inserted
    pub batches: u64,
    /// Points dropped by deduplication
    pub duplicates_dropped: u64,
    /// Stitching candidates discarded for repeating a vertex
    pub degenerate_rejected: u64,
    /// Unbounded circumspheres produced, summed over every cache rebuild
    pub infinite_spheres: u64,
    /// Points outside every circumsphere
    pub unplaced_points: u64,
    /// Bad tetrahedra consumed by an earlier point of the same batch
    pub stale_tetrahedra: u64,
}

impl Diagnostics {
    /// Folds a finished batch into the totals.
    pub fn record_batch(&mut self, report: &BatchReport) {
        self.batches += 1;
        self.duplicates_dropped += report.duplicates_dropped as u64;
        self.degenerate_rejected += report.degenerate_rejected as u64;
        self.unplaced_points += report.unplaced_points as u64;
        self.stale_tetrahedra += report.stale_tetrahedra as u64;
    }

    /// Records the outcome of a cache rebuild.
    pub fn record_rebuild(&mut self, infinite_spheres: usize) {
        self.infinite_spheres += infinite_spheres as u64;
    }
}

/// Events in a triangulation's history
#[derive(Debug, Clone, PartialEq)]
pub enum TriangulationEvent {
    /// The super-tetrahedron was seeded
    Created {
        /// Super-tetrahedron radius
        radius: f64,
    },
    /// A batch was inserted
    BatchInserted {
        /// Batch number, starting at 1
        batch: u64,
        /// Counts for the batch
        report: BatchReport,
        /// Wall time spent on the batch
        elapsed: Duration,
    },
    /// Super-tetrahedron tetrahedra were removed
    Finalized {
        /// Number of tetrahedra removed
        removed: usize,
    },
}

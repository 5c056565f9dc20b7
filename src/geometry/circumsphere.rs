//! Circumspheres of tetrahedra and the per-tetrahedron cache.
//!
//! The cache holds exactly one entry per tetrahedron, in the same order as the
//! tetrahedron list it was built from. It is always rebuilt wholesale.

use crate::geometry::point::{Point, Tetrahedron};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Below this magnitude of `2 · ab·(ac×ad)` a tetrahedron is treated as flat.
pub const DEGENERACY_THRESHOLD: f64 = 1e-6;

/// Center and radius of the sphere through a tetrahedron's four corners.
///
/// A tetrahedron too flat to have a trustworthy sphere gets the sentinel
/// `(origin, +inf)`, which contains every point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circumsphere {
    /// Sphere center
    pub center: Point,
    /// Sphere radius, `+inf` for degenerate tetrahedra
    pub radius: f64,
}

impl Circumsphere {
    /// The sentinel sphere for degenerate tetrahedra.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            center: Point::origin(),
            radius: f64::INFINITY,
        }
    }

    /// Computes the circumsphere using the default degeneracy threshold.
    #[must_use]
    pub fn of(tetrahedron: &Tetrahedron) -> Self {
        Self::with_threshold(tetrahedron, DEGENERACY_THRESHOLD)
    }

    /// Computes the circumsphere, falling back to [`Circumsphere::unbounded`]
    /// when `|2 · ab·(ac×ad)| < threshold`.
    #[must_use]
    pub fn with_threshold(tetrahedron: &Tetrahedron, threshold: f64) -> Self {
        let [a, b, c, d] = tetrahedron.vertices.map(Point::to_dvec3);
        let ab = b - a;
        let ac = c - a;
        let ad = d - a;

        let cross_ac_ad = ac.cross(ad);
        let cross_ad_ab = ad.cross(ab);
        let cross_ab_ac = ab.cross(ac);

        let denom = 2.0 * ab.dot(cross_ac_ad);
        if denom.abs() < threshold {
            return Self::unbounded();
        }

        let offset = (ab.length_squared() * cross_ac_ad
            + ac.length_squared() * cross_ad_ab
            + ad.length_squared() * cross_ab_ac)
            / denom;

        Self {
            center: Point::from(a + offset),
            radius: offset.length(),
        }
    }

    /// Returns true for the degenerate sentinel.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.radius.is_infinite()
    }

    /// Containment within `tolerance`; the sentinel contains everything.
    #[must_use]
    pub fn contains(&self, point: &Point, tolerance: f64) -> bool {
        self.is_unbounded() || point.distance(&self.center) <= self.radius + tolerance
    }
}

/// One [`Circumsphere`] per tetrahedron, index-aligned with the tetrahedron list.
#[derive(Debug, Clone)]
pub struct CircumsphereCache {
    entries: Vec<Circumsphere>,
    threshold: f64,
}

impl CircumsphereCache {
    /// Creates an empty cache with the given degeneracy threshold.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            entries: Vec::new(),
            threshold,
        }
    }

    /// Recomputes every entry from `tetrahedra`, replacing the previous
    /// contents. Entries are independent, so `parallel` only changes speed.
    ///
    /// Returns the number of degenerate (unbounded) entries.
    pub fn rebuild(&mut self, tetrahedra: &[Tetrahedron], parallel: bool) -> usize {
        let threshold = self.threshold;
        self.entries = if parallel {
            tetrahedra
                .par_iter()
                .map(|t| Circumsphere::with_threshold(t, threshold))
                .collect()
        } else {
            tetrahedra
                .iter()
                .map(|t| Circumsphere::with_threshold(t, threshold))
                .collect()
        };
        self.degenerate_count()
    }

    /// Indices of every entry whose sphere contains `point` within `tolerance`.
    #[must_use]
    pub fn containing(&self, point: &Point, tolerance: f64) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, sphere)| sphere.contains(point, tolerance))
            .map(|(index, _)| index)
            .collect()
    }

    /// Number of unbounded entries.
    #[must_use]
    pub fn degenerate_count(&self) -> usize {
        self.entries.iter().filter(|s| s.is_unbounded()).count()
    }

    /// All entries.
    #[must_use]
    pub fn entries(&self) -> &[Circumsphere] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

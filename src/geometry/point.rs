//! Points, faces and tetrahedra.
//!
//! Points compare approximately (component-wise within [`EPSILON`]) and order
//! lexicographically on `(x, y, z)`. The ordering only exists to put vertex
//! lists into a canonical order; it carries no geometric meaning.
//!
//! Faces and tetrahedra additionally expose exact hashing keys built from the
//! coordinate bit patterns. Vertices shared between neighbouring tetrahedra
//! are copies of the same `Point`, so exact keys are enough to match them.

use float_ord::FloatOrd;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Tolerance for approximate point equality and circumsphere containment.
pub const EPSILON: f64 = 1e-6;

/// A point in 3D space.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    /// x coordinate
    pub x: f64,
    /// y coordinate
    pub y: f64,
    /// z coordinate
    pub z: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Coordinate along `axis` (0 = x, 1 = y, anything else = z).
    #[must_use]
    pub const fn coord(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Converts to a `glam` vector.
    #[must_use]
    pub const fn to_dvec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        self.to_dvec3().distance_squared(other.to_dvec3())
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.to_dvec3().distance(other.to_dvec3())
    }

    /// Component-wise comparison within `tolerance`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance
            && (self.y - other.y).abs() < tolerance
            && (self.z - other.z).abs() < tolerance
    }

    /// Lexicographic comparison on `(x, y, z)` with a total float order.
    #[must_use]
    pub fn lex_cmp(&self, other: &Self) -> Ordering {
        (FloatOrd(self.x), FloatOrd(self.y), FloatOrd(self.z)).cmp(&(
            FloatOrd(other.x),
            FloatOrd(other.y),
            FloatOrd(other.z),
        ))
    }

    /// Returns true if all coordinates are finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Exact hashing key for this point.
    #[must_use]
    pub fn key(&self) -> PointKey {
        PointKey([bits(self.x), bits(self.y), bits(self.z)])
    }
}

// -0.0 and 0.0 must hash alike.
fn bits(value: f64) -> u64 {
    if value == 0.0 { 0.0_f64.to_bits() } else { value.to_bits() }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, EPSILON)
    }
}

impl From<[f64; 3]> for Point {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<(f64, f64, f64)> for Point {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<DVec3> for Point {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Exact, hashable identity of a point's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey([u64; 3]);

/// Canonical identity of a triangular face, independent of winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceKey([PointKey; 3]);

/// Canonical identity of a tetrahedron, independent of vertex order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TetrahedronKey([PointKey; 4]);

/// A triangular face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// The three corners
    pub vertices: [Point; 3],
}

impl Face {
    /// Creates a face from three points.
    #[must_use]
    pub const fn new(a: Point, b: Point, c: Point) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Canonical key: vertices sorted lexicographically.
    #[must_use]
    pub fn key(&self) -> FaceKey {
        let mut sorted = self.vertices;
        sorted.sort_by(Point::lex_cmp);
        FaceKey(sorted.map(|p| p.key()))
    }

    /// Returns true if `point` is approximately one of the corners.
    #[must_use]
    pub fn contains_vertex(&self, point: &Point) -> bool {
        self.vertices.iter().any(|v| v == point)
    }
}

/// A tetrahedron given by its four corner points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tetrahedron {
    /// The four corners
    pub vertices: [Point; 4],
}

impl Tetrahedron {
    /// Creates a tetrahedron from four points.
    #[must_use]
    pub const fn new(a: Point, b: Point, c: Point, d: Point) -> Self {
        Self {
            vertices: [a, b, c, d],
        }
    }

    /// The four triangular faces.
    #[must_use]
    pub const fn faces(&self) -> [Face; 4] {
        let [a, b, c, d] = self.vertices;
        [
            Face::new(a, b, c),
            Face::new(a, b, d),
            Face::new(a, c, d),
            Face::new(b, c, d),
        ]
    }

    /// Vertices in lexicographic order.
    #[must_use]
    pub fn sorted_vertices(&self) -> [Point; 4] {
        let mut sorted = self.vertices;
        sorted.sort_by(Point::lex_cmp);
        sorted
    }

    /// Canonical key: vertices sorted lexicographically.
    #[must_use]
    pub fn key(&self) -> TetrahedronKey {
        TetrahedronKey(self.sorted_vertices().map(|p| p.key()))
    }

    /// Returns true if no two corners are approximately equal.
    #[must_use]
    pub fn has_distinct_vertices(&self) -> bool {
        let v = &self.vertices;
        (0..4).all(|i| (i + 1..4).all(|j| v[i] != v[j]))
    }

    /// Returns true if `point` is approximately one of the corners.
    #[must_use]
    pub fn contains_vertex(&self, point: &Point) -> bool {
        self.vertices.iter().any(|v| v == point)
    }

    /// Signed volume; positive when `d` lies on the side of `abc` that its
    /// right-handed normal points to.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let [a, b, c, d] = self.vertices.map(Point::to_dvec3);
        (b - a).dot((c - a).cross(d - a)) / 6.0
    }

    /// Unsigned volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }
}

impl PartialEq for Tetrahedron {
    fn eq(&self, other: &Self) -> bool {
        self.sorted_vertices() == other.sorted_vertices()
    }
}

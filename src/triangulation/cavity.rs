//! Cavity boundary extraction and re-stitching.
//!
//! Removing the bad tetrahedra for a new point leaves a cavity. Faces shared
//! by two removed tetrahedra are interior to it; faces seen exactly once form
//! its boundary, and each boundary face joined to the new point becomes a new
//! tetrahedron.

use crate::geometry::point::{Face, FaceKey, Point, Tetrahedron};
use std::collections::HashMap;

/// Faces appearing exactly once among `cavity`'s faces, in first-seen order.
#[must_use]
pub fn boundary_faces(cavity: &[Tetrahedron]) -> Vec<Face> {
    let mut counts: HashMap<FaceKey, usize> = HashMap::new();
    let mut order: Vec<(FaceKey, Face)> = Vec::new();

    for tetrahedron in cavity {
        for face in tetrahedron.faces() {
            let key = face.key();
            let count = counts.entry(key).or_insert(0);
            if *count == 0 {
                order.push((key, face));
            }
            *count += 1;
        }
    }

    order
        .into_iter()
        .filter(|(key, _)| counts.get(key) == Some(&1))
        .map(|(_, face)| face)
        .collect()
}

/// New tetrahedra from joining boundary faces to an apex.
#[derive(Debug, Clone, Default)]
pub struct Stitched {
    /// Accepted tetrahedra
    pub created: Vec<Tetrahedron>,
    /// Candidates discarded for repeating a vertex
    pub rejected: usize,
}

/// Joins every face in `boundary` to `apex`, discarding candidates whose four
/// vertices are not pairwise distinct.
#[must_use]
pub fn stitch(boundary: &[Face], apex: Point) -> Stitched {
    let mut stitched = Stitched::default();

    for face in boundary {
        let [a, b, c] = face.vertices;
        let candidate = Tetrahedron::new(a, b, c, apex);
        if face.contains_vertex(&apex) || !candidate.has_distinct_vertices() {
            log::trace!("Rejected degenerate tetrahedron {candidate:?}");
            stitched.rejected += 1;
        } else {
            stitched.created.push(candidate);
        }
    }

    stitched
}

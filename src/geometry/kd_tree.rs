//! Static k-d tree for nearest-neighbour queries.
//!
//! Nodes live in a flat arena and refer to their children by arena position,
//! so the whole tree is dropped or rebuilt by replacing one `Vec`. The tree is
//! never updated incrementally: [`KdTree::build`] always starts from scratch.

use crate::geometry::point::Point;

/// A node of the k-d tree.
#[derive(Debug, Clone, Copy)]
struct KdNode {
    point: Point,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// Arena-backed 3D k-d tree.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl KdTree {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Creates a tree over `points`.
    #[must_use]
    pub fn from_points(points: Vec<Point>) -> Self {
        let mut tree = Self::new();
        tree.build(points);
        tree
    }

    /// Rebuilds the tree from scratch over `points`, discarding prior state.
    ///
    /// The splitting axis cycles x, y, z with depth. Each level picks its
    /// median with a linear-time selection rather than a full sort.
    pub fn build(&mut self, mut points: Vec<Point>) {
        self.nodes.clear();
        self.nodes.reserve(points.len());
        self.root = self.build_subtree(&mut points, 0);
    }

    fn build_subtree(&mut self, points: &mut [Point], depth: usize) -> Option<usize> {
        if points.is_empty() {
            return None;
        }

        let axis = depth % 3;
        let mid = points.len() / 2;
        points.select_nth_unstable_by(mid, |a, b| a.coord(axis).total_cmp(&b.coord(axis)));

        let index = self.nodes.len();
        self.nodes.push(KdNode {
            point: points[mid],
            axis,
            left: None,
            right: None,
        });

        let (left, rest) = points.split_at_mut(mid);
        let right = &mut rest[1..];
        self.nodes[index].left = self.build_subtree(left, depth + 1);
        self.nodes[index].right = self.build_subtree(right, depth + 1);

        Some(index)
    }

    /// Returns the indexed point closest to `query`, or `query` itself when
    /// the tree is empty.
    ///
    /// The fallback cannot be told apart from an exact hit; use
    /// [`KdTree::nearest`] when the empty case matters.
    #[must_use]
    pub fn find_nearest(&self, query: &Point) -> Point {
        self.nearest(query).unwrap_or(*query)
    }

    /// Returns the indexed point closest to `query`, or `None` when empty.
    #[must_use]
    pub fn nearest(&self, query: &Point) -> Option<Point> {
        let root = self.root?;
        let mut best = self.nodes[root].point;
        let mut best_distance_squared = f64::INFINITY;
        self.search(Some(root), query, &mut best, &mut best_distance_squared);
        Some(best)
    }

    fn search(
        &self,
        node: Option<usize>,
        query: &Point,
        best: &mut Point,
        best_distance_squared: &mut f64,
    ) {
        let Some(index) = node else {
            return;
        };
        let node = &self.nodes[index];

        let distance_squared = query.distance_squared(&node.point);
        if distance_squared < *best_distance_squared {
            *best_distance_squared = distance_squared;
            *best = node.point;
        }

        let diff = query.coord(node.axis) - node.point.coord(node.axis);
        let (near, far) = if diff <= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.search(near, query, best, best_distance_squared);
        if diff * diff < *best_distance_squared {
            self.search(far, query, best, best_distance_squared);
        }
    }

    /// Number of indexed points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the tree (0 when empty).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.subtree_depth(self.root)
    }

    fn subtree_depth(&self, node: Option<usize>) -> usize {
        node.map_or(0, |index| {
            let node = &self.nodes[index];
            1 + self
                .subtree_depth(node.left)
                .max(self.subtree_depth(node.right))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngExt, SeedableRng};

    fn brute_force_nearest(points: &[Point], query: &Point) -> Point {
        let mut best = points[0];
        for p in points {
            if query.distance_squared(p) < query.distance_squared(&best) {
                best = *p;
            }
        }
        best
    }

    #[test]
    fn test_empty_tree_returns_query() {
        let tree = KdTree::new();
        let query = Point::new(1.0, 2.0, 3.0);
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.find_nearest(&query), query);
        assert!(tree.nearest(&query).is_none());
    }

    #[test]
    fn test_single_point() {
        let only = Point::new(5.0, 5.0, 5.0);
        let tree = KdTree::from_points(vec![only]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.find_nearest(&Point::new(-100.0, 0.0, 100.0)), only);
    }

    #[test]
    fn test_axis_aligned_queries() {
        let points = vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(-1.0, 0.0, 0.0),
        ];
        let tree = KdTree::from_points(points.clone());

        assert_eq!(tree.find_nearest(&Point::new(0.9, 0.1, 0.0)), points[0]);
        assert_eq!(tree.find_nearest(&Point::new(0.0, 0.95, 0.0)), points[1]);
        assert_eq!(tree.find_nearest(&Point::new(0.0, 0.1, 0.9)), points[2]);
        assert_eq!(tree.find_nearest(&Point::new(-0.8, 0.0, 0.0)), points[3]);
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let points: Vec<Point> = (0..500)
            .map(|_| {
                Point::new(
                    rng.random_range(-10.0..10.0),
                    rng.random_range(-10.0..10.0),
                    rng.random_range(-10.0..10.0),
                )
            })
            .collect();
        let tree = KdTree::from_points(points.clone());

        for _ in 0..200 {
            let query = Point::new(
                rng.random_range(-12.0..12.0),
                rng.random_range(-12.0..12.0),
                rng.random_range(-12.0..12.0),
            );
            let expected = brute_force_nearest(&points, &query);
            let found = tree.find_nearest(&query);
            assert!(
                (query.distance(&found) - query.distance(&expected)).abs() < 1e-12,
                "k-d tree returned {found:?}, brute force {expected:?} for {query:?}"
            );
        }
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut tree = KdTree::from_points(vec![Point::new(0.0, 0.0, 0.0)]);
        tree.build(vec![Point::new(10.0, 0.0, 0.0), Point::new(20.0, 0.0, 0.0)]);
        assert_eq!(tree.len(), 2);
        assert_eq!(
            tree.find_nearest(&Point::new(0.0, 0.0, 0.0)),
            Point::new(10.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_tree_is_balanced() {
        let points: Vec<Point> = (0..1023)
            .map(|i| Point::new(f64::from(i), f64::from(i % 7), f64::from(i % 13)))
            .collect();
        let tree = KdTree::from_points(points);
        assert_eq!(tree.len(), 1023);
        assert_eq!(tree.depth(), 10);
    }
}

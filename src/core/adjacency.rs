//! Directed edge-adjacency analysis.
//!
//! [`EdgeAdjacency`] derives, from a face list, the mapping from each
//! *directed* edge (an ordered vertex-index pair induced by one side of one
//! face) to the faces that produced it in that direction. Every higher
//! component uses it: boundary-chain extraction walks the unmatched directed
//! edges, the orientation repair compares shared-edge directions, and tests
//! verify hull manifoldness with it.
//!
//! The central invariant it checks: in a correctly oriented, closed
//! 2-manifold, each directed edge occurs exactly once across all faces, and
//! its reverse also occurs exactly once (owned by the neighboring face).
//!
//! Construction is a single pass over the faces; all queries are lookups.
//! Pure analysis — nothing here mutates a mesh.

use crate::core::collections::{FastHashMap, SmallBuffer, fast_hash_map_with_capacity};

/// Classification of an undirected edge by the number of incident faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Exactly one incident face: the edge lies on a mesh boundary (a "gap").
    Boundary,
    /// Exactly two incident faces. The two may traverse the edge in the same
    /// direction, which means the faces are inconsistently wound but the edge
    /// is still combinatorially manifold.
    Manifold,
    /// Three or more incident faces: the mesh is invalid for this crate's
    /// repair operations.
    NonManifold,
}

/// Mapping from directed edges to the faces that own them.
///
/// # Examples
///
/// ```rust
/// use polyhull::core::adjacency::EdgeAdjacency;
///
/// // Two triangles sharing the edge (1, 2), consistently wound.
/// let faces = vec![[0, 1, 2], [2, 1, 3]];
/// let adjacency = EdgeAdjacency::from_faces(&faces);
///
/// assert_eq!(adjacency.boundary_directed_edges().count(), 4);
/// assert!(!adjacency.has_nonmanifold_edges());
/// assert!(!adjacency.is_closed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EdgeAdjacency {
    /// Directed edge `(tail, head)` → indices of the faces traversing it in
    /// that direction. At most one entry per direction in a consistently
    /// wound manifold; the buffer spills only on invalid input.
    directed: FastHashMap<(usize, usize), SmallBuffer<usize, 2>>,
}

impl EdgeAdjacency {
    /// Builds the adjacency mapping from a face list in O(F).
    #[must_use]
    pub fn from_faces(faces: &[[usize; 3]]) -> Self {
        let mut directed: FastHashMap<(usize, usize), SmallBuffer<usize, 2>> =
            fast_hash_map_with_capacity(faces.len() * 3);

        for (face_index, &[a, b, c]) in faces.iter().enumerate() {
            for edge in [(a, b), (b, c), (c, a)] {
                directed.entry(edge).or_default().push(face_index);
            }
        }

        Self { directed }
    }

    /// Faces that traverse the edge `tail → head` in exactly that direction.
    #[inline]
    #[must_use]
    pub fn directed_faces(&self, tail: usize, head: usize) -> &[usize] {
        self.directed
            .get(&(tail, head))
            .map_or(&[], SmallBuffer::as_slice)
    }

    /// Total number of face sides incident to the undirected edge `{u, v}`,
    /// counting both directions.
    #[inline]
    #[must_use]
    pub fn undirected_count(&self, u: usize, v: usize) -> usize {
        self.directed_faces(u, v).len() + self.directed_faces(v, u).len()
    }

    /// Classifies the undirected edge `{u, v}`, or `None` if no face touches
    /// it.
    #[must_use]
    pub fn classify(&self, u: usize, v: usize) -> Option<EdgeKind> {
        match self.undirected_count(u, v) {
            0 => None,
            1 => Some(EdgeKind::Boundary),
            2 => Some(EdgeKind::Manifold),
            _ => Some(EdgeKind::NonManifold),
        }
    }

    /// Is `{u, v}` incident to exactly one face?
    #[inline]
    #[must_use]
    pub fn is_boundary_edge(&self, u: usize, v: usize) -> bool {
        self.classify(u, v) == Some(EdgeKind::Boundary)
    }

    /// Is `{u, v}` incident to exactly two faces (in any direction
    /// combination)?
    #[inline]
    #[must_use]
    pub fn is_manifold_edge(&self, u: usize, v: usize) -> bool {
        self.classify(u, v) == Some(EdgeKind::Manifold)
    }

    /// Is `{u, v}` incident to three or more faces?
    #[inline]
    #[must_use]
    pub fn is_nonmanifold_edge(&self, u: usize, v: usize) -> bool {
        self.classify(u, v) == Some(EdgeKind::NonManifold)
    }

    /// Does any undirected edge have three or more incident faces?
    #[must_use]
    pub fn has_nonmanifold_edges(&self) -> bool {
        self.first_nonmanifold_edge().is_some()
    }

    /// The first non-manifold undirected edge found, with its total incident
    /// face count, if any. Which edge is reported first is unspecified.
    #[must_use]
    pub fn first_nonmanifold_edge(&self) -> Option<((usize, usize), usize)> {
        self.directed.keys().find_map(|&(u, v)| {
            let count = self.undirected_count(u, v);
            (count >= 3).then_some(((u, v), count))
        })
    }

    /// `true` when the mesh has no boundary edges (every undirected edge has
    /// at least two incident faces). A closed *manifold* additionally
    /// requires [`Self::has_nonmanifold_edges`] to be `false`.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.directed
            .keys()
            .all(|&(u, v)| self.undirected_count(u, v) != 1)
    }

    /// `true` when every directed edge occurs exactly once and its reverse is
    /// also present exactly once — the winding invariant of a consistently
    /// oriented closed 2-manifold.
    #[must_use]
    pub fn is_consistently_wound(&self) -> bool {
        self.directed.iter().all(|(&(tail, head), faces)| {
            faces.len() == 1 && self.directed_faces(head, tail).len() == 1
        })
    }

    /// Iterator over directed edges whose undirected edge is a boundary edge.
    pub fn boundary_directed_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.directed
            .keys()
            .copied()
            .filter(|&(u, v)| self.undirected_count(u, v) == 1)
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn undirected_edge_count(&self) -> usize {
        self.directed
            .keys()
            .filter(|&&(u, v)| u < v || !self.directed.contains_key(&(v, u)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> Vec<[usize; 3]> {
        vec![[0, 1, 2]]
    }

    fn two_triangles_consistent() -> Vec<[usize; 3]> {
        // Share undirected edge {1, 2}; traversed 1→2 and 2→1.
        vec![[0, 1, 2], [2, 1, 3]]
    }

    fn two_triangles_inconsistent() -> Vec<[usize; 3]> {
        // Both traverse the shared edge 1→2: same-direction winding clash.
        vec![[0, 1, 2], [1, 2, 3]]
    }

    fn fan_of_three() -> Vec<[usize; 3]> {
        // Three faces around the edge (0, 1): non-manifold.
        vec![[0, 1, 2], [0, 1, 3], [0, 1, 4]]
    }

    fn tetrahedron() -> Vec<[usize; 3]> {
        vec![[0, 1, 2], [0, 3, 1], [1, 3, 2], [0, 2, 3]]
    }

    #[test]
    fn build_single_triangle() {
        let adjacency = EdgeAdjacency::from_faces(&single_triangle());

        assert_eq!(adjacency.undirected_edge_count(), 3);
        assert_eq!(adjacency.boundary_directed_edges().count(), 3);
        assert!(!adjacency.is_closed());
        assert!(!adjacency.has_nonmanifold_edges());
    }

    #[test]
    fn directed_faces_lookup() {
        let adjacency = EdgeAdjacency::from_faces(&two_triangles_consistent());

        assert_eq!(adjacency.directed_faces(1, 2), &[0]);
        assert_eq!(adjacency.directed_faces(2, 1), &[1]);
        assert!(adjacency.directed_faces(0, 3).is_empty());
    }

    #[test]
    fn classify_covers_all_kinds() {
        let adjacency = EdgeAdjacency::from_faces(&fan_of_three());

        assert_eq!(adjacency.classify(0, 1), Some(EdgeKind::NonManifold));
        assert_eq!(adjacency.classify(1, 2), Some(EdgeKind::Boundary));
        assert_eq!(adjacency.classify(2, 3), None);

        let adjacency = EdgeAdjacency::from_faces(&two_triangles_consistent());
        assert_eq!(adjacency.classify(1, 2), Some(EdgeKind::Manifold));
        // Direction does not matter for undirected classification.
        assert_eq!(adjacency.classify(2, 1), Some(EdgeKind::Manifold));
    }

    #[test]
    fn nonmanifold_detection() {
        let adjacency = EdgeAdjacency::from_faces(&fan_of_three());

        assert!(adjacency.has_nonmanifold_edges());
        let ((u, v), count) = adjacency.first_nonmanifold_edge().unwrap();
        assert_eq!((u.min(v), u.max(v)), (0, 1));
        assert_eq!(count, 3);
    }

    #[test]
    fn inconsistent_winding_is_manifold_but_not_consistent() {
        let adjacency = EdgeAdjacency::from_faces(&two_triangles_inconsistent());

        // The shared edge is still manifold (2 incident faces)...
        assert!(adjacency.is_manifold_edge(1, 2));
        // ...but both faces traverse it 1→2, so the winding is inconsistent.
        assert_eq!(adjacency.directed_faces(1, 2).len(), 2);
        assert!(!adjacency.is_consistently_wound());
    }

    #[test]
    fn tetrahedron_is_closed_and_consistent() {
        let adjacency = EdgeAdjacency::from_faces(&tetrahedron());

        assert!(adjacency.is_closed());
        assert!(adjacency.is_consistently_wound());
        assert!(!adjacency.has_nonmanifold_edges());
        assert_eq!(adjacency.undirected_edge_count(), 6);
        assert_eq!(adjacency.boundary_directed_edges().count(), 0);
        for &[a, b, c] in &tetrahedron() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                assert!(adjacency.is_manifold_edge(u, v));
            }
        }
    }

    #[test]
    fn empty_face_list() {
        let adjacency = EdgeAdjacency::from_faces(&[]);

        assert!(adjacency.is_closed());
        assert!(adjacency.is_consistently_wound());
        assert_eq!(adjacency.undirected_edge_count(), 0);
    }
}

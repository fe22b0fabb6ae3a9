//! Boundary-chain extraction.
//!
//! A boundary edge is a directed edge with no matching face on its undirected
//! counterpart — a mesh "gap". This module walks boundary edges
//! head-to-next-tail into ordered chains: closed loops (holes) or open runs.
//! The incremental hull builder reuses the same walk on the subset of faces
//! it removes per insertion, where the resulting closed loop is the horizon.
//!
//! Meshes containing non-manifold edges are flagged: chain extraction around
//! such edges is unreliable and the repair operations downstream refuse to
//! act on flagged input.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::adjacency::EdgeAdjacency;
use crate::core::collections::{FastHashMap, FastHashSet, SmallBuffer};
use crate::core::mesh::TriangleMesh;
use crate::geometry::traits::coordinate::CoordinateScalar;

/// One connected run of unmatched directed edges, in walk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryChain {
    /// Vertex indices along the chain. For a closed chain the first vertex is
    /// *not* repeated at the end; the closing edge is implied.
    pub vertices: Vec<usize>,
    /// `true` when the walk returned to its starting vertex.
    pub is_closed: bool,
}

impl BoundaryChain {
    /// Number of boundary edges in the chain.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        if self.is_closed {
            self.vertices.len()
        } else {
            self.vertices.len().saturating_sub(1)
        }
    }

    /// Iterator over the chain's directed edges, including the closing edge
    /// of a closed chain.
    pub fn directed_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.vertices.len();
        let count = match (n, self.is_closed) {
            (0, _) => 0,
            (_, true) => n,
            (_, false) => n - 1,
        };
        (0..count).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// The result of boundary extraction: every chain found, plus the
/// non-manifold flag callers must check before attempting repair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryChains {
    /// All disjoint boundary chains, each reported separately.
    pub chains: Vec<BoundaryChain>,
    /// Set when any undirected edge is incident to 3 or more faces. Chain
    /// extraction for the affected region is unreliable and hole filling
    /// refuses flagged input.
    pub has_nonmanifold_edges: bool,
}

/// Extracts all boundary chains of a mesh.
///
/// A closed, consistently wound mesh yields no chains. See
/// [`find_boundary_chains_of_faces`] for the underlying walk.
///
/// # Examples
///
/// ```rust
/// use polyhull::prelude::*;
/// use nalgebra::Point3;
///
/// // A tetrahedron missing the face [0, 2, 3]: one triangular hole.
/// let mesh = TriangleMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(0.0, 0.0, 1.0_f64),
///     ],
///     vec![[0, 1, 2], [0, 3, 1], [1, 3, 2]],
/// );
///
/// let result = find_boundary_chains(&mesh);
/// assert_eq!(result.chains.len(), 1);
/// assert!(result.chains[0].is_closed);
/// assert_eq!(result.chains[0].edge_count(), 3);
/// assert!(!result.has_nonmanifold_edges);
/// ```
#[must_use]
pub fn find_boundary_chains<T: CoordinateScalar>(mesh: &TriangleMesh<T>) -> BoundaryChains {
    find_boundary_chains_of_faces(&mesh.faces)
}

/// Extracts boundary chains from a bare face list.
///
/// The walk follows unmatched directed edges head-vertex to next tail-vertex
/// until it returns to the start (closed chain) or exhausts its successors
/// (open chain; the walk then also extends backward from the start so the
/// full run is reported). Disjoint chains are reported separately.
#[must_use]
pub fn find_boundary_chains_of_faces(faces: &[[usize; 3]]) -> BoundaryChains {
    let adjacency = EdgeAdjacency::from_faces(faces);
    let has_nonmanifold_edges = adjacency.has_nonmanifold_edges();

    let boundary_edges: Vec<(usize, usize)> = adjacency.boundary_directed_edges().collect();
    if boundary_edges.is_empty() {
        return BoundaryChains {
            chains: Vec::new(),
            has_nonmanifold_edges,
        };
    }

    // Successor and predecessor lookups over boundary edges only.
    let mut successors: FastHashMap<usize, SmallBuffer<usize, 2>> = FastHashMap::default();
    let mut predecessors: FastHashMap<usize, SmallBuffer<usize, 2>> = FastHashMap::default();
    for &(tail, head) in &boundary_edges {
        successors.entry(tail).or_default().push(head);
        predecessors.entry(head).or_default().push(tail);
    }

    let mut visited: FastHashSet<(usize, usize)> = FastHashSet::default();
    let mut chains = Vec::new();

    for &(start, first_head) in &boundary_edges {
        if visited.contains(&(start, first_head)) {
            continue;
        }
        visited.insert((start, first_head));

        let mut vertices = vec![start, first_head];
        let mut head = first_head;
        let mut is_closed = false;

        loop {
            let next = successors
                .get(&head)
                .into_iter()
                .flatten()
                .copied()
                .find(|&candidate| !visited.contains(&(head, candidate)));

            match next {
                Some(candidate) => {
                    visited.insert((head, candidate));
                    if candidate == start {
                        is_closed = true;
                        break;
                    }
                    vertices.push(candidate);
                    head = candidate;
                }
                None => break,
            }
        }

        if !is_closed {
            // Walk backward from the start so an open chain is reported in
            // full, not from wherever the scan happened to pick it up.
            let mut tail = start;
            loop {
                let prev = predecessors
                    .get(&tail)
                    .into_iter()
                    .flatten()
                    .copied()
                    .find(|&candidate| !visited.contains(&(candidate, tail)));

                match prev {
                    Some(candidate) => {
                        visited.insert((candidate, tail));
                        vertices.insert(0, candidate);
                        tail = candidate;
                    }
                    None => break,
                }
            }
            warn!(
                chain_len = vertices.len(),
                start, "boundary chain is open: cannot be closed without more geometry"
            );
        }

        chains.push(BoundaryChain {
            vertices,
            is_closed,
        });
    }

    debug!(
        chain_count = chains.len(),
        boundary_edge_count = boundary_edges.len(),
        has_nonmanifold_edges,
        "extracted boundary chains"
    );

    BoundaryChains {
        chains,
        has_nonmanifold_edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_mesh_has_no_chains() {
        let tetrahedron = [[0, 1, 2], [0, 3, 1], [1, 3, 2], [0, 2, 3]];
        let result = find_boundary_chains_of_faces(&tetrahedron);

        assert!(result.chains.is_empty());
        assert!(!result.has_nonmanifold_edges);
    }

    #[test]
    fn single_triangle_is_one_closed_chain() {
        let result = find_boundary_chains_of_faces(&[[0, 1, 2]]);

        assert_eq!(result.chains.len(), 1);
        let chain = &result.chains[0];
        assert!(chain.is_closed);
        assert_eq!(chain.edge_count(), 3);
        // The walk follows the face's own directed edges.
        let edges: Vec<_> = chain.directed_edges().collect();
        assert!(edges.contains(&(0, 1)));
        assert!(edges.contains(&(1, 2)));
        assert!(edges.contains(&(2, 0)));
    }

    #[test]
    fn missing_tetrahedron_face_leaves_its_reversed_outline() {
        // Remove [0, 2, 3] from a tetrahedron. The surviving faces own the
        // reverse of each of its edges, so the hole's chain traverses the
        // outline of the missing face backwards.
        let faces = [[0, 1, 2], [0, 3, 1], [1, 3, 2]];
        let result = find_boundary_chains_of_faces(&faces);

        assert_eq!(result.chains.len(), 1);
        let chain = &result.chains[0];
        assert!(chain.is_closed);
        assert_eq!(chain.edge_count(), 3);
        let edges: Vec<_> = chain.directed_edges().collect();
        assert!(edges.contains(&(2, 0)) || edges.contains(&(0, 2)));
    }

    #[test]
    fn two_disjoint_holes_are_separate_chains() {
        // Two islands of one triangle each.
        let faces = [[0, 1, 2], [3, 4, 5]];
        let result = find_boundary_chains_of_faces(&faces);

        assert_eq!(result.chains.len(), 2);
        assert!(result.chains.iter().all(|chain| chain.is_closed));
        assert!(result.chains.iter().all(|chain| chain.edge_count() == 3));
    }

    #[test]
    fn strip_with_inconsistent_winding_yields_open_chains() {
        // Both triangles traverse the shared edge 1→2. The shared edge has
        // two incident faces and is not a boundary edge; the four outer
        // edges form open runs interrupted at the winding clash.
        let faces = [[0, 1, 2], [1, 2, 3]];
        let result = find_boundary_chains_of_faces(&faces);

        assert!(!result.has_nonmanifold_edges);
        assert!(!result.chains.is_empty());
        // Every boundary edge is reported exactly once across all chains.
        let reported: usize = result.chains.iter().map(BoundaryChain::edge_count).sum();
        assert_eq!(reported, 4);
    }

    #[test]
    fn nonmanifold_fan_sets_the_flag() {
        let faces = [[0, 1, 2], [0, 1, 3], [0, 1, 4]];
        let result = find_boundary_chains_of_faces(&faces);

        assert!(result.has_nonmanifold_edges);
    }

    #[test]
    fn empty_input() {
        let result = find_boundary_chains_of_faces(&[]);
        assert!(result.chains.is_empty());
        assert!(!result.has_nonmanifold_edges);
    }

    #[test]
    fn directed_edges_of_open_chain() {
        let chain = BoundaryChain {
            vertices: vec![4, 7, 9],
            is_closed: false,
        };
        assert_eq!(chain.edge_count(), 2);
        let edges: Vec<_> = chain.directed_edges().collect();
        assert_eq!(edges, vec![(4, 7), (7, 9)]);
    }
}

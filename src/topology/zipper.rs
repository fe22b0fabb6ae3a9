//! Hole closure by greedy zippering.
//!
//! [`fill_boundary_chains_by_zippering`] consumes the closed boundary chains
//! of a mesh into new triangles, directly bridging nearby boundary vertices:
//! the remaining loop is clipped alternately at its front and back until
//! three vertices remain. Each emitted triangle traverses the boundary edges
//! it consumes in reverse, so every chain edge ends up paired
//! manifold-correctly with exactly one new face.
//!
//! This is a topological closure step, not an area- or quality-optimizing
//! triangulation: an n-edge hole always closes with exactly n − 2 triangles,
//! and no geometry is consulted.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::core::boundary::BoundaryChains;
use crate::core::mesh::TriangleMesh;
use crate::geometry::traits::coordinate::CoordinateScalar;

/// Closes every boundary chain of `chains` by appending zippered triangles
/// to the mesh's face list.
///
/// Returns `true` on success. Returns `false` *without mutating the mesh*
/// when:
///
/// - `chains.has_nonmanifold_edges` is set (repair around non-manifold edges
///   is unreliable),
/// - any chain is open (it cannot be closed without additional geometric
///   information), or
/// - any chain is shorter than three vertices or degenerates during
///   clipping (repeated vertices in a chain).
///
/// An empty chain list is a trivial success.
///
/// # Examples
///
/// ```rust
/// use polyhull::prelude::*;
/// use nalgebra::Point3;
///
/// // Tetrahedron with one face missing: a three-edge hole.
/// let mut mesh = TriangleMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(0.0, 0.0, 1.0_f64),
///     ],
///     vec![[0, 1, 2], [0, 3, 1], [1, 3, 2]],
/// );
///
/// let chains = find_boundary_chains(&mesh);
/// assert!(fill_boundary_chains_by_zippering(&mut mesh, &chains));
/// assert_eq!(mesh.face_count(), 4);
/// assert!(EdgeAdjacency::from_faces(&mesh.faces).is_closed());
/// ```
#[must_use]
pub fn fill_boundary_chains_by_zippering<T: CoordinateScalar>(
    mesh: &mut TriangleMesh<T>,
    chains: &BoundaryChains,
) -> bool {
    if chains.has_nonmanifold_edges {
        warn!("refusing to zipper a mesh with non-manifold edges");
        return false;
    }

    let mut new_faces = Vec::new();
    for chain in &chains.chains {
        if !chain.is_closed {
            warn!(
                chain_len = chain.vertices.len(),
                "refusing to zipper an open boundary chain"
            );
            return false;
        }
        if chain.vertices.len() < 3 || !zipper_chain(&chain.vertices, &mut new_faces) {
            warn!(
                chain_len = chain.vertices.len(),
                "boundary chain cannot be zippered into valid triangles"
            );
            return false;
        }
    }

    debug!(
        chains = chains.chains.len(),
        faces_added = new_faces.len(),
        "zippered boundary chains closed"
    );
    mesh.faces.extend(new_faces);
    true
}

/// Clips one closed loop into triangles, alternating between its two ends.
///
/// Clipping the vertex at ring position `i` emits the triangle
/// `(next, clipped, prev)`: its first two edges reverse the two consumed
/// boundary edges, and its third edge becomes the implied closing edge of the
/// shrunken loop. The final three vertices are emitted as one reversed
/// triangle.
fn zipper_chain(loop_vertices: &[usize], out: &mut Vec<[usize; 3]>) -> bool {
    let mut ring: VecDeque<usize> = loop_vertices.iter().copied().collect();
    let mut clip_front = true;

    while ring.len() > 3 {
        let mut front = clip_front;
        let mut triangle = clip_triangle(&ring, front);
        if !is_proper(triangle) {
            // A repeated vertex in the loop makes this end degenerate; the
            // other end may still admit a proper clip.
            front = !front;
            triangle = clip_triangle(&ring, front);
            if !is_proper(triangle) {
                return false;
            }
        }
        out.push(triangle);
        if front {
            ring.pop_front();
        } else {
            ring.pop_back();
        }
        clip_front = !clip_front;
    }

    let closing = [ring[2], ring[1], ring[0]];
    if !is_proper(closing) {
        return false;
    }
    out.push(closing);
    true
}

/// The clip triangle at the ring's front or back.
fn clip_triangle(ring: &VecDeque<usize>, front: bool) -> [usize; 3] {
    let n = ring.len();
    if front {
        [ring[1], ring[0], ring[n - 1]]
    } else {
        [ring[0], ring[n - 1], ring[n - 2]]
    }
}

/// A triangle is proper when its three indices are distinct.
#[inline]
const fn is_proper([a, b, c]: [usize; 3]) -> bool {
    a != b && b != c && a != c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adjacency::EdgeAdjacency;
    use crate::core::boundary::{BoundaryChain, find_boundary_chains};
    use nalgebra::Point3;

    fn open_tetrahedron() -> TriangleMesh<f64> {
        TriangleMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 3, 1], [1, 3, 2]],
        )
    }

    fn open_box() -> TriangleMesh<f64> {
        // A unit cube missing its top: a four-edge square hole at z = 1.
        TriangleMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
            vec![
                [0, 2, 1],
                [0, 3, 2],
                [0, 1, 5],
                [0, 5, 4],
                [1, 2, 6],
                [1, 6, 5],
                [2, 3, 7],
                [2, 7, 6],
                [3, 0, 4],
                [3, 4, 7],
            ],
        )
    }

    #[test]
    fn three_edge_hole_gains_exactly_one_face() {
        let mut mesh = open_tetrahedron();
        let chains = find_boundary_chains(&mesh);
        assert_eq!(chains.chains.len(), 1);
        assert_eq!(chains.chains[0].edge_count(), 3);

        assert!(fill_boundary_chains_by_zippering(&mut mesh, &chains));
        assert_eq!(mesh.face_count(), 4);

        let adjacency = EdgeAdjacency::from_faces(&mesh.faces);
        assert!(adjacency.is_closed());
        assert!(adjacency.is_consistently_wound());
    }

    #[test]
    fn square_hole_closes_with_two_faces() {
        let mut mesh = open_box();
        let chains = find_boundary_chains(&mesh);
        assert_eq!(chains.chains.len(), 1);
        assert_eq!(chains.chains[0].edge_count(), 4);

        assert!(fill_boundary_chains_by_zippering(&mut mesh, &chains));
        assert_eq!(mesh.face_count(), 12);

        let adjacency = EdgeAdjacency::from_faces(&mesh.faces);
        assert!(adjacency.is_closed());
        assert!(adjacency.is_consistently_wound());
    }

    #[test]
    fn large_hole_closes_with_n_minus_two_faces() {
        // An octagonal fan missing its cap: chain of length 8.
        let mut vertices = vec![Point3::new(0.0, 0.0, -1.0)];
        let mut faces = Vec::new();
        for i in 0..8_usize {
            #[allow(clippy::cast_precision_loss)]
            let angle = std::f64::consts::TAU * (i as f64) / 8.0;
            vertices.push(Point3::new(angle.cos(), angle.sin(), 0.0));
        }
        for i in 0..8_usize {
            let a = 1 + i;
            let b = 1 + (i + 1) % 8;
            faces.push([0, b, a]);
        }
        let mut mesh = TriangleMesh::from_parts(vertices, faces);

        let chains = find_boundary_chains(&mesh);
        assert_eq!(chains.chains.len(), 1);
        assert_eq!(chains.chains[0].edge_count(), 8);

        assert!(fill_boundary_chains_by_zippering(&mut mesh, &chains));
        assert_eq!(mesh.face_count(), 8 + 6);

        let adjacency = EdgeAdjacency::from_faces(&mesh.faces);
        assert!(adjacency.is_closed());
        assert!(adjacency.is_consistently_wound());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn open_chain_is_refused_without_mutation() {
        let mut mesh = open_tetrahedron();
        let faces_before = mesh.faces.clone();
        let chains = BoundaryChains {
            chains: vec![BoundaryChain {
                vertices: vec![0, 1, 2, 3],
                is_closed: false,
            }],
            has_nonmanifold_edges: false,
        };

        assert!(!fill_boundary_chains_by_zippering(&mut mesh, &chains));
        assert_eq!(mesh.faces, faces_before);
    }

    #[test]
    fn nonmanifold_flag_is_refused_without_mutation() {
        let mut mesh = open_tetrahedron();
        let faces_before = mesh.faces.clone();
        let mut chains = find_boundary_chains(&mesh);
        chains.has_nonmanifold_edges = true;

        assert!(!fill_boundary_chains_by_zippering(&mut mesh, &chains));
        assert_eq!(mesh.faces, faces_before);
    }

    #[test]
    fn too_short_chain_is_refused() {
        let mut mesh = open_tetrahedron();
        let chains = BoundaryChains {
            chains: vec![BoundaryChain {
                vertices: vec![0, 1],
                is_closed: true,
            }],
            has_nonmanifold_edges: false,
        };

        assert!(!fill_boundary_chains_by_zippering(&mut mesh, &chains));
    }

    #[test]
    fn no_chains_is_a_trivial_success() {
        let mut mesh = open_tetrahedron();
        let faces_before = mesh.faces.clone();
        let chains = BoundaryChains::default();

        assert!(fill_boundary_chains_by_zippering(&mut mesh, &chains));
        assert_eq!(mesh.faces, faces_before);
    }

    #[test]
    fn zipper_consumes_every_chain_edge_in_reverse() {
        let mut out = Vec::new();
        assert!(zipper_chain(&[10, 11, 12, 13, 14], &mut out));
        assert_eq!(out.len(), 3);

        // Collect the directed edges of the emitted triangles.
        let mut emitted = Vec::new();
        for &[a, b, c] in &out {
            emitted.extend([(a, b), (b, c), (c, a)]);
        }
        // Every chain edge must appear reversed exactly once.
        for (tail, head) in [(10, 11), (11, 12), (12, 13), (13, 14), (14, 10)] {
            assert_eq!(
                emitted.iter().filter(|&&e| e == (head, tail)).count(),
                1,
                "chain edge ({tail}, {head}) not paired"
            );
        }
        // Interior edges pair up among themselves.
        for &(a, b) in &emitted {
            let forward = emitted.iter().filter(|&&e| e == (a, b)).count();
            assert_eq!(forward, 1, "duplicate directed edge ({a}, {b})");
        }
    }
}

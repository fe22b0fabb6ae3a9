//! Winding-consistency repair and genus reporting.
//!
//! [`ensure_consistent_face_orientation`] propagates a single consistent
//! winding across each connected component of a mesh and reports the total
//! genus derived from the Euler characteristic. The propagation is purely
//! combinatorial: two adjacent faces are consistently wound exactly when they
//! traverse their shared edge in opposite directions, so a breadth-first
//! sweep can fix every mismatch by flipping the offending face before
//! accepting it.
//!
//! Non-manifold meshes cannot be made consistent (three faces around one
//! edge admit no two-sided pairing) and are rejected with a typed error
//! rather than a best-effort result.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::debug;

use crate::core::adjacency::EdgeAdjacency;
use crate::core::collections::{FastHashMap, SmallBuffer};
use crate::core::mesh::TriangleMesh;
use crate::geometry::traits::coordinate::CoordinateScalar;
use crate::topology::euler::{self, EulerError};

/// Errors from the orientation-consistency calculator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OrientationError {
    /// An undirected edge is incident to more than two faces; a consistent
    /// two-sided orientation cannot exist.
    #[error("cannot orient a non-manifold mesh: edge {edge:?} has {incident_faces} incident faces")]
    NonManifoldEdge {
        /// The offending undirected edge, as reported.
        edge: (usize, usize),
        /// Total number of faces incident to the edge.
        incident_faces: usize,
    },
    /// The repaired mesh's Euler characteristic is impossible for closed
    /// orientable surfaces — typically an oversized deduplication tolerance
    /// collapsing distinct vertices. No sane genus exists, so this is a hard
    /// error.
    #[error(transparent)]
    InvalidEulerCharacteristic(#[from] EulerError),
}

/// Propagates a consistent winding across the mesh and returns the total
/// genus.
///
/// Per connected component, an arbitrary face is taken as canonically
/// oriented; breadth-first traversal then flips any neighbor that traverses
/// the shared edge in the same direction as the already-oriented face.
/// Disconnected components are oriented independently and are not an error.
/// Running the calculator on an already-consistent mesh performs no flips
/// and returns the same genus (idempotence).
///
/// `tolerance` is forwarded to the vertex counting used for the Euler
/// characteristic (see [`euler::count_surface`]); pass `0.0` for meshes with
/// properly shared vertices.
///
/// # Errors
///
/// - [`OrientationError::NonManifoldEdge`] when any undirected edge has more
///   than two incident faces; the mesh is left unmodified.
/// - [`OrientationError::InvalidEulerCharacteristic`] when the counted
///   characteristic fits no closed orientable surface (the winding repair
///   itself will already have been applied).
///
/// # Examples
///
/// ```rust
/// use polyhull::prelude::*;
/// use nalgebra::Point3;
///
/// let mut mesh = TriangleMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(0.0, 0.0, 1.0_f64),
///     ],
///     // One face wound backwards.
///     vec![[0, 1, 2], [0, 3, 1], [1, 3, 2], [0, 3, 2]],
/// );
///
/// let genus = ensure_consistent_face_orientation(&mut mesh, 0.0).unwrap();
/// assert_eq!(genus, 0);
/// assert!(EdgeAdjacency::from_faces(&mesh.faces).is_consistently_wound());
/// ```
pub fn ensure_consistent_face_orientation<T: CoordinateScalar>(
    mesh: &mut TriangleMesh<T>,
    tolerance: T,
) -> Result<usize, OrientationError> {
    let adjacency = EdgeAdjacency::from_faces(&mesh.faces);
    if let Some((edge, incident_faces)) = adjacency.first_nonmanifold_edge() {
        return Err(OrientationError::NonManifoldEdge {
            edge,
            incident_faces,
        });
    }

    // Face-adjacency graph keyed by normalized undirected edge.
    let mut edge_faces: FastHashMap<(usize, usize), SmallBuffer<usize, 2>> =
        FastHashMap::default();
    for (face_index, &[a, b, c]) in mesh.faces.iter().enumerate() {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            edge_faces
                .entry((u.min(v), u.max(v)))
                .or_default()
                .push(face_index);
        }
    }

    let mut visited = vec![false; mesh.face_count()];
    let mut queue = VecDeque::new();
    let mut flips = 0_usize;
    let mut components = 0_usize;

    for seed in 0..mesh.face_count() {
        if visited[seed] {
            continue;
        }
        // The component's first face is canonical as-is.
        visited[seed] = true;
        components += 1;
        queue.push_back(seed);

        while let Some(face_index) = queue.pop_front() {
            let [a, b, c] = mesh.faces[face_index];
            for (u, v) in [(a, b), (b, c), (c, a)] {
                let key = (u.min(v), u.max(v));
                let Some(neighbors) = edge_faces.get(&key) else {
                    continue;
                };
                for &neighbor in neighbors {
                    if visited[neighbor] {
                        continue;
                    }
                    // A consistently wound neighbor traverses the shared edge
                    // in the opposite direction (v → u). Matching direction
                    // means its winding must be flipped before acceptance.
                    if traverses(&mesh.faces[neighbor], u, v) {
                        mesh.flip_face(neighbor);
                        flips += 1;
                    }
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    debug!(flips, components, "orientation propagation complete");

    let counts = euler::count_surface(mesh, tolerance);
    let genus = euler::genus(&counts)?;
    Ok(genus)
}

/// Does the face traverse the directed edge `u → v`?
#[inline]
fn traverses(face: &[usize; 3], u: usize, v: usize) -> bool {
    let [a, b, c] = *face;
    (a, b) == (u, v) || (b, c) == (u, v) || (c, a) == (u, v)
}

//! Indexed triangle mesh container.
//!
//! [`TriangleMesh`] is the pair (vertex list, face list) that every component
//! in this crate consumes or mutates. Faces reference vertices by position;
//! the ordering of a face's indices encodes its winding and therefore its
//! outward normal direction (counter-clockwise when viewed from outside, by
//! the right-hand rule).
//!
//! Vertex indices are stable for the lifetime of a mesh snapshot; rebuilding
//! the vertex list invalidates them. Repair operations in this crate only
//! append faces or flip face windings — they never touch the vertex list.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::traits::coordinate::CoordinateScalar;

/// Errors that can occur during structural mesh validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MeshValidationError {
    /// A face references a vertex index outside the vertex list.
    #[error(
        "Face {face_index} references vertex {vertex_index}, but the mesh has only {vertex_count} vertices"
    )]
    FaceIndexOutOfRange {
        /// Index of the offending face.
        face_index: usize,
        /// The out-of-range vertex index.
        vertex_index: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
    /// A face repeats a vertex index and is therefore degenerate.
    #[error("Face {face_index} is degenerate: indices {indices:?} are not distinct")]
    DegenerateFace {
        /// Index of the offending face.
        face_index: usize,
        /// The face's vertex indices.
        indices: [usize; 3],
    },
}

/// An indexed triangle mesh: a vertex list and a face list.
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from outside, so
/// normals point outward by the right-hand rule. In a correctly oriented,
/// closed 2-manifold each directed edge occurs exactly once across all faces
/// and its reverse occurs exactly once, owned by the neighboring face.
///
/// # Examples
///
/// ```rust
/// use polyhull::core::mesh::TriangleMesh;
/// use nalgebra::Point3;
///
/// let mut mesh: TriangleMesh<f64> = TriangleMesh::new();
/// mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// assert!(mesh.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TriangleMesh<T: CoordinateScalar> {
    /// Vertex positions. Owned by the mesh; immutable once stored as far as
    /// this crate's operations are concerned.
    pub vertices: Vec<Point3<T>>,
    /// Triangle faces as ordered index triples into `vertices`.
    pub faces: Vec<[usize; 3]>,
}

impl<T: CoordinateScalar> TriangleMesh<T> {
    /// Creates a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Creates a mesh with pre-allocated capacity for the expected number of
    /// vertices and faces.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Creates a mesh from an existing vertex list and face list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use polyhull::core::mesh::TriangleMesh;
    /// use nalgebra::Point3;
    ///
    /// let mesh = TriangleMesh::from_parts(
    ///     vec![
    ///         Point3::new(0.0, 0.0, 0.0),
    ///         Point3::new(1.0, 0.0, 0.0),
    ///         Point3::new(0.0, 1.0, 0.0_f64),
    ///     ],
    ///     vec![[0, 1, 2]],
    /// );
    /// assert_eq!(mesh.face_count(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<T>>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Returns the number of vertices.
    #[inline]
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces.
    #[inline]
    #[must_use]
    pub const fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if the mesh has no vertices and no faces.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    /// Reverses the winding of the face at `face_index`.
    ///
    /// Swapping two indices of the triple flips the face's orientation and
    /// thus its outward normal. Used by the orientation-consistency repair.
    ///
    /// # Panics
    ///
    /// Panics if `face_index` is out of range.
    #[inline]
    pub fn flip_face(&mut self, face_index: usize) {
        self.faces[face_index].swap(1, 2);
    }

    /// Checks the structural invariant for a *valid* mesh: every face's three
    /// indices are in range and distinct.
    ///
    /// Topological invariants (manifoldness, closure, winding consistency)
    /// are the province of [`crate::core::adjacency::EdgeAdjacency`]; this
    /// method only guards against indexing corruption.
    ///
    /// # Errors
    ///
    /// Returns [`MeshValidationError::FaceIndexOutOfRange`] or
    /// [`MeshValidationError::DegenerateFace`] for the first offending face.
    pub fn validate(&self) -> Result<(), MeshValidationError> {
        let vertex_count = self.vertices.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            for &vertex_index in face {
                if vertex_index >= vertex_count {
                    return Err(MeshValidationError::FaceIndexOutOfRange {
                        face_index,
                        vertex_index,
                        vertex_count,
                    });
                }
            }
            let [a, b, c] = *face;
            if a == b || b == c || a == c {
                return Err(MeshValidationError::DegenerateFace {
                    face_index,
                    indices: *face,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> TriangleMesh<f64> {
        TriangleMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn empty_mesh() {
        let mesh: TriangleMesh<f64> = TriangleMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn flip_face_reverses_winding() {
        let mut mesh = unit_triangle();
        mesh.flip_face(0);
        assert_eq!(mesh.faces[0], [0, 2, 1]);
        mesh.flip_face(0);
        assert_eq!(mesh.faces[0], [0, 1, 2]);
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let mut mesh = unit_triangle();
        mesh.faces.push([0, 1, 3]);
        assert_eq!(
            mesh.validate(),
            Err(MeshValidationError::FaceIndexOutOfRange {
                face_index: 1,
                vertex_index: 3,
                vertex_count: 3,
            })
        );
    }

    #[test]
    fn validate_rejects_degenerate_face() {
        let mut mesh = unit_triangle();
        mesh.faces.push([1, 1, 2]);
        assert_eq!(
            mesh.validate(),
            Err(MeshValidationError::DegenerateFace {
                face_index: 1,
                indices: [1, 1, 2],
            })
        );
    }

    #[test]
    fn with_capacity_allocates() {
        let mesh: TriangleMesh<f32> = TriangleMesh::with_capacity(100, 200);
        assert!(mesh.vertices.capacity() >= 100);
        assert!(mesh.faces.capacity() >= 200);
        assert!(mesh.is_empty());
    }
}

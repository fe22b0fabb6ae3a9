//! Euler characteristic and genus computation for triangle surfaces.
//!
//! The Euler characteristic of a surface mesh is `χ = V − E + F`. For each
//! closed, orientable, connected component `χ = 2 − 2g` where `g` is the
//! genus, so across `C` independent components the total genus is
//! `C − χ/2`. Nothing here is stored: counts are derived on demand from the
//! face list.
//!
//! Vertex counting supports a caller-supplied deduplication tolerance: near-
//! duplicate vertices (as produced by triangle-soup imports) are merged by
//! spatial quantization before counting. An excessively large tolerance can
//! collapse genuinely distinct vertices into an Euler characteristic no
//! closed orientable surface can have; [`genus`] detects that and raises
//! [`EulerError::ImpossibleCharacteristic`] rather than silently reporting a
//! wrong genus.

use num_traits::cast;
use thiserror::Error;

use crate::core::collections::{FastHashMap, FastHashSet};
use crate::core::mesh::TriangleMesh;
use crate::geometry::traits::coordinate::{CoordinateScalar, coords_to_f64};

/// Errors from Euler-characteristic-derived computations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EulerError {
    /// The counted characteristic is impossible for a disjoint union of
    /// closed orientable surfaces (`2C − χ` negative or odd). Usually caused
    /// by a deduplication tolerance large enough to collapse distinct
    /// vertices, or by a mesh that is not closed.
    #[error(
        "Euler characteristic {chi} is impossible for {components} closed orientable component(s); \
         check the mesh for openness or the deduplication tolerance for over-merging"
    )]
    ImpossibleCharacteristic {
        /// The counted Euler characteristic.
        chi: i64,
        /// The number of connected components.
        components: usize,
    },
}

/// Element counts of a triangle surface: the inputs to Euler's formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCounts {
    /// Number of distinct referenced vertices (after tolerance merging).
    pub vertices: usize,
    /// Number of distinct undirected edges.
    pub edges: usize,
    /// Number of faces.
    pub faces: usize,
    /// Number of connected components of the face graph.
    pub components: usize,
}

/// Counts vertices, edges, faces, and connected components of a mesh.
///
/// Only vertices referenced by at least one face are counted. A positive
/// `tolerance` merges near-duplicate vertices by quantizing coordinates to a
/// grid of that spacing before counting (vertices straddling a grid boundary
/// may stay distinct; the merge is a counting aid, not exact clustering).
/// A non-positive tolerance counts vertices by index, unmerged.
///
/// # Examples
///
/// ```rust
/// use polyhull::core::mesh::TriangleMesh;
/// use polyhull::topology::euler::{count_surface, euler_characteristic};
/// use nalgebra::Point3;
///
/// let tetrahedron = TriangleMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(0.0, 0.0, 1.0_f64),
///     ],
///     vec![[0, 1, 2], [0, 3, 1], [1, 3, 2], [0, 2, 3]],
/// );
///
/// let counts = count_surface(&tetrahedron, 0.0);
/// assert_eq!((counts.vertices, counts.edges, counts.faces), (4, 6, 4));
/// assert_eq!(euler_characteristic(&counts), 2);
/// ```
#[must_use]
pub fn count_surface<T: CoordinateScalar>(mesh: &TriangleMesh<T>, tolerance: T) -> SurfaceCounts {
    let representative = representatives(mesh, tolerance);

    let mut referenced: FastHashSet<usize> = FastHashSet::default();
    let mut edges: FastHashSet<(usize, usize)> = FastHashSet::default();
    let mut union_find = UnionFind::new(mesh.vertex_count());

    for &[a, b, c] in &mesh.faces {
        let (ra, rb, rc) = (representative[a], representative[b], representative[c]);
        referenced.extend([ra, rb, rc]);
        for (u, v) in [(ra, rb), (rb, rc), (rc, ra)] {
            if u != v {
                edges.insert((u.min(v), u.max(v)));
                union_find.union(u, v);
            }
        }
    }

    let components = referenced
        .iter()
        .filter(|&&v| union_find.find(v) == v)
        .count();

    SurfaceCounts {
        vertices: referenced.len(),
        edges: edges.len(),
        faces: mesh.face_count(),
        components,
    }
}

/// The Euler characteristic `χ = V − E + F`.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn euler_characteristic(counts: &SurfaceCounts) -> i64 {
    counts.vertices as i64 - counts.edges as i64 + counts.faces as i64
}

/// Total genus across all components: `C − χ/2`, valid for a disjoint union
/// of closed orientable surfaces.
///
/// # Errors
///
/// Returns [`EulerError::ImpossibleCharacteristic`] when `2C − χ` is negative
/// or odd — no disjoint union of closed orientable surfaces has such a
/// characteristic, so reporting any number would be wrong.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn genus(counts: &SurfaceCounts) -> Result<usize, EulerError> {
    let chi = euler_characteristic(counts);
    let doubled = 2 * counts.components as i64 - chi;
    if doubled < 0 || doubled % 2 != 0 {
        return Err(EulerError::ImpossibleCharacteristic {
            chi,
            components: counts.components,
        });
    }
    Ok((doubled / 2) as usize)
}

/// Maps each vertex index to its representative under tolerance
/// quantization. With a non-positive tolerance every vertex represents
/// itself.
fn representatives<T: CoordinateScalar>(mesh: &TriangleMesh<T>, tolerance: T) -> Vec<usize> {
    let tolerance_f64: f64 = cast(tolerance).unwrap_or(0.0);
    if tolerance_f64 <= 0.0 {
        return (0..mesh.vertex_count()).collect();
    }

    let mut cell_owner: FastHashMap<(i64, i64, i64), usize> = FastHashMap::default();
    let mut representative = Vec::with_capacity(mesh.vertex_count());
    for (index, point) in mesh.vertices.iter().enumerate() {
        let coords = coords_to_f64(point);
        #[allow(clippy::cast_possible_truncation)]
        let cell = (
            (coords[0] / tolerance_f64).floor() as i64,
            (coords[1] / tolerance_f64).floor() as i64,
            (coords[2] / tolerance_f64).floor() as i64,
        );
        representative.push(*cell_owner.entry(cell).or_insert(index));
    }
    representative
}

/// Disjoint-set forest with path halving, for component counting.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Deterministic: the smaller index wins the root.
            let (low, high) = (ra.min(rb), ra.max(rb));
            self.parent[high] = low;
        }
    }
}

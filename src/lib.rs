//! # polyhull
//!
//! This is a library for building and repairing triangulated surface meshes in
//! three-dimensional space. It provides two closely related capabilities built
//! on the same foundations:
//!
//! - **Incremental convex hulls**: points are consumed one at a time (or in
//!   batch) while the hull is maintained as a closed, consistently-oriented
//!   triangle mesh.
//! - **Topology repair**: boundary-chain extraction, greedy hole zippering,
//!   winding-consistency restoration, and genus computation for arbitrary
//!   triangle meshes.
//!
//! Both rest on a floating-point-robust orientation predicate
//! ([`geometry::predicates::orient_3d`]) whose sign is trustworthy on *all*
//! inputs: a fast evaluation is accepted only when its magnitude clears a
//! conservative error bound, and is otherwise recomputed with exact
//! floating-point expansion arithmetic.
//!
//! # Features
//!
//! - Incremental 3D convex hull construction with deterministic handling of
//!   degenerate input (coplanar seeds, duplicate points)
//! - Directed edge-adjacency analysis (boundary, manifold, and non-manifold
//!   edge classification)
//! - Boundary-chain extraction into ordered open/closed loops
//! - Hole closure by greedy zippering
//! - Orientation propagation and Euler-characteristic/genus reporting
//! - Generic floating-point coordinate types (`f32`, `f64`, and other types
//!   implementing [`CoordinateScalar`](geometry::traits::coordinate::CoordinateScalar))
//! - Serialization/deserialization of the plain-data types with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use polyhull::prelude::*;
//! use nalgebra::Point3;
//!
//! // Build the hull of a tetrahedron plus one interior point.
//! let mut builder: ConvexHullBuilder<f64> = ConvexHullBuilder::new();
//! builder.add_vertices(&[
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(0.25, 0.25, 0.25), // interior: discarded
//! ]);
//!
//! let hull = builder.mesh();
//! assert_eq!(hull.vertex_count(), 4);
//! assert_eq!(hull.face_count(), 4);
//! assert_eq!(builder.num_evaluated(), 5);
//! ```
//!
//! # Mesh Repair
//!
//! ```rust
//! use polyhull::prelude::*;
//! use nalgebra::Point3;
//!
//! // A tetrahedron with one face missing.
//! let mut mesh = TriangleMesh::from_parts(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!         Point3::new(0.0, 0.0, 1.0_f64),
//!     ],
//!     vec![[0, 1, 2], [0, 3, 1], [1, 3, 2]],
//! );
//!
//! let chains = find_boundary_chains(&mesh);
//! assert_eq!(chains.chains.len(), 1);
//! assert!(chains.chains[0].is_closed);
//!
//! assert!(fill_boundary_chains_by_zippering(&mut mesh, &chains));
//! assert_eq!(mesh.face_count(), 4);
//!
//! // The closed tetrahedron has genus 0.
//! let genus = ensure_consistent_face_orientation(&mut mesh, 0.0).unwrap();
//! assert_eq!(genus, 0);
//! ```
//!
//! # Correctness Guarantees and Limitations
//!
//! 1. **Trustworthy predicate signs** — [`orient_3d`](geometry::predicates::orient_3d)
//!    never reports a wrong sign due to rounding; exactly coplanar
//!    configurations report [`Orientation::DEGENERATE`](geometry::predicates::Orientation).
//! 2. **Manifold hulls** — after every successful insertion the hull mesh is a
//!    closed, consistently-oriented 2-manifold (every undirected edge shared
//!    by exactly two faces that traverse it in opposite directions).
//! 3. **No silent topological failures** — non-manifold input is reported via
//!    explicit flags ([`BoundaryChains::has_nonmanifold_edges`](core::boundary::BoundaryChains))
//!    or typed errors ([`OrientationError`](topology::orientation::OrientationError)),
//!    never ignored.
//! 4. **Degenerate input degrades, it does not panic** — a hull over fewer
//!    than four non-degenerate points reports an empty face list; interior
//!    points are discarded as a normal (non-error) code path.
//!
//! Hole zippering is a greedy topological closure, not a minimal-area
//! triangulation, and the hull builder is linear-per-insertion in the current
//! face count; both are deliberate engineering tradeoffs.
//!
//! # References
//!
//! - Shewchuk, J. R. "Adaptive Precision Floating-Point Arithmetic and Fast
//!   Robust Geometric Predicates." *Discrete & Computational Geometry* 18,
//!   no. 3 (1997): 305-363.
//! - Barber, C.B., Dobkin, D.P., and Huhdanpaa, H. "The Quickhull Algorithm
//!   for Convex Hulls." *ACM Transactions on Mathematical Software* 22,
//!   no. 4 (1996): 469-483.

#![forbid(unsafe_code)]

/// The `core` module contains the mesh container and the combinatorial
/// analyses every higher component builds on: edge adjacency and
/// boundary-chain extraction.
pub mod core {
    pub mod adjacency;
    pub mod boundary;
    /// Collection types optimized for computational geometry workloads.
    pub mod collections;
    pub mod mesh;
    pub use adjacency::*;
    pub use boundary::*;
    pub use mesh::*;
    // Note: collections is not re-exported here to avoid namespace pollution.
}

/// Contains the robust orientation predicate and geometric algorithms.
pub mod geometry {
    /// Geometric algorithms operating on point sets and meshes.
    pub mod algorithms {
        /// Incremental 3D convex hull construction.
        pub mod convex_hull;
        pub use convex_hull::*;
    }
    pub mod predicates;
    /// Traits abstracting the coordinate scalar type.
    pub mod traits {
        pub mod coordinate;
        pub use coordinate::*;
    }
    pub use algorithms::*;
    pub use predicates::*;
    pub use traits::*;
}

/// Topological analyses and repairs: orientation consistency, genus, and
/// hole zippering.
pub mod topology {
    pub mod euler;
    pub mod orientation;
    pub mod zipper;
    pub use euler::*;
    pub use orientation::*;
    pub use zipper::*;
}

/// A prelude module that re-exports commonly used types and functions.
pub mod prelude {
    pub use crate::core::{
        adjacency::{EdgeAdjacency, EdgeKind},
        boundary::{
            BoundaryChain, BoundaryChains, find_boundary_chains, find_boundary_chains_of_faces,
        },
        mesh::{MeshValidationError, TriangleMesh},
    };

    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    pub use crate::geometry::{
        algorithms::convex_hull::{ConvexHullBuilder, HullConfig},
        predicates::{OrientPredicate, Orientation, orient_3d, orient_3d_exact},
        traits::coordinate::CoordinateScalar,
    };

    pub use crate::topology::{
        euler::{EulerError, SurfaceCounts, euler_characteristic},
        orientation::{OrientationError, ensure_consistent_face_orientation},
        zipper::fill_boundary_chains_by_zippering,
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================

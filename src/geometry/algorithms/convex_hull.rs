//! Incremental 3D convex hull construction.
//!
//! [`ConvexHullBuilder`] consumes points one at a time (or in batch) and
//! maintains the invariant that its mesh is the convex hull of all accepted
//! points: every accepted point lies on the hull's surface or strictly inside
//! it, and the mesh is a closed, consistently-oriented 2-manifold after every
//! insertion.
//!
//! # Algorithm
//!
//! The hull is seeded with the first four points that form a non-degenerate
//! tetrahedron (collinear triples are skipped while searching; an entirely
//! coplanar candidate set is resolved by a minute deterministic
//! perturbation). Each subsequent point is handled beneath-beyond style:
//!
//! 1. Collect the faces *visible* from the point (the point lies strictly on
//!    a face's outward side, per the orientation predicate).
//! 2. No visible face → the point is inside or on the hull; discard it. This
//!    is a normal code path, not an error.
//! 3. Otherwise remove the visible faces, extract their boundary — the
//!    *horizon*, a closed loop separating visible from invisible faces,
//!    obtained by running the boundary-chain walk on just the removed face
//!    set — and create one new face per horizon edge connecting that edge to
//!    the new point, oriented consistently with the existing winding.
//!
//! Insertion is linear in the current face count; no conflict graph is
//! maintained. That is a deliberate tradeoff, not a correctness concern.
//!
//! # References
//!
//! - Clarkson, K.L., and Shor, P.W. "Applications of Random Sampling in
//!   Computational Geometry, II." *Discrete & Computational Geometry* 4,
//!   no. 1 (1989): 387-421.
//! - Barber, C.B., Dobkin, D.P., and Huhdanpaa, H. "The Quickhull Algorithm
//!   for Convex Hulls." *ACM Transactions on Mathematical Software* 22,
//!   no. 4 (1996): 469-483.

use nalgebra::Point3;
use num_traits::cast;
use tracing::{debug, warn};

use crate::core::boundary::find_boundary_chains_of_faces;
use crate::core::collections::FastHashMap;
use crate::core::mesh::TriangleMesh;
use crate::geometry::predicates::{OrientPredicate, Orientation, collinear_3d, orient_3d};
use crate::geometry::traits::coordinate::CoordinateScalar;

/// Configuration for incremental hull construction.
///
/// The orientation predicate is injected as a plain function value: every
/// visibility test goes through it, and swapping in
/// [`orient_3d_exact`](crate::geometry::predicates::orient_3d_exact) (or an
/// instrumented wrapper) takes nothing more than a different function
/// pointer.
#[derive(Debug, Clone)]
pub struct HullConfig<T: CoordinateScalar> {
    /// Relative scale of the deterministic nudge applied to resolve
    /// degenerate seed configurations: small enough not to materially change
    /// hull membership of unrelated points, large enough to force a
    /// non-degenerate tetrahedron.
    pub perturbation_scale: T,
    /// The orientation predicate used for every visibility and seeding test.
    pub predicate: OrientPredicate<T>,
}

/// Minimum number of buffered candidates before an entirely coplanar set is
/// resolved by perturbation. Below this, a clean (unperturbed) seed may still
/// arrive with the next point, and eagerly nudging would preempt it.
const COPLANAR_NUDGE_THRESHOLD: usize = 5;

impl<T: CoordinateScalar> Default for HullConfig<T> {
    fn default() -> Self {
        Self {
            perturbation_scale: cast(1e-9).unwrap_or_else(T::default_tolerance),
            predicate: orient_3d::<T>,
        }
    }
}

/// Incremental convex hull builder.
///
/// Owns its hull state exclusively: the accepted points, the current hull
/// mesh, and the per-instance evaluation-order bookkeeping (a plain struct
/// field — nothing global). Mutated only by [`Self::add_vertex`] /
/// [`Self::add_vertices`].
///
/// # Degenerate input
///
/// Until four non-degenerate points have been supplied the hull is
/// *degenerate*: [`Self::mesh`] reports an empty face list rather than
/// erroring or panicking, and candidates are buffered internally.
///
/// # Examples
///
/// ```rust
/// use polyhull::prelude::*;
/// use nalgebra::Point3;
///
/// let mut builder: ConvexHullBuilder<f64> = ConvexHullBuilder::new();
/// builder.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// builder.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// builder.add_vertex(Point3::new(0.0, 1.0, 0.0));
///
/// // Three points: degenerate, no faces yet.
/// assert_eq!(builder.mesh().face_count(), 0);
///
/// builder.add_vertex(Point3::new(0.0, 0.0, 1.0));
/// assert_eq!(builder.mesh().face_count(), 4);
/// assert_eq!(builder.num_evaluated(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct ConvexHullBuilder<T: CoordinateScalar> {
    config: HullConfig<T>,
    mesh: TriangleMesh<T>,
    /// Points buffered before a non-degenerate seed tetrahedron exists, as
    /// (original submission index, position).
    pending: Vec<(usize, Point3<T>)>,
    seeded: bool,
    /// Original submission index → evaluation rank.
    evaluation_order: FastHashMap<usize, usize>,
    submitted: usize,
    evaluated: usize,
}

impl<T: CoordinateScalar> Default for ConvexHullBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CoordinateScalar> ConvexHullBuilder<T> {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HullConfig::default())
    }

    /// Creates a builder with an explicit configuration.
    #[must_use]
    pub fn with_config(config: HullConfig<T>) -> Self {
        Self {
            config,
            mesh: TriangleMesh::new(),
            pending: Vec::new(),
            seeded: false,
            evaluation_order: FastHashMap::default(),
            submitted: 0,
            evaluated: 0,
        }
    }

    /// Incorporates one point into the hull.
    ///
    /// Interior points are discarded (they already satisfy the hull
    /// invariant); duplicate points never break manifoldness. Every supplied
    /// point receives an evaluation rank, hull vertex or not.
    pub fn add_vertex(&mut self, point: Point3<T>) {
        let original_index = self.submitted;
        self.submitted += 1;

        if self.seeded {
            self.insert_point(original_index, point);
        } else {
            self.pending.push((original_index, point));
            self.try_seed();
        }
    }

    /// Incorporates a batch of points; equivalent to repeated
    /// [`Self::add_vertex`].
    pub fn add_vertices(&mut self, points: &[Point3<T>]) {
        for &point in points {
            self.add_vertex(point);
        }
    }

    /// Read-only view of the current hull mesh.
    ///
    /// With fewer than four non-degenerate points supplied, the returned mesh
    /// has an empty face list (degenerate hull; no error, no panic).
    #[inline]
    #[must_use]
    pub const fn mesh(&self) -> &TriangleMesh<T> {
        &self.mesh
    }

    /// Number of points that have been evaluated (incorporated into the
    /// hull, or examined and discarded as interior).
    #[inline]
    #[must_use]
    pub const fn num_evaluated(&self) -> usize {
        self.evaluated
    }

    /// Mapping from original submission index to evaluation rank.
    ///
    /// Diagnostics only: ranks differ from submission order exactly when
    /// degenerate prefixes forced buffering during seeding.
    #[inline]
    #[must_use]
    pub const fn evaluation_order(&self) -> &FastHashMap<usize, usize> {
        &self.evaluation_order
    }

    fn assign_rank(&mut self, original_index: usize) {
        self.evaluation_order.insert(original_index, self.evaluated);
        self.evaluated += 1;
    }

    /// Attempts to form the seed tetrahedron from the buffered points.
    fn try_seed(&mut self) {
        if self.pending.len() < 4 {
            return;
        }
        let predicate = self.config.predicate;

        // Second point: first candidate distinct from the first point.
        let first = self.pending[0].1;
        let Some(i1) = self
            .pending
            .iter()
            .position(|(_, p)| *p != first)
        else {
            return;
        };
        let second = self.pending[i1].1;

        // Third point: first candidate not collinear with the base segment.
        let Some(i2) = self
            .pending
            .iter()
            .enumerate()
            .position(|(index, (_, p))| {
                index != 0 && index != i1 && !collinear_3d(&first, &second, p)
            })
        else {
            return;
        };
        let third = self.pending[i2].1;

        // Fourth point: first candidate off the base plane. If the whole
        // candidate set is coplanar, nudge candidates deterministically until
        // one leaves the plane.
        let mut fourth: Option<(usize, Point3<T>)> = None;
        for (index, (_, p)) in self.pending.iter().enumerate() {
            if index == 0 || index == i1 || index == i2 {
                continue;
            }
            if predicate(&first, &second, &third, p) != Orientation::DEGENERATE {
                fourth = Some((index, *p));
                break;
            }
        }
        if fourth.is_none() && self.pending.len() >= COPLANAR_NUDGE_THRESHOLD {
            'candidates: for (index, (original_index, p)) in self.pending.iter().enumerate() {
                if index == 0 || index == i1 || index == i2 {
                    continue;
                }
                for attempt in 1..=4_u64 {
                    let nudged = perturbed(
                        p,
                        (*original_index as u64) << 3 | attempt,
                        self.config.perturbation_scale,
                    );
                    if predicate(&first, &second, &third, &nudged) != Orientation::DEGENERATE {
                        debug!(
                            original_index,
                            attempt, "resolved coplanar seed candidates by perturbation"
                        );
                        fourth = Some((index, nudged));
                        break 'candidates;
                    }
                }
            }
        }
        let Some((i3, fourth_point)) = fourth else {
            return;
        };

        self.build_seed(i1, i2, i3, fourth_point);
    }

    /// Builds the seed tetrahedron from pending slots `0, i1, i2, i3` (with
    /// the fourth position possibly perturbed), then replays the remaining
    /// buffered points in submission order.
    fn build_seed(&mut self, i1: usize, i2: usize, i3: usize, fourth_point: Point3<T>) {
        let predicate = self.config.predicate;
        let (o0, q0) = self.pending[0];
        let (o1, mut q1) = self.pending[i1];
        let (o2, mut q2) = self.pending[i2];
        let o3 = self.pending[i3].0;
        let q3 = fourth_point;

        // Wind the tetrahedron so every face's outward side excludes the
        // opposite vertex.
        if predicate(&q0, &q1, &q2, &q3) == Orientation::POSITIVE {
            std::mem::swap(&mut q1, &mut q2);
        }

        self.mesh.vertices.extend([q0, q1, q2, q3]);
        self.mesh
            .faces
            .extend([[0, 1, 2], [0, 3, 1], [1, 3, 2], [0, 2, 3]]);

        // The four seed points are incorporated together; rank them by
        // submission order so the diagnostic stays winding-independent.
        let mut members = [o0, o1, o2, o3];
        members.sort_unstable();
        for member in members {
            self.assign_rank(member);
        }
        self.seeded = true;

        debug!(
            seed_vertices = 4,
            buffered = self.pending.len() - 4,
            "seed tetrahedron established"
        );

        // Replay everything else that was buffered, in submission order.
        let remaining: Vec<(usize, Point3<T>)> = self
            .pending
            .drain(..)
            .enumerate()
            .filter_map(|(index, entry)| {
                (index != 0 && index != i1 && index != i2 && index != i3).then_some(entry)
            })
            .collect();
        for (original_index, point) in remaining {
            self.insert_point(original_index, point);
        }
    }

    /// Beneath-beyond insertion of a single point into the seeded hull.
    fn insert_point(&mut self, original_index: usize, point: Point3<T>) {
        self.assign_rank(original_index);
        let predicate = self.config.predicate;

        let mut visible = Vec::new();
        for (face_index, &[a, b, c]) in self.mesh.faces.iter().enumerate() {
            let orientation = predicate(
                &self.mesh.vertices[a],
                &self.mesh.vertices[b],
                &self.mesh.vertices[c],
                &point,
            );
            if orientation == Orientation::POSITIVE {
                visible.push(face_index);
            }
        }

        if visible.is_empty() {
            // Inside or on the hull: nothing to do.
            debug!(original_index, "interior point discarded");
            return;
        }

        // Remove the visible faces and keep them for horizon extraction.
        let mut removed = Vec::with_capacity(visible.len());
        let mut keep_index = 0;
        let mut visible_iter = visible.iter().copied().peekable();
        self.mesh.faces.retain(|face| {
            let is_visible = visible_iter.peek() == Some(&keep_index);
            if is_visible {
                visible_iter.next();
                removed.push(*face);
            }
            keep_index += 1;
            !is_visible
        });

        // The horizon is the boundary of the removed face set: a closed loop
        // of directed edges whose reverses live in the surviving faces.
        let horizon = find_boundary_chains_of_faces(&removed);

        let new_index = self.mesh.vertices.len();
        self.mesh.vertices.push(point);

        for chain in &horizon.chains {
            if !chain.is_closed {
                // Unreachable with a correct predicate; do not tear the mesh
                // further if it somehow happens.
                warn!(
                    original_index,
                    chain_len = chain.vertices.len(),
                    "open horizon chain during insertion"
                );
                continue;
            }
            for (tail, head) in chain.directed_edges() {
                self.mesh.faces.push([tail, head, new_index]);
            }
        }

        debug!(
            original_index,
            removed = removed.len(),
            faces = self.mesh.face_count(),
            "inserted hull vertex"
        );
    }
}

/// Deterministically nudges a point to break a degenerate configuration.
///
/// A pure function of the point, the salt, and the scale: no caller-visible
/// state is mutated, and equal inputs produce equal outputs. Offsets are
/// relative (`scale` × coordinate magnitude, with a floor of `scale` for
/// coordinates near zero), so the nudge is small enough not to materially
/// change hull membership of unrelated points yet large enough to leave an
/// exactly-degenerate plane.
#[must_use]
pub fn perturbed<T: CoordinateScalar>(point: &Point3<T>, salt: u64, scale: T) -> Point3<T> {
    let mut state = salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut nudge = |coordinate: T| -> T {
        // splitmix64 step: decorrelates the three axis offsets.
        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        #[allow(clippy::cast_precision_loss)]
        let unit = (z >> 11) as f64 / (1u64 << 53) as f64;
        let signed: T = cast(2.0 * unit - 1.0).unwrap_or_else(T::zero);
        let magnitude = coordinate.abs().max(T::one());
        coordinate + scale * magnitude * signed
    };
    Point3::new(nudge(point.x), nudge(point.y), nudge(point.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adjacency::EdgeAdjacency;

    fn tetrahedron_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    fn assert_closed_manifold(mesh: &TriangleMesh<f64>) {
        let adjacency = EdgeAdjacency::from_faces(&mesh.faces);
        assert!(!adjacency.has_nonmanifold_edges(), "non-manifold edge");
        assert!(adjacency.is_closed(), "mesh has boundary edges");
        assert!(adjacency.is_consistently_wound(), "winding inconsistent");
    }

    #[test]
    fn tetrahedron_scenario() {
        let mut builder = ConvexHullBuilder::new();
        builder.add_vertices(&tetrahedron_points());

        let mesh = builder.mesh();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
        assert!(mesh.validate().is_ok());
        assert_closed_manifold(mesh);
    }

    #[test]
    fn seed_faces_are_wound_outward() {
        let mut builder = ConvexHullBuilder::new();
        builder.add_vertices(&tetrahedron_points());
        let mesh = builder.mesh();

        // For every face, every hull vertex must be on or behind its plane.
        for &[a, b, c] in &mesh.faces {
            for vertex in &mesh.vertices {
                assert_ne!(
                    orient_3d(
                        &mesh.vertices[a],
                        &mesh.vertices[b],
                        &mesh.vertices[c],
                        vertex
                    ),
                    Orientation::POSITIVE
                );
            }
        }
    }

    #[test]
    fn interior_point_is_discarded() {
        let mut builder = ConvexHullBuilder::new();
        builder.add_vertices(&tetrahedron_points());
        builder.add_vertex(Point3::new(0.25, 0.25, 0.25));

        let mesh = builder.mesh();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(builder.num_evaluated(), 5);
    }

    #[test]
    fn duplicate_points_never_break_manifoldness() {
        let mut builder = ConvexHullBuilder::new();
        let points = tetrahedron_points();
        builder.add_vertices(&points);
        builder.add_vertices(&points);
        builder.add_vertex(points[2]);

        let mesh = builder.mesh();
        assert_eq!(mesh.face_count(), 4);
        assert_closed_manifold(mesh);
        assert_eq!(builder.num_evaluated(), 9);
    }

    #[test]
    fn fewer_than_four_points_reports_empty_face_list() {
        let mut builder: ConvexHullBuilder<f64> = ConvexHullBuilder::new();
        builder.add_vertex(Point3::new(0.0, 0.0, 0.0));
        builder.add_vertex(Point3::new(1.0, 0.0, 0.0));
        builder.add_vertex(Point3::new(0.0, 1.0, 0.0));

        assert!(builder.mesh().faces.is_empty());
        assert_eq!(builder.num_evaluated(), 0);
    }

    #[test]
    fn collinear_candidates_are_skipped_while_seeding() {
        let mut builder = ConvexHullBuilder::new();
        builder.add_vertices(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0), // collinear with the first two
            Point3::new(3.0, 0.0, 0.0), // still collinear
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]);

        let mesh = builder.mesh();
        assert!(mesh.face_count() >= 4);
        assert_closed_manifold(mesh);
    }

    #[test]
    fn entirely_coplanar_input_is_resolved_by_perturbation() {
        let mut builder = ConvexHullBuilder::new();
        // Six points, all exactly in the z = 0 plane.
        builder.add_vertices(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.5, 0.2, 0.0),
            Point3::new(0.2, 0.7, 0.0),
        ]);

        let mesh = builder.mesh();
        assert!(mesh.face_count() >= 4, "perturbation should have seeded");
        assert_closed_manifold(mesh);
    }

    #[test]
    fn evaluation_order_is_submission_order_for_clean_input() {
        let mut builder = ConvexHullBuilder::new();
        builder.add_vertices(&tetrahedron_points());
        builder.add_vertex(Point3::new(2.0, 2.0, 2.0));

        assert_eq!(builder.num_evaluated(), 5);
        for index in 0..5 {
            assert_eq!(builder.evaluation_order().get(&index), Some(&index));
        }
    }

    #[test]
    fn perturbed_is_pure_and_bounded() {
        let p: Point3<f64> = Point3::new(1.0, -2.0, 0.0);
        let a = perturbed(&p, 42, 1e-9);
        let b = perturbed(&p, 42, 1e-9);
        assert_eq!(a, b, "same inputs must give the same output");

        let other_salt = perturbed(&p, 43, 1e-9);
        assert_ne!(a, other_salt);

        assert!((a.x - p.x).abs() <= 2e-9);
        assert!((a.y - p.y).abs() <= 4e-9);
        assert!((a.z - p.z).abs() <= 2e-9);
    }

    #[test]
    fn growing_hull_stays_manifold_under_streaming_insertions() {
        let mut builder = ConvexHullBuilder::new();
        // A deterministic scatter: points on a skewed lattice.
        for i in 0..40_i32 {
            let t = f64::from(i);
            builder.add_vertex(Point3::new(
                (t * 0.377).sin() * 2.0,
                (t * 0.711).cos() * 1.5,
                (t * 0.193).sin() * (t * 0.071).cos(),
            ));
            assert_closed_manifold(builder.mesh());
        }
        assert_eq!(builder.num_evaluated(), 40);
    }
}

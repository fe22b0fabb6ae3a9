//! Robust geometric orientation predicates.
//!
//! The central operation is [`orient_3d`]: the sign of the signed volume of a
//! tetrahedron, equivalently which side of the oriented plane through three
//! points a fourth point lies on. Every visibility test during hull
//! construction calls it, and a single wrong sign corrupts the hull's
//! combinatorics, so the returned sign must be correct on *all* inputs —
//! including configurations where naive floating-point evaluation is wrecked
//! by cancellation.
//!
//! The implementation is adaptive in the manner of Shewchuk's predicates: a
//! fast `f64` evaluation is accepted when its magnitude exceeds a conservative
//! forward-error bound derived from the permanent of the difference matrix;
//! otherwise the sign is recomputed with exact floating-point expansion
//! arithmetic. [`orient_3d_exact`] always takes the exact path and exists to
//! cross-check (and benchmark against) the adaptive one; the two agree in
//! sign on every input.
//!
//! # References
//!
//! - Shewchuk, J. R. "Adaptive Precision Floating-Point Arithmetic and Fast
//!   Robust Geometric Predicates." *Discrete & Computational Geometry* 18,
//!   no. 3 (1997): 305-363.

use nalgebra::Point3;

use crate::geometry::traits::coordinate::{CoordinateScalar, coords_to_f64};

/// Represents the orientation of a point relative to an oriented plane, or of
/// a simplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The tetrahedron has negative signed volume (determinant < 0).
    NEGATIVE,
    /// The four points are exactly coplanar (determinant = 0).
    DEGENERATE,
    /// The tetrahedron has positive signed volume (determinant > 0).
    POSITIVE,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Function type for orientation predicates, used by the hull builder as an
/// injected dependency (a plain function value; no trait hierarchy needed).
pub type OrientPredicate<T> =
    fn(&Point3<T>, &Point3<T>, &Point3<T>, &Point3<T>) -> Orientation;

/// Half the distance between 1.0 and the next larger double: the unit
/// roundoff u = 2^-53.
const EPSILON: f64 = f64::EPSILON / 2.0;

/// Static forward-error bound for the fast orientation determinant,
/// `(7 + 56u)u` times the permanent of the matrix (Shewchuk's bound A).
const ORIENT3D_ERRBOUND_A: f64 = (7.0 + 56.0 * EPSILON) * EPSILON;

/// Determine which side of the plane through `a`, `b`, `c` the point `d`
/// lies on, robustly.
///
/// Returns the sign of the signed volume of the tetrahedron `(a, b, c, d)`,
/// i.e. the sign of `((b − a) × (c − a)) · (d − a)`:
///
/// - [`Orientation::POSITIVE`] — `d` is on the positive side of the plane
///   oriented by `(b − a) × (c − a)`
/// - [`Orientation::NEGATIVE`] — `d` is on the negative side
/// - [`Orientation::DEGENERATE`] — the four points are exactly coplanar
///
/// The fast evaluation is certified against a conservative error bound; when
/// it cannot be certified, the sign is recomputed exactly, so the result is
/// trustworthy on every input. Non-finite coordinates report `DEGENERATE`.
///
/// # Examples
///
/// ```rust
/// use polyhull::geometry::predicates::{Orientation, orient_3d};
/// use nalgebra::Point3;
///
/// let a = Point3::new(0.0, 0.0, 0.0);
/// let b = Point3::new(1.0, 0.0, 0.0);
/// let c = Point3::new(0.0, 1.0, 0.0);
///
/// assert_eq!(orient_3d(&a, &b, &c, &Point3::new(0.0, 0.0, 1.0)), Orientation::POSITIVE);
/// assert_eq!(orient_3d(&a, &b, &c, &Point3::new(0.0, 0.0, -1.0)), Orientation::NEGATIVE);
/// assert_eq!(orient_3d(&a, &b, &c, &Point3::new(0.3, 0.4, 0.0)), Orientation::DEGENERATE);
/// ```
#[must_use]
pub fn orient_3d<T: CoordinateScalar>(
    a: &Point3<T>,
    b: &Point3<T>,
    c: &Point3<T>,
    d: &Point3<T>,
) -> Orientation {
    let (pa, pb, pc, pd) = (
        coords_to_f64(a),
        coords_to_f64(b),
        coords_to_f64(c),
        coords_to_f64(d),
    );
    if !all_finite(&[pa, pb, pc, pd]) {
        return Orientation::DEGENERATE;
    }

    let ux = pb[0] - pa[0];
    let uy = pb[1] - pa[1];
    let uz = pb[2] - pa[2];
    let vx = pc[0] - pa[0];
    let vy = pc[1] - pa[1];
    let vz = pc[2] - pa[2];
    let wx = pd[0] - pa[0];
    let wy = pd[1] - pa[1];
    let wz = pd[2] - pa[2];

    let vywz = vy * wz;
    let vzwy = vz * wy;
    let vzwx = vz * wx;
    let vxwz = vx * wz;
    let vxwy = vx * wy;
    let vywx = vy * wx;

    let det = ux * (vywz - vzwy) + uy * (vzwx - vxwz) + uz * (vxwy - vywx);

    let permanent = (vywz.abs() + vzwy.abs()) * ux.abs()
        + (vzwx.abs() + vxwz.abs()) * uy.abs()
        + (vxwy.abs() + vywx.abs()) * uz.abs();
    let errbound = ORIENT3D_ERRBOUND_A * permanent;

    if det > errbound {
        return Orientation::POSITIVE;
    }
    if -det > errbound {
        return Orientation::NEGATIVE;
    }

    // The fast result cannot be certified: the true determinant may be tiny
    // or zero. Redo the computation exactly.
    orientation_from_sign(exact_det_sign(&pa, &pb, &pc, &pd))
}

/// Non-adaptive variant of [`orient_3d`] that always performs the full exact
/// computation.
///
/// Identical contract to [`orient_3d`]; the two agree in sign on every input.
/// Used to cross-check and benchmark the adaptive path.
#[must_use]
pub fn orient_3d_exact<T: CoordinateScalar>(
    a: &Point3<T>,
    b: &Point3<T>,
    c: &Point3<T>,
    d: &Point3<T>,
) -> Orientation {
    let (pa, pb, pc, pd) = (
        coords_to_f64(a),
        coords_to_f64(b),
        coords_to_f64(c),
        coords_to_f64(d),
    );
    if !all_finite(&[pa, pb, pc, pd]) {
        return Orientation::DEGENERATE;
    }
    orientation_from_sign(exact_det_sign(&pa, &pb, &pc, &pd))
}

/// Are the three points exactly collinear?
///
/// Evaluated exactly (all three 2×2 minors of the spanning vectors, via the
/// same expansion kernel as [`orient_3d`]), so near-collinear triples are
/// never misreported. The hull builder uses this to skip unusable seed
/// candidates. Non-finite coordinates report `true` (degenerate).
#[must_use]
pub fn collinear_3d<T: CoordinateScalar>(a: &Point3<T>, b: &Point3<T>, c: &Point3<T>) -> bool {
    use expansion::{expansion_sign, mul_two_expansions, two_diff};

    let (pa, pb, pc) = (coords_to_f64(a), coords_to_f64(b), coords_to_f64(c));
    if !all_finite(&[pa, pb, pc]) {
        return true;
    }

    let u = [
        two_diff(pb[0], pa[0]),
        two_diff(pb[1], pa[1]),
        two_diff(pb[2], pa[2]),
    ];
    let v = [
        two_diff(pc[0], pa[0]),
        two_diff(pc[1], pa[1]),
        two_diff(pc[2], pa[2]),
    ];

    // Collinear iff the cross product u × v is exactly zero.
    [(1, 2), (2, 0), (0, 1)].iter().all(|&(i, j)| {
        let minor = mul_two_expansions(u[i], v[j], u[j], v[i]);
        expansion_sign(&minor) == std::cmp::Ordering::Equal
    })
}

#[inline]
fn all_finite(points: &[[f64; 3]]) -> bool {
    points.iter().all(|p| p.iter().all(|c| c.is_finite()))
}

#[inline]
fn orientation_from_sign(sign: std::cmp::Ordering) -> Orientation {
    match sign {
        std::cmp::Ordering::Greater => Orientation::POSITIVE,
        std::cmp::Ordering::Less => Orientation::NEGATIVE,
        std::cmp::Ordering::Equal => Orientation::DEGENERATE,
    }
}

/// Exact sign of `det [b − a; c − a; d − a]` via expansion arithmetic.
///
/// Every intermediate value is represented as a floating-point expansion (a
/// sum of non-overlapping doubles ordered by increasing magnitude), so the
/// final sign is the sign of the mathematically exact determinant of the
/// given double-precision inputs.
fn exact_det_sign(pa: &[f64; 3], pb: &[f64; 3], pc: &[f64; 3], pd: &[f64; 3]) -> std::cmp::Ordering {
    use expansion::{expansion_sign, mul_two_expansions, scale_and_accumulate, two_diff};

    // Each coordinate difference is captured exactly as a two-component
    // expansion (approximation + roundoff tail).
    let u = [
        two_diff(pb[0], pa[0]),
        two_diff(pb[1], pa[1]),
        two_diff(pb[2], pa[2]),
    ];
    let v = [
        two_diff(pc[0], pa[0]),
        two_diff(pc[1], pa[1]),
        two_diff(pc[2], pa[2]),
    ];
    let w = [
        two_diff(pd[0], pa[0]),
        two_diff(pd[1], pa[1]),
        two_diff(pd[2], pa[2]),
    ];

    // Minors of the cross product v × w, each exact.
    let minor_x = mul_two_expansions(v[1], w[2], v[2], w[1]);
    let minor_y = mul_two_expansions(v[2], w[0], v[0], w[2]);
    let minor_z = mul_two_expansions(v[0], w[1], v[1], w[0]);

    // det = ux·minor_x + uy·minor_y + uz·minor_z, accumulated exactly.
    let mut det = Vec::with_capacity(192);
    scale_and_accumulate(&mut det, &minor_x, u[0]);
    scale_and_accumulate(&mut det, &minor_y, u[1]);
    scale_and_accumulate(&mut det, &minor_z, u[2]);

    expansion_sign(&det)
}

/// Floating-point expansion arithmetic (Shewchuk 1997).
///
/// An expansion is a sequence of doubles, non-overlapping and ordered by
/// increasing magnitude, whose exact sum is the represented value. All
/// operations below are exact; the only approximation in the predicate is the
/// certified fast path.
mod expansion {
    /// Exact sum: returns `(x, y)` with `x = fl(a + b)` and `a + b = x + y`.
    #[inline]
    pub(super) fn two_sum(a: f64, b: f64) -> (f64, f64) {
        let x = a + b;
        let b_virt = x - a;
        let a_virt = x - b_virt;
        let b_round = b - b_virt;
        let a_round = a - a_virt;
        (x, a_round + b_round)
    }

    /// Exact difference: returns `(x, y)` with `x = fl(a - b)` and
    /// `a - b = x + y`.
    #[inline]
    pub(super) fn two_diff(a: f64, b: f64) -> (f64, f64) {
        let x = a - b;
        let b_virt = a - x;
        let a_virt = x + b_virt;
        let b_round = b_virt - b;
        let a_round = a - a_virt;
        (x, a_round + b_round)
    }

    /// Exact product via fused multiply-add: returns `(x, y)` with
    /// `x = fl(a · b)` and `a · b = x + y`.
    #[inline]
    pub(super) fn two_product(a: f64, b: f64) -> (f64, f64) {
        let x = a * b;
        let y = a.mul_add(b, -x);
        (x, y)
    }

    /// Adds the scalar `b` into the expansion `e`, preserving the expansion
    /// invariant. Zero components are elided.
    pub(super) fn grow_expansion(e: &[f64], b: f64) -> Vec<f64> {
        let mut h = Vec::with_capacity(e.len() + 1);
        let mut q = b;
        for &component in e {
            let (sum, err) = two_sum(q, component);
            q = sum;
            if err != 0.0 {
                h.push(err);
            }
        }
        if q != 0.0 || h.is_empty() {
            h.push(q);
        }
        h
    }

    /// Exact product of two two-component expansions minus another such
    /// product: `(a1 + a0)(b1 + b0) - (c1 + c0)(d1 + d0)`.
    ///
    /// This is the shape of every 2×2 minor in the determinant.
    pub(super) fn mul_two_expansions(
        a: (f64, f64),
        b: (f64, f64),
        c: (f64, f64),
        d: (f64, f64),
    ) -> Vec<f64> {
        let mut acc = Vec::new();
        for &(p, q, negate) in &[
            (a, b, false),
            (c, d, true),
        ] {
            let sign = if negate { -1.0 } else { 1.0 };
            for &(x, y) in &[(p.0, q.0), (p.0, q.1), (p.1, q.0), (p.1, q.1)] {
                let (prod, err) = two_product(x, y);
                acc = grow_expansion(&acc, sign * err);
                acc = grow_expansion(&acc, sign * prod);
            }
        }
        acc
    }

    /// Accumulates `minor · (s1 + s0)` into the running expansion `det`,
    /// where `s = (s1, s0)` is a two-component expansion.
    pub(super) fn scale_and_accumulate(det: &mut Vec<f64>, minor: &[f64], s: (f64, f64)) {
        for &factor in &[s.1, s.0] {
            if factor == 0.0 {
                continue;
            }
            for &component in minor {
                let (prod, err) = two_product(component, factor);
                *det = grow_expansion(det, err);
                *det = grow_expansion(det, prod);
            }
        }
    }

    /// Sign of the value represented by an expansion: the sign of its
    /// largest-magnitude (last nonzero) component.
    pub(super) fn expansion_sign(e: &[f64]) -> std::cmp::Ordering {
        for &component in e.iter().rev() {
            if component > 0.0 {
                return std::cmp::Ordering::Greater;
            }
            if component < 0.0 {
                return std::cmp::Ordering::Less;
            }
        }
        std::cmp::Ordering::Equal
    }

}

// =============================================================================
// TESTS
// =============================================================================

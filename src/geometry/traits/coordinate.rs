//! Coordinate scalar abstraction for geometric computations.
//!
//! The crate is generic over the floating-point scalar used for vertex
//! coordinates. [`CoordinateScalar`] consolidates the bounds every generic
//! function needs (floating-point arithmetic, casting, serialization) and
//! provides per-type default tolerances for approximate comparisons.
//!
//! Geometric predicates always *evaluate* in `f64` regardless of the scalar
//! type (widening `f32` is lossless), so the robustness guarantees of
//! [`crate::geometry::predicates`] hold for every `CoordinateScalar`.

use nalgebra::Point3;
use num_traits::{Float, NumCast, cast};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::{Debug, Display};

/// Default tolerance for f32 floating-point comparisons.
///
/// Appropriate for single precision with a reasonable margin for accumulated
/// rounding.
pub const DEFAULT_TOLERANCE_F32: f32 = 1e-6;

/// Default tolerance for f64 floating-point comparisons.
///
/// Appropriate for double precision with a reasonable margin for accumulated
/// rounding.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-15;

/// Trait alias consolidating all coordinate scalar requirements.
///
/// Implemented for `f32` and `f64`. The bounds cover:
///
/// - **`Float + NumCast`**: arithmetic and lossless widening to `f64`
/// - **`Default + Debug + Display`**: diagnostics and container derives
/// - **`Serialize + DeserializeOwned`**: serde support on the plain-data
///   types holding coordinates
///
/// # Examples
///
/// ```rust
/// use polyhull::geometry::traits::coordinate::CoordinateScalar;
///
/// fn compare_with_tolerance<T: CoordinateScalar>(a: T, b: T) -> bool {
///     (a - b).abs() < T::default_tolerance()
/// }
///
/// assert!(compare_with_tolerance(1.0_f64, 1.0 + 1e-16));
/// assert_eq!(f32::default_tolerance(), 1e-6_f32);
/// ```
pub trait CoordinateScalar:
    Float + NumCast + Default + Debug + Display + Serialize + DeserializeOwned + 'static
{
    /// Returns the appropriate default tolerance for this scalar type:
    /// `1e-6` for `f32`, `1e-15` for `f64`.
    fn default_tolerance() -> Self;
}

impl CoordinateScalar for f32 {
    #[inline]
    fn default_tolerance() -> Self {
        DEFAULT_TOLERANCE_F32
    }
}

impl CoordinateScalar for f64 {
    #[inline]
    fn default_tolerance() -> Self {
        DEFAULT_TOLERANCE_F64
    }
}

/// Widens a point's coordinates to `f64` for predicate evaluation.
///
/// Non-finite and uncastable coordinates widen to `f64::NAN`; the predicates
/// treat any NaN operand as a degenerate configuration rather than erroring.
#[inline]
#[must_use]
pub fn coords_to_f64<T: CoordinateScalar>(p: &Point3<T>) -> [f64; 3] {
    [
        cast(p.x).unwrap_or(f64::NAN),
        cast(p.y).unwrap_or(f64::NAN),
        cast(p.z).unwrap_or(f64::NAN),
    ]
}

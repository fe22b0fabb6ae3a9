//! Collection types optimized for mesh and hull combinatorics.
//!
//! The maps in this crate key on vertex-index pairs (directed edges) and face
//! indices — trusted, internal data — so every map and set uses the fast
//! non-cryptographic `FxHasher` instead of the DoS-resistant default.

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;

/// Optimized `HashMap` type for performance-critical operations.
/// Uses `FastHasher` (`rustc_hash::FxHasher`) for faster hashing in
/// non-cryptographic contexts.
///
/// # Security Warning
///
/// Not DoS-resistant: do not use with attacker-controlled keys. Edge and face
/// indices produced by this crate's own analyses are fine.
///
/// # Examples
///
/// ```rust
/// use polyhull::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<(usize, usize), usize> = FastHashMap::default();
/// map.insert((0, 1), 7);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Optimized `HashSet` counterpart of [`FastHashMap`].
pub type FastHashSet<T> = FxHashSet<T>;

/// Fast non-cryptographic hasher alias for internal collections.
pub type FastHasher = FxHasher;

/// Build hasher that instantiates [`FastHasher`].
pub type FastBuildHasher = FxBuildHasher;

/// Re-export the Entry enum for `FastHashMap`, for efficient check-and-insert
/// operations. Since `FxHashMap` uses `std::collections::hash_map::Entry`, we
/// re-export that.
pub use std::collections::hash_map::Entry;

/// Small-optimized Vec that uses stack allocation for small collections, with
/// heap fallback for larger ones.
///
/// # Size Guidelines
///
/// - **N=2**: faces incident to a directed edge (≤1 in a consistently wound
///   manifold, ≤2 before repair)
/// - **N=8**: per-vertex boundary successors, temporary face buffers
///
/// # Examples
///
/// ```rust
/// use polyhull::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<usize, 2> = SmallBuffer::new();
/// buffer.push(0);
/// buffer.push(1);
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Creates a [`FastHashMap`] with pre-allocated capacity using the optimal
/// hasher. More efficient than the default constructor when the expected size
/// is known (e.g. three directed edges per face).
#[inline]
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

/// Creates a [`FastHashSet`] with pre-allocated capacity using the optimal
/// hasher.
#[inline]
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

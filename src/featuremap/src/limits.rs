//! Per-class clamp thresholds for length-bucket features.
//!
//! Each `*_length_at_least` class is a staircase of boolean features keyed on
//! a discretized length; `find_X`/`insert_X` clamp the requested length into
//! `[0, threshold]` before indexing, bounding the table regardless of how
//! long the real loop is.

pub const NUM_NUCLEOTIDE_CODES: usize = 5; // A, C, G, U, Other

pub const BP_DIST_LAST_THRESHOLD: usize = 131;
pub const HAIRPIN_LENGTH_LAST_THRESHOLD: usize = 30;
pub const HELIX_LENGTH_LAST_THRESHOLD: usize = 30;
pub const BULGE_LENGTH_LAST_THRESHOLD: usize = 30;
pub const INTERNAL_LENGTH_LAST_THRESHOLD: usize = 30;
pub const INTERNAL_SYMMETRIC_LENGTH_LAST_THRESHOLD: usize = 15;
pub const INTERNAL_ASYMMETRY_LAST_THRESHOLD: usize = 28;

/// `internal_explicit(i, j)` is only a distinct feature for small, specific
/// side lengths; longer internal loops fall back to `internal_length_at_least`.
pub const INTERNAL_EXPLICIT_MAX_LENGTH: usize = 4;

#[must_use]
pub fn clamp(length: usize, threshold: usize) -> usize {
    length.min(threshold)
}

//! This module contains constants that are needed throughout the codebase.

/// The width of a machine word on the modelled platforms in bits.
pub const WORD_SIZE_BITS: usize = 64;

/// The width of a byte (here and most other places) in bits.
pub const BYTE_SIZE_BITS: usize = 8;

/// The width of a machine word in bytes.
pub const WORD_SIZE_BYTES: usize = WORD_SIZE_BITS / BYTE_SIZE_BITS;

/// The default maximum number of bytes that a string model will scan before
/// giving up on finding a terminator.
///
/// One page of unconstrained memory. A string that crosses a full page
/// without a definite terminator is treated as a defect signature rather
/// than scanned further.
pub const DEFAULT_STRING_SCAN_BYTES: usize = 4096;

/// The default maximum number of concrete values that will be enumerated
/// when resolving a concretization with [`crate::signal::Policy::All`].
///
/// Callers must treat a result of exactly this many values as potentially
/// capped.
pub const DEFAULT_CONCRETIZATION_VALUE_LIMIT: usize = 256;

/// The default maximum number of concrete values that will be enumerated
/// when resolving a concretization with [`crate::signal::Policy::Sampled`].
pub const DEFAULT_SAMPLED_VALUE_LIMIT: usize = 16;

/// The default maximum number of candidate assignments the built-in
/// enumeration solver will explore for a single query.
///
/// Queries whose candidate space exceeds this limit fail with
/// [`crate::error::solver::Error::SearchSpaceExceeded`] rather than running
/// away.
pub const DEFAULT_SOLVER_SEARCH_LIMIT: usize = 1 << 20;

//! Error types for array-splices.
//!
//! Finding splices never fails. Errors only arise when a splice list is
//! applied to a sequence it was not computed for.

use thiserror::Error;

/// Errors that can occur while applying splices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    /// A splice reaches past the end of the sequence in progress
    #[error("splice #{index} out of bounds: at {at}, remove {remove}, but length is {len}")]
    OutOfBounds {
        /// Position of the offending splice in the list
        index: usize,
        /// Insertion point of the splice
        at: usize,
        /// Number of elements the splice removes
        remove: usize,
        /// Length of the sequence when the splice was applied
        len: usize,
    },
}

/// Result type alias for splice operations.
pub type SpliceResult<T> = Result<T, SpliceError>;

impl SpliceError {
    /// Create an out-of-bounds error for the splice at `index`.
    pub fn out_of_bounds(index: usize, at: usize, remove: usize, len: usize) -> Self {
        Self::OutOfBounds { index, at, remove, len }
    }
}

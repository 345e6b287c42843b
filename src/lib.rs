//! array-splices - Greedy splice lists between ordered sequences
//!
//! ## Core Concepts
//!
//! **Splice**: `{at, remove, add}`, an edit of a sequence in progress. A list of
//! splices applied in order, left to right, turns the old sequence into the new.
//!
//! **Matcher**: the equivalence test deciding which old element lines up with
//! which new element. Any `FnMut(&T, &T) -> bool` works; [`CachedMatcher`]
//! memoizes an expensive one.
//!
//! ## Modules
//! - `algo`: splice search (single pair and batches)
//! - `matcher`: `Matcher` trait, default and memoizing matchers
//! - `splice`: `Splice` record, statistics and application
//! - `describe`: rendering of changes as method-call statements
//!
//! ## Usage
//!
//! ```
//! use array_splices::{applied, find_splices, find_splices_by, Splice};
//!
//! let before = [1, 2];
//! let after = [0, 1, 2, 3];
//! let splices = find_splices(&before, &after);
//! assert_eq!(splices, vec![Splice::insert(0, vec![0]), Splice::insert(3, vec![3])]);
//! assert_eq!(applied(&before, &splices).unwrap(), after);
//!
//! // Compare only the first character
//! let splices = find_splices_by(&["a1", "b1"], &["c2", "a2", "b2"], |a, b| a[..1] == b[..1]);
//! assert_eq!(splices, vec![Splice::insert(0, vec!["c2"])]);
//! ```

// =============================================================================
// Core modules
// =============================================================================

/// Algorithms: splice search, batches
pub mod algo;

/// Equivalence predicates and memoization
pub mod matcher;

/// Splice records and application
pub mod splice;

/// Change rendering
pub mod describe;

/// Error types
pub mod error;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Algorithms
pub use algo::{
    find_splices, find_splices_batch, find_splices_by, find_splices_with, try_find_splices,
    SequencePair,
};

// Matchers
pub use matcher::{
    ByAddress, ByValue, CacheKey, CachedMatcher, Equal, MatchStats, Matcher, SharedMatcher,
    Symmetry,
};

// Splices
pub use splice::{apply_splices, applied, Splice, SpliceStats};

// Describe
pub use describe::{
    fmt_object, Change, ChangeKind, ClassNameFn, DescribeConfig, Path, PathSegment, ValueDisplay,
};

// Error types
pub use error::{SpliceError, SpliceResult};

// =============================================================================
// Tests
// =============================================================================

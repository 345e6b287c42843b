//! Prelude module for common imports.
//!
//! ```
//! use array_splices::prelude::*;
//!
//! let splices = find_splices_with(&[1, 2], &[1, 2, 3], CachedMatcher::new(Equal));
//! assert_eq!(splices, vec![Splice::insert(2, vec![3])]);
//! ```

// Matchers
pub use crate::matcher::{
    ByAddress, ByValue, CacheKey, CachedMatcher, Equal, MatchStats, Matcher, SharedMatcher,
    Symmetry,
};

// Splices
pub use crate::splice::{apply_splices, applied, Splice, SpliceStats};

// Algorithms
pub use crate::algo::{
    find_splices, find_splices_batch, find_splices_by, find_splices_with, try_find_splices,
    SequencePair,
};

// Error
pub use crate::error::{SpliceError, SpliceResult};

// Describe
pub use crate::describe::{
    describe_change, describe_changes, describe_splice, describe_splices, fmt_object, path_string,
    Change, ChangeKind, ClassNameFn, DescribeConfig, Path, PathSegment, ValueDisplay,
};

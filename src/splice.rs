//! Splice records and their application.
//!
//! A splice is the edit `{at, remove, add}`: remove `remove` elements starting
//! at `at`, then insert `add` at the same position. A list of splices is always
//! relative to the evolving sequence, each one expressed against the result
//! of the splices before it.

use crate::error::{SpliceError, SpliceResult};

// =============================================================================
// Splice
// =============================================================================

/// One edit of a sequence in progress
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Splice<T> {
    /// Insertion point, relative to the sequence as already edited
    pub at: usize,
    /// Number of elements removed starting at `at`
    pub remove: usize,
    /// Elements inserted at `at` after removal, in order
    pub add: Vec<T>,
}

impl<T> Splice<T> {
    /// Create a new splice
    pub fn new(at: usize, remove: usize, add: Vec<T>) -> Self {
        Self { at, remove, add }
    }

    /// Splice that only inserts
    pub fn insert(at: usize, add: Vec<T>) -> Self {
        Self::new(at, 0, add)
    }

    /// Splice that only removes
    pub fn removal(at: usize, remove: usize) -> Self {
        Self::new(at, remove, Vec::new())
    }

    /// Elements inserted by this splice
    #[inline]
    pub fn added(&self) -> &[T] {
        &self.add
    }

    /// End of the removed range (exclusive)
    #[inline]
    pub fn end(&self) -> usize {
        self.at + self.remove
    }

    /// Check if this splice removes nothing
    pub fn is_insertion(&self) -> bool {
        self.remove == 0 && !self.add.is_empty()
    }

    /// Check if this splice inserts nothing
    pub fn is_removal(&self) -> bool {
        self.add.is_empty() && self.remove > 0
    }

    /// Check if this splice both removes and inserts
    pub fn is_replacement(&self) -> bool {
        self.remove > 0 && !self.add.is_empty()
    }

    /// Change in sequence length caused by this splice
    pub fn len_delta(&self) -> isize {
        self.add.len() as isize - self.remove as isize
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Summary of a splice list
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SpliceStats {
    /// Number of splices
    pub splices: usize,
    /// Total elements removed
    pub removed: usize,
    /// Total elements added
    pub added: usize,
}

impl SpliceStats {
    /// Collect statistics over a splice list
    pub fn of<T>(splices: &[Splice<T>]) -> Self {
        splices.iter().fold(Self::default(), |mut stats, s| {
            stats.splices += 1;
            stats.removed += s.remove;
            stats.added += s.add.len();
            stats
        })
    }

    /// Check if there are no changes
    pub fn is_empty(&self) -> bool {
        self.splices == 0
    }

    /// Difference between the target and source lengths
    pub fn net_change(&self) -> isize {
        self.added as isize - self.removed as isize
    }
}

// =============================================================================
// Application
// =============================================================================

/// Apply `splices` to `target` in order.
///
/// Each splice is checked against the current length before it is applied. On
/// failure the earlier splices stay applied and the offending one is reported.
pub fn apply_splices<T: Clone>(target: &mut Vec<T>, splices: &[Splice<T>]) -> SpliceResult<()> {
    for (index, splice) in splices.iter().enumerate() {
        let len = target.len();
        if splice.at > len || splice.remove > len - splice.at {
            return Err(SpliceError::out_of_bounds(index, splice.at, splice.remove, len));
        }
        target.splice(splice.at..splice.end(), splice.add.iter().cloned());
    }
    Ok(())
}

/// Apply `splices` to a copy of `before`
pub fn applied<T: Clone>(before: &[T], splices: &[Splice<T>]) -> SpliceResult<Vec<T>> {
    let mut target = before.to_vec();
    apply_splices(&mut target, splices)?;
    Ok(target)
}

// =============================================================================
// Tests
// =============================================================================

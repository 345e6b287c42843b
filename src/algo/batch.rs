//! Splice search over many independent sequence pairs
//!
//! Each pair gets a fresh matcher from the caller's factory, so no cache is
//! shared unless the factory hands out clones of a [`SharedMatcher`].
//! With the `parallel` feature the pairs are spread over rayon's pool; the
//! output is the same either way.
//!
//! [`SharedMatcher`]: crate::SharedMatcher

use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::splices::find_splices_with;
use crate::matcher::Matcher;
use crate::splice::Splice;

/// Old and new version of one sequence
pub type SequencePair<T> = (Vec<T>, Vec<T>);

/// Find splices for every pair, in input order
pub fn find_splices_batch<T, M, F>(pairs: &[SequencePair<T>], make_matcher: F) -> Vec<Vec<Splice<T>>>
where
    T: Clone + Send + Sync,
    M: Matcher<T>,
    F: Fn() -> M + Sync,
{
    debug!("finding splices for {} sequence pairs", pairs.len());

    #[cfg(feature = "parallel")]
    let iter = pairs.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = pairs.iter();

    iter.map(|(before, after)| find_splices_with(before, after, make_matcher()))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

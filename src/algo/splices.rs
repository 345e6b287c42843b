//! Greedy splice search between two sequences
//!
//! Walks both sequences with a cursor pair and emits a splice for every run
//! of elements that does not line up.
//!
//! # Algorithm
//!
//! ```text
//! loop:
//!   k = first index where before[k] !~ after[k]   (reads past the end never match)
//!   none  -> done
//!   k > 0 -> skip the matched prefix, at += k
//!   k = 0 -> (i, j) = first matching pair, row-major over before x after
//!            emit { at, remove: i, add: after[..j] }
//!            before = before[i..], after = after[j..], at += j
//! ```
//!
//! The re-sync point is the first match in scan order, not the one giving the
//! shortest edit script. The matched pair is not consumed; the next mismatch
//! scan confirms it.
//!
//! # Complexity
//!
//! - Time: O(n * m) matcher calls per re-sync scan, across all splices
//! - Space: O(n + m) for the output
//!
//! Wrapping the predicate in a [`CachedMatcher`](crate::CachedMatcher) removes
//! the repeated comparisons between the two scans.

use std::convert::Infallible;

use log::{debug, trace};

use crate::matcher::{Equal, Matcher};
use crate::splice::Splice;

// =============================================================================
// Fallible Matching
// =============================================================================

/// Matcher whose predicate may fail
///
/// The search stops at the first error and returns it unchanged.
trait TryMatcher<T: ?Sized> {
    type Error;

    fn try_matches(&mut self, a: &T, b: &T) -> Result<bool, Self::Error>;
}

impl<T: ?Sized, E, F> TryMatcher<T> for F
where
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    type Error = E;

    #[inline]
    fn try_matches(&mut self, a: &T, b: &T) -> Result<bool, E> {
        self(a, b)
    }
}

/// Lifts an infallible [`Matcher`] into the search
struct Total<'m, M: ?Sized>(&'m mut M);

impl<T: ?Sized, M: Matcher<T> + ?Sized> TryMatcher<T> for Total<'_, M> {
    type Error = Infallible;

    #[inline]
    fn try_matches(&mut self, a: &T, b: &T) -> Result<bool, Infallible> {
        Ok(self.0.matches(a, b))
    }
}

// =============================================================================
// Main API
// =============================================================================

/// Find splices turning `before` into `after`, comparing with `PartialEq`
///
/// ```
/// use array_splices::{find_splices, Splice};
///
/// let splices = find_splices(&[1, 2], &[0, 1, 2, 3]);
/// assert_eq!(splices, vec![Splice::insert(0, vec![0]), Splice::insert(3, vec![3])]);
/// ```
///
/// # Panics
///
/// Never for `PartialEq` implementations that answer consistently.
pub fn find_splices<T: PartialEq + Clone>(before: &[T], after: &[T]) -> Vec<Splice<T>> {
    find_splices_with(before, after, Equal)
}

/// Find splices turning `before` into `after` using `matcher`
///
/// Applying the result in order to `before` yields `after` whenever the
/// matcher only pairs identical elements. A looser matcher leaves matched
/// elements with their old values.
///
/// # Panics
///
/// Panics if the matcher contradicts itself: reporting a pair as different
/// during the mismatch scan and then as equal during the re-sync scan. A
/// [`CachedMatcher`](crate::CachedMatcher) answers consistently by
/// construction. A panic raised by the matcher itself propagates unchanged.
pub fn find_splices_with<T, M>(before: &[T], after: &[T], mut matcher: M) -> Vec<Splice<T>>
where
    T: Clone,
    M: Matcher<T>,
{
    match search(before, after, &mut Total(&mut matcher)) {
        Ok(splices) => splices,
        Err(never) => match never {},
    }
}

/// Find splices using a closure as the matcher
///
/// Same as [`find_splices_with`], with closure argument types inferred.
pub fn find_splices_by<T, F>(before: &[T], after: &[T], matcher: F) -> Vec<Splice<T>>
where
    T: Clone,
    F: FnMut(&T, &T) -> bool,
{
    find_splices_with(before, after, matcher)
}

/// Find splices with a predicate that may fail
///
/// The first error returned by `matcher` aborts the search and is returned
/// as-is; no partial result is kept.
///
/// # Panics
///
/// Same conditions as [`find_splices_with`].
pub fn try_find_splices<T, E, F>(before: &[T], after: &[T], mut matcher: F) -> Result<Vec<Splice<T>>, E>
where
    T: Clone,
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    search(before, after, &mut matcher)
}

// =============================================================================
// Search Core
// =============================================================================

fn search<T, M>(mut before: &[T], mut after: &[T], matcher: &mut M) -> Result<Vec<Splice<T>>, M::Error>
where
    T: Clone,
    M: TryMatcher<T> + ?Sized,
{
    let mut splices = Vec::new();
    let mut at = 0;

    while let Some(start) = find_mismatch(before, after, matcher)? {
        if start > 0 {
            trace!("skipping {start} matched elements at {at}");
            before = &before[start..];
            after = &after[start..];
            at += start;
            continue;
        }

        let (i, j) = find_match(before, after, matcher)?;
        assert!(
            i > 0 || j > 0,
            "matcher answered inconsistently for the pair at offset {at}"
        );

        trace!("splice at {at}: remove {i}, add {j}");
        splices.push(Splice::new(at, i, after[..j].to_vec()));
        before = &before[i..];
        after = &after[j..];
        at += j;
    }

    debug!("found {} splices", splices.len());
    Ok(splices)
}

/// Compare slot `k` of both sequences
///
/// A slot past the end is absent: it matches another absent slot and nothing
/// else.
#[inline]
fn slot_matches<T, M>(before: &[T], after: &[T], k: usize, matcher: &mut M) -> Result<bool, M::Error>
where
    M: TryMatcher<T> + ?Sized,
{
    match (before.get(k), after.get(k)) {
        (Some(a), Some(b)) => matcher.try_matches(a, b),
        (None, None) => Ok(true),
        _ => Ok(false),
    }
}

/// First index where the sequences disagree, `None` if they match entirely
fn find_mismatch<T, M>(before: &[T], after: &[T], matcher: &mut M) -> Result<Option<usize>, M::Error>
where
    M: TryMatcher<T> + ?Sized,
{
    let len = before.len().max(after.len());
    for k in 0..len {
        if !slot_matches(before, after, k, matcher)? {
            return Ok(Some(k));
        }
    }
    Ok(None)
}

/// First matching `(before_idx, after_idx)` pair in row-major order
///
/// Falls back to `(before.len(), after.len())` when nothing matches.
fn find_match<T, M>(before: &[T], after: &[T], matcher: &mut M) -> Result<(usize, usize), M::Error>
where
    M: TryMatcher<T> + ?Sized,
{
    for (i, a) in before.iter().enumerate() {
        for (j, b) in after.iter().enumerate() {
            if matcher.try_matches(a, b)? {
                return Ok((i, j));
            }
        }
    }
    Ok((before.len(), after.len()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::matcher::CachedMatcher;
    use crate::splice::applied;

    fn splice<T>(at: usize, remove: usize, add: Vec<T>) -> Splice<T> {
        Splice::new(at, remove, add)
    }

    /// Check that the splices rebuild `after` from `before`
    fn assert_round_trip<T: Clone + PartialEq + std::fmt::Debug>(before: &[T], after: &[T], splices: &[Splice<T>]) {
        assert_eq!(applied(before, splices).unwrap(), after);
    }

    #[test]
    fn test_one_splice_at_start() {
        let splices = find_splices(&[1, 2], &[0, 1, 2]);
        assert_eq!(splices, vec![splice(0, 0, vec![0])]);
    }

    #[test]
    fn test_one_splice_at_end() {
        let splices = find_splices(&[1, 2], &[1, 2, 3]);
        assert_eq!(splices, vec![splice(2, 0, vec![3])]);
    }

    #[test]
    fn test_one_splice_at_middle() {
        let splices = find_splices(&[1.0, 2.0], &[1.0, 1.5, 2.0]);
        assert_eq!(splices, vec![splice(1, 0, vec![1.5])]);
    }

    #[test]
    fn test_two_splices_at_start_and_end() {
        let splices = find_splices(&[1, 2], &[0, 1, 2, 3]);
        assert_eq!(splices, vec![splice(0, 0, vec![0]), splice(3, 0, vec![3])]);
    }

    #[test]
    fn test_long_splices_in() {
        let before = ["1", "2"];
        let after = ["a", "b", "c", "1", "x", "y", "z", "2", "you", "and", "me"];
        let splices = find_splices(&before, &after);
        assert_eq!(
            splices,
            vec![
                splice(0, 0, vec!["a", "b", "c"]),
                splice(4, 0, vec!["x", "y", "z"]),
                splice(8, 0, vec!["you", "and", "me"]),
            ]
        );
        assert_round_trip(&before, &after, &splices);
    }

    #[test]
    fn test_splice_out_at_start() {
        assert_eq!(find_splices(&[0, 1, 2], &[1, 2]), vec![splice(0, 1, vec![])]);
    }

    #[test]
    fn test_splice_out_at_end() {
        assert_eq!(find_splices(&[1, 2, 3], &[1, 2]), vec![splice(2, 1, vec![])]);
    }

    #[test]
    fn test_splice_out_at_middle() {
        assert_eq!(find_splices(&[1.0, 1.5, 2.0], &[1.0, 2.0]), vec![splice(1, 1, vec![])]);
    }

    #[test]
    fn test_splice_out_everywhere() {
        let before = [0.0, 1.0, 1.5, 2.0, 3.0];
        let after = [1.0, 2.0];
        let splices = find_splices(&before, &after);
        assert_eq!(
            splices,
            vec![splice(0, 1, vec![]), splice(1, 1, vec![]), splice(2, 1, vec![])]
        );
        assert_round_trip(&before, &after, &splices);
    }

    #[test]
    fn test_long_splices_out() {
        let before = ["a", "b", "c", "1", "x", "y", "z", "2", "you", "and", "me"];
        let after = ["1", "2"];
        let splices = find_splices(&before, &after);
        assert_eq!(
            splices,
            vec![splice(0, 3, vec![]), splice(1, 3, vec![]), splice(2, 3, vec![])]
        );
        assert_round_trip(&before, &after, &splices);
    }

    #[test]
    fn test_replace_at_start() {
        assert_eq!(find_splices(&[1, 2], &[-1, 2]), vec![splice(0, 1, vec![-1])]);
    }

    #[test]
    fn test_long_replace_at_start() {
        let splices = find_splices(&[1, 2, 3, 4, 5, 6, 7], &[-1, -2, -3, 4, 5, 6, 7]);
        assert_eq!(splices, vec![splice(0, 3, vec![-1, -2, -3])]);
    }

    #[test]
    fn test_custom_matcher() {
        // Only the first character is compared
        let before = ["a1", "b1"];
        let after = ["c2", "a2", "b2"];
        let splices = find_splices_by(&before, &after, |a, b| a[..1] == b[..1]);
        assert_eq!(splices, vec![splice(0, 0, vec!["c2"])]);
    }

    #[test]
    fn test_caching_matcher_call_count() {
        let calls = Cell::new(0);
        let matcher = CachedMatcher::new(|a: &i32, b: &i32| {
            calls.set(calls.get() + 1);
            a == b
        });

        let splices = find_splices_with(&[1, 2], &[0, 1, 2], matcher);
        assert_eq!(splices, vec![splice(0, 0, vec![0])]);
        // 1 ~ 0 (mismatch scan), 1 ~ 1 (re-sync scan), 2 ~ 2 (mismatch scan).
        // The repeats of 1 ~ 0 and 1 ~ 1 come from the cache.
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_uncached_matcher_call_count() {
        let calls = Cell::new(0);
        let splices = find_splices_by(&[1, 2], &[0, 1, 2], |a, b| {
            calls.set(calls.get() + 1);
            a == b
        });
        assert_eq!(splices.len(), 1);
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn test_cached_matcher_by_ref() {
        let mut matcher: CachedMatcher<i32, _> = CachedMatcher::new(Equal);
        let splices = find_splices_with(&[1, 2], &[0, 1, 2], matcher.by_ref());
        assert_eq!(splices.len(), 1);
        assert_eq!(matcher.stats().calls, 3);
        assert_eq!(matcher.stats().hits, 2);
    }

    #[test]
    fn test_cached_matcher_reused_after_sequences_dropped() {
        let mut matcher: CachedMatcher<i32, _> = CachedMatcher::new(Equal);
        {
            let before = vec![1, 2];
            let after = vec![1, 2];
            assert!(find_splices_with(&before, &after, matcher.by_ref()).is_empty());
        }

        // Fresh allocations may land on the addresses freed above
        let before = vec![3, 4];
        let after = vec![5, 6];
        let splices = find_splices_with(&before, &after, matcher.by_ref());
        assert_eq!(splices, vec![splice(0, 2, vec![5, 6])]);
        assert_round_trip(&before, &after, &splices);
    }

    #[test]
    fn test_cached_matcher_reused_across_searches_hits_cache() {
        let calls = Cell::new(0);
        let mut matcher = CachedMatcher::new(|a: &i32, b: &i32| {
            calls.set(calls.get() + 1);
            a == b
        });

        let first = find_splices_with(&[1, 2], &[0, 1, 2], matcher.by_ref());
        assert_eq!(first, vec![splice(0, 0, vec![0])]);
        assert_eq!(calls.get(), 3);

        // Same values in fresh arrays: every answer comes from the cache
        let (before, after) = (vec![1, 2], vec![0, 1, 2]);
        let second = find_splices_with(&before, &after, matcher.by_ref());
        assert_eq!(second, first);
        assert_eq!(calls.get(), 3);
        assert_eq!(matcher.stats().hits, 7);
    }

    #[test]
    fn test_address_keyed_matcher_cleared_between_searches() {
        let mut matcher: CachedMatcher<i32, _, _> = CachedMatcher::by_address(Equal);
        {
            let before = vec![1, 2];
            let after = vec![1, 2];
            assert!(find_splices_with(&before, &after, matcher.by_ref()).is_empty());
            assert_eq!(matcher.cached_pairs(), 2);
        }
        matcher.clear();

        let before = vec![3, 4];
        let after = vec![5, 6];
        let splices = find_splices_with(&before, &after, matcher.by_ref());
        assert_eq!(splices, vec![splice(0, 2, vec![5, 6])]);
        assert_eq!(matcher.stats().calls, matcher.cached_pairs());
    }

    #[test]
    fn test_identical_sequences() {
        let seq = ["x", "y", "z"];
        assert!(find_splices(&seq, &seq).is_empty());
    }

    #[test]
    fn test_empty_sequences() {
        assert!(find_splices::<i32>(&[], &[]).is_empty());
        assert_eq!(find_splices(&[], &[1, 2]), vec![splice(0, 0, vec![1, 2])]);
        assert_eq!(find_splices(&[1, 2], &[]), vec![splice(0, 2, vec![])]);
    }

    #[test]
    fn test_full_replacement() {
        let splices = find_splices(&[1, 2, 3], &[4, 5]);
        assert_eq!(splices, vec![splice(0, 3, vec![4, 5])]);
    }

    #[test]
    fn test_greedy_resync_prefers_leftmost_before() {
        // (0, 1) is found before (1, 0) in row-major order
        let splices = find_splices(&['a', 'b'], &['b', 'a']);
        assert_eq!(splices, vec![splice(0, 0, vec!['b']), splice(2, 1, vec![])]);
        assert_round_trip(&['a', 'b'], &['b', 'a'], &splices);
    }

    #[test]
    fn test_never_matching_predicate() {
        let splices = find_splices_by(&[1, 2], &[1, 2], |_, _| false);
        assert_eq!(splices, vec![splice(0, 2, vec![1, 2])]);
    }

    #[test]
    fn test_always_matching_predicate() {
        // Length difference still shows as absent slots
        let splices = find_splices_by(&[1, 2, 3], &[9], |_, _| true);
        assert_eq!(splices, vec![splice(1, 2, vec![])]);
        assert_round_trip(&[1, 2, 3], &[1], &splices);

        let splices = find_splices_by(&[1], &[7, 8], |_, _| true);
        assert_eq!(splices, vec![splice(1, 0, vec![8])]);
    }

    #[test]
    fn test_non_reflexive_predicate_terminates() {
        // Odd elements never match anything, not even themselves
        let before = [1, 2, 3, 4];
        let after = [1, 2, 3, 4];
        let splices = find_splices_by(&before, &after, |a, b| a == b && a % 2 == 0);
        assert_eq!(
            splices,
            vec![splice(0, 1, vec![1]), splice(2, 1, vec![3])]
        );
    }

    #[test]
    #[should_panic(expected = "matcher answered inconsistently")]
    fn test_inconsistent_predicate_panics() {
        // Says "no" once, then "yes" forever
        let mut first = true;
        find_splices_by(&[1], &[1], move |_, _| !std::mem::take(&mut first));
    }

    #[test]
    fn test_inconsistent_predicate_is_tamed_by_cache() {
        let mut first = true;
        let matcher = CachedMatcher::new(move |_: &i32, _: &i32| !std::mem::take(&mut first));
        let splices = find_splices_with(&[1], &[1], matcher);
        assert_eq!(splices, vec![splice(0, 1, vec![1])]);
    }

    #[test]
    fn test_try_find_splices_ok() {
        let splices: Result<_, String> = try_find_splices(&[1, 2], &[0, 1, 2], |a, b| Ok(a == b));
        assert_eq!(splices.unwrap(), vec![splice(0, 0, vec![0])]);
    }

    #[test]
    fn test_try_find_splices_propagates_error() {
        let calls = Cell::new(0);
        let result = try_find_splices(&[1, 2, 3], &[1, 5, 3], |a: &i32, b: &i32| {
            calls.set(calls.get() + 1);
            if *b == 5 {
                Err(format!("cannot compare {a} with {b}"))
            } else {
                Ok(a == b)
            }
        });
        assert_eq!(result.unwrap_err(), "cannot compare 2 with 5");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_round_trip_grid() {
        // Deterministic pseudo-random sequences over a small alphabet
        let mut state = 0x2545_f491_u32;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };

        for _ in 0..200 {
            let before: Vec<u32> = (0..next() % 9).map(|_| next() % 4).collect();
            let after: Vec<u32> = (0..next() % 9).map(|_| next() % 4).collect();

            let splices = find_splices(&before, &after);
            assert_round_trip(&before, &after, &splices);

            let cached = find_splices_with(&before, &after, CachedMatcher::new(Equal));
            assert_eq!(cached, splices);
        }
    }

    #[test]
    fn test_round_trip_with_loose_matcher() {
        // Matching by parity still rebuilds the exact target
        let before = [1, 2, 3, 4, 6];
        let after = [5, 8, 7, 9, 10, 12];
        let splices = find_splices_by(&before, &after, |a, b| a % 2 == b % 2);
        let rebuilt = applied(&before, &splices).unwrap();
        assert_eq!(rebuilt.len(), after.len());
        // Elements that were matched, not replaced, keep their old value
        assert!(rebuilt.iter().zip(&after).all(|(r, a)| r % 2 == a % 2));
    }

    #[test]
    fn test_no_op_when_reflexive() {
        let seq = vec![String::from("a"), String::from("b")];
        assert!(find_splices_by(&seq, &seq, |a, b| a.len() == b.len()).is_empty());
    }
}

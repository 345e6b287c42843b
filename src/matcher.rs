//! Equivalence predicates and their memoizing wrappers.
//!
//! A [`Matcher`] decides whether an element of the old sequence corresponds to
//! an element of the new one. Any `FnMut(&T, &T) -> bool` is a matcher;
//! [`Equal`] is the default and compares with `PartialEq`.
//!
//! # Memoization
//!
//! The splice search asks about the same pair more than once (the mismatch
//! scan and the re-sync scan overlap). [`CachedMatcher`] calls the wrapped
//! predicate at most once per unordered pair of keys:
//!
//! ```text
//! matches(a, b)
//!   cache[a][b] hit?  -> return it
//!   cache[b][a] hit?  -> return it        (Symmetry::Assumed only)
//!   r = inner(a, b); cache[a][b] = r     (one direction stored)
//! ```
//!
//! The cache never evicts. By default it is keyed by element value, so one
//! matcher can serve several searches. Keying by address with
//! [`CachedMatcher::by_address`] skips the clone but ties the cache to the
//! sequences of a single search.
//!
//! [`SharedMatcher`] is the same idea behind a lock, for many diffs running
//! on different threads over the same element domain.

use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

// =============================================================================
// Matcher Trait
// =============================================================================

/// Equivalence test between an old element and a new element
///
/// The splice search always passes the old element first. Implementations are
/// not required to be reflexive, symmetric or transitive.
pub trait Matcher<T: ?Sized> {
    /// Check if `a` and `b` are the same element
    fn matches(&mut self, a: &T, b: &T) -> bool;

    /// Borrow this matcher, so it can be passed by value and used afterwards
    fn by_ref(&mut self) -> ByRef<'_, Self>
    where
        Self: Sized,
    {
        ByRef(self)
    }
}

impl<T: ?Sized, F> Matcher<T> for F
where
    F: FnMut(&T, &T) -> bool,
{
    #[inline]
    fn matches(&mut self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// Mutable borrow of a matcher, see [`Matcher::by_ref`]
#[derive(Debug)]
pub struct ByRef<'m, M>(&'m mut M);

impl<T: ?Sized, M: Matcher<T>> Matcher<T> for ByRef<'_, M> {
    #[inline]
    fn matches(&mut self, a: &T, b: &T) -> bool {
        self.0.matches(a, b)
    }
}

/// Default matcher: value equality through `PartialEq`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Equal;

impl<T: PartialEq + ?Sized> Matcher<T> for Equal {
    #[inline]
    fn matches(&mut self, a: &T, b: &T) -> bool {
        a == b
    }
}

// =============================================================================
// Cache Keys
// =============================================================================

/// Strategy for turning an element into a cache key
pub trait CacheKey<T: ?Sized> {
    /// Key stored in the cache
    type Key: Hash + Eq;

    /// Compute the key of `item`
    fn key(item: &T) -> Self::Key;
}

/// Key elements by identity (their address)
///
/// Only meaningful while the compared sequences stay borrowed, which holds for
/// the duration of one splice search. Once they are dropped their addresses
/// can be reused by unrelated elements, and cached answers go stale. A matcher
/// keyed this way must be [`clear`](CachedMatcher::clear)ed before it is
/// reused. Zero-sized elements share addresses and therefore share cache
/// entries.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByAddress;

impl<T: ?Sized> CacheKey<T> for ByAddress {
    type Key = usize;

    #[inline]
    fn key(item: &T) -> usize {
        (item as *const T).cast::<()>() as usize
    }
}

/// Key elements by value
#[derive(Debug, Default, Clone, Copy)]
pub struct ByValue;

impl<T: Hash + Eq + Clone> CacheKey<T> for ByValue {
    type Key = T;

    #[inline]
    fn key(item: &T) -> T {
        item.clone()
    }
}

// =============================================================================
// Cache Settings
// =============================================================================

/// How a memoizing matcher treats argument order
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    /// An answer for `(a, b)` is reused for `(b, a)`.
    ///
    /// An asymmetric predicate is then only asked in one direction.
    #[default]
    Assumed,
    /// Each ordered pair is cached and computed separately
    Directed,
}

/// Counters for a memoizing matcher
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct MatchStats {
    /// Number of `matches` calls
    pub lookups: usize,
    /// Lookups answered from the cache
    pub hits: usize,
    /// Calls made to the wrapped predicate
    pub calls: usize,
}

impl MatchStats {
    /// Fraction of lookups answered from the cache
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

type PairCache<K> = FxHashMap<K, FxHashMap<K, bool>>;

#[inline]
fn lookup<K: Hash + Eq>(cache: &PairCache<K>, a: &K, b: &K) -> Option<bool> {
    cache.get(a).and_then(|row| row.get(b)).copied()
}

#[inline]
fn lookup_pair<K: Hash + Eq>(
    cache: &PairCache<K>,
    symmetry: Symmetry,
    a: &K,
    b: &K,
) -> Option<bool> {
    lookup(cache, a, b).or_else(|| match symmetry {
        Symmetry::Assumed => lookup(cache, b, a),
        Symmetry::Directed => None,
    })
}

// =============================================================================
// CachedMatcher
// =============================================================================

/// Memoizing wrapper around a matcher
///
/// Observably equal to the wrapped matcher, as long as that matcher is a pure
/// function of its arguments.
pub struct CachedMatcher<T: ?Sized, F, K: CacheKey<T> = ByValue> {
    inner: F,
    cache: PairCache<K::Key>,
    symmetry: Symmetry,
    stats: MatchStats,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> CachedMatcher<T, F, ByValue>
where
    T: Hash + Eq + Clone,
{
    /// Wrap `inner`, keying the cache by element value
    pub fn new(inner: F) -> Self {
        Self::with_key(inner)
    }
}

impl<T: ?Sized, F> CachedMatcher<T, F, ByAddress> {
    /// Wrap `inner`, keying the cache by element identity
    ///
    /// Equal elements at different positions get separate entries, which
    /// matters for predicates that look at more than the value. The cache is
    /// only valid for the sequences of one search: call
    /// [`clear`](Self::clear) before reusing the matcher on other sequences.
    pub fn by_address(inner: F) -> Self {
        Self::with_key(inner)
    }
}

impl<T: ?Sized, F, K: CacheKey<T>> CachedMatcher<T, F, K> {
    /// Wrap `inner` with an explicit key strategy
    pub fn with_key(inner: F) -> Self {
        Self {
            inner,
            cache: FxHashMap::default(),
            symmetry: Symmetry::default(),
            stats: MatchStats::default(),
            _marker: PhantomData,
        }
    }

    /// Set how argument order is treated
    pub fn with_symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Current symmetry setting
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// Counters since creation (or the last [`clear`](Self::clear))
    pub fn stats(&self) -> MatchStats {
        self.stats
    }

    /// Number of pairs held in the cache
    pub fn cached_pairs(&self) -> usize {
        self.cache.values().map(|row| row.len()).sum()
    }

    /// Drop all cached answers and reset the counters
    pub fn clear(&mut self) {
        self.cache.clear();
        self.stats = MatchStats::default();
    }

    /// Unwrap the inner matcher
    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<T: ?Sized, F, K> Matcher<T> for CachedMatcher<T, F, K>
where
    F: Matcher<T>,
    K: CacheKey<T>,
{
    fn matches(&mut self, a: &T, b: &T) -> bool {
        self.stats.lookups += 1;
        let ka = K::key(a);
        let kb = K::key(b);

        if let Some(hit) = lookup_pair(&self.cache, self.symmetry, &ka, &kb) {
            self.stats.hits += 1;
            return hit;
        }

        let result = self.inner.matches(a, b);
        self.stats.calls += 1;
        self.cache.entry(ka).or_default().insert(kb, result);
        result
    }
}

impl<T: ?Sized, F, K: CacheKey<T>> std::fmt::Debug for CachedMatcher<T, F, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedMatcher")
            .field("symmetry", &self.symmetry)
            .field("cached_pairs", &self.cached_pairs())
            .field("stats", &self.stats)
            .finish()
    }
}

// =============================================================================
// SharedMatcher
// =============================================================================

/// Thread-safe memoizing matcher
///
/// Clones share one cache. The predicate is called without holding the lock,
/// so two threads racing on the same new pair may both compute it; the cache
/// keeps whichever answer lands first.
pub struct SharedMatcher<T, F, K: CacheKey<T> = ByValue> {
    inner: Arc<F>,
    cache: Arc<Mutex<PairCache<K::Key>>>,
    symmetry: Symmetry,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> SharedMatcher<T, F, ByValue>
where
    T: Hash + Eq + Clone,
    F: Fn(&T, &T) -> bool,
{
    /// Wrap `inner`, keying the shared cache by element value
    pub fn new(inner: F) -> Self {
        Self {
            inner: Arc::new(inner),
            cache: Arc::new(Mutex::new(FxHashMap::default())),
            symmetry: Symmetry::default(),
            _marker: PhantomData,
        }
    }
}

impl<T, F, K: CacheKey<T>> SharedMatcher<T, F, K> {
    /// Set how argument order is treated
    pub fn with_symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Number of pairs held in the shared cache
    pub fn cached_pairs(&self) -> usize {
        self.cache.lock().values().map(|row| row.len()).sum()
    }
}

impl<T, F, K: CacheKey<T>> Clone for SharedMatcher<T, F, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cache: Arc::clone(&self.cache),
            symmetry: self.symmetry,
            _marker: PhantomData,
        }
    }
}

impl<T, F, K> Matcher<T> for SharedMatcher<T, F, K>
where
    F: Fn(&T, &T) -> bool,
    K: CacheKey<T>,
{
    fn matches(&mut self, a: &T, b: &T) -> bool {
        let ka = K::key(a);
        let kb = K::key(b);

        if let Some(hit) = lookup_pair(&self.cache.lock(), self.symmetry, &ka, &kb) {
            return hit;
        }

        let result = (self.inner)(a, b);
        let mut cache = self.cache.lock();
        *cache.entry(ka).or_default().entry(kb).or_insert(result)
    }
}

impl<T, F, K: CacheKey<T>> std::fmt::Debug for SharedMatcher<T, F, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMatcher")
            .field("symmetry", &self.symmetry)
            .field("cached_pairs", &self.cached_pairs())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

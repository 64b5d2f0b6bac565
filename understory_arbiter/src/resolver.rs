// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolver implementation.
//!
//! ## Overview
//!
//! Picks one winning component per trigger key and caches the result until the tree's
//! fingerprint changes.
//!
//! ## Query sequence
//!
//! 1. If the querying component is detached, drop the whole cache and answer "conflict".
//! 2. If the tree's [`Fingerprint`] differs from the recorded one, drop the whole cache.
//! 3. On a cache miss, scan every candidate that competes with the querying component
//!    and declares interest in the key, and reduce them with
//!    [`pick_winner`](crate::ranking::pick_winner).
//! 4. The querying component has no conflict exactly when it is the cached winner.
//!
//! Invalidation is all-or-nothing. Within one fingerprint window every query for a key
//! sees the same winner, so exactly one interested component is told to proceed.

use alloc::collections::BTreeMap;
use core::fmt;

use tracing::{debug, trace};

use crate::ranking::{Ranking, pick_winner};
use crate::types::{
    Candidate, ComponentTree, Fingerprint, FingerprintSources, Orderable, ResolverStats,
};

/// Caching conflict resolver for one shared-state domain.
///
/// ## Usage
///
/// - Construct with [`Resolver::new`] and a [`Ranking`] strategy, or with
///   [`Resolver::with_fingerprint`] to choose which change signals invalidate the cache.
/// - Before mutating shared state on behalf of a component, call
///   [`Resolver::has_conflict`]; proceed only when it returns `false`.
/// - One resolver serves one tree and one component kind, since it caches a single
///   winner per key. Keep it next to the tree it arbitrates and pass it to callers
///   explicitly.
///
/// `K` is the trigger key, `H` the component handle of the tree provider, and `R` the
/// ranking strategy.
pub struct Resolver<K, H, R> {
    ranking: R,
    sources: FingerprintSources,
    fingerprint: Option<Fingerprint>,
    winners: BTreeMap<K, Option<H>>,
    stats: ResolverStats,
}

impl<K, H, R> fmt::Debug for Resolver<K, H, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("sources", &self.sources)
            .field("fingerprint", &self.fingerprint)
            .field("cached", &self.winners.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[derive(Copy, Clone, Debug)]
enum Invalidation {
    Detached,
    FingerprintChanged,
    SourcesChanged,
    Explicit,
}

impl<K, H, R> Resolver<K, H, R>
where
    K: Ord + Copy + fmt::Debug,
    H: Copy + Eq + fmt::Debug,
{
    /// Create a resolver that fingerprints the tree by node and attachment counts.
    pub fn new(ranking: R) -> Self {
        Self::with_fingerprint(ranking, FingerprintSources::default())
    }

    /// Create a resolver with explicit fingerprint sources.
    pub fn with_fingerprint(ranking: R, sources: FingerprintSources) -> Self {
        Self {
            ranking,
            sources,
            fingerprint: None,
            winners: BTreeMap::new(),
            stats: ResolverStats::default(),
        }
    }

    /// The ranking strategy.
    pub fn ranking(&self) -> &R {
        &self.ranking
    }

    /// The change signals that invalidate the cache.
    pub fn fingerprint_sources(&self) -> FingerprintSources {
        self.sources
    }

    /// Change the fingerprint sources. Drops the cache if they differ.
    pub fn set_fingerprint_sources(&mut self, sources: FingerprintSources) {
        if sources == self.sources {
            return;
        }
        self.sources = sources;
        self.fingerprint = None;
        self.invalidate(Invalidation::SourcesChanged);
    }

    /// Drop every cached winner.
    pub fn clear(&mut self) {
        self.invalidate(Invalidation::Explicit);
    }

    /// Cached winner for `key`: `None` if not cached, `Some(None)` if cached as "no winner".
    pub fn cached(&self, key: &K) -> Option<Option<H>> {
        self.winners.get(key).copied()
    }

    /// Number of cached keys.
    pub fn cached_len(&self) -> usize {
        self.winners.len()
    }

    /// Activity counters.
    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Returns `true` if some other component outranks `component` for `key`.
    ///
    /// Returns `false` when `component` is the winner and may act. A detached component
    /// always has a conflict, and querying with one drops the whole cache.
    ///
    /// `component` is expected to declare interest in `key`. Otherwise it is not a
    /// candidate, cannot win, and the answer is always `true`.
    pub fn has_conflict<C, T>(&mut self, tree: &T, component: H, key: K) -> bool
    where
        T: ComponentTree<C, Handle = H>,
        C: Orderable<K>,
        R: Ranking<H, C>,
    {
        self.winner(tree, component, key) != Some(component)
    }

    /// The winner for `key` among components competing with `component`.
    ///
    /// Shares the cache and invalidation rules of [`Resolver::has_conflict`].
    /// Returns `None` if `component` is detached or nothing declares interest in `key`.
    pub fn winner<C, T>(&mut self, tree: &T, component: H, key: K) -> Option<H>
    where
        T: ComponentTree<C, Handle = H>,
        C: Orderable<K>,
        R: Ranking<H, C>,
    {
        self.stats.queries += 1;
        let Some(me) = tree.candidate(component) else {
            self.invalidate(Invalidation::Detached);
            return None;
        };

        let current = Fingerprint::of::<C, T>(tree, self.sources);
        match self.fingerprint {
            Some(prev) if prev == current => {}
            Some(_) => {
                self.invalidate(Invalidation::FingerprintChanged);
                self.fingerprint = Some(current);
            }
            None => self.fingerprint = Some(current),
        }

        if let Some(&cached) = self.winners.get(&key) {
            debug_assert!(
                cached
                    .and_then(|w| tree.candidate(w))
                    .is_none_or(|w| me.component.competes_with(w.component)),
                "cached winner is of another kind; use one resolver per kind"
            );
            self.stats.hits += 1;
            trace!(?key, winner = ?cached, "cache hit");
            return cached;
        }

        self.stats.scans += 1;
        let (winner, considered) = self.scan(tree, me.component, &key);
        debug!(?key, ?winner, considered, "computed winner");
        self.winners.insert(key, winner);
        winner
    }

    /// Scan `tree` for the winner of `key` among components competing with `exemplar`.
    ///
    /// Uncached and side-effect free. Returns `None` if no competing component declares
    /// interest in `key`.
    pub fn find_winner<C, T>(&self, tree: &T, exemplar: &C, key: &K) -> Option<H>
    where
        T: ComponentTree<C, Handle = H>,
        C: Orderable<K>,
        R: Ranking<H, C>,
    {
        self.scan(tree, exemplar, key).0
    }

    fn scan<C, T>(&self, tree: &T, exemplar: &C, key: &K) -> (Option<H>, usize)
    where
        T: ComponentTree<C, Handle = H>,
        C: Orderable<K>,
        R: Ranking<H, C>,
    {
        let mut best: Option<Candidate<'_, H, C>> = None;
        let mut considered = 0_usize;
        for c in tree.candidates() {
            if !exemplar.competes_with(c.component) || !c.component.declares_interest(key) {
                continue;
            }
            considered += 1;
            best = Some(match best {
                None => c,
                Some(b) => pick_winner(&self.ranking, b, c),
            });
        }
        (best.map(|c| c.handle), considered)
    }

    fn invalidate(&mut self, why: Invalidation) {
        self.stats.invalidations += 1;
        if !self.winners.is_empty() {
            debug!(reason = ?why, dropped = self.winners.len(), "cache invalidated");
            self.winners.clear();
        }
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ranking strategies and the tie-break ladder.
//!
//! ## Overview
//!
//! A [`Ranking`] is the policy half of winner selection: it says which of two candidates
//! ranks higher, and may declare a tie. The ladder in [`compare_candidates`] turns any
//! ranking into a strict choice between distinct candidates:
//!
//! 1. The ranking. `Greater` means the first candidate wins.
//! 2. The candidate on the node with the lower persistent id.
//! 3. The candidate with the lower position on that node.
//!
//! Steps 2 and 3 only use identities that do not depend on scan order, so the winner of
//! a reduction does not depend on the order in which candidates are visited, provided
//! the ranking itself is a total preorder.

use core::cmp::Ordering;

use crate::types::Candidate;

/// Ranks two candidates of the same kind.
///
/// Return [`Ordering::Greater`] when `a` should win, [`Ordering::Less`] when `b` should
/// win, and [`Ordering::Equal`] for a tie, which the ladder then breaks.
///
/// For the resolver's single-pass reduction to be order independent, implementations
/// must be a total preorder: antisymmetric (`compare(a, b) == compare(b, a).reverse()`)
/// and transitive.
///
/// Closures of the form `Fn(&Candidate, &Candidate) -> Ordering` implement this trait.
pub trait Ranking<H, C> {
    /// Compare `a` against `b`.
    fn compare(&self, a: &Candidate<'_, H, C>, b: &Candidate<'_, H, C>) -> Ordering;
}

impl<H, C, F> Ranking<H, C> for F
where
    F: Fn(&Candidate<'_, H, C>, &Candidate<'_, H, C>) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &Candidate<'_, H, C>, b: &Candidate<'_, H, C>) -> Ordering {
        self(a, b)
    }
}

/// Ranking that ties every pair, leaving the decision to the ladder.
#[derive(Copy, Clone, Debug, Default)]
pub struct Unranked;

impl<H, C> Ranking<H, C> for Unranked {
    #[inline]
    fn compare(&self, _a: &Candidate<'_, H, C>, _b: &Candidate<'_, H, C>) -> Ordering {
        Ordering::Equal
    }
}

/// A configured secondary priority. Lower values rank higher.
pub trait Prioritized {
    /// Priority of this component.
    fn priority(&self) -> u32;
}

/// Prefer components closer to the root, then components with the lower priority value.
///
/// This is a lexicographic order over `(depth, priority)` and therefore a total preorder.
#[derive(Copy, Clone, Debug, Default)]
pub struct DepthThenPriority;

impl<H, C: Prioritized> Ranking<H, C> for DepthThenPriority {
    fn compare(&self, a: &Candidate<'_, H, C>, b: &Candidate<'_, H, C>) -> Ordering {
        b.depth
            .cmp(&a.depth)
            .then_with(|| b.component.priority().cmp(&a.component.priority()))
    }
}

/// Compare two candidates with the full tie-break ladder. `Greater` means `a` wins.
///
/// `Equal` is only possible for two views of the same component (or a provider that
/// reports two components at the same node and position).
pub fn compare_candidates<H, C, R>(
    ranking: &R,
    a: &Candidate<'_, H, C>,
    b: &Candidate<'_, H, C>,
) -> Ordering
where
    R: Ranking<H, C> + ?Sized,
{
    ranking
        .compare(a, b)
        .then_with(|| b.node.cmp(&a.node))
        .then_with(|| b.position.cmp(&a.position))
}

/// Return the winner of `a` and `b` under the tie-break ladder.
///
/// If the ladder is exhausted, `a` is kept.
pub fn pick_winner<'a, H, C, R>(
    ranking: &R,
    a: Candidate<'a, H, C>,
    b: Candidate<'a, H, C>,
) -> Candidate<'a, H, C>
where
    R: Ranking<H, C> + ?Sized,
{
    match compare_candidates(ranking, &a, &b) {
        Ordering::Less => b,
        Ordering::Equal | Ordering::Greater => a,
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Check-then-act helper for action dispatchers.
//!
//! ## Usage
//!
//! When a trigger fires for a component, call [`trigger`] with the resolver for the
//! shared-state domain and a closure that performs the mutation. The closure runs only
//! if the component wins, and reports whether the mutation took effect.
//!
//! ```
//! use understory_arbiter::dispatch::Outcome;
//!
//! fn report(outcome: Outcome) -> &'static str {
//!     match outcome {
//!         Outcome::Applied => "done",
//!         Outcome::Failed => "unavailable",
//!         Outcome::StoodDown | Outcome::Detached => "skipped",
//!     }
//! }
//! # let _ = report(Outcome::Applied);
//! ```

use core::fmt;

use tracing::{info, trace, warn};

use crate::ranking::Ranking;
use crate::resolver::Resolver;
use crate::types::{ComponentTree, Orderable};

/// Result of a [`trigger`] call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The component is not attached to the tree; nothing ran.
    Detached,
    /// Another component won the key; nothing ran.
    StoodDown,
    /// The component won and the action succeeded.
    Applied,
    /// The component won but the action reported failure.
    Failed,
}

impl Outcome {
    /// Whether the action ran, successfully or not.
    pub fn acted(self) -> bool {
        matches!(self, Self::Applied | Self::Failed)
    }
}

/// Run `action` on behalf of `component` if it wins `key`.
///
/// `action` receives the component payload and returns whether the mutation succeeded.
pub fn trigger<K, H, R, C, T, F>(
    resolver: &mut Resolver<K, H, R>,
    tree: &T,
    component: H,
    key: K,
    action: F,
) -> Outcome
where
    K: Ord + Copy + fmt::Debug,
    H: Copy + Eq + fmt::Debug,
    T: ComponentTree<C, Handle = H>,
    C: Orderable<K>,
    R: Ranking<H, C>,
    F: FnOnce(&C) -> bool,
{
    let conflict = resolver.has_conflict(tree, component, key);
    let Some(me) = tree.candidate(component) else {
        trace!(?component, ?key, "detached component triggered");
        return Outcome::Detached;
    };
    if conflict {
        trace!(?component, ?key, "stood down");
        return Outcome::StoodDown;
    }
    if action(me.component) {
        info!(?component, ?key, node = me.node, "applied");
        Outcome::Applied
    } else {
        warn!(?component, ?key, node = me.node, "action could not be applied");
        Outcome::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::Unranked;
    use crate::types::Candidate;
    use alloc::vec::Vec;
    use core::cell::Cell;

    struct Toggle;

    impl Orderable<u8> for Toggle {
        fn declares_interest(&self, key: &u8) -> bool {
            *key == 0
        }
    }

    /// Two components on nodes 1 and 2; the first can be detached.
    struct Pair {
        first_attached: bool,
        toggles: [Toggle; 2],
    }

    impl ComponentTree<Toggle> for Pair {
        type Handle = usize;

        fn node_count(&self) -> usize {
            if self.first_attached { 2 } else { 1 }
        }

        fn attachment_count(&self) -> usize {
            self.node_count()
        }

        fn structure_version(&self) -> u64 {
            0
        }

        fn candidate<'a>(&'a self, handle: usize) -> Option<Candidate<'a, usize, Toggle>>
        where
            Toggle: 'a,
        {
            if handle == 0 && !self.first_attached {
                return None;
            }
            Some(Candidate {
                handle,
                component: self.toggles.get(handle)?,
                node: handle as u64 + 1,
                position: 0,
                depth: 0,
            })
        }

        fn candidates<'a>(&'a self) -> impl Iterator<Item = Candidate<'a, usize, Toggle>> + 'a
        where
            Toggle: 'a,
        {
            (0..2)
                .filter_map(|h| self.candidate(h))
                .collect::<Vec<_>>()
                .into_iter()
        }
    }

    #[test]
    fn only_the_winner_acts() {
        let tree = Pair {
            first_attached: true,
            toggles: [Toggle, Toggle],
        };
        let mut resolver: Resolver<u8, usize, _> = Resolver::new(Unranked);
        let runs = Cell::new(0);
        let act = |_: &Toggle| {
            runs.set(runs.get() + 1);
            true
        };
        assert_eq!(trigger(&mut resolver, &tree, 0, 0, act), Outcome::Applied);
        assert_eq!(trigger(&mut resolver, &tree, 1, 0, act), Outcome::StoodDown);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn failure_is_reported() {
        let tree = Pair {
            first_attached: true,
            toggles: [Toggle, Toggle],
        };
        let mut resolver: Resolver<u8, usize, _> = Resolver::new(Unranked);
        let outcome = trigger(&mut resolver, &tree, 0, 0, |_| false);
        assert_eq!(outcome, Outcome::Failed);
        assert!(outcome.acted());
    }

    #[test]
    fn detached_component_never_acts() {
        let tree = Pair {
            first_attached: false,
            toggles: [Toggle, Toggle],
        };
        let mut resolver: Resolver<u8, usize, _> = Resolver::new(Unranked);
        let outcome = trigger(&mut resolver, &tree, 0, 0, |_| true);
        assert_eq!(outcome, Outcome::Detached);
        assert!(!outcome.acted());
        assert_eq!(trigger(&mut resolver, &tree, 1, 0, |_| true), Outcome::Applied);
    }
}

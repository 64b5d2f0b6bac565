// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`ComponentTree`] implementation for Understory Attach Tree.
//!
//! ## Feature
//!
//! Enable with `attach_tree_adapter`.
//!
//! ## Notes
//!
//! Handles are [`ComponentId`]s. The node identity fed to the tie-break ladder is the
//! owning node's [`PersistentId`](understory_attach_tree::PersistentId), not its slot, so
//! a node created after another never takes over its place in the ladder even when it
//! reuses the slot. Candidates are enumerated in the tree's depth-first pre-order walk.

use understory_attach_tree::{ComponentId, PersistentId, Tree};

use crate::types::{Candidate, ComponentTree, UNKNOWN_POSITION};

impl<C> ComponentTree<C> for Tree<C> {
    type Handle = ComponentId;

    fn node_count(&self) -> usize {
        Tree::node_count(self)
    }

    fn attachment_count(&self) -> usize {
        Tree::attachment_count(self)
    }

    fn structure_version(&self) -> u64 {
        self.version()
    }

    fn candidate<'a>(&'a self, handle: ComponentId) -> Option<Candidate<'a, ComponentId, C>>
    where
        C: 'a,
    {
        let owner = self.owner_of(handle)?;
        Some(Candidate {
            handle,
            component: self.component(handle)?,
            node: self.persistent_id(owner)?.get(),
            position: self.position_in_parent(handle),
            depth: self.depth_from_root(owner),
        })
    }

    fn candidates<'a>(&'a self) -> impl Iterator<Item = Candidate<'a, ComponentId, C>> + 'a
    where
        C: 'a,
    {
        self.walk().flat_map(move |(node, depth)| {
            let persistent = self.persistent_id(node).map_or(u64::MAX, PersistentId::get);
            self.components(node)
                .iter()
                .enumerate()
                .filter_map(move |(i, &handle)| {
                    Some(Candidate {
                        handle,
                        component: self.component(handle)?,
                        node: persistent,
                        position: u32::try_from(i).unwrap_or(UNKNOWN_POSITION),
                        depth,
                    })
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Outcome, trigger};
    use crate::ranking::{DepthThenPriority, Prioritized, Unranked};
    use crate::resolver::Resolver;
    use crate::types::{FingerprintSources, Orderable};
    use alloc::vec::Vec;

    #[derive(Debug)]
    struct Mode {
        group: u8,
        level: u32,
    }

    impl Orderable<u8> for Mode {
        fn declares_interest(&self, key: &u8) -> bool {
            *key == self.group
        }
    }

    impl Prioritized for Mode {
        fn priority(&self) -> u32 {
            self.level
        }
    }

    fn mode(group: u8, level: u32) -> Mode {
        Mode { group, level }
    }

    #[test]
    fn candidates_follow_walk_order_and_positions() {
        let mut tree = Tree::new();
        let root = tree.insert(None);
        let a = tree.insert(Some(root));
        let b = tree.insert(Some(root));
        let on_b = tree.attach(b, mode(1, 0)).unwrap();
        let on_a0 = tree.attach(a, mode(1, 0)).unwrap();
        let on_a1 = tree.attach(a, mode(1, 0)).unwrap();

        let seen: Vec<_> = tree
            .candidates()
            .map(|c| (c.handle, c.position, c.depth))
            .collect();
        assert_eq!(seen, [(on_a0, 0, 1), (on_a1, 1, 1), (on_b, 0, 1)]);

        let c = tree.candidate(on_a1).unwrap();
        assert_eq!(c.node, tree.persistent_id(a).unwrap().get());
        assert_eq!(c.position, 1);
    }

    #[test]
    fn detached_component_has_no_candidate() {
        let mut tree = Tree::new();
        let root = tree.insert(None);
        let id = tree.attach(root, mode(1, 0)).unwrap();
        tree.detach(id).unwrap();
        assert!(tree.candidate(id).is_none());
        assert_eq!(tree.candidates().count(), 0);
    }

    #[test]
    fn newer_node_in_reused_slot_loses_to_older_node() {
        let mut tree = Tree::new();
        let root = tree.insert(None);
        let first = tree.insert(Some(root));
        let second = tree.insert(Some(root));
        tree.attach(first, mode(1, 0)).unwrap();
        let older = tree.attach(second, mode(1, 0)).unwrap();

        // Removing `first` frees its slot; the replacement reuses it.
        tree.remove(first);
        let replacement = tree.insert(Some(root));
        let newer = tree.attach(replacement, mode(1, 0)).unwrap();

        let mut resolver: Resolver<u8, _, _> = Resolver::new(Unranked);
        assert_eq!(resolver.winner(&tree, newer, 1), Some(older));
        assert!(resolver.has_conflict(&tree, newer, 1));
        assert!(!resolver.has_conflict(&tree, older, 1));
    }

    #[test]
    fn closer_to_root_then_lower_level_wins() {
        let mut tree = Tree::new();
        let root = tree.insert(None);
        let child = tree.insert(Some(root));
        let deep = tree.attach(child, mode(1, 0)).unwrap();
        let shallow_high = tree.attach(root, mode(1, 5)).unwrap();
        let shallow_low = tree.attach(root, mode(1, 2)).unwrap();

        let mut resolver: Resolver<u8, _, _> = Resolver::new(DepthThenPriority);
        assert_eq!(resolver.winner(&tree, deep, 1), Some(shallow_low));
        assert!(resolver.has_conflict(&tree, shallow_high, 1));
    }

    #[test]
    fn removing_the_winning_subtree_elects_a_new_winner() {
        let mut tree = Tree::new();
        let root = tree.insert(None);
        let stage = tree.insert(Some(root));
        let upper = tree.insert(Some(root));
        let lower = tree.attach(stage, mode(2, 0)).unwrap();
        let other = tree.attach(upper, mode(2, 0)).unwrap();

        let mut resolver: Resolver<u8, _, _> = Resolver::new(Unranked);
        assert_eq!(resolver.winner(&tree, other, 2), Some(lower));

        tree.remove(stage);
        assert_eq!(resolver.winner(&tree, other, 2), Some(other));
        assert_eq!(
            trigger(&mut resolver, &tree, other, 2, |_| true),
            Outcome::Applied
        );
        assert_eq!(
            trigger(&mut resolver, &tree, lower, 2, |_| true),
            Outcome::Detached
        );
    }

    #[test]
    fn detaching_the_winner_hands_the_key_to_a_sibling() {
        let mut tree = Tree::new();
        let root = tree.insert(None);
        let a = tree.attach(root, mode(1, 0)).unwrap();
        let b = tree.attach(root, mode(1, 0)).unwrap();

        let mut resolver: Resolver<u8, _, _> = Resolver::new(Unranked);
        assert!(!resolver.has_conflict(&tree, a, 1));
        assert!(resolver.has_conflict(&tree, b, 1));

        // The node stays; ask the sibling before the detached component.
        tree.detach(a).unwrap();
        assert!(
            !resolver.has_conflict(&tree, b, 1),
            "the only attached component must win"
        );
        assert_eq!(resolver.cached(&1), Some(Some(b)));
        assert_eq!(resolver.stats().scans, 2);
        assert!(resolver.has_conflict(&tree, a, 1));
    }

    #[test]
    fn version_catches_swaps_that_keep_counts() {
        let mut tree = Tree::new();
        let root = tree.insert(None);
        let a = tree.insert(Some(root));
        let b = tree.insert(Some(root));
        let on_a = tree.attach(a, mode(3, 0)).unwrap();
        let on_b = tree.attach(b, mode(3, 0)).unwrap();
        tree.detach(on_b).unwrap();

        let mut counts: Resolver<u8, _, _> = Resolver::with_fingerprint(
            Unranked,
            FingerprintSources::NODES | FingerprintSources::ATTACHMENTS,
        );
        let mut versioned: Resolver<u8, _, _> =
            Resolver::with_fingerprint(Unranked, FingerprintSources::VERSION);
        assert_eq!(counts.winner(&tree, on_a, 3), Some(on_a));
        assert_eq!(versioned.winner(&tree, on_a, 3), Some(on_a));

        // Swap which component is attached; node and attachment counts are unchanged.
        tree.detach(on_a).unwrap();
        tree.reattach(on_b, b).unwrap();

        assert_eq!(versioned.winner(&tree, on_b, 3), Some(on_b));
        // The count-based resolver still answers from its stale cache entry.
        assert_eq!(counts.cached(&3), Some(Some(on_a)));
    }
}

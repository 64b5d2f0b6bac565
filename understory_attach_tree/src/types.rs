// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the attach tree: node and component identifiers.

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// ### Liveness
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to a live node.
/// Stale `NodeId`s never alias a different live node because the generation must match.
///
/// ### Ordering
///
/// `NodeId` deliberately has no ordering. Slots are reused, so slot order says nothing
/// about when a node was created. Use [`PersistentId`] for stable ordering.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for a component attached to the tree.
///
/// Same generational scheme as [`NodeId`], over a separate slot space.
/// A `ComponentId` is the identity of a component: two distinct components never
/// share one, and a destroyed component's id never aliases a later component.
///
/// A component outlives its attachment. Detaching it (or removing the node it was
/// attached to) leaves the `ComponentId` valid but ownerless.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ComponentId(pub(crate) u32, pub(crate) u32);

impl ComponentId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Persistent identity of a node.
///
/// Drawn from a per-tree monotonic counter when the node is inserted and never
/// reused, even when the node's slot is. Lower values were created earlier.
/// Survives [`Tree::reparent`](crate::Tree::reparent).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PersistentId(pub(crate) u64);

impl PersistentId {
    /// Raw value of this identity.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Sentinel returned by [`Tree::position_in_parent`](crate::Tree::position_in_parent)
/// when a component's position cannot be determined.
pub const UNKNOWN_POSITION: u32 = u32::MAX;

/// Sentinel returned by [`Tree::depth_from_root`](crate::Tree::depth_from_root)
/// for stale node ids.
pub const UNKNOWN_DEPTH: u32 = u32::MAX;

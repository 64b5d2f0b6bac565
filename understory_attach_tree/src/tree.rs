// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, attachments, queries.

use alloc::vec::Vec;
use tracing::trace;

use crate::error::TreeError;
use crate::types::{ComponentId, NodeId, PersistentId, UNKNOWN_DEPTH, UNKNOWN_POSITION};

impl<C> Default for Tree<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level attach tree.
///
/// Holds a forest of nodes and a typed store of components of kind `C`.
/// Each live component is either attached to exactly one node (at a position in
/// that node's ordered component list) or detached.
pub struct Tree<C> {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    components: Vec<Option<Slot<C>>>,
    component_generations: Vec<u32>,
    component_free_list: Vec<usize>,
    next_persistent: u64,
    alive: usize,
    attached: usize,
    version: u64,
}

impl<C> core::fmt::Debug for Tree<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let components_alive = self.components.iter().filter(|c| c.is_some()).count();
        f.debug_struct("Tree")
            .field("nodes_total", &self.nodes.len())
            .field("nodes_alive", &self.alive)
            .field("free_list", &self.free_list.len())
            .field("components_alive", &components_alive)
            .field("components_attached", &self.attached)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    persistent: PersistentId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    components: Vec<ComponentId>,
}

#[derive(Clone, Debug)]
struct Slot<C> {
    generation: u32,
    owner: Option<NodeId>,
    payload: C,
}

impl<C> Tree<C> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            components: Vec::new(),
            component_generations: Vec::new(),
            component_free_list: Vec::new(),
            next_persistent: 1,
            alive: 0,
            attached: 0,
            version: 0,
        }
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// A stale `parent` inserts a root.
    pub fn insert(&mut self, parent: Option<NodeId>) -> NodeId {
        let persistent = PersistentId(self.next_persistent);
        self.next_persistent += 1;
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, persistent));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, persistent)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(idx as u32, generation);
        if let Some(p) = parent
            && self.is_alive(p)
        {
            self.link_parent(id, p);
        }
        self.alive += 1;
        self.bump();
        trace!(?id, ?persistent, ?parent, "inserted node");
        id
    }

    /// Remove a node (and its subtree) from the tree.
    ///
    /// Components attached anywhere in the subtree stay alive but become detached.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.parent(id) {
            self.unlink_parent(id, parent);
        }
        let removed = self.remove_subtree(id);
        self.bump();
        trace!(?id, removed, "removed subtree");
    }

    /// Reparent `id` under `new_parent` (or make it a root if `None`).
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), TreeError> {
        if !self.is_alive(id) {
            return Err(TreeError::StaleNode(id));
        }
        if let Some(p) = new_parent {
            if !self.is_alive(p) {
                return Err(TreeError::StaleNode(p));
            }
            if self.is_within(p, id) {
                return Err(TreeError::Cycle {
                    node: id,
                    parent: p,
                });
            }
        }
        if let Some(parent) = self.parent(id) {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        self.bump();
        trace!(?id, ?new_parent, "reparented node");
        Ok(())
    }

    /// Attach a new component to `node`, appending it to the node's component list.
    pub fn attach(&mut self, node: NodeId, payload: C) -> Result<ComponentId, TreeError> {
        if !self.is_alive(node) {
            return Err(TreeError::StaleNode(node));
        }
        let slot = |generation| Slot {
            generation,
            owner: Some(node),
            payload,
        };
        let (idx, generation) = if let Some(idx) = self.component_free_list.pop() {
            let generation = self.component_generations[idx].saturating_add(1);
            self.component_generations[idx] = generation;
            self.components[idx] = Some(slot(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.components.push(Some(slot(generation)));
            self.component_generations.push(generation);
            (self.components.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ComponentId uses 32-bit indices by design."
        )]
        let id = ComponentId::new(idx as u32, generation);
        if let Some(n) = self.node_mut(node) {
            n.components.push(id);
        }
        self.attached += 1;
        self.bump();
        trace!(component = ?id, ?node, "attached component");
        Ok(id)
    }

    /// Detach a component from its node. The component stays alive.
    ///
    /// Detaching an already detached component is a no-op.
    pub fn detach(&mut self, id: ComponentId) -> Result<(), TreeError> {
        let owner = self
            .slot(id)
            .ok_or(TreeError::StaleComponent(id))?
            .owner;
        if let Some(node) = owner {
            self.unlink_component(id, node);
            self.bump();
            trace!(component = ?id, ?node, "detached component");
        }
        Ok(())
    }

    /// Move a component to the end of `node`'s component list.
    ///
    /// Works for attached and detached components alike.
    pub fn reattach(&mut self, id: ComponentId, node: NodeId) -> Result<(), TreeError> {
        let owner = self
            .slot(id)
            .ok_or(TreeError::StaleComponent(id))?
            .owner;
        if !self.is_alive(node) {
            return Err(TreeError::StaleNode(node));
        }
        if let Some(prev) = owner {
            self.unlink_component(id, prev);
        }
        if let Some(n) = self.node_mut(node) {
            n.components.push(id);
        }
        if let Some(slot) = self.slot_mut(id) {
            slot.owner = Some(node);
        }
        self.attached += 1;
        self.bump();
        trace!(component = ?id, ?node, "reattached component");
        Ok(())
    }

    /// Destroy a component and return its payload.
    ///
    /// Returns `None` if `id` is stale.
    pub fn destroy(&mut self, id: ComponentId) -> Option<C> {
        let owner = self.slot(id)?.owner;
        if let Some(node) = owner {
            self.unlink_component(id, node);
            self.bump();
        }
        let slot = self.components[id.idx()].take()?;
        self.component_free_list.push(id.idx());
        trace!(component = ?id, "destroyed component");
        Some(slot.payload)
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    /// See [`NodeId`] docs for the generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Returns true if `id` refers to a live component, attached or not.
    pub fn contains_component(&self, id: ComponentId) -> bool {
        self.slot(id).is_some()
    }

    /// Payload of a live component.
    pub fn component(&self, id: ComponentId) -> Option<&C> {
        self.slot(id).map(|s| &s.payload)
    }

    /// Mutable payload of a live component.
    ///
    /// Payload edits are not structural and leave [`Tree::version`] unchanged.
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut C> {
        self.slot_mut(id).map(|s| &mut s.payload)
    }

    /// Node the component is attached to, or `None` if it is detached or stale.
    pub fn owner_of(&self, id: ComponentId) -> Option<NodeId> {
        self.slot(id)?.owner
    }

    /// Parent of a live node, or `None` for roots and stale ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children of a node in index order. Empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Components attached to a node in position order. Empty for stale ids.
    pub fn components(&self, id: NodeId) -> &[ComponentId] {
        self.node(id)
            .map(|n| n.components.as_slice())
            .unwrap_or(&[])
    }

    /// Persistent identity of a live node.
    pub fn persistent_id(&self, id: NodeId) -> Option<PersistentId> {
        self.node(id).map(|n| n.persistent)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.alive
    }

    /// Number of components currently attached to a node.
    pub fn attachment_count(&self) -> usize {
        self.attached
    }

    /// Structural version.
    ///
    /// Incremented by every structural edit: insert, remove, reparent, and any
    /// attach, detach, reattach or destroy that changes an attachment.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Zero-based index of the component in its owning node's component list.
    ///
    /// Returns [`UNKNOWN_POSITION`] if the component is detached or stale.
    pub fn position_in_parent(&self, id: ComponentId) -> u32 {
        let Some(owner) = self.owner_of(id) else {
            return UNKNOWN_POSITION;
        };
        self.components(owner)
            .iter()
            .position(|c| *c == id)
            .and_then(|i| u32::try_from(i).ok())
            .unwrap_or(UNKNOWN_POSITION)
    }

    /// Number of parent hops from `id` to its root. Roots have depth `0`.
    ///
    /// Returns [`UNKNOWN_DEPTH`] for stale ids.
    pub fn depth_from_root(&self, id: NodeId) -> u32 {
        if !self.is_alive(id) {
            return UNKNOWN_DEPTH;
        }
        let mut depth = 0_u32;
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            depth = depth.saturating_add(1);
            cur = p;
        }
        depth
    }

    /// Root nodes in slot order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| match n {
            Some(n) if n.parent.is_none() =>
            {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "NodeId uses 32-bit indices by design."
                )]
                Some(NodeId::new(i as u32, n.generation))
            }
            _ => None,
        })
    }

    /// Depth-first pre-order walk over all live nodes, yielding `(node, depth)`.
    ///
    /// Roots are visited in slot order and children in index order, so the walk is
    /// reproducible for as long as the structure is unchanged.
    pub fn walk(&self) -> Walk<'_, C> {
        let mut stack: Vec<(NodeId, u32)> = self.roots().map(|r| (r, 0)).collect();
        stack.reverse();
        Walk { tree: self, stack }
    }

    // --- internals ---

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())?
            .as_mut()
            .filter(|n| n.generation == id.1)
    }

    fn slot(&self, id: ComponentId) -> Option<&Slot<C>> {
        self.components
            .get(id.idx())?
            .as_ref()
            .filter(|s| s.generation == id.1)
    }

    fn slot_mut(&mut self, id: ComponentId) -> Option<&mut Slot<C>> {
        self.components
            .get_mut(id.idx())?
            .as_mut()
            .filter(|s| s.generation == id.1)
    }

    /// True if `id` is `root` or one of its descendants.
    fn is_within(&self, id: NodeId, root: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == root {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }

    fn unlink_component(&mut self, id: ComponentId, node: NodeId) {
        if let Some(n) = self.node_mut(node) {
            n.components.retain(|c| *c != id);
        }
        if let Some(slot) = self.slot_mut(id) {
            slot.owner = None;
        }
        self.attached -= 1;
    }

    /// Free `id` and its descendants, detaching their components. Returns the number of nodes freed.
    fn remove_subtree(&mut self, id: NodeId) -> usize {
        if !self.is_alive(id) {
            return 0;
        }
        let Some(node) = self.nodes[id.idx()].take() else {
            return 0;
        };
        self.free_list.push(id.idx());
        self.alive -= 1;
        let mut detached = 0;
        for &cid in &node.components {
            if let Some(slot) = self.slot_mut(cid) {
                slot.owner = None;
                detached += 1;
            }
        }
        self.attached -= detached;
        let mut removed = 1;
        for child in node.children {
            removed += self.remove_subtree(child);
        }
        removed
    }
}

impl Node {
    fn new(generation: u32, persistent: PersistentId) -> Self {
        Self {
            generation,
            persistent,
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
        }
    }
}

/// Iterator returned by [`Tree::walk`].
#[derive(Debug)]
pub struct Walk<'a, C> {
    tree: &'a Tree<C>,
    stack: Vec<(NodeId, u32)>,
}

impl<C> Iterator for Walk<'_, C> {
    type Item = (NodeId, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        if let Some(node) = self.tree.node(id) {
            self.stack
                .extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }
        Some((id, depth))
    }
}

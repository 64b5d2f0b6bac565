// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_attach_tree --heading-base-level=0

//! Understory Attach Tree: a generational node tree with ordered component attachments.
//!
//! Understory Attach Tree is a reusable building block for scenes and assemblies where
//! behavior lives in components attached to structural nodes.
//!
//! - Represents a forest of nodes with parent/child links in index order.
//! - Stores a typed collection of components; each is attached to one node or detached.
//! - Gives every node a [`PersistentId`] that is never reused, alongside its generational [`NodeId`].
//! - Tracks cheap change signals: [`Tree::node_count`], [`Tree::attachment_count`] and a
//!   structural [`Tree::version`].
//!
//! ## Typed attachments
//!
//! A `Tree<C>` holds components of one payload type `C`.
//! Callers that need several component kinds use an enum payload, or one tree per kind
//! keyed by the same structure upstream. Queries never inspect runtime types.
//!
//! ## Detachment
//!
//! Removing a node removes its subtree. Components attached anywhere in that subtree are not
//! destroyed: they become detached, and their [`ComponentId`]s stay valid until
//! [`Tree::destroy`] is called. [`Tree::owner_of`] returns `None` for them.
//!
//! ## API overview
//!
//! - [`Tree`]: container managing nodes and component attachments.
//! - [`NodeId`]: generational handle of a node.
//! - [`ComponentId`]: generational handle (and identity) of a component.
//! - [`PersistentId`]: monotonic, never-reused node identity; useful for stable tie-breaks.
//! - [`TreeError`]: returned by fallible structural edits.
//!
//! Key operations:
//! - [`Tree::insert`] / [`Tree::remove`] / [`Tree::reparent`]
//! - [`Tree::attach`] / [`Tree::detach`] / [`Tree::reattach`] / [`Tree::destroy`]
//! - [`Tree::walk`]: deterministic depth-first traversal with depths.
//! - [`Tree::position_in_parent`] and [`Tree::depth_from_root`], with
//!   [`UNKNOWN_POSITION`] / [`UNKNOWN_DEPTH`] sentinels.
//!
//! ### Minimal usage
//!
//! ```
//! use understory_attach_tree::Tree;
//!
//! let mut tree = Tree::new();
//! let root = tree.insert(None);
//! let child = tree.insert(Some(root));
//!
//! let a = tree.attach(child, "engine").unwrap();
//! let b = tree.attach(child, "probe").unwrap();
//! assert_eq!(tree.position_in_parent(b), 1);
//! assert_eq!(tree.depth_from_root(child), 1);
//!
//! // Removing the node detaches its components but keeps them alive.
//! tree.remove(child);
//! assert_eq!(tree.owner_of(a), None);
//! assert_eq!(tree.component(a), Some(&"engine"));
//! assert_eq!(tree.attachment_count(), 0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod tree;
mod types;

pub use error::TreeError;
pub use tree::{Tree, Walk};
pub use types::{ComponentId, NodeId, PersistentId, UNKNOWN_DEPTH, UNKNOWN_POSITION};

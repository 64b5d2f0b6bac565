// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_arbiter --heading-base-level=0

//! Understory Arbiter: deterministic conflict resolution for components that compete
//! for the same trigger.
//!
//! ## Overview
//!
//! Components attached to the nodes of a tree may all declare interest in one trigger
//! key, while the action behind that key must be carried out by exactly one of them.
//! This crate picks that one component, the same way every time, and remembers the
//! choice until the tree changes.
//!
//! It does not own the tree. Feed it anything that implements
//! [`ComponentTree`](crate::types::ComponentTree); components implement
//! [`Orderable`](crate::types::Orderable).
//!
//! ## Ordering
//!
//! Among the candidates of the same kind that declare interest in a key, the winner is
//! chosen by the ladder in [`ranking`]:
//!
//! 1. The injected [`Ranking`](crate::ranking::Ranking), if it prefers one candidate.
//! 2. The candidate on the node with the lower persistent identity.
//! 3. The candidate with the lower position among its node's components.
//!
//! Steps 2 and 3 do not depend on enumeration order, so the winner is reproducible for
//! a given structure.
//!
//! ## Caching
//!
//! [`Resolver`](crate::resolver::Resolver) caches one winner per key and drops the whole
//! cache when the tree's [`Fingerprint`](crate::types::Fingerprint) changes or when a
//! detached component asks. Which signals make up the fingerprint is configured with
//! [`FingerprintSources`](crate::types::FingerprintSources).
//!
//! ## Workflow
//!
//! 1) Build one resolver per shared-state domain (for example, one per component kind).
//! 2) When a trigger fires for a component, ask [`Resolver::has_conflict`](crate::resolver::Resolver::has_conflict),
//!    or use [`dispatch::trigger`](crate::dispatch::trigger) to run the action only for the winner.
//! 3) Mutate the tree freely; the next query notices and recomputes.
//!
//! ```
//! use understory_arbiter::ranking::Unranked;
//! use understory_arbiter::resolver::Resolver;
//! use understory_arbiter::types::{Candidate, ComponentTree, Orderable};
//!
//! /// A component bound to one action group.
//! struct Mode(u8);
//!
//! impl Orderable<u8> for Mode {
//!     fn declares_interest(&self, key: &u8) -> bool {
//!         *key == self.0
//!     }
//! }
//!
//! /// One component per node; the node identity is the index.
//! struct Row(Vec<Mode>);
//!
//! impl ComponentTree<Mode> for Row {
//!     type Handle = usize;
//!
//!     fn node_count(&self) -> usize {
//!         self.0.len()
//!     }
//!
//!     fn attachment_count(&self) -> usize {
//!         self.0.len()
//!     }
//!
//!     fn structure_version(&self) -> u64 {
//!         0
//!     }
//!
//!     fn candidate<'a>(&'a self, handle: usize) -> Option<Candidate<'a, usize, Mode>>
//!     where
//!         Mode: 'a,
//!     {
//!         Some(Candidate {
//!             handle,
//!             component: self.0.get(handle)?,
//!             node: handle as u64,
//!             position: 0,
//!             depth: 0,
//!         })
//!     }
//!
//!     fn candidates<'a>(&'a self) -> impl Iterator<Item = Candidate<'a, usize, Mode>> + 'a
//!     where
//!         Mode: 'a,
//!     {
//!         (0..self.0.len()).filter_map(move |h| self.candidate(h))
//!     }
//! }
//!
//! let row = Row(vec![Mode(1), Mode(2), Mode(1)]);
//! let mut resolver: Resolver<u8, usize, _> = Resolver::new(Unranked);
//!
//! // Components 0 and 2 both want key 1; the lower node wins.
//! assert!(!resolver.has_conflict(&row, 0, 1));
//! assert!(resolver.has_conflict(&row, 2, 1));
//! // Component 1 is alone on key 2.
//! assert!(!resolver.has_conflict(&row, 1, 2));
//! ```
//!
//! ## Features
//!
//! - `std`: enables [`SharedResolver`](crate::sync::SharedResolver) and `std` support in `tracing`.
//! - `attach_tree_adapter`: implements [`ComponentTree`](crate::types::ComponentTree) for
//!   `understory_attach_tree::Tree`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod adapters;
pub mod dispatch;
pub mod ranking;
pub mod resolver;
#[cfg(feature = "std")]
pub mod sync;
pub mod types;

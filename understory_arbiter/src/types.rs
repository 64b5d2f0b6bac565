// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the arbiter: the component contract, the tree-provider seam,
//! candidates, fingerprints, and statistics.
//!
//! ## Overview
//!
//! These types describe what the [resolver](crate::resolver::Resolver) needs from the
//! outside world. Components implement [`Orderable`]; whatever owns the tree implements
//! [`ComponentTree`] and hands out [`Candidate`] views.

use core::fmt;

/// Sentinel position for a component whose index in its node cannot be determined.
///
/// Sorts after every real position, so such a component loses every position tie-break.
pub const UNKNOWN_POSITION: u32 = u32::MAX;

/// Sentinel depth for a component whose distance from the root cannot be determined.
pub const UNKNOWN_DEPTH: u32 = u32::MAX;

/// Capabilities a competing component exposes to the resolver.
///
/// `K` is the trigger key type.
pub trait Orderable<K> {
    /// Whether this component participates for `key`.
    fn declares_interest(&self, key: &K) -> bool;

    /// Whether `other` is of the same kind as `self` and therefore competes with it.
    ///
    /// Trees holding several component kinds in one payload type (for example an enum)
    /// override this to keep kinds apart, and use one resolver per kind.
    /// The default treats every payload as one kind.
    fn competes_with(&self, other: &Self) -> bool {
        let _ = other;
        true
    }
}

/// A component as seen by the resolver during a scan.
///
/// Produced by a [`ComponentTree`]. Carries the component's identity, its payload, and
/// the structural facts the tie-break ladder needs.
pub struct Candidate<'a, H, C> {
    /// Identity of the component. Two distinct components never share a handle.
    pub handle: H,
    /// Component payload.
    pub component: &'a C,
    /// Persistent identity of the owning node. Assigned once and never reused.
    pub node: u64,
    /// Zero-based index among the components on the owning node, or [`UNKNOWN_POSITION`].
    pub position: u32,
    /// Parent hops from the owning node to its root (root is `0`), or [`UNKNOWN_DEPTH`].
    pub depth: u32,
}

impl<H: Copy, C> Clone for Candidate<'_, H, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: Copy, C> Copy for Candidate<'_, H, C> {}

impl<H: fmt::Debug, C> fmt::Debug for Candidate<'_, H, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("handle", &self.handle)
            .field("node", &self.node)
            .field("position", &self.position)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// The tree provider: enumerates typed candidates and reports change signals.
///
/// The resolver never mutates or retains the tree; it reads it through this trait
/// for the duration of a single query.
pub trait ComponentTree<C> {
    /// Component identity.
    type Handle: Copy + Eq + fmt::Debug;

    /// Number of live nodes.
    fn node_count(&self) -> usize;

    /// Number of attached components.
    fn attachment_count(&self) -> usize;

    /// Structural version; must change on every structural edit.
    ///
    /// Providers without such a counter may return `0`, and callers should then not
    /// select [`FingerprintSources::VERSION`].
    fn structure_version(&self) -> u64;

    /// Candidate view of `handle`, or `None` if the component is detached or unknown.
    fn candidate<'a>(&'a self, handle: Self::Handle) -> Option<Candidate<'a, Self::Handle, C>>
    where
        C: 'a;

    /// Every attached component, in an order that is reproducible while the
    /// structure is unchanged.
    fn candidates<'a>(&'a self) -> impl Iterator<Item = Candidate<'a, Self::Handle, C>> + 'a
    where
        C: 'a;
}

bitflags::bitflags! {
    /// Which change signals make up a [`Fingerprint`].
    ///
    /// The resolver drops its whole cache whenever the fingerprint it recorded differs
    /// from the tree's current one.
    ///
    /// The default is [`NODES`](Self::NODES) together with
    /// [`ATTACHMENTS`](Self::ATTACHMENTS): the total node and attachment counts. A
    /// component can leave its node without the node going away, so node count alone
    /// would keep a detached winner cached.
    ///
    /// Counts are cheap but coarse: two edits that cancel out (detach one component and
    /// attach another in the same cycle) leave them unchanged. [`VERSION`](Self::VERSION)
    /// catches those, at the cost of refreshing after every structural edit.
    /// An empty set never invalidates on structure; only detachment and
    /// [`Resolver::clear`](crate::resolver::Resolver::clear) do.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FingerprintSources: u8 {
        /// Number of live nodes.
        const NODES       = 0b0000_0001;
        /// Number of attached components.
        const ATTACHMENTS = 0b0000_0010;
        /// Structural version counter.
        const VERSION     = 0b0000_0100;
    }
}

impl Default for FingerprintSources {
    fn default() -> Self {
        Self::NODES | Self::ATTACHMENTS
    }
}

/// Snapshot of the change signals selected by a [`FingerprintSources`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// Live node count, if selected.
    pub nodes: Option<usize>,
    /// Attached component count, if selected.
    pub attachments: Option<usize>,
    /// Structural version, if selected.
    pub version: Option<u64>,
}

impl Fingerprint {
    /// Read the selected signals from `tree`.
    pub fn of<C, T: ComponentTree<C>>(tree: &T, sources: FingerprintSources) -> Self {
        Self {
            nodes: sources
                .contains(FingerprintSources::NODES)
                .then(|| tree.node_count()),
            attachments: sources
                .contains(FingerprintSources::ATTACHMENTS)
                .then(|| tree.attachment_count()),
            version: sources
                .contains(FingerprintSources::VERSION)
                .then(|| tree.structure_version()),
        }
    }
}

/// Counters describing resolver activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Winner lookups, including those made by `has_conflict`.
    pub queries: u64,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Full-tree scans.
    pub scans: u64,
    /// Whole-cache invalidations (detachment, fingerprint change, explicit clear).
    pub invalidations: u64,
}

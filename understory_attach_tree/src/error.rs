// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for fallible structural edits.

use crate::types::{ComponentId, NodeId};

/// Error returned by structural edits that cannot be applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// The node id is stale or was never issued by this tree.
    #[error("stale node id {0:?}")]
    StaleNode(NodeId),
    /// The component id is stale or was never issued by this tree.
    #[error("stale component id {0:?}")]
    StaleComponent(ComponentId),
    /// The edit would make a node its own ancestor.
    #[error("moving {node:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Node being moved.
        node: NodeId,
        /// Requested parent, which lies inside the moved subtree.
        parent: NodeId,
    },
}

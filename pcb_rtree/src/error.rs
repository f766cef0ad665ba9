// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! None of the tree operations fail at runtime: insertion always succeeds and a delete that
//! finds nothing returns `false`. Errors only come from configuration and from the structural
//! checker in [`RTree::validate`](crate::RTree::validate).

/// Rejected [`RTreeConfig`](crate::RTreeConfig).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The requested fan-out is outside the supported range.
    #[error("fan-out {requested} is outside {min}..={max}")]
    FanOutOutOfRange {
        /// Fan-out that was asked for.
        requested: usize,
        /// Smallest supported fan-out.
        min: usize,
        /// Largest supported fan-out.
        max: usize,
    },
}

/// A broken structural invariant found by [`RTree::validate`](crate::RTree::validate).
///
/// Node numbers are arena indices as printed by [`RTree::dump`](crate::RTree::dump).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    /// The root node has a parent link.
    #[error("root node {node} has a parent")]
    RootHasParent {
        /// Root node.
        node: usize,
    },
    /// A node's parent link does not point at the node that holds it.
    #[error("node {node} is held by {holder} but links to {linked:?}")]
    ParentLink {
        /// Child node.
        node: usize,
        /// Node that actually holds it.
        holder: usize,
        /// Parent recorded in the child.
        linked: Option<usize>,
    },
    /// A node holds more than the configured fan-out.
    #[error("node {node} holds {len} items, fan-out is {max}")]
    FanOut {
        /// Overfull node.
        node: usize,
        /// Number of items held.
        len: usize,
        /// Configured fan-out.
        max: usize,
    },
    /// A node other than the root is empty.
    #[error("non-root node {node} is empty")]
    EmptyNode {
        /// Empty node.
        node: usize,
    },
    /// A node's cached box differs from the union of its contents.
    #[error("node {node} box is not the union of its contents")]
    LooseBounds {
        /// Node with the stale box.
        node: usize,
    },
    /// An internal node mixes leaf and internal children.
    #[error("node {node} mixes leaf and internal children")]
    MixedChildren {
        /// Offending internal node.
        node: usize,
    },
    /// Leaves sit at different depths.
    #[error("leaf {node} at depth {depth}, expected {expected}")]
    UnevenDepth {
        /// Leaf at the wrong depth.
        node: usize,
        /// Its depth.
        depth: usize,
        /// Depth of the first leaf seen.
        expected: usize,
    },
    /// A leaf references an empty payload slot.
    #[error("leaf {node} references empty slot {slot}")]
    DanglingEntry {
        /// Leaf holding the reference.
        node: usize,
        /// Slot index.
        slot: usize,
    },
    /// A cached entry box disagrees with its slot or with its payload.
    #[error("cached bounds of slot {slot} disagree with the payload")]
    StaleBounds {
        /// Slot index.
        slot: usize,
    },
    /// The number of reachable entries differs from the running count.
    #[error("tree counts {expected} entries but {found} are reachable")]
    CountMismatch {
        /// Running count.
        expected: usize,
        /// Entries found by walking the tree.
        found: usize,
    },
}

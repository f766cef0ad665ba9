// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deletion.
//!
//! Entries are located by descending only into nodes whose box contains the target bounds.
//! Removal compacts the leaf. A leaf left empty is unlinked from its parent, and so on up
//! while parents empty out; otherwise boxes are re-tightened up to the root. The tree is
//! never rebalanced and the root never loses a level.

use alloc::vec::Vec;

use crate::node::{Children, LeafEntry, NodeIdx};
use crate::tree::{Key, Payload, RTree};
use crate::types::{Aabb2D, Bounded, Scalar};

impl<'a, T: Scalar, P: Bounded<T>> RTree<'a, T, P> {
    /// Delete the entry under `key`, dropping the payload if the tree owns it.
    ///
    /// Returns `false` if the key is stale.
    pub fn delete(&mut self, key: Key) -> bool {
        self.remove(key).is_some()
    }

    /// Delete the entry under `key` and hand its payload back.
    ///
    /// Returns `None` if the key is stale.
    pub fn remove(&mut self, key: Key) -> Option<Payload<'a, P>> {
        let bounds = self.entry(key)?.bounds;
        let slot = key.idx();
        let found = self.find_entry(self.root, &bounds, &|e: &LeafEntry<T>| e.slot == slot);
        debug_assert!(found.is_some(), "live slot {slot} is not reachable");
        let (leaf, pos) = found?;
        Some(self.take_entry(leaf, pos))
    }

    /// Delete the first entry whose cached bounds equal `bounds`.
    ///
    /// Useful when the caller only kept the box. With duplicate boxes in the tree, which
    /// entry goes is unspecified; prefer [`delete`](Self::delete).
    pub fn delete_matching(&mut self, bounds: &Aabb2D<T>) -> bool {
        if self.is_empty() {
            return false;
        }
        match self.find_entry(self.root, bounds, &|e: &LeafEntry<T>| e.bounds == *bounds) {
            Some((leaf, pos)) => {
                drop(self.take_entry(leaf, pos));
                true
            }
            None => false,
        }
    }

    fn find_entry(
        &self,
        node: NodeIdx,
        bounds: &Aabb2D<T>,
        matches: &impl Fn(&LeafEntry<T>) -> bool,
    ) -> Option<(NodeIdx, usize)> {
        let n = &self.nodes[node];
        if !n.bbox.contains(bounds) {
            return None;
        }
        match &n.children {
            Children::Leaf(entries) => entries.iter().position(matches).map(|pos| (node, pos)),
            Children::Internal(kids) => kids
                .iter()
                .find_map(|&kid| self.find_entry(kid, bounds, matches)),
        }
    }

    /// Unlink entry `pos` of `leaf`, fix up the tree, and release its slot.
    fn take_entry(&mut self, leaf: NodeIdx, pos: usize) -> Payload<'a, P> {
        let Children::Leaf(entries) = &mut self.nodes[leaf].children else {
            unreachable!("entries only live in leaves");
        };
        let slot = entries.remove(pos).slot;
        if entries.is_empty() {
            self.prune_empty(leaf);
        } else {
            self.nodes.adjust_upward(leaf);
        }
        self.len -= 1;
        let payload = self.free_slot(slot);
        self.debug_validate();
        match payload {
            Some(payload) => payload,
            None => unreachable!("leaf referenced empty slot {slot}"),
        }
    }

    /// Remove the empty `node` and every ancestor it leaves empty.
    fn prune_empty(&mut self, node: NodeIdx) {
        let mut node = node;
        loop {
            let Some(parent) = self.nodes[node].parent else {
                if !self.nodes[node].is_leaf() {
                    self.nodes[node].children =
                        Children::Leaf(Vec::with_capacity(self.config.fan_out() + 1));
                    log::debug!("rtree: last entry removed, root reset to an empty leaf");
                }
                return;
            };
            let Children::Internal(kids) = &mut self.nodes[parent].children else {
                unreachable!("parent of a node is always internal");
            };
            kids.retain(|&kid| kid != node);
            let emptied = kids.is_empty();
            self.nodes.free(node);
            if !emptied {
                self.nodes.adjust_upward(parent);
                return;
            }
            node = parent;
        }
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Insertion.
//!
//! The descent carries a `grow` flag: node boxes on the way down are only widened while
//! the new box may lie outside them. Once a child fully contains the new box, nothing below
//! it has to change shape.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::node::{Children, LeafEntry, Node, NodeIdx};
use crate::tree::{Key, Payload, RTree};
use crate::types::{Aabb2D, Bounded, Scalar, penalty, union_aabb};

/// Where an insert continues below an internal node.
enum Descent {
    /// A child already covers the box.
    Contained(NodeIdx),
    /// The node's children are leaves and there is room for one more.
    NewLeaf,
    /// The child whose box grows least.
    Grow(NodeIdx),
}

impl<'a, T: Scalar, P: Bounded<T>> RTree<'a, T, P> {
    /// Insert a payload and return its key.
    ///
    /// The payload's bounds are read once and cached. They must be well formed; this is
    /// checked in debug builds only.
    pub fn insert(&mut self, payload: Payload<'a, P>) -> Key {
        let bounds = payload.bounds();
        debug_assert!(
            bounds.is_well_formed(),
            "inserted box {bounds:?} has no positive extent"
        );
        let key = self.alloc_slot(bounds, payload);
        let entry = LeafEntry {
            slot: key.idx(),
            bounds,
        };
        let grow = !self.nodes[self.root].bbox.contains(&bounds);
        self.place(entry, grow);
        self.len += 1;
        self.debug_validate();
        key
    }

    /// Insert a payload the tree takes ownership of.
    pub fn insert_owned(&mut self, payload: P) -> Key {
        self.insert(Payload::Owned(Box::new(payload)))
    }

    /// Insert a payload the caller keeps alive.
    pub fn insert_borrowed(&mut self, payload: &'a P) -> Key {
        self.insert(Payload::Borrowed(payload))
    }

    fn place(&mut self, entry: LeafEntry<T>, grow: bool) {
        let fan_out = self.config.fan_out();
        let mut node = self.root;
        let mut grow = grow;
        loop {
            let n = &mut self.nodes[node];
            if let Children::Leaf(entries) = &mut n.children {
                entries.push(entry);
                if entries.len() == 1 {
                    n.bbox = entry.bounds;
                } else if grow {
                    n.bbox = union_aabb(n.bbox, entry.bounds);
                }
                if entries.len() > fan_out {
                    self.split_node(node);
                }
                return;
            }
            if grow {
                n.bbox = union_aabb(n.bbox, entry.bounds);
            }
            match self.choose_subtree(node, &entry.bounds) {
                Descent::Contained(kid) => {
                    node = kid;
                    grow = false;
                }
                Descent::Grow(kid) => {
                    node = kid;
                    grow = true;
                }
                Descent::NewLeaf => {
                    let mut entries = Vec::with_capacity(fan_out + 1);
                    entries.push(entry);
                    let leaf = self.nodes.alloc(Node {
                        bbox: entry.bounds,
                        parent: Some(node),
                        children: Children::Leaf(entries),
                    });
                    if let Children::Internal(kids) = &mut self.nodes[node].children {
                        kids.push(leaf);
                    }
                    return;
                }
            }
        }
    }

    fn choose_subtree(&self, node: NodeIdx, bounds: &Aabb2D<T>) -> Descent {
        let Children::Internal(kids) = &self.nodes[node].children else {
            unreachable!("choose_subtree is only called on internal nodes");
        };
        if let Some(&kid) = kids
            .iter()
            .find(|&&kid| self.nodes[kid].bbox.contains(bounds))
        {
            return Descent::Contained(kid);
        }
        if kids.len() < self.config.fan_out() && self.nodes[kids[0]].is_leaf() {
            return Descent::NewLeaf;
        }
        let mut best = kids[0];
        let mut best_cost = penalty(&self.nodes[best].bbox, bounds);
        for &kid in &kids[1..] {
            let cost = penalty(&self.nodes[kid].bbox, bounds);
            if cost < best_cost {
                best = kid;
                best_cost = cost;
            }
        }
        Descent::Grow(best)
    }
}

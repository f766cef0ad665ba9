// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node storage: an index-addressed arena of leaf and internal nodes.

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::types::{Aabb2D, Scalar, union_aabb};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    pub(crate) const fn get(self) -> usize {
        self.0
    }
}

/// A payload reference held by a leaf, with a copy of its bounds for locality.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct LeafEntry<T> {
    pub(crate) slot: usize,
    pub(crate) bounds: Aabb2D<T>,
}

#[derive(Clone, Debug)]
pub(crate) enum Children<T> {
    Leaf(Vec<LeafEntry<T>>),
    Internal(Vec<NodeIdx>),
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    /// Union of everything below. Stale while the node is an empty leaf.
    pub(crate) bbox: Aabb2D<T>,
    pub(crate) parent: Option<NodeIdx>,
    pub(crate) children: Children<T>,
}

impl<T: Scalar> Node<T> {
    pub(crate) fn empty_leaf(parent: Option<NodeIdx>, capacity: usize) -> Self {
        Self {
            bbox: Aabb2D::new(T::zero(), T::zero(), T::zero(), T::zero()),
            parent,
            children: Children::Leaf(Vec::with_capacity(capacity)),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.children, Children::Leaf(_))
    }

    pub(crate) fn len(&self) -> usize {
        match &self.children {
            Children::Leaf(entries) => entries.len(),
            Children::Internal(kids) => kids.len(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Arena owning every node of one tree. Freed nodes are recycled.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<T> {
    nodes: Vec<Node<T>>,
    free: Vec<NodeIdx>,
}

impl<T: Scalar> NodeArena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeIdx {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx.get()] = node;
            idx
        } else {
            self.nodes.push(node);
            NodeIdx(self.nodes.len() - 1)
        }
    }

    pub(crate) fn free(&mut self, idx: NodeIdx) {
        let node = &mut self.nodes[idx.get()];
        node.parent = None;
        node.children = Children::Leaf(Vec::new());
        self.free.push(idx);
        log::trace!("rtree: freed node {}", idx.get());
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
    }

    /// Number of nodes currently in use.
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Box of the `i`-th child or entry of `idx`.
    pub(crate) fn child_bbox(&self, idx: NodeIdx, i: usize) -> Aabb2D<T> {
        match &self[idx].children {
            Children::Leaf(entries) => entries[i].bounds,
            Children::Internal(kids) => self[kids[i]].bbox,
        }
    }

    /// Union of a node's contents, or `None` for an empty node.
    pub(crate) fn contents_bbox(&self, idx: NodeIdx) -> Option<Aabb2D<T>> {
        match &self[idx].children {
            Children::Leaf(entries) => entries
                .iter()
                .map(|e| e.bounds)
                .reduce(union_aabb),
            Children::Internal(kids) => kids.iter().map(|k| self[*k].bbox).reduce(union_aabb),
        }
    }

    /// Recompute a node's box from its contents. Empty nodes keep their old box.
    pub(crate) fn adjust_bounds(&mut self, idx: NodeIdx) {
        if let Some(bbox) = self.contents_bbox(idx) {
            self[idx].bbox = bbox;
        }
    }

    /// Re-tighten boxes from `idx` up to the root.
    pub(crate) fn adjust_upward(&mut self, idx: NodeIdx) {
        let mut cur = Some(idx);
        while let Some(i) = cur {
            self.adjust_bounds(i);
            cur = self[i].parent;
        }
    }
}

impl<T> Index<NodeIdx> for NodeArena<T> {
    type Output = Node<T>;

    #[inline]
    fn index(&self, idx: NodeIdx) -> &Node<T> {
        &self.nodes[idx.0]
    }
}

impl<T> IndexMut<NodeIdx> for NodeArena<T> {
    #[inline]
    fn index_mut(&mut self, idx: NodeIdx) -> &mut Node<T> {
        &mut self.nodes[idx.0]
    }
}

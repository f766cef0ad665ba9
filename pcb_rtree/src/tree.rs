// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree handle: payload slots, keys, lifecycle, and accessors.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::Deref;

use crate::config::RTreeConfig;
use crate::node::{Children, Node, NodeArena, NodeIdx};
use crate::types::{Aabb2D, Bounded, Scalar};

/// Generational handle for a stored entry.
///
/// A key is returned by every insert and identifies that one entry. Once the entry is
/// deleted the key goes stale for good: a later insert may reuse the slot, but with a
/// higher generation, so the old key never matches the new entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Keys are intentionally 32-bit; higher bits are truncated by design."
    )]
    pub(crate) const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

/// A stored object, either owned by the tree or borrowed from the caller.
///
/// Owned payloads are dropped when their entry is deleted or when the tree is dropped.
/// Borrowed payloads are never dropped by the tree.
pub enum Payload<'a, P> {
    /// The tree owns the object.
    Owned(Box<P>),
    /// The caller keeps the object alive for the lifetime of the tree.
    Borrowed(&'a P),
}

impl<P> Payload<'_, P> {
    /// Whether the tree owns this payload.
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// Unbox an owned payload. `None` for a borrowed one.
    pub fn into_owned(self) -> Option<P> {
        match self {
            Self::Owned(p) => Some(*p),
            Self::Borrowed(_) => None,
        }
    }
}

impl<P> Deref for Payload<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        match self {
            Self::Owned(p) => p,
            Self::Borrowed(p) => p,
        }
    }
}

impl<P: Debug> Debug for Payload<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Owned(p) => f.debug_tuple("Owned").field(p).finish(),
            Self::Borrowed(p) => f.debug_tuple("Borrowed").field(p).finish(),
        }
    }
}

pub(crate) struct Entry<'a, T, P> {
    pub(crate) generation: u32,
    pub(crate) bounds: Aabb2D<T>,
    pub(crate) payload: Payload<'a, P>,
}

/// Dynamic R-tree over half-open boxes.
///
/// Every node holds at most [`RTreeConfig::fan_out`] children or entries. Leaves hold entries:
/// a slot number plus a copy of the payload's bounds. Internal nodes hold child nodes. Each
/// node caches the union of its contents, which is what searches prune on.
///
/// The tree is single-threaded and not reentrant: searches borrow it shared, inserts and
/// deletes borrow it exclusively, so a search callback can never mutate the tree it is
/// walking. Collect keys during the search and mutate afterwards.
pub struct RTree<'a, T: Scalar, P: Bounded<T>> {
    pub(crate) config: RTreeConfig,
    pub(crate) nodes: NodeArena<T>,
    pub(crate) root: NodeIdx,
    pub(crate) entries: Vec<Option<Entry<'a, T, P>>>,
    /// Last generation per slot; survives frees so reused slots get fresh keys.
    generations: Vec<u32>,
    free_slots: Vec<usize>,
    pub(crate) len: usize,
}

impl<T: Scalar, P: Bounded<T>> Default for RTree<'_, T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Scalar, P: Bounded<T>> RTree<'a, T, P> {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RTreeConfig::new())
    }

    /// Create an empty tree with the given configuration.
    pub fn with_config(config: RTreeConfig) -> Self {
        let mut nodes = NodeArena::new();
        let root = nodes.alloc(Node::empty_leaf(None, config.fan_out() + 1));
        Self {
            config,
            nodes,
            root,
            entries: Vec::new(),
            generations: Vec::new(),
            free_slots: Vec::new(),
            len: 0,
        }
    }

    /// Build a tree that owns every item, inserting them one at a time.
    pub fn from_owned<I: IntoIterator<Item = P>>(items: I) -> Self {
        items.into_iter().map(|p| Payload::Owned(Box::new(p))).collect()
    }

    /// Build a tree over borrowed items, inserting them one at a time.
    pub fn from_borrowed(items: &'a [P]) -> Self {
        items.iter().map(Payload::Borrowed).collect()
    }

    /// The configuration this tree was built with.
    pub fn config(&self) -> RTreeConfig {
        self.config
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Box covering every entry, or `None` for an empty tree.
    pub fn bounds(&self) -> Option<Aabb2D<T>> {
        (!self.is_empty()).then(|| self.nodes[self.root].bbox)
    }

    /// Number of node levels; a lone leaf root has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut cur = self.root;
        while let Children::Internal(kids) = &self.nodes[cur].children {
            height += 1;
            cur = kids[0];
        }
        height
    }

    /// Number of nodes in use.
    pub fn node_count(&self) -> usize {
        self.nodes.live()
    }

    /// Remove every entry, dropping owned payloads.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self
            .nodes
            .alloc(Node::empty_leaf(None, self.config.fan_out() + 1));
        for slot in &mut self.entries {
            *slot = None;
        }
        // Generations are kept so that keys from before the clear stay stale.
        self.free_slots = (0..self.entries.len()).rev().collect();
        self.len = 0;
    }

    /// Returns true if `key` refers to a stored entry.
    pub fn contains_key(&self, key: Key) -> bool {
        self.entry(key).is_some()
    }

    /// The payload stored under `key`.
    pub fn get(&self, key: Key) -> Option<&P> {
        self.entry(key).map(|e| &*e.payload)
    }

    /// Whether the entry under `key` is owned by the tree. `None` for stale keys.
    pub fn is_owned(&self, key: Key) -> Option<bool> {
        self.entry(key).map(|e| e.payload.is_owned())
    }

    /// Iterate all stored entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &P)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            e.as_ref()
                .map(|e| (Key::new(i, e.generation), &*e.payload))
        })
    }

    pub(crate) fn entry(&self, key: Key) -> Option<&Entry<'a, T, P>> {
        self.entries
            .get(key.idx())?
            .as_ref()
            .filter(|e| e.generation == key.generation())
    }

    pub(crate) fn key_for_slot(&self, slot: usize) -> Key {
        Key::new(slot, self.generations[slot])
    }

    /// Store a payload in a free slot and return its key.
    pub(crate) fn alloc_slot(&mut self, bounds: Aabb2D<T>, payload: Payload<'a, P>) -> Key {
        let idx = if let Some(idx) = self.free_slots.pop() {
            self.generations[idx] = self.generations[idx].wrapping_add(1);
            idx
        } else {
            self.entries.push(None);
            self.generations.push(1);
            self.entries.len() - 1
        };
        let generation = self.generations[idx];
        self.entries[idx] = Some(Entry {
            generation,
            bounds,
            payload,
        });
        Key::new(idx, generation)
    }

    /// Empty a slot and hand its payload back.
    pub(crate) fn free_slot(&mut self, slot: usize) -> Option<Payload<'a, P>> {
        let entry = self.entries.get_mut(slot)?.take()?;
        self.free_slots.push(slot);
        Some(entry.payload)
    }

    #[cfg(feature = "slow_asserts")]
    pub(crate) fn debug_validate(&self) {
        debug_assert!(self.validate().is_ok(), "{:?}", self.validate());
    }

    #[cfg(not(feature = "slow_asserts"))]
    #[inline(always)]
    pub(crate) fn debug_validate(&self) {}
}

impl<'a, T: Scalar, P: Bounded<T>> FromIterator<Payload<'a, P>> for RTree<'a, T, P> {
    fn from_iter<I: IntoIterator<Item = Payload<'a, P>>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        log::debug!(
            "rtree: created with {} entries, height {}",
            tree.len(),
            tree.height()
        );
        tree
    }
}

impl<'a, T: Scalar, P: Bounded<T>> Extend<Payload<'a, P>> for RTree<'a, T, P> {
    fn extend<I: IntoIterator<Item = Payload<'a, P>>>(&mut self, iter: I) {
        for payload in iter {
            let _ = self.insert(payload);
        }
    }
}

impl<T: Scalar, P: Bounded<T>> Debug for RTree<'_, T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RTree")
            .field("fan_out", &self.config.fan_out())
            .field("len", &self.len)
            .field("height", &self.height())
            .field("nodes", &self.nodes.live())
            .field("slots", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    /// Payload that counts how often it is dropped.
    struct Tracked {
        bounds: Aabb2D<i64>,
        drops: Rc<Cell<usize>>,
    }

    impl Bounded<i64> for Tracked {
        fn bounds(&self) -> Aabb2D<i64> {
            self.bounds
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    fn tracked(i: i64, drops: &Rc<Cell<usize>>) -> Tracked {
        Tracked {
            bounds: Aabb2D::new(i * 10, 0, i * 10 + 5, 5),
            drops: drops.clone(),
        }
    }

    #[test]
    fn create_from_list() {
        let boxes: Vec<Aabb2D<i64>> = (0..20).map(|i| Aabb2D::new(i, i, i + 3, i + 3)).collect();
        let tree = RTree::from_borrowed(&boxes);
        assert_eq!(tree.len(), 20);
        assert_eq!(tree.bounds(), Some(Aabb2D::new(0, 0, 22, 22)));
        assert!(tree.iter().all(|(k, _)| tree.is_owned(k) == Some(false)));
    }

    #[test]
    fn create_from_empty_list() {
        let tree: RTree<'_, i64, Aabb2D<i64>> = RTree::from_owned(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.bounds(), None);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn managed_payloads_drop_once_on_destroy() {
        let owned_drops = Rc::new(Cell::new(0));
        let borrowed_drops = Rc::new(Cell::new(0));
        let borrowed: Vec<Tracked> = (0..5).map(|i| tracked(100 + i, &borrowed_drops)).collect();
        {
            let mut tree = RTree::new();
            for i in 0..10 {
                let _ = tree.insert_owned(tracked(i, &owned_drops));
            }
            for item in &borrowed {
                let _ = tree.insert_borrowed(item);
            }
            assert_eq!(tree.len(), 15);
            assert_eq!(owned_drops.get(), 0);
        }
        assert_eq!(owned_drops.get(), 10);
        assert_eq!(borrowed_drops.get(), 0);
        drop(borrowed);
        assert_eq!(borrowed_drops.get(), 5);
    }

    #[test]
    fn clear_drops_owned_payloads() {
        let drops = Rc::new(Cell::new(0));
        let mut tree = RTree::new();
        let first = tree.insert_owned(tracked(0, &drops));
        for i in 1..8 {
            let _ = tree.insert_owned(tracked(i, &drops));
        }
        tree.clear();
        assert_eq!(drops.get(), 8);
        assert!(tree.is_empty());
        assert_eq!(tree.count(None), 0);
        let again = tree.insert_owned(tracked(1, &drops));
        assert_eq!(tree.len(), 1);
        assert!(!tree.contains_key(first));
        assert!(tree.contains_key(again));
    }

    #[test]
    fn keys_go_stale_after_delete() {
        let mut tree: RTree<'_, i64, Aabb2D<i64>> = RTree::new();
        let a = tree.insert_owned(Aabb2D::new(0, 0, 10, 10));
        assert!(tree.delete(a));
        let b = tree.insert_owned(Aabb2D::new(0, 0, 10, 10));
        assert_ne!(a, b);
        assert!(!tree.contains_key(a));
        assert!(tree.contains_key(b));
        assert_eq!(tree.get(a), None);
        // A reused slot gets a newer generation even after several cycles.
        assert!(tree.delete(b));
        let c = tree.insert_owned(Aabb2D::new(1, 1, 2, 2));
        assert!(c.generation() > b.generation());
    }

    #[test]
    fn iter_lists_live_entries() {
        let mut tree: RTree<'_, i64, Aabb2D<i64>> = RTree::new();
        let keys: Vec<Key> = (0..4)
            .map(|i| tree.insert_owned(Aabb2D::new(i, 0, i + 1, 1)))
            .collect();
        assert!(tree.delete(keys[1]));
        let listed: Vec<Key> = tree.iter().map(|(k, _)| k).collect();
        assert_eq!(listed, vec![keys[0], keys[2], keys[3]]);
    }

    #[test]
    fn payload_deref_and_ownership() {
        let b = Aabb2D::new(0_i64, 0, 1, 1);
        let owned: Payload<'_, Aabb2D<i64>> = Payload::Owned(Box::new(b));
        let borrowed = Payload::Borrowed(&b);
        assert!(owned.is_owned());
        assert!(!borrowed.is_owned());
        assert_eq!(*owned, *borrowed);
        assert_eq!(owned.into_owned(), Some(b));
        assert_eq!(borrowed.into_owned(), None);
    }
}

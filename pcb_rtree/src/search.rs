// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pruned callback search.

use alloc::vec::Vec;
use core::ops::ControlFlow;

use crate::node::{Children, NodeIdx};
use crate::tree::{Key, RTree};
use crate::types::{Aabb2D, Bounded, Scalar};

/// What a search callback decided about one entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Visit {
    /// Count the entry and keep searching.
    Accept,
    /// Do not count the entry; keep searching.
    Skip,
    /// Count the entry and end the search.
    AcceptAndStop,
    /// End the search without counting the entry.
    Stop,
}

impl Visit {
    #[inline]
    fn counts(self) -> bool {
        matches!(self, Self::Accept | Self::AcceptAndStop)
    }

    #[inline]
    fn stops(self) -> bool {
        matches!(self, Self::AcceptAndStop | Self::Stop)
    }
}

impl From<bool> for Visit {
    fn from(accept: bool) -> Self {
        if accept { Self::Accept } else { Self::Skip }
    }
}

struct SearchState<'q, T, R, F> {
    query: &'q Aabb2D<T>,
    region: R,
    found: F,
    accepted: usize,
}

impl<'a, T: Scalar, P: Bounded<T>> RTree<'a, T, P> {
    /// Visit every entry whose box intersects `query`.
    ///
    /// A `None` query covers the whole tree. `region` is asked about the box of every child
    /// of an internal node that intersects the query; returning `false` skips that subtree.
    /// `found` is called once per intersecting entry and decides whether it counts and
    /// whether the search goes on.
    ///
    /// Returns the number of accepted entries. An empty tree, or a query without positive
    /// extent, matches nothing.
    pub fn search_with<R, F>(&self, query: Option<&Aabb2D<T>>, region: R, found: F) -> usize
    where
        R: FnMut(&Aabb2D<T>) -> bool,
        F: FnMut(Key, &P) -> Visit,
    {
        if self.is_empty() {
            return 0;
        }
        let root_box = self.nodes[self.root].bbox;
        let query = query.copied().unwrap_or(root_box);
        if !query.is_well_formed() || !root_box.intersects(&query) {
            return 0;
        }
        let mut state = SearchState {
            query: &query,
            region,
            found,
            accepted: 0,
        };
        let _ = self.visit(self.root, &mut state);
        state.accepted
    }

    /// Like [`search_with`](Self::search_with) without subtree pruning.
    pub fn search<F>(&self, query: Option<&Aabb2D<T>>, found: F) -> usize
    where
        F: FnMut(Key, &P) -> Visit,
    {
        self.search_with(query, |_| true, found)
    }

    /// Number of entries intersecting `query`.
    pub fn count(&self, query: Option<&Aabb2D<T>>) -> usize {
        self.search(query, |_, _| Visit::Accept)
    }

    /// Search the square of half-size `radius` around `(x, y)`.
    ///
    /// `radius` must be positive, or nothing matches.
    pub fn search_pt<F>(&self, x: T, y: T, radius: T, found: F) -> usize
    where
        F: FnMut(Key, &P) -> Visit,
    {
        self.search(Some(&Aabb2D::around(x, y, radius)), found)
    }

    /// True if no entry intersects `region`. Stops at the first hit.
    pub fn region_is_empty(&self, region: &Aabb2D<T>) -> bool {
        self.search(Some(region), |_, _| Visit::AcceptAndStop) == 0
    }

    /// Keys and payloads of all entries intersecting `rect`.
    ///
    /// Results are collected before the iterator is returned, so the keys can be used to
    /// delete entries once the iterator is dropped.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> impl Iterator<Item = (Key, &P)> + '_ {
        let mut hits = Vec::new();
        let _ = self.search(Some(&rect), |key, _| {
            hits.push(key);
            Visit::Accept
        });
        hits.into_iter().filter_map(move |key| self.get(key).map(|p| (key, p)))
    }

    fn visit<R, F>(&self, node: NodeIdx, state: &mut SearchState<'_, T, R, F>) -> ControlFlow<()>
    where
        R: FnMut(&Aabb2D<T>) -> bool,
        F: FnMut(Key, &P) -> Visit,
    {
        match &self.nodes[node].children {
            Children::Leaf(entries) => {
                for e in entries {
                    if !e.bounds.intersects(state.query) {
                        continue;
                    }
                    let Some(entry) = &self.entries[e.slot] else {
                        continue;
                    };
                    let key = Key::new(e.slot, entry.generation);
                    let visit = (state.found)(key, &*entry.payload);
                    if visit.counts() {
                        state.accepted += 1;
                    }
                    if visit.stops() {
                        return ControlFlow::Break(());
                    }
                }
            }
            Children::Internal(kids) => {
                for &kid in kids {
                    let bbox = self.nodes[kid].bbox;
                    if bbox.intersects(state.query) && (state.region)(&bbox) {
                        self.visit(kid, state)?;
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! PCB R-tree: a dynamic 2D spatial index over half-open boxes.
//!
//! - Insert payloads that know their own bounds, either owned by the tree or borrowed.
//! - Search by rectangle with a per-entry callback that can reject entries or stop early,
//!   and an optional region filter that prunes whole subtrees.
//! - Delete by key. Keys are generational and go stale once their entry is gone.
//!
//! Boxes are half-open: a box covers `[min_x, max_x) × [min_y, max_y)`, so boxes that only
//! share an edge never intersect. Coordinates are generic over [`Scalar`] (`i32`, `i64`,
//! `f32`, `f64`).
//!
//! Nodes hold at most [`RTreeConfig::fan_out`] children (6 by default). An overfull node is
//! split with a small area-weighted 2-means pass over the centroids of its contents.
//! Deletion only shrinks boxes; the tree is never rebalanced.
//!
//! # Example
//!
//! ```rust
//! use pcb_rtree::{Aabb2D, RTree, Visit};
//!
//! let mut tree = RTree::new();
//! let a = tree.insert_owned(Aabb2D::new(0_i64, 0, 10, 10));
//! let _b = tree.insert_owned(Aabb2D::new(20, 0, 30, 10));
//!
//! // Everything touching the strip x in [5, 25).
//! let hits = tree.search(Some(&Aabb2D::new(5, 0, 25, 1)), |_, _| Visit::Accept);
//! assert_eq!(hits, 2);
//!
//! // Shared edges do not count as overlap.
//! assert!(tree.region_is_empty(&Aabb2D::new(10, 0, 20, 10)));
//!
//! assert!(tree.delete(a));
//! assert!(!tree.delete(a));
//! assert_eq!(tree.bounds(), Some(Aabb2D::new(20, 0, 30, 10)));
//! ```
//!
//! Searches borrow the tree, so entries cannot be deleted from inside a callback. Collect
//! keys first:
//!
//! ```rust
//! use pcb_rtree::{Aabb2D, Key, RTree};
//!
//! let mut tree = RTree::new();
//! for i in 0..20_i64 {
//!     let _ = tree.insert_owned(Aabb2D::new(i * 2, 0, i * 2 + 1, 1));
//! }
//! let doomed: Vec<Key> = tree.query_rect(Aabb2D::new(0, 0, 10, 1)).map(|(k, _)| k).collect();
//! for key in doomed {
//!     tree.delete(key);
//! }
//! assert_eq!(tree.len(), 15);
//! ```
//!
//! ## Features
//!
//! - `slow_asserts`: re-run [`RTree::validate`] after every insert and delete in debug builds.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Boxes with NaN coordinates are
//! not well formed and are rejected by debug assertions on insert.

#![no_std]

extern crate alloc;

mod check;
pub mod config;
mod delete;
mod dump;
pub mod error;
mod insert;
mod node;
mod search;
mod split;
mod tree;
pub mod types;

pub use config::{DEFAULT_FAN_OUT, MAX_FAN_OUT, MIN_FAN_OUT, RTreeConfig};
pub use dump::DumpStats;
pub use error::{ConfigError, InvariantError};
pub use search::Visit;
pub use tree::{Key, Payload, RTree};
pub use types::{Aabb2D, Bounded, Scalar};

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree basics.
//!
//! Insert a few boxes, search with a filtering callback, stop early, and delete.
//!
//! Run:
//! - `cargo run -p pcb_demos --example rtree_basics`

use pcb_rtree::{Aabb2D, RTree, Visit};

fn main() {
    let mut tree: RTree<'_, i64, Aabb2D<i64>> = RTree::new();
    let mut keys = Vec::new();
    for i in 0..20 {
        keys.push(tree.insert_owned(Aabb2D::<i64>::from_xywh(i * 10, (i % 4) * 10, 8, 8)));
    }
    println!(
        "{} entries, height {}, {} nodes, bounds {:?}",
        tree.len(),
        tree.height(),
        tree.node_count(),
        tree.bounds()
    );

    // Count boxes in a window, but only those in the top row.
    let window = Aabb2D::new(0, 0, 100, 40);
    let top_row = tree.search(Some(&window), |_, b| (b.min_y == 0).into());
    println!("top-row boxes in window: {top_row}");
    assert_eq!(top_row, 3, "x = 0, 40, 80 sit in row 0");

    // Stop at the first hit.
    let first = tree.search(Some(&window), |key, b| {
        println!("first hit: {key:?} at {b:?}");
        Visit::AcceptAndStop
    });
    assert_eq!(first, 1, "search stops after the first accepted entry");

    // Shared edges are not overlap.
    assert!(tree.region_is_empty(&Aabb2D::new(8, 0, 10, 8)));

    for key in keys.iter().step_by(2) {
        assert!(tree.delete(*key), "each key deletes once");
    }
    println!("after deleting half: {} entries, bounds {:?}", tree.len(), tree.bounds());
    assert_eq!(tree.validate(), Ok(()));
}

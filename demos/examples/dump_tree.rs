// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dump the structure of a small tree.
//!
//! Run:
//! - `cargo run -p pcb_demos --example dump_tree`

use pcb_rtree::{Aabb2D, RTree, RTreeConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let boxes: Vec<Aabb2D<i64>> = (0..12)
        .map(|i| Aabb2D::<i64>::from_xywh((i % 4) * 25, (i / 4) * 25, 20, 20))
        .collect();
    let config = RTreeConfig::new().with_fan_out(3)?;
    let mut tree = RTree::with_config(config);
    for (i, b) in boxes.iter().enumerate() {
        if i % 3 == 0 {
            let _ = tree.insert_owned(*b);
        } else {
            let _ = tree.insert_borrowed(b);
        }
    }

    let mut out = String::new();
    let stats = tree.dump(&mut out)?;
    print!("{out}");
    println!(
        "{} nodes, {} entries, average box area {}",
        stats.nodes,
        stats.entries,
        stats.average_area()
    );
    Ok(())
}

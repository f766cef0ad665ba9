// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable tree dump for debugging.

use core::fmt::{self, Write};

use crate::node::{Children, NodeIdx};
use crate::tree::RTree;
use crate::types::{Aabb2D, Bounded, Scalar};

/// Totals gathered while dumping a tree.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DumpStats {
    /// Nodes written.
    pub nodes: usize,
    /// Entries written.
    pub entries: usize,
    /// Summed area of every node box and entry box.
    pub total_area: f64,
}

impl DumpStats {
    /// Mean area over all node and entry boxes, or `0.0` when nothing was written.
    pub fn average_area(&self) -> f64 {
        let n = self.nodes + self.entries;
        if n == 0 { 0.0 } else { self.total_area / n as f64 }
    }
}

fn area_f64<T: Scalar>(b: &Aabb2D<T>) -> f64 {
    T::sub(b.max_x, b.min_x).to_f64() * T::sub(b.max_y, b.min_y).to_f64()
}

impl<T: Scalar, P: Bounded<T>> RTree<'_, T, P> {
    /// Write an indented listing of every node and entry, followed by the average box area.
    ///
    /// ```text
    /// node #7 X(0, 31) Y(0, 1)
    ///   leaf #0 owned(3f) X(0, 11) Y(0, 1)
    ///     entry #0@1 X(0, 1) Y(0, 1) owned
    /// ```
    pub fn dump<W: Write>(&self, out: &mut W) -> Result<DumpStats, fmt::Error> {
        let mut stats = DumpStats::default();
        if self.is_empty() {
            writeln!(out, "empty tree")?;
            return Ok(stats);
        }
        self.dump_node(out, self.root, 0, &mut stats)?;
        writeln!(out, "average box area is {}", stats.average_area())?;
        Ok(stats)
    }

    fn dump_node<W: Write>(
        &self,
        out: &mut W,
        node: NodeIdx,
        depth: usize,
        stats: &mut DumpStats,
    ) -> fmt::Result {
        let n = &self.nodes[node];
        stats.nodes += 1;
        stats.total_area += area_f64(&n.bbox);
        indent(out, depth)?;
        match &n.children {
            Children::Internal(kids) => {
                writeln!(out, "node #{} {}", node.get(), Coords(&n.bbox))?;
                for &kid in kids {
                    self.dump_node(out, kid, depth + 1, stats)?;
                }
            }
            Children::Leaf(entries) => {
                let owned = entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| {
                        self.entries[e.slot]
                            .as_ref()
                            .is_some_and(|s| s.payload.is_owned())
                    })
                    .fold(0_u64, |mask, (i, _)| mask | (1 << i));
                writeln!(out, "leaf #{} owned({owned:02x}) {}", node.get(), Coords(&n.bbox))?;
                for e in entries {
                    stats.entries += 1;
                    stats.total_area += area_f64(&e.bounds);
                    indent(out, depth + 1)?;
                    let key = self.key_for_slot(e.slot);
                    let kind = match &self.entries[e.slot] {
                        Some(s) if s.payload.is_owned() => "owned",
                        Some(_) => "borrowed",
                        None => "dangling",
                    };
                    writeln!(
                        out,
                        "entry #{}@{} {} {kind}",
                        e.slot,
                        key.generation(),
                        Coords(&e.bounds)
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn indent<W: Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str("  ")?;
    }
    Ok(())
}

struct Coords<'b, T>(&'b Aabb2D<T>);

impl<T: fmt::Debug> fmt::Display for Coords<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "X({:?}, {:?}) Y({:?}, {:?})",
            b.min_x, b.max_x, b.min_y, b.max_y
        )
    }
}

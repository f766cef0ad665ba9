// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overflow splitting.
//!
//! An overfull node holds `fan_out + 1` items. They are partitioned into two clusters with a
//! small 2-means pass over the item centroids, each centroid weighted by `area + 1`:
//!
//! 1. The two centers start at the centroids of the first and the last item.
//! 2. Each round assigns every item to the closer center, scaling each squared distance by
//!    `cluster_size + fan_out / 2` so that a cluster gets less attractive as it grows.
//!    This keeps splits away from one-against-all partitions.
//! 3. Centers move to the weighted centroid of their cluster. The loop ends after `fan_out`
//!    rounds or once neither center moves by a whole unit.
//!
//! If every item lands in one cluster, the middle item is moved to the other one.

use alloc::vec;
use alloc::vec::Vec;

use crate::node::{Children, Node, NodeIdx};
use crate::tree::RTree;
use crate::types::{Aabb2D, Bounded, Scalar, union_aabb};

#[derive(Copy, Clone, Debug)]
struct Center {
    x: f64,
    y: f64,
    weight: f64,
}

/// Assign each box to cluster A (`true`) or B (`false`). Both clusters end up non-empty.
pub(crate) fn partition<T: Scalar>(boxes: &[Aabb2D<T>], fan_out: usize) -> Vec<bool> {
    let n = boxes.len();
    debug_assert!(n >= 2, "cannot split fewer than two items");
    let centers: Vec<Center> = boxes
        .iter()
        .map(|b| {
            let (x, y) = b.centroid();
            let w = T::max_zero(T::sub(b.max_x, b.min_x)).to_f64();
            let h = T::max_zero(T::sub(b.max_y, b.min_y)).to_f64();
            Center {
                x,
                y,
                weight: 1.0 + w * h,
            }
        })
        .collect();

    let (mut a_x, mut a_y) = (centers[0].x, centers[0].y);
    let (mut b_x, mut b_y) = (centers[n - 1].x, centers[n - 1].y);
    if a_x == b_x && a_y == b_y {
        b_x += 10000.0;
        a_y -= 10000.0;
    }

    let bias = (fan_out / 2) as f64;
    let middle = (fan_out / 2).min(n - 1);
    let mut belong = vec![false; n];
    for _ in 0..fan_out {
        let old = (trunc(a_x), trunc(a_y), trunc(b_x), trunc(b_y));
        let (mut clust_a, mut clust_b) = (0_usize, 0_usize);
        for (c, slot) in centers.iter().zip(belong.iter_mut()) {
            let dist_a = square(a_x - c.x) + square(a_y - c.y);
            let dist_b = square(b_x - c.x) + square(b_y - c.y);
            *slot = dist_a * (clust_a as f64 + bias) < dist_b * (clust_b as f64 + bias);
            if *slot {
                clust_a += 1;
            } else {
                clust_b += 1;
            }
        }
        if clust_a == n {
            belong[middle] = false;
        } else if clust_b == n {
            belong[middle] = true;
        }

        let (mut total_a, mut total_b) = (0.0, 0.0);
        (a_x, a_y, b_x, b_y) = (0.0, 0.0, 0.0, 0.0);
        for (c, &in_a) in centers.iter().zip(belong.iter()) {
            if in_a {
                a_x += c.x * c.weight;
                a_y += c.y * c.weight;
                total_a += c.weight;
            } else {
                b_x += c.x * c.weight;
                b_y += c.y * c.weight;
                total_b += c.weight;
            }
        }
        a_x /= total_a;
        a_y /= total_a;
        b_x /= total_b;
        b_y /= total_b;
        if old == (trunc(a_x), trunc(a_y), trunc(b_x), trunc(b_y)) {
            break;
        }
    }
    belong
}

#[inline]
fn square(v: f64) -> f64 {
    v * v
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Convergence is checked on whole units; saturation is fine."
)]
#[inline]
fn trunc(v: f64) -> i64 {
    v as i64
}

impl<T: Scalar, P: Bounded<T>> RTree<'_, T, P> {
    /// Split an overfull node and propagate the new sibling upward.
    pub(crate) fn split_node(&mut self, node: NodeIdx) {
        let mut node = node;
        loop {
            let sibling = self.split_one(node);
            match self.nodes[node].parent {
                None => {
                    let bbox = union_aabb(self.nodes[node].bbox, self.nodes[sibling].bbox);
                    let mut kids = Vec::with_capacity(self.config.fan_out() + 1);
                    kids.push(node);
                    kids.push(sibling);
                    let root = self.nodes.alloc(Node {
                        bbox,
                        parent: None,
                        children: Children::Internal(kids),
                    });
                    self.nodes[node].parent = Some(root);
                    self.nodes[sibling].parent = Some(root);
                    self.root = root;
                    log::debug!("rtree: root split, height is now {}", self.height());
                    return;
                }
                Some(parent) => {
                    let Children::Internal(kids) = &mut self.nodes[parent].children else {
                        unreachable!("parent of a node is always internal");
                    };
                    kids.push(sibling);
                    if kids.len() <= self.config.fan_out() {
                        return;
                    }
                    node = parent;
                }
            }
        }
    }

    /// Partition `node` in place and return the newly allocated sibling.
    fn split_one(&mut self, node: NodeIdx) -> NodeIdx {
        let len = self.nodes[node].len();
        let boxes: Vec<Aabb2D<T>> = (0..len).map(|i| self.nodes.child_bbox(node, i)).collect();
        let belong = partition(&boxes, self.config.fan_out());
        let parent = self.nodes[node].parent;
        let cap = self.config.fan_out() + 1;

        let moved = match &mut self.nodes[node].children {
            Children::Leaf(entries) => {
                let (a, b) = take_split(entries, &belong, cap);
                *entries = a;
                Children::Leaf(b)
            }
            Children::Internal(kids) => {
                let (a, b) = take_split(kids, &belong, cap);
                *kids = a;
                Children::Internal(b)
            }
        };
        let bbox = self.nodes[node].bbox;
        let sibling = self.nodes.alloc(Node {
            bbox,
            parent,
            children: moved,
        });
        if let Children::Internal(kids) = &self.nodes[sibling].children {
            let kids = kids.clone();
            for kid in kids {
                self.nodes[kid].parent = Some(sibling);
            }
        }
        self.nodes.adjust_bounds(node);
        self.nodes.adjust_bounds(sibling);
        log::trace!(
            "rtree: split node {} into {} + {} (sibling {})",
            node.get(),
            self.nodes[node].len(),
            self.nodes[sibling].len(),
            sibling.get()
        );
        sibling
    }
}

/// Drain `items` into the `true` and `false` halves of `belong`, keeping order.
fn take_split<I>(items: &mut Vec<I>, belong: &[bool], cap: usize) -> (Vec<I>, Vec<I>) {
    let mut a = Vec::with_capacity(cap);
    let mut b = Vec::with_capacity(cap);
    for (item, &in_a) in items.drain(..).zip(belong) {
        if in_a {
            a.push(item);
        } else {
            b.push(item);
        }
    }
    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(x: i64, y: i64) -> Aabb2D<i64> {
        Aabb2D::new(x, y, x + 1, y + 1)
    }

    #[test]
    fn separates_two_groups() {
        let boxes = [
            unit(0, 0),
            unit(1000, 0),
            unit(2, 1),
            unit(1001, 3),
            unit(1, 2),
            unit(1003, 1),
            unit(1002, 2),
        ];
        let belong = partition(&boxes, 6);
        // The first item seeds cluster A.
        for (i, b) in boxes.iter().enumerate() {
            assert_eq!(belong[i], b.min_x < 500, "item {i} landed in the wrong cluster");
        }
    }

    #[test]
    fn identical_boxes_still_split() {
        let boxes = [unit(5, 5); 7];
        let belong = partition(&boxes, 6);
        let a = belong.iter().filter(|&&x| x).count();
        assert!(a > 0 && a < boxes.len(), "degenerate split: {a} of 7");
    }

    #[test]
    fn both_clusters_non_empty_for_small_fan_out() {
        let boxes = [unit(0, 0), unit(0, 1), unit(50, 50)];
        let belong = partition(&boxes, 2);
        assert!(belong.iter().any(|&x| x));
        assert!(belong.iter().any(|&x| !x));
    }

    #[test]
    fn float_boxes_split() {
        let boxes: Vec<Aabb2D<f64>> = (0..7)
            .map(|i| Aabb2D::<f64>::from_xywh(i as f64 * 0.1, 0.0, 0.05, 0.05))
            .collect();
        let belong = partition(&boxes, 6);
        let a = belong.iter().filter(|&&x| x).count();
        assert!(a > 0 && a < boxes.len(), "degenerate split: {a} of 7");
    }

    #[test]
    fn take_split_keeps_order() {
        let mut items = alloc::vec![1, 2, 3, 4, 5];
        let (a, b) = take_split(&mut items, &[true, false, true, false, false], 6);
        assert_eq!(a, [1, 3]);
        assert_eq!(b, [2, 4, 5]);
        assert!(items.is_empty());
    }
}

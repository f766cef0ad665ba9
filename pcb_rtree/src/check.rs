// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural invariant checker.

use crate::error::InvariantError;
use crate::node::{Children, NodeIdx};
use crate::tree::RTree;
use crate::types::{Bounded, Scalar};

#[derive(Default)]
struct Walk {
    leaf_depth: Option<usize>,
    entries: usize,
}

impl<T: Scalar, P: Bounded<T>> RTree<'_, T, P> {
    /// Walk the whole tree and report the first broken invariant.
    ///
    /// Checks parent links, the fan-out bound, that only the root may be empty, that every
    /// node box is exactly the union of its contents, that all leaves sit at one depth,
    /// and that every leaf entry points at a live slot whose bounds agree with the payload.
    /// Linear in the size of the tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantError`] found.
    pub fn validate(&self) -> Result<(), InvariantError> {
        if self.nodes[self.root].parent.is_some() {
            return Err(InvariantError::RootHasParent {
                node: self.root.get(),
            });
        }
        let mut walk = Walk::default();
        self.check_node(self.root, 0, &mut walk)?;
        if walk.entries != self.len {
            return Err(InvariantError::CountMismatch {
                expected: self.len,
                found: walk.entries,
            });
        }
        Ok(())
    }

    fn check_node(&self, node: NodeIdx, depth: usize, walk: &mut Walk) -> Result<(), InvariantError> {
        let n = &self.nodes[node];
        let id = node.get();
        let max = self.config.fan_out();
        if n.len() > max {
            return Err(InvariantError::FanOut {
                node: id,
                len: n.len(),
                max,
            });
        }
        if n.is_empty() {
            return if node == self.root && n.is_leaf() {
                Ok(())
            } else {
                Err(InvariantError::EmptyNode { node: id })
            };
        }
        if self.nodes.contents_bbox(node) != Some(n.bbox) {
            return Err(InvariantError::LooseBounds { node: id });
        }
        match &n.children {
            Children::Leaf(entries) => {
                match walk.leaf_depth {
                    None => walk.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(InvariantError::UnevenDepth {
                            node: id,
                            depth,
                            expected,
                        });
                    }
                    Some(_) => {}
                }
                for e in entries {
                    let Some(entry) = self.entries.get(e.slot).and_then(Option::as_ref) else {
                        return Err(InvariantError::DanglingEntry {
                            node: id,
                            slot: e.slot,
                        });
                    };
                    if entry.bounds != e.bounds || entry.payload.bounds() != e.bounds {
                        return Err(InvariantError::StaleBounds { slot: e.slot });
                    }
                    walk.entries += 1;
                }
            }
            Children::Internal(kids) => {
                let leaves = self.nodes[kids[0]].is_leaf();
                for &kid in kids {
                    let child = &self.nodes[kid];
                    if child.parent != Some(node) {
                        return Err(InvariantError::ParentLink {
                            node: kid.get(),
                            holder: id,
                            linked: child.parent.map(NodeIdx::get),
                        });
                    }
                    if child.is_leaf() != leaves {
                        return Err(InvariantError::MixedChildren { node: id });
                    }
                    self.check_node(kid, depth + 1, walk)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Aabb2D;

    fn sample() -> RTree<'static, i64, Aabb2D<i64>> {
        let mut tree = RTree::new();
        for i in 0..25 {
            let _ = tree.insert_owned(Aabb2D::new(i * 4, i % 5, i * 4 + 3, i % 5 + 2));
        }
        tree
    }

    #[test]
    fn fresh_trees_are_valid() {
        let empty: RTree<'_, i64, Aabb2D<i64>> = RTree::new();
        assert_eq!(empty.validate(), Ok(()));
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn count_mismatch_is_reported() {
        let mut tree = sample();
        tree.len += 1;
        assert_eq!(
            tree.validate(),
            Err(InvariantError::CountMismatch {
                expected: 26,
                found: 25
            })
        );
    }

    #[test]
    fn root_parent_is_reported() {
        let mut tree = sample();
        let root = tree.root;
        tree.nodes[root].parent = Some(root);
        assert_eq!(
            tree.validate(),
            Err(InvariantError::RootHasParent { node: root.get() })
        );
    }

    #[test]
    fn loose_root_box_is_reported() {
        let mut tree = sample();
        let root = tree.root;
        tree.nodes[root].bbox.max_x += 1;
        assert_eq!(
            tree.validate(),
            Err(InvariantError::LooseBounds { node: root.get() })
        );
    }

    #[test]
    fn stale_entry_bounds_are_reported() {
        let mut tree = RTree::new();
        let k = tree.insert_owned(Aabb2D::new(0_i64, 0, 4, 4));
        let _ = tree.insert_owned(Aabb2D::new(10, 10, 14, 14));
        if let Some(entry) = tree.entries[k.idx()].as_mut() {
            entry.bounds = Aabb2D::new(0, 0, 5, 5);
        }
        assert_eq!(
            tree.validate(),
            Err(InvariantError::StaleBounds { slot: k.idx() })
        );
    }

    #[test]
    fn messages_name_the_node() {
        let err = InvariantError::FanOut {
            node: 3,
            len: 7,
            max: 6,
        };
        assert_eq!(alloc::format!("{err}"), "node 3 holds 7 items, fan-out is 6");
    }
}

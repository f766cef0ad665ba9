// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The board: one tree per layer and object kind.

use alloc::vec::Vec;

use kurbo::{Point, Rect};
use pcb_rtree::{Aabb2D, Key, RTree, RTreeConfig, Visit};

use crate::error::BoardError;
use crate::objects::{Coord, Object};
use crate::types::{ObjectHandle, ObjectKind, QueryFilter};
use crate::util::rect_to_aabb;

type ObjectTree = RTree<'static, Coord, Object>;

struct Layer {
    lines: ObjectTree,
    arcs: ObjectTree,
    polygons: ObjectTree,
    visible: bool,
}

impl Layer {
    fn new(config: RTreeConfig) -> Self {
        Self {
            lines: RTree::with_config(config),
            arcs: RTree::with_config(config),
            polygons: RTree::with_config(config),
            visible: true,
        }
    }
}

/// Spatial index over every object on a board.
///
/// Lines, arcs, and polygons live in per-layer trees; vias, pads, and rat lines in
/// board-wide trees. The index owns its objects.
pub struct BoardIndex {
    layers: Vec<Layer>,
    vias: ObjectTree,
    pads: ObjectTree,
    rats: ObjectTree,
}

impl core::fmt::Debug for BoardIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let visible = self.layers.iter().filter(|l| l.visible).count();
        f.debug_struct("BoardIndex")
            .field("layers", &self.layers.len())
            .field("visible_layers", &visible)
            .field("objects", &self.len())
            .finish_non_exhaustive()
    }
}

impl BoardIndex {
    /// Create an empty board with `layer_count` copper layers.
    pub fn new(layer_count: usize) -> Self {
        Self::with_config(layer_count, RTreeConfig::default())
    }

    /// Create an empty board whose trees all use `config`.
    pub fn with_config(layer_count: usize, config: RTreeConfig) -> Self {
        Self {
            layers: (0..layer_count).map(|_| Layer::new(config)).collect(),
            vias: RTree::with_config(config),
            pads: RTree::with_config(config),
            rats: RTree::with_config(config),
        }
    }

    /// Number of copper layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Total number of stored objects.
    pub fn len(&self) -> usize {
        let layered: usize = self
            .layers
            .iter()
            .map(|l| l.lines.len() + l.arcs.len() + l.polygons.len())
            .sum();
        layered + self.vias.len() + self.pads.len() + self.rats.len()
    }

    /// True if the board holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add an object. Lines, arcs, and polygons need a layer; other kinds must not have one.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::MissingLayer`], [`BoardError::UnexpectedLayer`], or
    /// [`BoardError::LayerOutOfRange`] when `layer` does not fit the object's kind.
    pub fn insert(
        &mut self,
        object: Object,
        layer: Option<usize>,
    ) -> Result<ObjectHandle, BoardError> {
        let kind = object.kind();
        let key = self.tree_mut(kind, layer)?.insert_owned(object);
        Ok(ObjectHandle { kind, layer, key })
    }

    /// Remove an object and return it. `None` if the handle is stale.
    pub fn remove(&mut self, handle: ObjectHandle) -> Option<Object> {
        // Board trees only ever hold owned objects.
        self.tree_mut(handle.kind, handle.layer)
            .ok()?
            .remove(handle.key)?
            .into_owned()
    }

    /// The object behind `handle`.
    pub fn get(&self, handle: ObjectHandle) -> Option<&Object> {
        self.tree(handle.kind, handle.layer).ok()?.get(handle.key)
    }

    /// Move an object by `(dx, dy)`. The old handle goes stale; the new one is returned.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::StaleHandle`] if `handle` does not refer to a stored object, or
    /// [`BoardError::CoordinateOverflow`] if the move leaves the coordinate range. The object
    /// stays in place on error.
    pub fn translate(
        &mut self,
        handle: ObjectHandle,
        dx: Coord,
        dy: Coord,
    ) -> Result<ObjectHandle, BoardError> {
        let moved = self
            .get(handle)
            .ok_or(BoardError::StaleHandle)?
            .translated(dx, dy)?;
        let _ = self.remove(handle);
        log::debug!(
            "board: moved {:?} on layer {:?} by ({dx}, {dy}) to {:?}",
            handle.kind,
            handle.layer,
            moved.bbox()
        );
        self.insert(moved, handle.layer)
    }

    /// Show or hide a layer. Hidden layers are skipped by filters with `visible_only`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::LayerOutOfRange`] for an unknown layer.
    pub fn set_layer_visible(&mut self, layer: usize, visible: bool) -> Result<(), BoardError> {
        let count = self.layers.len();
        self.layers
            .get_mut(layer)
            .ok_or(BoardError::LayerOutOfRange { layer, count })?
            .visible = visible;
        Ok(())
    }

    /// Whether `layer` is shown. `None` for an unknown layer.
    pub fn is_layer_visible(&self, layer: usize) -> Option<bool> {
        self.layers.get(layer).map(|l| l.visible)
    }

    /// Handles of all objects whose bounding box intersects `rect`.
    ///
    /// The rect is rounded outward to board coordinates.
    pub fn query(&self, rect: Rect, filter: QueryFilter) -> Vec<ObjectHandle> {
        let area = rect_to_aabb(rect);
        let mut out = Vec::new();
        for (kind, layer, tree) in self.trees(&filter) {
            let _ = search_filtered(tree, &area, &filter, |key, _| {
                out.push(ObjectHandle { kind, layer, key });
                Visit::Accept
            });
        }
        out
    }

    /// The first object whose copper lies within `radius` of `pt`.
    ///
    /// Kinds are tried in [`ObjectKind::ALL`] order, layers from first to last. Candidates
    /// come from the index; the exact shape decides.
    pub fn hit_test(&self, pt: Point, radius: f64, filter: QueryFilter) -> Option<ObjectHandle> {
        let r = radius.max(1.0);
        let area = rect_to_aabb(Rect::new(pt.x - r, pt.y - r, pt.x + r, pt.y + r));
        for (kind, layer, tree) in self.trees(&filter) {
            let mut found = None;
            let _ = search_filtered(tree, &area, &filter, |key, object| {
                if object.shape().hit(pt, radius.max(0.0)) {
                    found = Some(key);
                    Visit::AcceptAndStop
                } else {
                    Visit::Skip
                }
            });
            if let Some(key) = found {
                return Some(ObjectHandle { kind, layer, key });
            }
        }
        None
    }

    /// True if no object's bounding box intersects `rect`.
    pub fn is_clear(&self, rect: Rect, filter: QueryFilter) -> bool {
        let area = rect_to_aabb(rect);
        self.trees(&filter)
            .into_iter()
            .all(|(_, _, tree)| {
                search_filtered(tree, &area, &filter, |_, _| Visit::AcceptAndStop) == 0
            })
    }

    /// Remove every object whose bounding box intersects `rect` and return them.
    pub fn remove_in_region(&mut self, rect: Rect, filter: QueryFilter) -> Vec<Object> {
        let doomed = self.query(rect, filter);
        let removed: Vec<Object> = doomed.into_iter().filter_map(|h| self.remove(h)).collect();
        log::debug!("board: removed {} objects in {rect:?}", removed.len());
        removed
    }

    /// Trees a query with `filter` has to look at, in hit-test priority order.
    fn trees(&self, filter: &QueryFilter) -> Vec<(ObjectKind, Option<usize>, &ObjectTree)> {
        let mut trees = Vec::new();
        for kind in ObjectKind::ALL {
            if !filter.wants(kind) {
                continue;
            }
            if kind.is_layered() {
                for (i, layer) in self.layers.iter().enumerate() {
                    if filter.visible_only && !layer.visible {
                        continue;
                    }
                    let tree = match kind {
                        ObjectKind::Line => &layer.lines,
                        ObjectKind::Arc => &layer.arcs,
                        _ => &layer.polygons,
                    };
                    trees.push((kind, Some(i), tree));
                }
            } else {
                let tree = match kind {
                    ObjectKind::Via => &self.vias,
                    ObjectKind::Pad => &self.pads,
                    _ => &self.rats,
                };
                trees.push((kind, None, tree));
            }
        }
        trees
    }

    fn tree(&self, kind: ObjectKind, layer: Option<usize>) -> Result<&ObjectTree, BoardError> {
        let count = self.layers.len();
        match (kind.is_layered(), layer) {
            (true, None) => Err(BoardError::MissingLayer { kind }),
            (false, Some(_)) => Err(BoardError::UnexpectedLayer { kind }),
            (true, Some(layer)) => {
                let l = self
                    .layers
                    .get(layer)
                    .ok_or(BoardError::LayerOutOfRange { layer, count })?;
                Ok(match kind {
                    ObjectKind::Line => &l.lines,
                    ObjectKind::Arc => &l.arcs,
                    _ => &l.polygons,
                })
            }
            (false, None) => Ok(match kind {
                ObjectKind::Via => &self.vias,
                ObjectKind::Pad => &self.pads,
                _ => &self.rats,
            }),
        }
    }

    fn tree_mut(
        &mut self,
        kind: ObjectKind,
        layer: Option<usize>,
    ) -> Result<&mut ObjectTree, BoardError> {
        let count = self.layers.len();
        match (kind.is_layered(), layer) {
            (true, None) => Err(BoardError::MissingLayer { kind }),
            (false, Some(_)) => Err(BoardError::UnexpectedLayer { kind }),
            (true, Some(layer)) => {
                let l = self
                    .layers
                    .get_mut(layer)
                    .ok_or(BoardError::LayerOutOfRange { layer, count })?;
                Ok(match kind {
                    ObjectKind::Line => &mut l.lines,
                    ObjectKind::Arc => &mut l.arcs,
                    _ => &mut l.polygons,
                })
            }
            (false, None) => Ok(match kind {
                ObjectKind::Via => &mut self.vias,
                ObjectKind::Pad => &mut self.pads,
                _ => &mut self.rats,
            }),
        }
    }
}

/// Search `tree` for objects in `area` that pass `filter`, pruning small subtrees.
fn search_filtered<F>(
    tree: &ObjectTree,
    area: &Aabb2D<Coord>,
    filter: &QueryFilter,
    mut found: F,
) -> usize
where
    F: FnMut(Key, &Object) -> Visit,
{
    tree.search_with(
        Some(area),
        |region| filter.big_enough(region),
        |key, object| {
            if filter.accepts(object) {
                found(key, object)
            } else {
                Visit::Skip
            }
        },
    )
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the board index: object handles, kinds, flags, and query filters.

use pcb_rtree::Key;

use crate::objects::{Coord, Object};

bitflags::bitflags! {
    /// Per-object state flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u16 {
        /// Marked by a connectivity search.
        const FOUND      = 0b0000_0001;
        /// Part of the current selection.
        const SELECTED   = 0b0000_0010;
        /// Cannot be selected or moved.
        const LOCKED     = 0b0000_0100;
        /// Via or pad without plating.
        const HOLE       = 0b0000_1000;
        /// Line clears surrounding polygons.
        const CLEAR_LINE = 0b0001_0000;
        /// Placed by the autorouter.
        const AUTO       = 0b0010_0000;
    }
}

/// The kind of a board object. Also names the tree it lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    /// Copper via, board-wide.
    Via,
    /// Component pad, board-wide.
    Pad,
    /// Straight trace on a layer.
    Line,
    /// Elliptic arc trace on a layer.
    Arc,
    /// Unrouted connection, board-wide.
    Rat,
    /// Filled polygon on a layer.
    Polygon,
}

impl ObjectKind {
    /// All kinds, in hit-test priority order.
    pub const ALL: [Self; 6] = [
        Self::Via,
        Self::Pad,
        Self::Line,
        Self::Arc,
        Self::Rat,
        Self::Polygon,
    ];

    /// Whether objects of this kind belong to a copper layer.
    pub const fn is_layered(self) -> bool {
        matches!(self, Self::Line | Self::Arc | Self::Polygon)
    }

    /// The single-kind mask.
    pub const fn mask(self) -> KindMask {
        match self {
            Self::Via => KindMask::VIA,
            Self::Pad => KindMask::PAD,
            Self::Line => KindMask::LINE,
            Self::Arc => KindMask::ARC,
            Self::Rat => KindMask::RAT,
            Self::Polygon => KindMask::POLYGON,
        }
    }
}

bitflags::bitflags! {
    /// A set of [`ObjectKind`]s.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KindMask: u8 {
        /// Vias.
        const VIA     = 0b0000_0001;
        /// Pads.
        const PAD     = 0b0000_0010;
        /// Lines.
        const LINE    = 0b0000_0100;
        /// Arcs.
        const ARC     = 0b0000_1000;
        /// Rat lines.
        const RAT     = 0b0001_0000;
        /// Polygons.
        const POLYGON = 0b0010_0000;
        /// Everything drawn in copper.
        const COPPER  = Self::VIA.bits() | Self::PAD.bits() | Self::LINE.bits()
            | Self::ARC.bits() | Self::POLYGON.bits();
    }
}

/// Handle to an object stored in a [`BoardIndex`](crate::BoardIndex).
///
/// Handles are generational: once the object is removed or moved, the old handle is stale
/// and never refers to another object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle {
    pub(crate) kind: ObjectKind,
    pub(crate) layer: Option<usize>,
    pub(crate) key: Key,
}

impl ObjectHandle {
    /// Kind of the referenced object.
    pub const fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Layer of the referenced object, `None` for board-wide kinds.
    pub const fn layer(&self) -> Option<usize> {
        self.layer
    }
}

/// Filters applied by board queries.
///
/// Used by [`BoardIndex::query`](crate::BoardIndex::query),
/// [`BoardIndex::hit_test`](crate::BoardIndex::hit_test) and friends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryFilter {
    /// Kinds to consider.
    pub kinds: KindMask,
    /// If true, skip layered objects on hidden layers.
    pub visible_only: bool,
    /// Skip objects carrying any of these flags.
    pub exclude: ObjectFlags,
    /// Skip objects whose bounding box is smaller than this on both axes.
    ///
    /// Subtrees whose box is smaller are not searched at all.
    pub min_extent: Coord,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            kinds: KindMask::all(),
            visible_only: false,
            exclude: ObjectFlags::empty(),
            min_extent: 0,
        }
    }
}

impl QueryFilter {
    /// Filter that accepts only the given kinds.
    pub fn kinds(kinds: KindMask) -> Self {
        Self {
            kinds,
            ..Self::default()
        }
    }

    pub(crate) fn wants(&self, kind: ObjectKind) -> bool {
        self.kinds.contains(kind.mask())
    }

    pub(crate) fn accepts(&self, object: &Object) -> bool {
        !object.flags.intersects(self.exclude) && self.big_enough(object.bbox())
    }

    pub(crate) fn big_enough(&self, b: &pcb_rtree::Aabb2D<Coord>) -> bool {
        self.min_extent <= 0
            || b.max_x - b.min_x >= self.min_extent
            || b.max_y - b.min_y >= self.min_extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_masks_line_up() {
        let mut all = KindMask::empty();
        for kind in ObjectKind::ALL {
            assert!(!all.contains(kind.mask()), "{kind:?} listed twice");
            all |= kind.mask();
        }
        assert_eq!(all, KindMask::all());
        assert!(!KindMask::COPPER.contains(KindMask::RAT));
        assert_eq!(
            ObjectKind::ALL.iter().filter(|k| k.is_layered()).count(),
            3
        );
    }

    #[test]
    fn min_extent_accepts_either_axis() {
        let filter = QueryFilter {
            min_extent: 10,
            ..QueryFilter::default()
        };
        assert!(filter.big_enough(&pcb_rtree::Aabb2D::new(0, 0, 10, 1)));
        assert!(filter.big_enough(&pcb_rtree::Aabb2D::new(0, 0, 1, 10)));
        assert!(!filter.big_enough(&pcb_rtree::Aabb2D::new(0, 0, 9, 9)));
        assert!(QueryFilter::default().big_enough(&pcb_rtree::Aabb2D::new(0, 0, 1, 1)));
    }
}

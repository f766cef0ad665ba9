// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! PCB board index: spatial lookup of traces, vias, pads, and polygons on a circuit board.
//!
//! Built on [`pcb_rtree`]. Each copper layer keeps one tree per layered kind (lines, arcs,
//! polygons); vias, pads, and rat lines pass through every layer and live in board-wide
//! trees. Object boxes include clearance, so "is this area free" questions are answered by
//! the index directly.
//!
//! - [`BoardIndex::query`]: handles of everything whose box meets a rectangle.
//! - [`BoardIndex::hit_test`]: the topmost object under a point, checked against its exact
//!   shape.
//! - [`BoardIndex::is_clear`]: whether a rectangle touches nothing.
//! - [`BoardIndex::translate`] and [`BoardIndex::remove_in_region`]: edits that keep the
//!   trees in sync.
//!
//! Board coordinates are integers ([`Coord`]); query rectangles are Kurbo [`Rect`]s in the
//! same units and are rounded outward.
//!
//! # Example
//!
//! ```rust
//! use pcb_board_index::{
//!     BoardIndex, BoardPoint, Line, Object, Point, QueryFilter, Rect, Shape, Via,
//! };
//!
//! let mut board = BoardIndex::new(2);
//! let trace = board
//!     .insert(
//!         Object::new(Shape::Line(Line {
//!             p1: BoardPoint::new(0, 0),
//!             p2: BoardPoint::new(1000, 0),
//!             thickness: 10,
//!             clearance: 10,
//!         }))?,
//!         Some(0),
//!     )?;
//! let via = board.insert(
//!     Object::new(Shape::Via(Via {
//!         center: BoardPoint::new(1000, 0),
//!         thickness: 40,
//!         clearance: 10,
//!         mask: 0,
//!         drill: 20,
//!     }))?,
//!     None,
//! )?;
//!
//! // Vias win over traces under the cursor.
//! assert_eq!(board.hit_test(Point::new(1000.0, 0.0), 2.0, QueryFilter::default()), Some(via));
//! assert_eq!(board.hit_test(Point::new(500.0, 3.0), 2.0, QueryFilter::default()), Some(trace));
//!
//! assert!(!board.is_clear(Rect::new(400.0, -5.0, 600.0, 5.0), QueryFilter::default()));
//! assert!(board.is_clear(Rect::new(400.0, 50.0, 600.0, 60.0), QueryFilter::default()));
//! # Ok::<(), pcb_board_index::BoardError>(())
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): Use the Rust standard library.
//! - `libm`: Use floating point implementations from `libm` for `no_std` builds.
//!
//! At least one of `std` and `libm` is required; `std` overrides `libm`.

#![no_std]

extern crate alloc;

mod board;
mod error;
mod objects;
mod types;
mod util;

pub use kurbo::{Point, Rect};
pub use pcb_rtree::{Aabb2D, RTreeConfig};

pub use board::BoardIndex;
pub use error::BoardError;
pub use objects::{Arc, BoardPoint, Coord, Line, Object, Pad, Polygon, Rat, Shape, Via};
pub use types::{KindMask, ObjectFlags, ObjectHandle, ObjectKind, QueryFilter};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn trace(y: Coord, x0: Coord, x1: Coord) -> Object {
        Object::new(Shape::Line(Line {
            p1: BoardPoint::new(x0, y),
            p2: BoardPoint::new(x1, y),
            thickness: 8,
            clearance: 8,
        }))
        .unwrap()
    }

    #[test]
    fn many_traces_match_a_linear_scan() {
        let config = RTreeConfig::new().with_fan_out(4).unwrap();
        let mut board = BoardIndex::with_config(4, config);
        let mut placed: Vec<(ObjectHandle, Aabb2D<Coord>)> = Vec::new();
        for i in 0..400_usize {
            let n = i as Coord;
            let obj = trace((n * 37) % 900, (n * 53) % 700, (n * 53) % 700 + 40 + n % 60);
            let bbox = *obj.bbox();
            placed.push((board.insert(obj, Some(i % 4)).unwrap(), bbox));
        }
        assert_eq!(board.len(), 400);
        for (x, y) in [(0, 0), (300, 450), (650, 880), (123, 77)] {
            let area = Aabb2D::new(x, y, x + 120, y + 90);
            let r = Rect::new(x as f64, y as f64, (x + 120) as f64, (y + 90) as f64);
            let mut got = board.query(r, QueryFilter::default());
            let mut want: Vec<ObjectHandle> = placed
                .iter()
                .filter(|(_, b)| b.intersects(&area))
                .map(|(h, _)| *h)
                .collect();
            got.sort();
            want.sort();
            assert_eq!(got, want, "query at ({x}, {y})");
        }
    }

    #[test]
    fn copper_mask_skips_rat_lines() {
        let mut board = BoardIndex::new(1);
        let rat = Object::new(Shape::Rat(Rat {
            p1: BoardPoint::new(0, 0),
            p2: BoardPoint::new(100, 100),
        }))
        .unwrap();
        let h = board.insert(rat, None).unwrap();
        let everywhere = Rect::new(-10.0, -10.0, 200.0, 200.0);
        assert!(board.is_clear(everywhere, QueryFilter::kinds(KindMask::COPPER)));
        assert_eq!(board.query(everywhere, QueryFilter::default()), [h]);
    }

    #[test]
    fn translate_then_hit_test_finds_the_new_position() {
        let mut board = BoardIndex::new(1);
        let h = board.insert(trace(0, 0, 100), Some(0)).unwrap();
        let moved = board.translate(h, 1000, 1000).unwrap();
        assert_eq!(
            board.hit_test(Point::new(50.0, 0.0), 1.0, QueryFilter::default()),
            None
        );
        assert_eq!(
            board.hit_test(Point::new(1050.0, 1000.0), 1.0, QueryFilter::default()),
            Some(moved)
        );
    }
}

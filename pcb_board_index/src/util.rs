// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between Kurbo geometry and integer board boxes.

use kurbo::Rect;
use pcb_rtree::Aabb2D;

use crate::objects::Coord;

/// Integer box covering `rect`, rounded outward.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Board coordinates are integral; the rect is rounded outward first."
)]
pub(crate) fn rect_to_aabb(rect: Rect) -> Aabb2D<Coord> {
    let r = rect.abs().expand();
    Aabb2D::new(r.x0 as Coord, r.y0 as Coord, r.x1 as Coord, r.y1 as Coord)
}

/// Give a degenerate box a one-unit extent so it can be indexed.
pub(crate) fn close_box(b: Aabb2D<Coord>) -> Aabb2D<Coord> {
    Aabb2D::new(
        b.min_x,
        b.min_y,
        b.max_x.max(b.min_x + 1),
        b.max_y.max(b.min_y + 1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rects_round_outward() {
        assert_eq!(
            rect_to_aabb(Rect::new(0.5, -0.5, 9.2, 3.0)),
            Aabb2D::new(0, -1, 10, 3)
        );
        assert_eq!(
            rect_to_aabb(Rect::new(10.0, 10.0, 0.0, 0.0)),
            Aabb2D::new(0, 0, 10, 10)
        );
    }

    #[test]
    fn degenerate_boxes_are_closed() {
        assert_eq!(close_box(Aabb2D::new(5, 5, 5, 5)), Aabb2D::new(5, 5, 6, 6));
        assert_eq!(close_box(Aabb2D::new(0, 0, 3, 3)), Aabb2D::new(0, 0, 3, 3));
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Board objects and their bounding boxes.
//!
//! A bounding box covers an object's whole area of influence, clearance included, so that
//! clearance checks can be answered from the index alone. Boxes are computed once when an
//! [`Object`] is built.

use alloc::vec::Vec;
use core::f64::consts::PI;

use kurbo::{BezPath, ParamCurveNearest, Point, Shape as _, Vec2};
use pcb_rtree::{Aabb2D, Bounded};

use crate::error::BoardError;
use crate::types::{ObjectFlags, ObjectKind};
use crate::util::{close_box, rect_to_aabb};

/// Integer board coordinate.
pub type Coord = i64;

const NEAREST_ACCURACY: f64 = 1e-3;
const ARC_TOLERANCE: f64 = 0.1;

/// A point on the board.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoardPoint {
    /// X coordinate.
    pub x: Coord,
    /// Y coordinate.
    pub y: Coord,
}

impl BoardPoint {
    /// Create a point.
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// The same point in Kurbo's float space.
    pub fn to_point(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    fn offset(self, dx: Coord, dy: Coord) -> Result<Self, BoardError> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Ok(Self::new(x, y)),
            _ => Err(BoardError::CoordinateOverflow),
        }
    }
}

/// Straight trace segment with round caps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    /// First end point.
    pub p1: BoardPoint,
    /// Second end point.
    pub p2: BoardPoint,
    /// Copper width.
    pub thickness: Coord,
    /// Clearance to surrounding polygons.
    pub clearance: Coord,
}

/// Elliptic arc trace.
///
/// Angles are in degrees. Angle 0 points in the negative x direction and positive angles
/// turn toward positive y.
#[derive(Clone, Debug, PartialEq)]
pub struct Arc {
    /// Center of the ellipse.
    pub center: BoardPoint,
    /// Horizontal radius.
    pub width: Coord,
    /// Vertical radius.
    pub height: Coord,
    /// Start angle in degrees.
    pub start_angle: f64,
    /// Swept angle in degrees.
    pub delta: f64,
    /// Copper width.
    pub thickness: Coord,
    /// Clearance to surrounding polygons.
    pub clearance: Coord,
}

/// Plated through hole connecting layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Via {
    /// Center.
    pub center: BoardPoint,
    /// Copper ring diameter.
    pub thickness: Coord,
    /// Clearance to surrounding polygons.
    pub clearance: Coord,
    /// Solder mask opening diameter.
    pub mask: Coord,
    /// Drill diameter.
    pub drill: Coord,
}

/// Surface mount pad, a thick segment with square or round ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pad {
    /// First end point.
    pub p1: BoardPoint,
    /// Second end point.
    pub p2: BoardPoint,
    /// Pad width.
    pub thickness: Coord,
    /// Clearance to surrounding polygons.
    pub clearance: Coord,
    /// Solder mask opening width.
    pub mask: Coord,
}

/// Filled polygon, closed implicitly between the last and first point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Polygon {
    /// Outline points.
    pub points: Vec<BoardPoint>,
}

/// Unrouted connection between two points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rat {
    /// First end point.
    pub p1: BoardPoint,
    /// Second end point.
    pub p2: BoardPoint,
}

/// Geometry of a board object.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// A trace segment.
    Line(Line),
    /// An arc trace.
    Arc(Arc),
    /// A via.
    Via(Via),
    /// A pad.
    Pad(Pad),
    /// A polygon.
    Polygon(Polygon),
    /// A rat line.
    Rat(Rat),
}

impl Shape {
    /// Which kind of object this shape makes.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Line(_) => ObjectKind::Line,
            Self::Arc(_) => ObjectKind::Arc,
            Self::Via(_) => ObjectKind::Via,
            Self::Pad(_) => ObjectKind::Pad,
            Self::Polygon(_) => ObjectKind::Polygon,
            Self::Rat(_) => ObjectKind::Rat,
        }
    }

    /// Bounding box including clearance, or `None` for a polygon without points.
    pub fn bounding_box(&self) -> Option<Aabb2D<Coord>> {
        let b = match self {
            Self::Line(l) => segment_box(l.p1, l.p2, (l.thickness + l.clearance + 1) / 2),
            Self::Pad(p) => {
                let half = ((p.thickness + p.clearance + 1) / 2).max((p.mask + 1) / 2);
                segment_box(p.p1, p.p2, half)
            }
            Self::Rat(r) => segment_box(r.p1, r.p2, 0),
            Self::Via(v) => {
                let half = ((v.clearance + 1) / 2 + (v.thickness + 1) / 2).max((v.mask + 1) / 2);
                Aabb2D::around(v.center.x, v.center.y, half)
            }
            Self::Arc(a) => {
                let half = ((a.thickness + a.clearance) / 2) as f64;
                rect_to_aabb(a.to_kurbo().bounding_box().inflate(half, half))
            }
            Self::Polygon(p) => {
                let (first, rest) = p.points.split_first()?;
                rest.iter().fold(
                    Aabb2D::new(first.x, first.y, first.x, first.y),
                    |b, pt| {
                        Aabb2D::new(
                            b.min_x.min(pt.x),
                            b.min_y.min(pt.y),
                            b.max_x.max(pt.x),
                            b.max_y.max(pt.y),
                        )
                    },
                )
            }
        };
        Some(close_box(b))
    }

    /// Whether `pt` lies on the copper of this shape, allowing `slop` extra distance.
    ///
    /// Clearance is not part of the copper. Rat lines count as infinitely thin.
    pub fn hit(&self, pt: Point, slop: f64) -> bool {
        match self {
            Self::Line(l) => near_segment(l.p1, l.p2, pt, l.thickness as f64 / 2.0 + slop),
            Self::Pad(p) => near_segment(p.p1, p.p2, pt, p.thickness as f64 / 2.0 + slop),
            Self::Rat(r) => near_segment(r.p1, r.p2, pt, slop),
            Self::Via(v) => {
                let reach = v.thickness as f64 / 2.0 + slop;
                (pt - v.center.to_point()).hypot2() <= reach * reach
            }
            Self::Arc(a) => {
                let reach = a.thickness as f64 / 2.0 + slop;
                a.to_kurbo()
                    .to_path(ARC_TOLERANCE)
                    .segments()
                    .any(|seg| seg.nearest(pt, NEAREST_ACCURACY).distance_sq <= reach * reach)
            }
            Self::Polygon(p) => {
                let outline = p.outline();
                outline.contains(pt)
                    || outline
                        .segments()
                        .any(|seg| seg.nearest(pt, NEAREST_ACCURACY).distance_sq <= slop * slop)
            }
        }
    }

    /// A copy with every point moved by `(dx, dy)`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::CoordinateOverflow`] if a point leaves the coordinate range.
    pub fn translated(&self, dx: Coord, dy: Coord) -> Result<Self, BoardError> {
        let mut shape = self.clone();
        match &mut shape {
            Self::Line(l) => {
                l.p1 = l.p1.offset(dx, dy)?;
                l.p2 = l.p2.offset(dx, dy)?;
            }
            Self::Pad(p) => {
                p.p1 = p.p1.offset(dx, dy)?;
                p.p2 = p.p2.offset(dx, dy)?;
            }
            Self::Rat(r) => {
                r.p1 = r.p1.offset(dx, dy)?;
                r.p2 = r.p2.offset(dx, dy)?;
            }
            Self::Via(v) => v.center = v.center.offset(dx, dy)?,
            Self::Arc(a) => a.center = a.center.offset(dx, dy)?,
            Self::Polygon(p) => {
                for pt in &mut p.points {
                    *pt = pt.offset(dx, dy)?;
                }
            }
        }
        Ok(shape)
    }
}

impl Arc {
    /// The arc as a Kurbo arc.
    ///
    /// The board's angle convention is mirrored in x relative to Kurbo's, so the start angle
    /// becomes `π - start` and the sweep changes sign.
    pub fn to_kurbo(&self) -> kurbo::Arc {
        kurbo::Arc {
            center: self.center.to_point(),
            radii: Vec2::new(self.width as f64, self.height as f64),
            start_angle: PI - self.start_angle.to_radians(),
            sweep_angle: -self.delta.to_radians(),
            x_rotation: 0.0,
        }
    }
}

impl Polygon {
    fn outline(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter().map(|p| p.to_point());
        if let Some(first) = points.next() {
            path.move_to(first);
            for pt in points {
                path.line_to(pt);
            }
            path.close_path();
        }
        path
    }
}

fn segment_box(p1: BoardPoint, p2: BoardPoint, half: Coord) -> Aabb2D<Coord> {
    Aabb2D::new(
        p1.x.min(p2.x) - half,
        p1.y.min(p2.y) - half,
        p1.x.max(p2.x) + half,
        p1.y.max(p2.y) + half,
    )
}

fn near_segment(p1: BoardPoint, p2: BoardPoint, pt: Point, reach: f64) -> bool {
    kurbo::Line::new(p1.to_point(), p2.to_point())
        .nearest(pt, NEAREST_ACCURACY)
        .distance_sq
        <= reach * reach
}

/// A board object: geometry, state flags, and its cached bounding box.
///
/// The geometry is only reachable through methods that keep the box in step with it.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    shape: Shape,
    /// State flags.
    pub flags: ObjectFlags,
    bbox: Aabb2D<Coord>,
}

impl Object {
    /// Build an object and compute its bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::EmptyPolygon`] for a polygon without points.
    pub fn new(shape: Shape) -> Result<Self, BoardError> {
        let bbox = shape.bounding_box().ok_or(BoardError::EmptyPolygon)?;
        Ok(Self {
            shape,
            flags: ObjectFlags::empty(),
            bbox,
        })
    }

    /// Set the state flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ObjectFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the geometry and recompute the bounding box. Flags are kept.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::EmptyPolygon`] for a polygon without points.
    pub fn with_shape(self, shape: Shape) -> Result<Self, BoardError> {
        Ok(Self::new(shape)?.with_flags(self.flags))
    }

    /// Geometry.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Take the geometry out of the object.
    pub fn into_shape(self) -> Shape {
        self.shape
    }

    /// The object's kind.
    pub fn kind(&self) -> ObjectKind {
        self.shape.kind()
    }

    /// Bounding box including clearance.
    pub fn bbox(&self) -> &Aabb2D<Coord> {
        &self.bbox
    }

    /// A copy moved by `(dx, dy)`, box included.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::CoordinateOverflow`] if the shape or its box leaves the
    /// coordinate range.
    pub fn translated(&self, dx: Coord, dy: Coord) -> Result<Self, BoardError> {
        let min = BoardPoint::new(self.bbox.min_x, self.bbox.min_y).offset(dx, dy)?;
        let max = BoardPoint::new(self.bbox.max_x, self.bbox.max_y).offset(dx, dy)?;
        Ok(Self {
            shape: self.shape.translated(dx, dy)?,
            flags: self.flags,
            bbox: Aabb2D::new(min.x, min.y, max.x, max.y),
        })
    }
}

impl Bounded<Coord> for Object {
    fn bounds(&self) -> Aabb2D<Coord> {
        self.bbox
    }
}

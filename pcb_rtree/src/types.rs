// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.
//!
//! Boxes are half-open: a box covers `[min_x, max_x) × [min_y, max_y)`. It includes its
//! lower corner and excludes its upper corner, so two boxes that only share an edge do not
//! intersect.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned, half-open box in 2D.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Aabb2D<T> {
    /// Minimum x (left, inclusive)
    pub min_x: T,
    /// Minimum y (inclusive)
    pub min_y: T,
    /// Maximum x (right, exclusive)
    pub max_x: T,
    /// Maximum y (exclusive)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new box from min/max corners.
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// True if the box has a strictly positive extent on both axes.
    ///
    /// Only well-formed boxes may be stored in an [`RTree`](crate::RTree).
    pub fn is_well_formed(&self) -> bool {
        lt(self.min_x, self.max_x) && lt(self.min_y, self.max_y)
    }

    /// Whether the two boxes overlap under the half-open convention.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        lt(self.min_x, other.max_x)
            && lt(other.min_x, self.max_x)
            && lt(self.min_y, other.max_y)
            && lt(other.min_y, self.max_y)
    }

    /// Whether `other` lies entirely inside this box.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        le(self.min_x, other.min_x)
            && le(other.max_x, self.max_x)
            && le(self.min_y, other.min_y)
            && le(other.max_y, self.max_y)
    }

    /// Whether the box covers the point. The upper edges are excluded.
    pub fn contains_point(&self, x: T, y: T) -> bool {
        le(self.min_x, x) && lt(x, self.max_x) && le(self.min_y, y) && lt(y, self.max_y)
    }

    /// The smallest box covering both boxes.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        union_aabb(*self, *other)
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Box covering `[x - radius, x + radius] × [y - radius, y + radius]`.
    ///
    /// Used for point-with-tolerance queries; `radius` must be positive for the
    /// result to be well formed.
    pub fn around(x: T, y: T, radius: T) -> Self {
        Self {
            min_x: T::sub(x, radius),
            min_y: T::sub(y, radius),
            max_x: T::add(x, radius),
            max_y: T::add(y, radius),
        }
    }

    /// Grow (or with a negative amount, shrink) the box on every side.
    #[must_use]
    pub fn inflate(&self, amount: T) -> Self {
        Self {
            min_x: T::sub(self.min_x, amount),
            min_y: T::sub(self.min_y, amount),
            max_x: T::add(self.max_x, amount),
            max_y: T::add(self.max_y, amount),
        }
    }

    /// Area of the box in the scalar's widened accumulator.
    #[inline]
    pub fn area(&self) -> T::Acc {
        area(self)
    }

    /// Center of the box in `f64`.
    pub fn centroid(&self) -> (f64, f64) {
        (
            0.5 * (self.min_x.to_f64() + self.max_x.to_f64()),
            0.5 * (self.min_y.to_f64() + self.max_y.to_f64()),
        )
    }
}

impl Aabb2D<f32> {
    /// Create a box from origin and size in f32.
    pub const fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

impl Aabb2D<f64> {
    /// Create a box from origin and size in f64.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

impl Aabb2D<i32> {
    /// Create a box from origin and size in i32.
    pub const fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

impl Aabb2D<i64> {
    /// Create a box from origin and size in i64.
    pub const fn from_xywh(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

/// Anything that occupies a box.
///
/// Payloads stored in an [`RTree`](crate::RTree) implement this. The tree reads the bounds once
/// at insert time and caches them, so the value returned must not change while the payload is
/// stored.
pub trait Bounded<T> {
    /// The box this object occupies.
    fn bounds(&self) -> Aabb2D<T>;
}

impl<T: Copy> Bounded<T> for Aabb2D<T> {
    #[inline]
    fn bounds(&self) -> Aabb2D<T> {
        *self
    }
}

/// Numeric scalar abstraction for 2D boxes.
///
/// This trait provides the small set of operations the tree needs for area penalties and
/// centroid clustering, and an associated widened accumulator type for area
/// (e.g., f32→f64, i64→i128).
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Widened accumulator type suitable for area/cost computations.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Sub<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Max of the scalar value and zero.
    fn max_zero(v: Self) -> Self;

    /// Convert a scalar to the accumulator type.
    fn widen(v: Self) -> Self::Acc;

    /// Lossy conversion to `f64` for clustering and diagnostics.
    fn to_f64(self) -> f64;
}

impl Scalar for f32 {
    type Acc = f64;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as f64
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Scalar for f64 {
    type Acc = Self;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

impl Scalar for i32 {
    type Acc = i64;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as i64
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Scalar for i64 {
    type Acc = i128;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as i128
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Compute the area of a box using the scalar's widened accumulator type.
#[inline]
pub fn area<T: Scalar>(a: &Aabb2D<T>) -> T::Acc {
    let w = T::max_zero(T::sub(a.max_x, a.min_x));
    let h = T::max_zero(T::sub(a.max_y, a.min_y));
    T::widen(w) * T::widen(h)
}

/// Area increase needed for `node` to also cover `query`.
#[inline]
pub(crate) fn penalty<T: Scalar>(node: &Aabb2D<T>, query: &Aabb2D<T>) -> T::Acc {
    area(&union_aabb(*node, *query)) - area(node)
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

pub(crate) fn union_aabb<T: PartialOrd + Copy>(a: Aabb2D<T>, b: Aabb2D<T>) -> Aabb2D<T> {
    Aabb2D {
        min_x: min_t(a.min_x, b.min_x),
        min_y: min_t(a.min_y, b.min_y),
        max_x: max_t(a.max_x, b.max_x),
        max_y: max_t(a.max_y, b.max_y),
    }
}

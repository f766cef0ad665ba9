// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Board index errors.

use crate::types::ObjectKind;

/// Errors returned by [`BoardIndex`](crate::BoardIndex) and [`Object::new`](crate::Object::new).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The layer number is not below the board's layer count.
    #[error("layer {layer} does not exist, the board has {count} layers")]
    LayerOutOfRange {
        /// Requested layer.
        layer: usize,
        /// Number of layers on the board.
        count: usize,
    },
    /// A layered kind was inserted without a layer.
    #[error("{kind:?} objects need a layer")]
    MissingLayer {
        /// Kind of the rejected object.
        kind: ObjectKind,
    },
    /// A board-wide kind was inserted with a layer.
    #[error("{kind:?} objects are board-wide and take no layer")]
    UnexpectedLayer {
        /// Kind of the rejected object.
        kind: ObjectKind,
    },
    /// A polygon without points has no bounding box.
    #[error("polygon has no points")]
    EmptyPolygon,
    /// Moving an object would take a coordinate out of range.
    #[error("coordinate out of range")]
    CoordinateOverflow,
    /// The handle does not refer to a stored object.
    #[error("object handle is stale")]
    StaleHandle,
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree tuning parameters.

use crate::error::ConfigError;

/// Default maximum number of children or entries per node.
///
/// Values between 4 and 7 work well for board-sized data sets.
pub const DEFAULT_FAN_OUT: usize = 6;

/// Smallest accepted fan-out. A split must leave both halves non-empty.
pub const MIN_FAN_OUT: usize = 2;

/// Largest accepted fan-out.
pub const MAX_FAN_OUT: usize = 32;

/// Configuration for an [`RTree`](crate::RTree).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RTreeConfig {
    fan_out: usize,
}

impl Default for RTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RTreeConfig {
    /// Configuration with [`DEFAULT_FAN_OUT`].
    pub const fn new() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
        }
    }

    /// Use a different fan-out.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FanOutOutOfRange`] unless
    /// `MIN_FAN_OUT <= fan_out <= MAX_FAN_OUT`.
    pub const fn with_fan_out(self, fan_out: usize) -> Result<Self, ConfigError> {
        if fan_out < MIN_FAN_OUT || fan_out > MAX_FAN_OUT {
            return Err(ConfigError::FanOutOutOfRange {
                requested: fan_out,
                min: MIN_FAN_OUT,
                max: MAX_FAN_OUT,
            });
        }
        Ok(Self { fan_out })
    }

    /// Maximum number of children or entries per node.
    pub const fn fan_out(&self) -> usize {
        self.fan_out
    }
}

//! Rectangle sizes.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Width and height of a rectangle. Both dimensions are non-negative by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RectangleSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RectangleSize {
    /// The zero size.
    pub const EMPTY: Self = Self {
        width: 0,
        height: 0,
    };

    /// Create a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A size with either dimension zero covers no pixels.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    #[inline]
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether this size fits inside `other` in both dimensions.
    #[inline]
    pub const fn fits_within(self, other: Self) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Scale uniformly, rounding up.
    #[must_use]
    pub fn scale(self, ratio: f64) -> Self {
        Self {
            width: scale_dimension(self.width, ratio),
            height: scale_dimension(self.height, ratio),
        }
    }
}

/// Scale one dimension, rounding up and clamping at zero.
pub(crate) fn scale_dimension(value: u32, ratio: f64) -> u32 {
    (f64::from(value) * ratio).ceil().max(0.0) as u32
}

impl From<(u32, u32)> for RectangleSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for RectangleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

//! Points.

use core::fmt;
use core::ops::{Add, Neg, Sub};
use serde::{Deserialize, Serialize};

/// An integer point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    /// Horizontal coordinate in pixels.
    pub x: i32,
    /// Vertical coordinate in pixels.
    pub y: i32,
}

impl Location {
    /// The origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new location.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return this location moved by the given deltas.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Return this location moved by another location treated as a vector.
    #[inline]
    #[must_use]
    pub const fn offset_by(self, delta: Self) -> Self {
        self.offset(delta.x, delta.y)
    }

    /// The point mirrored through the origin.
    #[inline]
    #[must_use]
    pub const fn negated(self) -> Self {
        Self {
            x: self.x.saturating_neg(),
            y: self.y.saturating_neg(),
        }
    }

    /// Vector sum, or `None` if a coordinate overflows.
    #[inline]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match (self.x.checked_add(rhs.x), self.y.checked_add(rhs.y)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// Vector difference, or `None` if a coordinate overflows.
    #[inline]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match (self.x.checked_sub(rhs.x), self.y.checked_sub(rhs.y)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// Scale both coordinates, rounding up.
    #[must_use]
    pub fn scale(self, ratio: f64) -> Self {
        Self {
            x: (f64::from(self.x) * ratio).ceil() as i32,
            y: (f64::from(self.y) * ratio).ceil() as i32,
        }
    }
}

impl Add for Location {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.offset_by(rhs)
    }
}

impl Sub for Location {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.offset_by(rhs.negated())
    }
}

impl Neg for Location {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Offsetting composes with negation back to the original point.
    ///
    /// # Panics
    /// Panics if the arithmetic does not round-trip.
    #[test]
    fn offset_and_negate() {
        let point = Location::new(10, -4);
        let moved = point.offset(5, 7);
        assert_eq!(moved, Location::new(15, 3));
        assert_eq!(moved - Location::new(5, 7), point);
        assert_eq!(-point, Location::new(-10, 4));
        assert_eq!(point + Location::ZERO, point);
    }

    /// Checked arithmetic reports overflow instead of saturating.
    ///
    /// # Panics
    /// Panics if an overflow goes unnoticed.
    #[test]
    fn checked_arithmetic() {
        let point = Location::new(10, -4);
        assert_eq!(point.checked_add(Location::new(1, 1)), Some(Location::new(11, -3)));
        assert_eq!(point.checked_sub(Location::new(1, 1)), Some(Location::new(9, -5)));
        assert_eq!(Location::new(i32::MAX, 0).checked_add(Location::new(1, 0)), None);
        assert_eq!(Location::new(0, i32::MIN).checked_sub(Location::new(0, 1)), None);
    }

    /// Scaling rounds towards positive infinity.
    ///
    /// # Panics
    /// Panics if scaled coordinates are not rounded up.
    #[test]
    fn scale_rounds_up() {
        assert_eq!(Location::new(3, 5).scale(0.5), Location::new(2, 3));
        assert_eq!(Location::new(-3, 4).scale(0.5), Location::new(-1, 2));
    }
}

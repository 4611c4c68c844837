//! Coordinate-tagged rectangles.

use crate::coordinates::CoordinatesType;
use crate::error::GeometryError;
use crate::location::Location;
use crate::size::{RectangleSize, scale_dimension};
use crate::subregion::{Subregions, TileMode};
use core::fmt;
use serde::{Deserialize, Serialize};

/// A rectangle tagged with the coordinate space it is expressed in.
///
/// Regions are values: every operation returns a new region and never mutates the
/// receiver, so the same region can be shared between several region lists. A
/// region with a zero dimension is empty; intersecting with an empty region yields
/// the canonical empty region `(0, 0, 0x0)` in the receiver's space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    left: i32,
    top: i32,
    width: u32,
    height: u32,
    coordinates: CoordinatesType,
}

impl Region {
    /// Create a region expressed in device-as-captured pixels.
    #[inline]
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self::with_coordinates(left, top, width, height, CoordinatesType::DeviceAsCaptured)
    }

    /// Create a region in the given coordinate space.
    #[inline]
    pub const fn with_coordinates(
        left: i32,
        top: i32,
        width: u32,
        height: u32,
        coordinates: CoordinatesType,
    ) -> Self {
        Self {
            left,
            top,
            width,
            height,
            coordinates,
        }
    }

    /// Create a region from signed dimensions, rejecting negative sizes.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidArgument`] if `width` or `height` is negative.
    pub fn try_new(
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        coordinates: CoordinatesType,
    ) -> Result<Self, GeometryError> {
        let width = u32::try_from(width).map_err(|_| {
            GeometryError::InvalidArgument(format!("region width must not be negative ({width})"))
        })?;
        let height = u32::try_from(height).map_err(|_| {
            GeometryError::InvalidArgument(format!(
                "region height must not be negative ({height})"
            ))
        })?;
        Ok(Self::with_coordinates(left, top, width, height, coordinates))
    }

    /// Create a region from a location and a size.
    #[inline]
    pub const fn from_parts(
        location: Location,
        size: RectangleSize,
        coordinates: CoordinatesType,
    ) -> Self {
        Self::with_coordinates(location.x, location.y, size.width, size.height, coordinates)
    }

    /// The canonical empty region in the given space.
    #[inline]
    pub const fn empty(coordinates: CoordinatesType) -> Self {
        Self::with_coordinates(0, 0, 0, 0, coordinates)
    }

    /// Left edge.
    #[inline]
    pub const fn left(&self) -> i32 {
        self.left
    }

    /// Top edge.
    #[inline]
    pub const fn top(&self) -> i32 {
        self.top
    }

    /// Width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.left
            .saturating_add(i32::try_from(self.width).unwrap_or(i32::MAX))
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.top
            .saturating_add(i32::try_from(self.height).unwrap_or(i32::MAX))
    }

    /// Top-left corner.
    #[inline]
    pub const fn location(&self) -> Location {
        Location::new(self.left, self.top)
    }

    /// Width and height.
    #[inline]
    pub const fn size(&self) -> RectangleSize {
        RectangleSize::new(self.width, self.height)
    }

    /// The coordinate space this region is expressed in.
    #[inline]
    pub const fn coordinates(&self) -> CoordinatesType {
        self.coordinates
    }

    /// The same rectangle re-tagged with another coordinate space.
    #[inline]
    #[must_use]
    pub const fn retagged(self, coordinates: CoordinatesType) -> Self {
        Self {
            coordinates,
            ..self
        }
    }

    /// The same size placed at another location.
    #[inline]
    #[must_use]
    pub const fn moved_to(self, location: Location) -> Self {
        Self {
            left: location.x,
            top: location.y,
            ..self
        }
    }

    /// Whether the region covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `point` lies inside the region (right and bottom edges excluded).
    pub fn contains(&self, point: Location) -> bool {
        !self.is_empty()
            && point.x >= self.left
            && point.y >= self.top
            && point.x < self.right()
            && point.y < self.bottom()
    }

    /// Whether `other` lies completely inside this region.
    pub fn contains_region(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the two regions share at least one pixel.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersected(other).is_empty()
    }

    /// The overlap of two regions, or the canonical empty region if they are disjoint.
    ///
    /// The result keeps the receiver's coordinate space. Both regions must be in the
    /// same space; the operation is only commutative under that condition. Empty
    /// regions are exempt since they carry no position.
    #[must_use]
    pub fn intersected(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::empty(self.coordinates);
        }
        debug_assert_eq!(
            self.coordinates, other.coordinates,
            "intersecting regions from different coordinate spaces"
        );
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Self::empty(self.coordinates);
        }
        Self::with_coordinates(
            left,
            top,
            u32::try_from(i64::from(right) - i64::from(left)).unwrap_or(0),
            u32::try_from(i64::from(bottom) - i64::from(top)).unwrap_or(0),
            self.coordinates,
        )
    }

    /// The region moved by the given deltas. Empty regions stay canonical.
    #[must_use]
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        if self.is_empty() {
            return Self::empty(self.coordinates);
        }
        self.moved_to(self.location().offset(dx, dy))
    }

    /// The region with location and size scaled by `ratio`, each rounded up.
    #[must_use]
    pub fn scale(&self, ratio: f64) -> Self {
        if self.is_empty() {
            return Self::empty(self.coordinates);
        }
        let location = self.location().scale(ratio);
        Self::with_coordinates(
            location.x,
            location.y,
            scale_dimension(self.width, ratio),
            scale_dimension(self.height, ratio),
            self.coordinates,
        )
    }

    /// Divide the region into tiles of `tile` size, row by row.
    ///
    /// In [`TileMode::Fixed`] every tile has exactly the requested size and the last
    /// row and column are pulled back to end on the region's edge. In
    /// [`TileMode::Varying`] the last row and column are clipped instead.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidArgument`] if the tile has a zero dimension, or
    /// in fixed mode if the tile is larger than the region in either dimension.
    pub fn subdivide(&self, tile: RectangleSize, mode: TileMode) -> Result<Subregions, GeometryError> {
        Subregions::new(*self, tile, mode)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{} [{}]",
            self.left, self.top, self.width, self.height, self.coordinates
        )
    }
}

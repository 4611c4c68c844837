//! Lazy tiling of a region.

use crate::error::GeometryError;
use crate::region::Region;
use crate::size::RectangleSize;
use core::iter::FusedIterator;

/// How the last row and column of a subdivision are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMode {
    /// Every tile has exactly the requested size; trailing tiles are pulled back
    /// so they end on the region edge.
    Fixed,
    /// Trailing tiles are clipped to the remaining extent.
    Varying,
}

/// Iterator over the tiles covering a region, row by row, left to right.
///
/// Created by [`Region::subdivide`]. It is finite and cannot be restarted.
#[derive(Debug)]
pub struct Subregions {
    bounds: Region,
    tile: RectangleSize,
    mode: TileMode,
    next_left: i64,
    next_top: i64,
    finished: bool,
}

impl Subregions {
    pub(crate) fn new(
        bounds: Region,
        tile: RectangleSize,
        mode: TileMode,
    ) -> Result<Self, GeometryError> {
        if tile.is_empty() {
            return Err(GeometryError::InvalidArgument(format!(
                "tile size must be positive in both dimensions (got {tile})"
            )));
        }
        if mode == TileMode::Fixed && !tile.fits_within(bounds.size()) {
            return Err(GeometryError::InvalidArgument(format!(
                "fixed tile {tile} is larger than the region {}",
                bounds.size()
            )));
        }
        Ok(Self {
            bounds,
            tile,
            mode,
            next_left: i64::from(bounds.left()),
            next_top: i64::from(bounds.top()),
            finished: bounds.is_empty(),
        })
    }

    /// Number of tiles along each axis: `ceil(extent / tile)`.
    fn grid(&self) -> (u64, u64) {
        (
            u64::from(self.bounds.width()).div_ceil(u64::from(self.tile.width)),
            u64::from(self.bounds.height()).div_ceil(u64::from(self.tile.height)),
        )
    }

    fn advance(&mut self) {
        let right = i64::from(self.bounds.left()) + i64::from(self.bounds.width());
        let bottom = i64::from(self.bounds.top()) + i64::from(self.bounds.height());
        self.next_left += i64::from(self.tile.width);
        if self.next_left >= right {
            self.next_left = i64::from(self.bounds.left());
            self.next_top += i64::from(self.tile.height);
            if self.next_top >= bottom {
                self.finished = true;
            }
        }
    }
}

impl Iterator for Subregions {
    type Item = Region;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let right = i64::from(self.bounds.left()) + i64::from(self.bounds.width());
        let bottom = i64::from(self.bounds.top()) + i64::from(self.bounds.height());
        let tile_width = i64::from(self.tile.width);
        let tile_height = i64::from(self.tile.height);

        let (left, top, width, height) = match self.mode {
            TileMode::Fixed => (
                self.next_left.min(right - tile_width),
                self.next_top.min(bottom - tile_height),
                tile_width,
                tile_height,
            ),
            TileMode::Varying => (
                self.next_left,
                self.next_top,
                tile_width.min(right - self.next_left),
                tile_height.min(bottom - self.next_top),
            ),
        };
        self.advance();

        Some(Region::with_coordinates(
            i32::try_from(left).unwrap_or(i32::MAX),
            i32::try_from(top).unwrap_or(i32::MAX),
            u32::try_from(width).unwrap_or(0),
            u32::try_from(height).unwrap_or(0),
            self.bounds.coordinates(),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let (columns, rows) = self.grid();
        let top = i64::from(self.bounds.top());
        let left = i64::from(self.bounds.left());
        let rows_done = u64::try_from((self.next_top - top) / i64::from(self.tile.height))
            .unwrap_or(0);
        let columns_done =
            u64::try_from((self.next_left - left) / i64::from(self.tile.width)).unwrap_or(0);
        let remaining = (rows - rows_done) * columns - columns_done;
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Subregions {}

impl FusedIterator for Subregions {}

//! Browser-specific corrections of where a region lands in a scaled capture.

use core::fmt;
use geometry::Region;

/// Shifts a region computed in screenshot space to where the pixels really are.
pub trait RegionPositionCompensation: fmt::Debug {
    /// Correct `region` for a capture taken at `pixel_ratio` and `frame_depth`.
    fn compensate(&self, region: Region, pixel_ratio: f64, frame_depth: usize) -> Region;
}

fn is_unit(pixel_ratio: f64) -> bool {
    (pixel_ratio - 1.0).abs() < f64::EPSILON
}

/// No correction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRegionCompensation;

impl RegionPositionCompensation for NullRegionCompensation {
    fn compensate(&self, region: Region, _pixel_ratio: f64, _frame_depth: usize) -> Region {
        region
    }
}

/// Firefox renders the outermost document half a device pixel row low on scaled displays.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirefoxRegionCompensation;

impl RegionPositionCompensation for FirefoxRegionCompensation {
    fn compensate(&self, region: Region, pixel_ratio: f64, frame_depth: usize) -> Region {
        if is_unit(pixel_ratio) || frame_depth > 0 || region.is_empty() {
            return region;
        }
        region.offset(0, -((pixel_ratio / 2.0).ceil() as i32))
    }
}

/// Safari captures start one device pixel row early on scaled displays.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafariRegionCompensation;

impl RegionPositionCompensation for SafariRegionCompensation {
    fn compensate(&self, region: Region, pixel_ratio: f64, _frame_depth: usize) -> Region {
        if is_unit(pixel_ratio) || region.is_empty() {
            return region;
        }
        region.offset(0, pixel_ratio.ceil() as i32)
    }
}

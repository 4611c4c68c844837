//! Integer geometry for captured surfaces.
//!
//! Points, sizes and coordinate-tagged rectangles shared by every consumer of a
//! capture: cropping, ignore and floating regions, sub-screenshot extraction and
//! the stitching loop.

pub mod coordinates;
pub mod error;
pub mod location;
pub mod region;
pub mod size;
pub mod subregion;

pub use coordinates::CoordinatesType;
pub use error::GeometryError;
pub use location::Location;
pub use region::Region;
pub use size::RectangleSize;
pub use subregion::{Subregions, TileMode};

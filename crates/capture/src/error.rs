//! Capture errors.

use core::error::Error;
use core::fmt;
use geometry::{CoordinatesType, GeometryError, Region};

/// Result alias used throughout the capture crate.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors raised while capturing, converting or stitching.
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// Malformed geometry or a missing required parameter.
    InvalidArgument(String),
    /// A point, region or sub-screenshot fell outside the captured frame window.
    OutOfBounds(String),
    /// A point cannot be expressed in the requested coordinate space.
    CoordinateConversion {
        /// Source space.
        from: CoordinatesType,
        /// Requested target space.
        to: CoordinatesType,
    },
    /// The rendering surface could not report a position or its entire size.
    PositionQueryFailed(String),
    /// The rendering surface refused to move to a new position.
    PositionUpdateFailed(String),
    /// The first capture of a stitching run failed.
    ImageCapture(String),
    /// A capture in the middle of a stitching run failed.
    TileCaptureFailed {
        /// Tile that was being captured.
        tile: Region,
        /// Underlying failure.
        reason: String,
    },
    /// A frame was popped from an empty frame chain.
    EmptyFrameChain,
}

impl CaptureError {
    /// Whether the caller may degrade gracefully instead of aborting the capture.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::OutOfBounds(_) | Self::PositionQueryFailed(_))
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::OutOfBounds(msg) => write!(f, "Out of bounds: {msg}"),
            Self::CoordinateConversion { from, to } => {
                write!(f, "Cannot convert coordinates from {from} to {to}: out of range")
            }
            Self::PositionQueryFailed(msg) => write!(f, "Position query failed: {msg}"),
            Self::PositionUpdateFailed(msg) => write!(f, "Position update failed: {msg}"),
            Self::ImageCapture(msg) => write!(f, "Image capture failed: {msg}"),
            Self::TileCaptureFailed { tile, reason } => {
                write!(f, "Capture of tile {tile} failed: {reason}")
            }
            Self::EmptyFrameChain => f.write_str("Cannot pop a frame from an empty frame chain"),
        }
    }
}

impl Error for CaptureError {}

impl From<GeometryError> for CaptureError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::InvalidArgument(msg) => Self::InvalidArgument(msg),
        }
    }
}

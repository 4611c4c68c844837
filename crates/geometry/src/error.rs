//! Errors raised while building or dividing geometry.

use core::error::Error;
use core::fmt;

/// Geometry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Malformed geometry such as a negative size or a zero tile.
    InvalidArgument(String),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
        }
    }
}

impl Error for GeometryError {}

//! Coordinate space tags.

use core::fmt;
use serde::{Deserialize, Serialize};

/// The coordinate space a [`crate::Region`] or point is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinatesType {
    /// Pixels exactly as the raw capture returned them.
    DeviceAsCaptured,
    /// Pixels relative to the visible origin of the current context.
    ContextAsIs,
    /// Pixels relative to the current context, accounting for its own scroll.
    ContextRelative,
    /// Device pixels relative to the outermost capture the screenshot was cut from.
    DeviceRelativeToOutermost,
}

impl CoordinatesType {
    /// Stable name used in logs and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeviceAsCaptured => "device-as-captured",
            Self::ContextAsIs => "context-as-is",
            Self::ContextRelative => "context-relative",
            Self::DeviceRelativeToOutermost => "device-relative-to-outermost",
        }
    }

    /// Whether the space is anchored to the active context rather than the image.
    pub const fn is_context_based(self) -> bool {
        matches!(self, Self::ContextAsIs | Self::ContextRelative)
    }
}

impl fmt::Display for CoordinatesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

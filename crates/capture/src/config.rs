//! Runtime configuration for full-page capture.
//!
//! Settings can be built explicitly or read from environment variables, in which
//! case anything missing or unparsable falls back to its default.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default settle delay between moving the surface and capturing it.
pub const DEFAULT_WAIT_BEFORE_SCREENSHOTS_MS: u64 = 100;

/// Default number of pixels each tile overlaps the previous one.
pub const DEFAULT_STITCHING_OVERLAP: u32 = 50;

/// How the surface is moved between tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StitchMode {
    /// Native scrolling of the viewport or element.
    #[default]
    Scroll,
    /// Translating the content layer with a CSS transform, keeping fixed and
    /// sticky elements in place.
    Css,
}

impl FromStr for StitchMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scroll" => Ok(Self::Scroll),
            "css" => Ok(Self::Css),
            other => Err(format!("unknown stitch mode '{other}'")),
        }
    }
}

impl fmt::Display for StitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scroll => "scroll",
            Self::Css => "css",
        })
    }
}

/// Settings for the stitching loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StitchConfig {
    /// Settle delay before every capture.
    pub wait_before_screenshots: Duration,
    /// Pixels each tile overlaps the previous one, hiding repeated footers and scrollbars.
    pub stitching_overlap: u32,
    /// How the surface is moved between tiles.
    pub stitch_mode: StitchMode,
    /// Directory receiving intermediate captures, if any.
    pub debug_screenshots_dir: Option<PathBuf>,
}

impl StitchConfig {
    /// Construct a `StitchConfig` with explicit values.
    #[inline]
    #[must_use]
    pub const fn new(
        wait_before_screenshots: Duration,
        stitching_overlap: u32,
        stitch_mode: StitchMode,
        debug_screenshots_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            wait_before_screenshots,
            stitching_overlap,
            stitch_mode,
            debug_screenshots_dir,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `VIEWSHOT_WAIT_BEFORE_SCREENSHOTS_MS`: settle delay in milliseconds (default: 100)
    /// - `VIEWSHOT_STITCH_OVERLAP`: overlap in pixels (default: 50)
    /// - `VIEWSHOT_STITCH_MODE`: `scroll` or `css` (default: `scroll`)
    /// - `VIEWSHOT_DEBUG_DIR`: directory for intermediate captures (default: unset)
    #[must_use]
    pub fn from_env() -> Self {
        let wait_ms = env::var("VIEWSHOT_WAIT_BEFORE_SCREENSHOTS_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_WAIT_BEFORE_SCREENSHOTS_MS);
        let stitching_overlap = env::var("VIEWSHOT_STITCH_OVERLAP")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(DEFAULT_STITCHING_OVERLAP);
        let stitch_mode = env::var("VIEWSHOT_STITCH_MODE")
            .ok()
            .and_then(|val| val.parse::<StitchMode>().ok())
            .unwrap_or_default();
        let debug_screenshots_dir = env::var_os("VIEWSHOT_DEBUG_DIR")
            .filter(|val| !val.is_empty())
            .map(PathBuf::from);
        Self::new(
            Duration::from_millis(wait_ms),
            stitching_overlap,
            stitch_mode,
            debug_screenshots_dir,
        )
    }

    /// Same settings with another settle delay.
    #[must_use]
    pub fn with_wait(mut self, wait_before_screenshots: Duration) -> Self {
        self.wait_before_screenshots = wait_before_screenshots;
        self
    }

    /// Same settings with another overlap.
    #[must_use]
    pub fn with_overlap(mut self, stitching_overlap: u32) -> Self {
        self.stitching_overlap = stitching_overlap;
        self
    }
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_WAIT_BEFORE_SCREENSHOTS_MS),
            DEFAULT_STITCHING_OVERLAP,
            StitchMode::Scroll,
            None,
        )
    }
}

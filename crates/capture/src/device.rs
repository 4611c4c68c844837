//! Known device chrome, keyed by screen and viewport geometry.
//!
//! Some mobile browsers capture the whole screen, status bar and toolbars included.
//! For devices we know, the table gives the part of a full-screen capture that is
//! actually page content.

use geometry::{RectangleSize, Region};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Structural identity of a device for crop lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceSignature {
    /// Screen width in device pixels.
    pub width: u32,
    /// Screen height in device pixels.
    pub height: u32,
    /// Viewport width in layout pixels.
    pub viewport_width: u32,
    /// Viewport height in layout pixels.
    pub viewport_height: u32,
    /// Major operating system version.
    pub os_major: u32,
}

impl DeviceSignature {
    pub const fn new(screen: RectangleSize, viewport: RectangleSize, os_major: u32) -> Self {
        Self {
            width: screen.width,
            height: screen.height,
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            os_major,
        }
    }
}

const fn entry(
    screen: (u32, u32),
    viewport: (u32, u32),
    os_major: u32,
    content: Region,
) -> (DeviceSignature, Region) {
    (
        DeviceSignature {
            width: screen.0,
            height: screen.1,
            viewport_width: viewport.0,
            viewport_height: viewport.1,
            os_major,
        },
        content,
    )
}

/// Content regions of full-screen captures on known iOS devices.
const KNOWN_DEVICES: [(DeviceSignature, Region); 6] = [
    // iPhone 6/7/8
    entry((750, 1334), (375, 553), 11, Region::new(0, 128, 750, 1106)),
    // iPhone 6/7/8 Plus
    entry((1242, 2208), (414, 622), 11, Region::new(0, 192, 1242, 1866)),
    // iPhone X
    entry((1125, 2436), (375, 635), 11, Region::new(0, 264, 1125, 1905)),
    entry((1125, 2436), (375, 635), 12, Region::new(0, 264, 1125, 1905)),
    // iPad
    entry((1536, 2048), (768, 954), 11, Region::new(0, 140, 1536, 1908)),
    // iPhone 6/7/8 landscape
    entry((1334, 750), (667, 331), 11, Region::new(0, 88, 1334, 662)),
];

static CROP_REGIONS: LazyLock<HashMap<DeviceSignature, Region>> =
    LazyLock::new(|| KNOWN_DEVICES.into_iter().collect());

/// Content region of a full-screen capture on `signature`, if the device is known.
pub fn crop_region_for(signature: &DeviceSignature) -> Option<Region> {
    CROP_REGIONS.get(signature).copied()
}

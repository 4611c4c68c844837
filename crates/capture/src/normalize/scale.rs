//! Scale providers: map raw device pixels onto layout pixels.

use core::fmt;
use geometry::RectangleSize;
use log::debug;

/// Width tolerance, in pixels, for treating a capture as viewport-sized.
const ALLOWED_VIEWPORT_DEVIATION: u32 = 1;
/// Width tolerance, in pixels, for treating a capture as document-sized.
const ALLOWED_DOCUMENT_DEVIATION: u32 = 10;

/// Reports the ratio that brings a raw capture to layout pixels.
pub trait ScaleProvider: fmt::Debug {
    /// Ratio computed by the last [`Self::update_scale_ratio`].
    fn scale_ratio(&self) -> f64;

    /// Recompute the ratio for a raw capture `image_width` pixels wide.
    fn update_scale_ratio(&mut self, image_width: u32);

    /// Whether this provider always reports 1.0.
    fn is_null(&self) -> bool {
        false
    }
}

/// Never scales.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullScaleProvider;

impl ScaleProvider for NullScaleProvider {
    fn scale_ratio(&self) -> f64 {
        1.0
    }

    fn update_scale_ratio(&mut self, _image_width: u32) {}

    fn is_null(&self) -> bool {
        true
    }
}

/// Scales every capture by the same ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedScaleProvider {
    ratio: f64,
}

impl FixedScaleProvider {
    pub const fn new(ratio: f64) -> Self {
        Self { ratio }
    }
}

impl ScaleProvider for FixedScaleProvider {
    fn scale_ratio(&self) -> f64 {
        self.ratio
    }

    fn update_scale_ratio(&mut self, _image_width: u32) {}
}

/// Derives the ratio from what the capture's width matches.
///
/// A capture as wide as the viewport or as the whole document is already in layout
/// pixels. Anything else is assumed to be in device pixels and divided by the device
/// pixel ratio; on mobile devices, which often report a rounded pixel ratio, a second
/// step fits the result to the viewport width exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextBasedScaleProvider {
    entire_size: RectangleSize,
    viewport_size: RectangleSize,
    device_pixel_ratio: f64,
    is_mobile: bool,
    scale_ratio: Option<f64>,
}

impl ContextBasedScaleProvider {
    pub const fn new(
        entire_size: RectangleSize,
        viewport_size: RectangleSize,
        device_pixel_ratio: f64,
        is_mobile: bool,
    ) -> Self {
        Self {
            entire_size,
            viewport_size,
            device_pixel_ratio,
            is_mobile,
            scale_ratio: None,
        }
    }
}

const fn within(value: u32, target: u32, deviation: u32) -> bool {
    value >= target.saturating_sub(deviation) && value <= target.saturating_add(deviation)
}

impl ScaleProvider for ContextBasedScaleProvider {
    /// Before the first update this is the plain device pixel inverse.
    fn scale_ratio(&self) -> f64 {
        self.scale_ratio.unwrap_or_else(|| {
            if self.device_pixel_ratio > 0.0 {
                1.0 / self.device_pixel_ratio
            } else {
                1.0
            }
        })
    }

    fn update_scale_ratio(&mut self, image_width: u32) {
        let viewport_width = self.viewport_size.width;
        let document_width = self.entire_size.width;

        let ratio = if within(image_width, viewport_width, ALLOWED_VIEWPORT_DEVIATION)
            || within(image_width, document_width, ALLOWED_DOCUMENT_DEVIATION)
            || self.device_pixel_ratio <= 0.0
        {
            1.0
        } else {
            let mut ratio = 1.0 / self.device_pixel_ratio;
            if self.is_mobile && image_width > 0 {
                let scaled_width = (f64::from(image_width) * ratio).round() as u32;
                if !within(scaled_width, viewport_width, ALLOWED_VIEWPORT_DEVIATION) {
                    ratio = f64::from(viewport_width) / f64::from(image_width);
                }
            }
            ratio
        };
        debug!("Scale ratio for a {image_width}px wide capture: {ratio}");
        self.scale_ratio = Some(ratio);
    }
}

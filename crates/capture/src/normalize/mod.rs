//! Capture normalization: turn a raw device capture into layout pixels.
//!
//! Cropping and scaling happen in whichever order keeps the most pixels: cut first
//! when shrinking, scale first (with the cut margins scaled along) when enlarging.

mod compensation;
mod cut;
mod scale;

pub use compensation::{
    FirefoxRegionCompensation, NullRegionCompensation, RegionPositionCompensation,
    SafariRegionCompensation,
};
pub use cut::{
    CutProvider, FixedCutProvider, Margins, NullCutProvider, ProportionalCutProvider,
    UnscaledFixedCutProvider,
};
pub use scale::{ContextBasedScaleProvider, FixedScaleProvider, NullScaleProvider, ScaleProvider};

use geometry::RectangleSize;
use image::{RgbaImage, imageops};
use log::trace;

/// Resize `image` by `ratio`, rounding the new dimensions up.
pub fn scale_image(image: &RgbaImage, ratio: f64) -> RgbaImage {
    let target = RectangleSize::new(image.width(), image.height()).scale(ratio);
    if target.is_empty() || (target.width == image.width() && target.height == image.height()) {
        return image.clone();
    }
    trace!("Scaling {}x{} to {target}", image.width(), image.height());
    imageops::resize(image, target.width, target.height, imageops::FilterType::CatmullRom)
}

/// Applies a cut provider and a scale provider to every raw capture.
#[derive(Debug)]
pub struct CaptureNormalizer {
    cut: Box<dyn CutProvider>,
    scale: Box<dyn ScaleProvider>,
}

impl Default for CaptureNormalizer {
    fn default() -> Self {
        Self::new(Box::new(NullCutProvider), Box::new(NullScaleProvider))
    }
}

impl CaptureNormalizer {
    pub fn new(cut: Box<dyn CutProvider>, scale: Box<dyn ScaleProvider>) -> Self {
        Self { cut, scale }
    }

    pub fn set_cut_provider(&mut self, cut: Box<dyn CutProvider>) {
        self.cut = cut;
    }

    pub fn set_scale_provider(&mut self, scale: Box<dyn ScaleProvider>) {
        self.scale = scale;
    }

    /// Whether normalization can never change a capture.
    pub fn is_null(&self) -> bool {
        self.cut.is_null() && self.scale.is_null()
    }

    /// Ratio applied to the last capture.
    pub fn scale_ratio(&self) -> f64 {
        self.scale.scale_ratio()
    }

    /// Device pixels per layout pixel for the last capture.
    pub fn pixel_ratio(&self) -> f64 {
        let ratio = self.scale_ratio();
        if ratio > 0.0 { 1.0 / ratio } else { 1.0 }
    }

    /// Cut and scale a raw capture.
    pub fn normalize(&mut self, image: RgbaImage) -> RgbaImage {
        if self.is_null() {
            return image;
        }
        self.scale.update_scale_ratio(image.width());
        let ratio = self.scale.scale_ratio();
        if (ratio - 1.0).abs() < f64::EPSILON {
            return self.cut.cut(image);
        }
        if ratio < 1.0 {
            scale_image(&self.cut.cut(image), ratio)
        } else {
            self.cut.scale(ratio).cut(scale_image(&image, ratio))
        }
    }
}

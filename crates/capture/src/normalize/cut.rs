//! Cut providers: remove device chrome from raw captures.

use core::fmt;
use geometry::{RectangleSize, Region};
use image::{RgbaImage, imageops};
use log::{trace, warn};

/// Crops a fixed or proportional margin off every raw capture.
pub trait CutProvider: fmt::Debug {
    /// Remove the margins from `image`.
    fn cut(&self, image: RgbaImage) -> RgbaImage;

    /// Equivalent provider for an image resized by `ratio`.
    fn scale(&self, ratio: f64) -> Box<dyn CutProvider>;

    /// Whether this provider never changes an image.
    fn is_null(&self) -> bool {
        false
    }
}

/// Pixel margins on each side of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub header: u32,
    pub footer: u32,
    pub left: u32,
    pub right: u32,
}

impl Margins {
    pub const fn new(header: u32, footer: u32, left: u32, right: u32) -> Self {
        Self {
            header,
            footer,
            left,
            right,
        }
    }

    /// Margins that leave exactly `keep` of an image of `image_size`.
    pub fn around(image_size: RectangleSize, keep: Region) -> Self {
        let left = u32::try_from(keep.left()).unwrap_or(0);
        let header = u32::try_from(keep.top()).unwrap_or(0);
        let right = image_size
            .width
            .saturating_sub(u32::try_from(keep.right()).unwrap_or(0));
        let footer = image_size
            .height
            .saturating_sub(u32::try_from(keep.bottom()).unwrap_or(0));
        Self::new(header, footer, left, right)
    }

    fn scaled(self, ratio: f64) -> Self {
        let scale = |value: u32| (f64::from(value) * ratio).ceil() as u32;
        Self::new(
            scale(self.header),
            scale(self.footer),
            scale(self.left),
            scale(self.right),
        )
    }

    const fn is_zero(self) -> bool {
        self.header == 0 && self.footer == 0 && self.left == 0 && self.right == 0
    }

    fn apply(self, image: RgbaImage) -> RgbaImage {
        if self.is_zero() {
            return image;
        }
        let (width, height) = image.dimensions();
        let horizontal = self.left.saturating_add(self.right);
        let vertical = self.header.saturating_add(self.footer);
        if horizontal >= width || vertical >= height {
            warn!("Cut margins {self:?} leave nothing of a {width}x{height} capture, keeping it uncut");
            return image;
        }
        trace!("Cutting {self:?} from {width}x{height}");
        imageops::crop_imm(&image, self.left, self.header, width - horizontal, height - vertical)
            .to_image()
    }
}

/// Leaves captures untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCutProvider;

impl CutProvider for NullCutProvider {
    fn cut(&self, image: RgbaImage) -> RgbaImage {
        image
    }

    fn scale(&self, _ratio: f64) -> Box<dyn CutProvider> {
        Box::new(Self)
    }

    fn is_null(&self) -> bool {
        true
    }
}

/// Fixed margins expressed in unscaled pixels; they follow the image when it is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCutProvider {
    margins: Margins,
}

impl FixedCutProvider {
    pub const fn new(header: u32, footer: u32, left: u32, right: u32) -> Self {
        Self {
            margins: Margins::new(header, footer, left, right),
        }
    }

    /// Provider keeping only `keep` of captures of `image_size`.
    pub fn keeping(image_size: RectangleSize, keep: Region) -> Self {
        Self {
            margins: Margins::around(image_size, keep),
        }
    }

    pub const fn margins(&self) -> Margins {
        self.margins
    }
}

impl CutProvider for FixedCutProvider {
    fn cut(&self, image: RgbaImage) -> RgbaImage {
        self.margins.apply(image)
    }

    fn scale(&self, ratio: f64) -> Box<dyn CutProvider> {
        Box::new(Self {
            margins: self.margins.scaled(ratio),
        })
    }
}

/// Fixed margins that stay the same whatever the image is resized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnscaledFixedCutProvider {
    margins: Margins,
}

impl UnscaledFixedCutProvider {
    pub const fn new(header: u32, footer: u32, left: u32, right: u32) -> Self {
        Self {
            margins: Margins::new(header, footer, left, right),
        }
    }
}

impl CutProvider for UnscaledFixedCutProvider {
    fn cut(&self, image: RgbaImage) -> RgbaImage {
        self.margins.apply(image)
    }

    fn scale(&self, _ratio: f64) -> Box<dyn CutProvider> {
        Box::new(*self)
    }
}

/// Margins given as fractions of the image's height (header/footer) and width (sides).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionalCutProvider {
    header: f64,
    footer: f64,
    left: f64,
    right: f64,
}

impl ProportionalCutProvider {
    /// Fractions are clamped to `0.0..=1.0`.
    pub fn new(header: f64, footer: f64, left: f64, right: f64) -> Self {
        Self {
            header: header.clamp(0.0, 1.0),
            footer: footer.clamp(0.0, 1.0),
            left: left.clamp(0.0, 1.0),
            right: right.clamp(0.0, 1.0),
        }
    }
}

impl CutProvider for ProportionalCutProvider {
    fn cut(&self, image: RgbaImage) -> RgbaImage {
        let width = f64::from(image.width());
        let height = f64::from(image.height());
        let margins = Margins::new(
            (height * self.header).round() as u32,
            (height * self.footer).round() as u32,
            (width * self.left).round() as u32,
            (width * self.right).round() as u32,
        );
        margins.apply(image)
    }

    fn scale(&self, _ratio: f64) -> Box<dyn CutProvider> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn numbered(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    /// Fixed margins crop from each side and scale with the image.
    ///
    /// # Panics
    /// Panics if the crop is misplaced.
    #[test]
    fn fixed_cut() {
        let provider = FixedCutProvider::new(10, 5, 2, 3);
        let cut = provider.cut(numbered(50, 40));
        assert_eq!(cut.dimensions(), (45, 25));
        assert_eq!(cut.get_pixel(0, 0), &Rgba([2, 10, 0, 255]));

        let doubled = provider.scale(2.0).cut(numbered(100, 80));
        assert_eq!(doubled.dimensions(), (90, 50));
        assert_eq!(doubled.get_pixel(0, 0), &Rgba([4, 20, 0, 255]));
    }

    /// Unscaled margins ignore the ratio; null providers ignore everything.
    ///
    /// # Panics
    /// Panics if a provider changes when it should not.
    #[test]
    fn unscaled_and_null() {
        let unscaled = UnscaledFixedCutProvider::new(10, 0, 0, 0).scale(3.0);
        assert_eq!(unscaled.cut(numbered(20, 30)).dimensions(), (20, 20));
        assert!(NullCutProvider.is_null());
        assert!(NullCutProvider.scale(2.0).is_null());
        assert!(!unscaled.is_null());
        assert_eq!(NullCutProvider.cut(numbered(7, 9)).dimensions(), (7, 9));
    }

    /// Proportional margins follow the image size.
    ///
    /// # Panics
    /// Panics if the proportions are not applied.
    #[test]
    fn proportional_cut() {
        let provider = ProportionalCutProvider::new(0.1, 0.1, 0.0, 0.25);
        assert_eq!(provider.cut(numbered(100, 200)).dimensions(), (75, 160));
    }

    /// Margins that would consume the whole capture are ignored.
    ///
    /// # Panics
    /// Panics if the capture is destroyed.
    #[test]
    fn oversized_margins_keep_image() {
        let provider = FixedCutProvider::new(30, 30, 0, 0);
        assert_eq!(provider.cut(numbered(10, 50)).dimensions(), (10, 50));
    }

    /// Margins derived from a crop region keep exactly that region.
    ///
    /// # Panics
    /// Panics if the derived margins are wrong.
    #[test]
    fn keeping_region() {
        let provider = FixedCutProvider::keeping(RectangleSize::new(750, 1334), Region::new(0, 128, 750, 1106));
        assert_eq!(provider.margins(), Margins::new(128, 100, 0, 0));
    }
}

//! Frame-aware screenshots.
//!
//! A [`Screenshot`] is one raw capture plus enough context to map points and regions
//! between the coordinate spaces of [`CoordinatesType`]. There is a single screenshot
//! type; what used to be separate viewport/entire-frame/cropped variants is expressed
//! through the capture [`ScreenshotKind`] and an explicit frame window.

use crate::error::{CaptureError, CaptureResult};
use crate::frame::{CaptureContext, FrameChain};
use geometry::{CoordinatesType, Location, RectangleSize, Region};
use image::{RgbaImage, imageops};
use log::trace;

/// What a raw capture covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenshotKind {
    /// Only the visible viewport of the outermost document.
    Viewport,
    /// The whole scrollable extent of the active context.
    EntireContext,
}

impl ScreenshotKind {
    /// An image larger than the viewport in either dimension is a whole-context capture.
    pub const fn classify(image_size: RectangleSize, viewport_size: RectangleSize) -> Self {
        if image_size.width <= viewport_size.width && image_size.height <= viewport_size.height {
            Self::Viewport
        } else {
            Self::EntireContext
        }
    }
}

/// One immutable capture and the frame geometry it was taken under.
#[derive(Debug, Clone)]
pub struct Screenshot {
    image: RgbaImage,
    kind: ScreenshotKind,
    frame_chain: FrameChain,
    frame_location_in_screenshot: Location,
    current_frame_scroll_position: Location,
    frame_window: Region,
    origin_in_outermost: Location,
}

impl Screenshot {
    /// Wrap a raw capture taken under `context`.
    ///
    /// When `kind` is `None` the capture is classified by comparing the image with the
    /// viewport size.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::OutOfBounds`] if the active frame is not visible in the
    /// image at all.
    pub fn capture(
        image: RgbaImage,
        context: &CaptureContext,
        kind: Option<ScreenshotKind>,
    ) -> CaptureResult<Self> {
        let image_size = RectangleSize::new(image.width(), image.height());
        let kind = kind.unwrap_or_else(|| ScreenshotKind::classify(image_size, context.viewport_size));
        let frame_chain = context.frame_chain.clone();
        let frame_location = frame_chain.location_in_screenshot(kind);

        let (frame_size, scroll_position) = match frame_chain.current_frame_inner_size() {
            Some(inner) => (inner, context.scroll_position),
            None if kind == ScreenshotKind::Viewport => {
                (context.viewport_size, context.scroll_position)
            }
            // A whole-document capture already contains the scrolled-away content.
            None => (image_size, Location::ZERO),
        };

        Self::with_frame_location(
            image,
            kind,
            frame_chain,
            frame_location,
            scroll_position,
            frame_size,
        )
    }

    /// Wrap an image that holds the entire active context, e.g. a stitched result.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::OutOfBounds`] if `entire_size` is empty.
    pub fn entire_frame(
        image: RgbaImage,
        frame_chain: FrameChain,
        entire_size: RectangleSize,
    ) -> CaptureResult<Self> {
        Self::with_frame_location(
            image,
            ScreenshotKind::EntireContext,
            frame_chain,
            Location::ZERO,
            Location::ZERO,
            entire_size,
        )
    }

    /// Wrap an image whose active frame is known to start at `frame_location`.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::OutOfBounds`] if the frame does not overlap the image.
    pub fn with_frame_location(
        image: RgbaImage,
        kind: ScreenshotKind,
        frame_chain: FrameChain,
        frame_location: Location,
        scroll_position: Location,
        frame_size: RectangleSize,
    ) -> CaptureResult<Self> {
        let bounds = Region::new(0, 0, image.width(), image.height());
        let frame_window = Region::new(
            frame_location.x,
            frame_location.y,
            frame_size.width,
            frame_size.height,
        )
        .intersected(&bounds);
        if frame_window.is_empty() {
            return Err(CaptureError::OutOfBounds(format!(
                "frame of size {frame_size} at {frame_location} is not visible in a {}x{} capture",
                image.width(),
                image.height()
            )));
        }
        trace!("Screenshot {kind:?}, frame window {frame_window}, scroll {scroll_position}");

        Ok(Self {
            image,
            kind,
            frame_chain,
            frame_location_in_screenshot: frame_location,
            current_frame_scroll_position: scroll_position,
            frame_window,
            origin_in_outermost: Location::ZERO,
        })
    }

    /// The raw pixels.
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Give up the frame metadata and keep the pixels.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub const fn kind(&self) -> ScreenshotKind {
        self.kind
    }

    pub const fn frame_chain(&self) -> &FrameChain {
        &self.frame_chain
    }

    /// Visible part of the active frame, in device pixels of this image.
    pub const fn frame_window(&self) -> Region {
        self.frame_window
    }

    pub const fn frame_location_in_screenshot(&self) -> Location {
        self.frame_location_in_screenshot
    }

    pub const fn current_frame_scroll_position(&self) -> Location {
        self.current_frame_scroll_position
    }

    /// Where this image's top-left corner sits in the capture it was cropped from.
    pub const fn origin_in_outermost(&self) -> Location {
        self.origin_in_outermost
    }

    /// Whole image as a device-space region.
    pub fn image_bounds(&self) -> Region {
        Region::new(0, 0, self.image.width(), self.image.height())
    }

    /// Outermost document captured whole: context spaces coincide and only the frame
    /// placement separates them from device pixels.
    fn is_flat(&self) -> bool {
        self.frame_chain.is_empty()
            && self.kind == ScreenshotKind::EntireContext
            && self.current_frame_scroll_position == Location::ZERO
    }

    /// Map `point` from one coordinate space into another.
    ///
    /// Every pair goes through device pixels of this image, so any two spaces compose.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::CoordinateConversion`] if the point cannot be represented
    /// in the target space.
    pub fn convert_location(
        &self,
        point: Location,
        from: CoordinatesType,
        to: CoordinatesType,
    ) -> CaptureResult<Location> {
        if from == to {
            return Ok(point);
        }
        if self.is_flat() && from.is_context_based() && to.is_context_based() {
            return Ok(point);
        }

        let frame = self.frame_location_in_screenshot;
        let scroll = self.current_frame_scroll_position;
        let device = match from {
            CoordinatesType::DeviceAsCaptured => Some(point),
            CoordinatesType::ContextAsIs => point.checked_add(frame),
            CoordinatesType::ContextRelative => {
                point.checked_sub(scroll).and_then(|moved| moved.checked_add(frame))
            }
            CoordinatesType::DeviceRelativeToOutermost => point.checked_sub(self.origin_in_outermost),
        };
        let converted = device.and_then(|device| match to {
            CoordinatesType::DeviceAsCaptured => Some(device),
            CoordinatesType::ContextAsIs => device.checked_sub(frame),
            CoordinatesType::ContextRelative => {
                device.checked_sub(frame).and_then(|moved| moved.checked_add(scroll))
            }
            CoordinatesType::DeviceRelativeToOutermost => device.checked_add(self.origin_in_outermost),
        });
        converted.ok_or(CaptureError::CoordinateConversion { from, to })
    }

    /// Move `region` into another coordinate space, keeping its size.
    ///
    /// # Errors
    ///
    /// Same as [`Self::convert_location`].
    pub fn convert_region_location(
        &self,
        region: Region,
        to: CoordinatesType,
    ) -> CaptureResult<Region> {
        if region.is_empty() {
            return Ok(Region::empty(to));
        }
        let location = self.convert_location(region.location(), region.coordinates(), to)?;
        Ok(Region::from_parts(location, region.size(), to))
    }

    /// The part of `region` visible in this capture, expressed in `result_type`.
    ///
    /// Context-based regions are clipped to the frame window; device regions are
    /// clipped to the image. No overlap yields an empty region, not an error.
    ///
    /// # Errors
    ///
    /// Same as [`Self::convert_location`].
    pub fn intersected_region(
        &self,
        region: Region,
        result_type: CoordinatesType,
    ) -> CaptureResult<Region> {
        if region.is_empty() {
            return Ok(Region::empty(result_type));
        }
        let source = region.coordinates();
        let device = self.convert_region_location(region, CoordinatesType::DeviceAsCaptured)?;
        let bounds = if source.is_context_based() {
            self.frame_window
        } else {
            self.image_bounds()
        };
        let visible = device.intersected(&bounds);
        if visible.is_empty() {
            return Ok(Region::empty(result_type));
        }
        self.convert_region_location(visible, result_type)
    }

    /// `region` in this image's device pixels, clipped to what was captured.
    ///
    /// # Errors
    ///
    /// Same as [`Self::convert_location`].
    pub fn region_in_screenshot_space(&self, region: Region) -> CaptureResult<Region> {
        self.intersected_region(region, CoordinatesType::DeviceAsCaptured)
    }

    /// `point` in this image's device pixels.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::OutOfBounds`] if the point is outside the frame window.
    pub fn location_in_screenshot(
        &self,
        point: Location,
        from: CoordinatesType,
    ) -> CaptureResult<Location> {
        let device = self.convert_location(point, from, CoordinatesType::DeviceAsCaptured)?;
        if !self.frame_window.contains(device) {
            return Err(CaptureError::OutOfBounds(format!(
                "point {point} ({from}) maps to {device}, outside frame window {}",
                self.frame_window
            )));
        }
        Ok(device)
    }

    /// Crop `region` out of this capture into a new screenshot.
    ///
    /// The new screenshot keeps the frame chain and scroll position; its frame window
    /// and frame placement are re-based at the crop origin.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::OutOfBounds`] if nothing of `region` is visible, or if
    /// `throw_if_clipped` is set and only part of it is.
    pub fn sub_screenshot(&self, region: Region, throw_if_clipped: bool) -> CaptureResult<Self> {
        let crop = self.region_in_screenshot_space(region)?;
        if crop.is_empty() || (throw_if_clipped && crop.size() != region.size()) {
            return Err(CaptureError::OutOfBounds(format!(
                "region {region} is {} in a {}x{} capture",
                if crop.is_empty() { "not visible" } else { "clipped" },
                self.image.width(),
                self.image.height()
            )));
        }

        let left = u32::try_from(crop.left()).unwrap_or(0);
        let top = u32::try_from(crop.top()).unwrap_or(0);
        let image = imageops::crop_imm(&self.image, left, top, crop.width(), crop.height()).to_image();
        let origin = crop.location();
        let bounds = Region::new(0, 0, image.width(), image.height());
        let frame_window = self
            .frame_window
            .offset(-origin.x, -origin.y)
            .intersected(&bounds);
        trace!("Sub-screenshot {crop} of {}", self.image_bounds());

        Ok(Self {
            image,
            kind: self.kind,
            frame_chain: self.frame_chain.clone(),
            frame_location_in_screenshot: self.frame_location_in_screenshot - origin,
            current_frame_scroll_position: self.current_frame_scroll_position,
            frame_window,
            origin_in_outermost: self.origin_in_outermost + origin,
        })
    }
}

/// Builds frame-aware screenshots for the stitching orchestrator.
pub trait ScreenshotFactory {
    /// Wrap a normalized capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the active frame is not visible in `image`.
    fn make_screenshot(&self, image: RgbaImage) -> CaptureResult<Screenshot>;
}

/// [`ScreenshotFactory`] over a fixed [`CaptureContext`].
#[derive(Debug, Clone)]
pub struct ContextScreenshotFactory {
    context: CaptureContext,
    kind: Option<ScreenshotKind>,
}

impl ContextScreenshotFactory {
    /// Factory that classifies each capture against the context's viewport.
    pub const fn new(context: CaptureContext) -> Self {
        Self {
            context,
            kind: None,
        }
    }

    /// Force every capture to be treated as `kind`.
    #[must_use]
    pub const fn with_kind(mut self, kind: ScreenshotKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub const fn context(&self) -> &CaptureContext {
        &self.context
    }
}

impl ScreenshotFactory for ContextScreenshotFactory {
    fn make_screenshot(&self, image: RgbaImage) -> CaptureResult<Screenshot> {
        Screenshot::capture(image, &self.context, self.kind)
    }
}

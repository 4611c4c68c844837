//! Full-page capture: scroll, capture, normalize and stitch.
//!
//! The first capture is taken at the origin of the area to stitch. If it already
//! covers the area it is returned as is. Otherwise the area is cut into parts one
//! capture high (minus the overlap), the surface is moved to each part in turn and
//! every capture is written where the surface actually ended up, which is not
//! always where it was asked to go. Position state is snapshotted up front and put
//! back on every exit path.

use crate::config::StitchConfig;
use crate::debug::{DebugScreenshotSink, FileDebugSink, NullDebugSink};
use crate::error::{CaptureError, CaptureResult};
use crate::image_provider::ImageProvider;
use crate::normalize::{
    CaptureNormalizer, CutProvider, NullRegionCompensation, RegionPositionCompensation,
    ScaleProvider,
};
use crate::position::{PositionGuard, PositionProvider, ScrollPositionProvider};
use crate::screenshot::{Screenshot, ScreenshotFactory};
use crate::script::ScriptExecutor;
use crate::strategy::position_provider_for;
use core::fmt;
use core::time::Duration;
use geometry::{Location, RectangleSize, Region, TileMode};
use image::{RgbaImage, imageops};
use log::{debug, info, warn};
use std::rc::Rc;
use std::thread;

/// Parts are never shorter than this, whatever the overlap.
pub const MIN_SCREENSHOT_PART_HEIGHT: u32 = 10;

/// What to keep of each capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    /// Every captured pixel.
    EntireImage,
    /// Only this region, located through the screenshot's coordinate spaces.
    Region(Region),
}

impl fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntireImage => f.write_str("entire image"),
            Self::Region(region) => write!(f, "region {region}"),
        }
    }
}

/// Orchestrates a full-page capture.
pub struct Stitcher {
    config: StitchConfig,
    origin_provider: Box<dyn PositionProvider>,
    image_provider: Box<dyn ImageProvider>,
    screenshot_factory: Box<dyn ScreenshotFactory>,
    normalizer: CaptureNormalizer,
    region_compensation: Box<dyn RegionPositionCompensation>,
    debug_sink: Box<dyn DebugScreenshotSink>,
}

impl Stitcher {
    /// Stitcher with null normalization and no region compensation.
    ///
    /// `origin_provider` positions the outermost context; it is reset to the origin
    /// for the duration of every capture. Intermediate captures are written to
    /// `config.debug_screenshots_dir` when set.
    pub fn new(
        config: StitchConfig,
        origin_provider: Box<dyn PositionProvider>,
        image_provider: Box<dyn ImageProvider>,
        screenshot_factory: Box<dyn ScreenshotFactory>,
    ) -> Self {
        let debug_sink = debug_sink_for(&config);
        Self {
            config,
            origin_provider,
            image_provider,
            screenshot_factory,
            normalizer: CaptureNormalizer::default(),
            region_compensation: Box::new(NullRegionCompensation),
            debug_sink,
        }
    }

    /// Stitcher for a scriptable surface reached through `executor`.
    ///
    /// The outermost document is scrolled back to its origin for every capture. Use
    /// [`Self::position_provider`] for the provider that moves between parts.
    pub fn for_script_surface(
        config: StitchConfig,
        executor: Rc<dyn ScriptExecutor>,
        image_provider: Box<dyn ImageProvider>,
        screenshot_factory: Box<dyn ScreenshotFactory>,
    ) -> Self {
        let origin_provider = Box::new(ScrollPositionProvider::document(executor));
        Self::new(config, origin_provider, image_provider, screenshot_factory)
    }

    /// Provider moving the document, or the element matching `element`, the way
    /// the configured [`StitchMode`](crate::config::StitchMode) says.
    pub fn position_provider(
        &self,
        executor: Rc<dyn ScriptExecutor>,
        element: Option<&str>,
    ) -> Box<dyn PositionProvider> {
        debug!("Positioning with {} stitching", self.config.stitch_mode);
        position_provider_for(self.config.stitch_mode, executor, element)
    }

    /// Crop every raw capture with `cut` before it is scaled or stitched.
    #[must_use]
    pub fn with_cut_provider(mut self, cut: Box<dyn CutProvider>) -> Self {
        self.normalizer.set_cut_provider(cut);
        self
    }

    /// Scale every raw capture to layout pixels with `scale`.
    #[must_use]
    pub fn with_scale_provider(mut self, scale: Box<dyn ScaleProvider>) -> Self {
        self.normalizer.set_scale_provider(scale);
        self
    }

    /// Correct located regions for browser placement quirks.
    #[must_use]
    pub fn with_region_compensation(mut self, compensation: Box<dyn RegionPositionCompensation>) -> Self {
        self.region_compensation = compensation;
        self
    }

    /// Send intermediate captures to `sink` instead of the configured directory.
    #[must_use]
    pub fn with_debug_sink(mut self, sink: Box<dyn DebugScreenshotSink>) -> Self {
        self.debug_sink = sink;
        self
    }

    /// Settings this stitcher runs with.
    pub const fn config(&self) -> &StitchConfig {
        &self.config
    }

    /// Capture `target` over `full_area`, moving `position_provider` between parts.
    ///
    /// Without a `full_area` (or with an empty one) the provider's entire size is
    /// used, or the first capture's size if that query fails. A region target that
    /// is not visible in the first capture yields a 0x0 image.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::ImageCapture`] if the first capture fails,
    /// [`CaptureError::TileCaptureFailed`] if a later one does, and position errors
    /// if a provider cannot be read, moved or restored.
    pub fn get_stitched_region(
        &mut self,
        target: &CaptureTarget,
        full_area: Option<Region>,
        position_provider: &mut dyn PositionProvider,
    ) -> CaptureResult<RgbaImage> {
        let Self {
            config,
            origin_provider,
            image_provider,
            screenshot_factory,
            normalizer,
            region_compensation,
            debug_sink,
        } = self;
        info!("Getting stitched {target}");

        let mut origin = PositionGuard::new(&mut **origin_provider)?;
        origin.set_position(Location::ZERO)?;
        let mut provider = PositionGuard::new(position_provider)?;
        provider.set_position(full_area.map_or(Location::ZERO, |area| area.location()))?;

        let mut source = PartSource {
            image_provider: &mut **image_provider,
            normalizer,
            debug_sink: &mut **debug_sink,
            wait: config.wait_before_screenshots,
        };
        let first = source
            .grab("original")
            .map_err(|err| CaptureError::ImageCapture(format!("{err:#}")))?;
        let pixel_ratio = source.normalizer.pixel_ratio();
        let screenshot = screenshot_factory.make_screenshot(first)?;

        let crop = match target {
            CaptureTarget::EntireImage => None,
            CaptureTarget::Region(region) => {
                let located = locate_region(&screenshot, *region, pixel_ratio, &**region_compensation)?;
                if located.is_empty() {
                    warn!("{target} is not visible in the capture, returning an empty image");
                    restore_all(provider, origin)?;
                    return Ok(RgbaImage::new(0, 0));
                }
                debug!("{target} is {located} in the capture");
                Some(located)
            }
        };
        let mut image = screenshot.into_image();
        if let Some(region) = crop {
            image = crop_image(&image, region);
            source.debug_sink.save(&image, "original-cropped");
        }

        let full_area = resolve_full_area(full_area, &*provider, &image)?;
        if image.width() >= full_area.width() && image.height() >= full_area.height() {
            debug!("Capture of {}x{} already covers {full_area}", image.width(), image.height());
            restore_all(provider, origin)?;
            return Ok(image);
        }

        let part_size = part_size(&image, config.stitching_overlap);
        let stitched = stitch_parts(&mut source, &mut *provider, &image, full_area, part_size, crop)?;
        source.debug_sink.save(&stitched, "stitched");
        restore_all(provider, origin)?;
        Ok(stitched)
    }
}

fn debug_sink_for(config: &StitchConfig) -> Box<dyn DebugScreenshotSink> {
    if let Some(dir) = &config.debug_screenshots_dir {
        return Box::new(FileDebugSink::new(dir.clone(), "stitch-"));
    }
    Box::new(NullDebugSink)
}

/// Captures and normalizes one part.
struct PartSource<'run> {
    image_provider: &'run mut dyn ImageProvider,
    normalizer: &'run mut CaptureNormalizer,
    debug_sink: &'run mut dyn DebugScreenshotSink,
    wait: Duration,
}

impl PartSource<'_> {
    fn grab(&mut self, label: &str) -> anyhow::Result<RgbaImage> {
        thread::sleep(self.wait);
        let raw = self.image_provider.image()?;
        self.debug_sink.save(&raw, label);
        if self.normalizer.is_null() {
            return Ok(raw);
        }
        let image = self.normalizer.normalize(raw);
        self.debug_sink.save(&image, &format!("{label}-normalized"));
        Ok(image)
    }
}

/// Where `region` is in the normalized capture, corrected for the browser.
fn locate_region(
    screenshot: &Screenshot,
    region: Region,
    pixel_ratio: f64,
    compensation: &dyn RegionPositionCompensation,
) -> CaptureResult<Region> {
    let in_screenshot = screenshot.region_in_screenshot_space(region)?;
    let compensated =
        compensation.compensate(in_screenshot, pixel_ratio, screenshot.frame_chain().len());
    Ok(compensated.intersected(&screenshot.image_bounds()))
}

fn crop_image(image: &RgbaImage, region: Region) -> RgbaImage {
    let left = u32::try_from(region.left()).unwrap_or(0);
    let top = u32::try_from(region.top()).unwrap_or(0);
    imageops::crop_imm(image, left, top, region.width(), region.height()).to_image()
}

/// Area to stitch: the requested one, else the provider's entire size, else the
/// capture alone when the surface cannot report its size.
fn resolve_full_area<P: PositionProvider + ?Sized>(
    requested: Option<Region>,
    provider: &P,
    image: &RgbaImage,
) -> CaptureResult<Region> {
    if let Some(area) = requested.filter(|area| !area.is_empty()) {
        return Ok(area);
    }
    match provider.entire_size() {
        Ok(size) => {
            debug!("Entire size is {size}");
            Ok(Region::new(0, 0, size.width, size.height))
        }
        Err(err) if err.is_recoverable() => {
            warn!("Entire size unavailable, stitching the capture alone: {err}");
            Ok(Region::new(0, 0, image.width(), image.height()))
        }
        Err(err) => Err(err),
    }
}

/// Part size for captures of `image`'s size: one capture high minus the overlap,
/// floored at [`MIN_SCREENSHOT_PART_HEIGHT`] but never taller than the capture.
fn part_size(image: &RgbaImage, overlap: u32) -> RectangleSize {
    let capture_height = image.height();
    let height = capture_height.saturating_sub(overlap);
    if height >= MIN_SCREENSHOT_PART_HEIGHT {
        return RectangleSize::new(image.width(), height);
    }
    let floored = MIN_SCREENSHOT_PART_HEIGHT.min(capture_height);
    warn!(
        "Stitching overlap {overlap} leaves {height}px of a {capture_height}px capture, using {floored}px parts"
    );
    RectangleSize::new(image.width(), floored)
}

fn stitch_parts(
    source: &mut PartSource<'_>,
    provider: &mut dyn PositionProvider,
    first: &RgbaImage,
    full_area: Region,
    part_size: RectangleSize,
    crop: Option<Region>,
) -> CaptureResult<RgbaImage> {
    let parts = full_area.subdivide(part_size, TileMode::Varying)?;
    info!("Stitching {} parts of {part_size} into {full_area}", parts.len());

    let mut stitched = RgbaImage::new(full_area.width(), full_area.height());
    imageops::replace(&mut stitched, first, 0, 0);
    let mut last_position = Location::ZERO;
    let mut last_size = RectangleSize::new(first.width(), first.height());

    // The first part is the capture already taken at the origin.
    for (index, part) in parts.enumerate().skip(1) {
        let requested = part.location();
        provider.set_position(requested)?;
        let reached = provider.current_position().unwrap_or(requested);
        let target = reached - full_area.location();
        debug!("Part {index}: requested {requested}, reached {reached}, placing at {target}");

        let mut image = source
            .grab(&format!("part-{index}"))
            .map_err(|err| CaptureError::TileCaptureFailed {
                tile: part,
                reason: format!("{err:#}"),
            })?;
        if let Some(region) = crop {
            image = crop_image(&image, region);
        }
        imageops::replace(&mut stitched, &image, i64::from(target.x), i64::from(target.y));
        last_position = target;
        last_size = RectangleSize::new(image.width(), image.height());
    }

    Ok(trim(stitched, last_position, last_size))
}

/// End of `length` pixels starting at `start`, clamped to `0..=limit`.
fn clamp_extent(start: i32, length: u32, limit: u32) -> u32 {
    let end = i64::from(start) + i64::from(length);
    u32::try_from(end.clamp(0, i64::from(limit))).unwrap_or(limit)
}

/// Cut the buffer down to what the last part actually reached.
fn trim(stitched: RgbaImage, last_position: Location, last_size: RectangleSize) -> RgbaImage {
    let width = clamp_extent(last_position.x, last_size.width, stitched.width());
    let height = clamp_extent(last_position.y, last_size.height, stitched.height());
    if width == stitched.width() && height == stitched.height() {
        return stitched;
    }
    info!(
        "Trimming stitched image from {}x{} to {width}x{height}",
        stitched.width(),
        stitched.height()
    );
    imageops::crop_imm(&stitched, 0, 0, width, height).to_image()
}

fn restore_all<A, B>(provider: PositionGuard<'_, A>, origin: PositionGuard<'_, B>) -> CaptureResult<()>
where
    A: PositionProvider + ?Sized,
    B: PositionProvider + ?Sized,
{
    let provider_result = provider.restore();
    let origin_result = origin.restore();
    provider_result.and(origin_result)
}

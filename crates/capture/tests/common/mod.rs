#![allow(dead_code, reason = "shared by several integration test files")]

use anyhow::{Result, anyhow, bail};
use capture::{
    CaptureContext, CaptureError, CaptureResult, ContextScreenshotFactory, ImageProvider,
    PositionMemento, PositionProvider, ScriptExecutor, StitchConfig, Stitcher,
};
use core::cell::RefCell;
use core::time::Duration;
use geometry::{Location, RectangleSize};
use image::{Rgba, RgbaImage, imageops};
use serde_json::{Value, json};
use std::rc::Rc;

/// Initialise test logging once.
pub fn init_logging() {
    let _ignored = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Colour of the page content at `(x, y)`; unique per row up to 65536 rows.
pub fn content_pixel(x: u32, y: u32) -> Rgba<u8> {
    Rgba([(x % 251) as u8, (y % 256) as u8, (y / 256) as u8, 255])
}

/// Colour of the browser chrome; transparent, unlike any content pixel.
pub const CHROME_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A scrollable page rendered into a fixed viewport.
pub struct PageState {
    pub content: RgbaImage,
    pub viewport: RectangleSize,
    pub scroll: Location,
    /// Every position the page was asked to move to, after clamping.
    pub scroll_history: Vec<Location>,
    pub captures: usize,
    /// One-based index of the capture that fails.
    pub fail_on_capture: Option<usize>,
    pub entire_size_fails: bool,
    /// Entire size reported instead of the real content size.
    pub reported_entire_size: Option<RectangleSize>,
    /// Device pixels per layout pixel of every capture.
    pub device_pixel_ratio: u32,
    /// Layout rows of browser chrome above the viewport in every capture.
    pub header_height: u32,
    /// Inline `transform` style of the root element.
    pub transform: String,
    /// Every script run through [`PageScripts`].
    pub scripts: Vec<String>,
}

pub type SharedPage = Rc<RefCell<PageState>>;

impl PageState {
    fn max_scroll(&self) -> Location {
        Location::new(
            self.content.width().saturating_sub(self.viewport.width) as i32,
            self.content.height().saturating_sub(self.viewport.height) as i32,
        )
    }

    fn scroll_to(&mut self, location: Location) {
        let max = self.max_scroll();
        self.scroll = Location::new(location.x.clamp(0, max.x), location.y.clamp(0, max.y));
        self.scroll_history.push(self.scroll);
    }

    fn entire_size(&self) -> RectangleSize {
        self.reported_entire_size
            .unwrap_or_else(|| RectangleSize::new(self.content.width(), self.content.height()))
    }

    /// Offset of the content layer from a `translate(Xpx, Ypx)` transform.
    fn translation(&self) -> Location {
        let Some(args) = self
            .transform
            .strip_prefix("translate(")
            .and_then(|rest| rest.strip_suffix(')'))
        else {
            return Location::ZERO;
        };
        let mut offsets = args
            .split(',')
            .filter_map(|arg| arg.trim().trim_end_matches("px").parse::<i32>().ok());
        match (offsets.next(), offsets.next()) {
            (Some(x), Some(y)) => Location::new(-x, -y),
            _ => Location::ZERO,
        }
    }

    fn render_viewport(&self) -> RgbaImage {
        let mut frame = RgbaImage::from_pixel(
            self.viewport.width,
            self.viewport.height + self.header_height,
            Rgba([255, 255, 255, 255]),
        );
        let header = RgbaImage::from_pixel(self.viewport.width, self.header_height, CHROME_PIXEL);
        imageops::replace(&mut frame, &header, 0, 0);
        let offset = self.scroll + self.translation();
        let visible = imageops::crop_imm(
            &self.content,
            u32::try_from(offset.x).unwrap_or(0),
            u32::try_from(offset.y).unwrap_or(0),
            self.viewport.width,
            self.viewport.height,
        )
        .to_image();
        imageops::replace(&mut frame, &visible, 0, i64::from(self.header_height));
        if self.device_pixel_ratio > 1 {
            return imageops::resize(
                &frame,
                frame.width() * self.device_pixel_ratio,
                frame.height() * self.device_pixel_ratio,
                imageops::FilterType::Nearest,
            );
        }
        frame
    }
}

/// A page of `width`x`height` content seen through `viewport`.
pub fn page(width: u32, height: u32, viewport: RectangleSize) -> SharedPage {
    Rc::new(RefCell::new(PageState {
        content: RgbaImage::from_fn(width, height, content_pixel),
        viewport,
        scroll: Location::ZERO,
        scroll_history: Vec::new(),
        captures: 0,
        fail_on_capture: None,
        entire_size_fails: false,
        reported_entire_size: None,
        device_pixel_ratio: 1,
        header_height: 0,
        transform: String::new(),
        scripts: Vec::new(),
    }))
}

/// Captures the page's viewport.
pub struct PageCamera(pub SharedPage);

impl ImageProvider for PageCamera {
    fn image(&mut self) -> Result<RgbaImage> {
        let mut state = self.0.borrow_mut();
        state.captures += 1;
        if state.fail_on_capture == Some(state.captures) {
            return Err(anyhow!("simulated failure of capture {}", state.captures));
        }
        Ok(state.render_viewport())
    }
}

/// Scrolls the page, stopping at the end of the content like a browser does.
pub struct PageScroller(pub SharedPage);

impl PositionProvider for PageScroller {
    fn current_position(&self) -> Option<Location> {
        Some(self.0.borrow().scroll)
    }

    fn set_position(&mut self, location: Location) -> CaptureResult<()> {
        self.0.borrow_mut().scroll_to(location);
        Ok(())
    }

    fn entire_size(&self) -> CaptureResult<RectangleSize> {
        let state = self.0.borrow();
        if state.entire_size_fails {
            return Err(CaptureError::PositionQueryFailed(
                "simulated page is not scriptable".to_owned(),
            ));
        }
        Ok(state.entire_size())
    }

    fn state(&self) -> CaptureResult<PositionMemento> {
        Ok(PositionMemento::from_position(self.0.borrow().scroll))
    }

    fn restore_state(&mut self, memento: PositionMemento) -> CaptureResult<()> {
        self.set_position(memento.position())
    }
}

/// Runs the scroll and CSS translate providers' scripts against the page.
///
/// Every element selector resolves to the page's own scrolling box.
pub struct PageScripts(pub SharedPage);

impl ScriptExecutor for PageScripts {
    fn execute_script(&self, script: &str) -> Result<Value> {
        let mut state = self.0.borrow_mut();
        state.scripts.push(script.to_owned());
        if script.contains("return {") {
            let transform = state.transform.clone();
            return Ok(json!({ "transform": transform, "webkitTransform": transform }));
        }
        if let Some(literal) = assigned_value(script, "el.style[\"transform\"] = ") {
            state.transform = serde_json::from_str(literal)?;
            return Ok(Value::Null);
        }
        if script.contains("scrollWidth") {
            if state.entire_size_fails {
                bail!("simulated page is not scriptable");
            }
            let size = state.entire_size();
            return Ok(json!([size.width, size.height]));
        }
        if let Some(args) = script
            .strip_prefix("window.scrollTo(")
            .and_then(|rest| rest.strip_suffix(");"))
        {
            let Some((x, y)) = args.split_once(',') else {
                bail!("malformed scroll script: {script}");
            };
            state.scroll_to(Location::new(x.trim().parse()?, y.trim().parse()?));
            return Ok(Value::Null);
        }
        if let (Some(left), Some(top)) = (
            assigned_value(script, "el.scrollLeft = "),
            assigned_value(script, "el.scrollTop = "),
        ) {
            state.scroll_to(Location::new(left.parse()?, top.parse()?));
            return Ok(Value::Null);
        }
        if script.ends_with("return [x, y];") || script.contains("return [el.scrollLeft, el.scrollTop]") {
            return Ok(json!([state.scroll.x, state.scroll.y]));
        }
        Err(anyhow!("unsupported script: {script}"))
    }
}

/// Value assigned right after `target`, up to the end of the statement.
fn assigned_value<'script>(script: &'script str, target: &str) -> Option<&'script str> {
    let start = script.find(target)? + target.len();
    script.get(start..)?.split(';').next().map(str::trim)
}

/// Config without settle delay.
pub fn fast_config() -> StitchConfig {
    StitchConfig::default().with_wait(Duration::ZERO)
}

/// Stitcher over `page`, with the page's scroller as origin provider.
pub fn stitcher(page: &SharedPage, config: StitchConfig) -> Stitcher {
    let viewport = page.borrow().viewport;
    Stitcher::new(
        config,
        Box::new(PageScroller(Rc::clone(page))),
        Box::new(PageCamera(Rc::clone(page))),
        Box::new(ContextScreenshotFactory::new(CaptureContext::new(viewport))),
    )
}

/// Stitcher driven through [`PageScripts`], and the executor for its providers.
pub fn script_stitcher(page: &SharedPage, config: StitchConfig) -> (Stitcher, Rc<dyn ScriptExecutor>) {
    let viewport = page.borrow().viewport;
    let executor: Rc<dyn ScriptExecutor> = Rc::new(PageScripts(Rc::clone(page)));
    let stitcher = Stitcher::for_script_surface(
        config,
        Rc::clone(&executor),
        Box::new(PageCamera(Rc::clone(page))),
        Box::new(ContextScreenshotFactory::new(CaptureContext::new(viewport))),
    );
    (stitcher, executor)
}

/// The page content between `top` and `top + height`, `width` pixels wide.
pub fn expected_content(page: &SharedPage, width: u32, top: u32, height: u32) -> RgbaImage {
    imageops::crop_imm(&page.borrow().content, 0, top, width, height).to_image()
}

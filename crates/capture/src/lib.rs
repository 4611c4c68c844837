//! Full-page capture and stitching over nested, scrollable rendering contexts.
//!
//! A capture run moves the surface with a [`PositionProvider`], grabs raw images from
//! an [`ImageProvider`], normalizes them to layout pixels, and composes them with the
//! [`Stitcher`]. [`Screenshot`] maps points and regions between the coordinate
//! spaces of a single capture, taking the [`FrameChain`] into account.

pub mod capabilities;
pub mod config;
pub mod debug;
pub mod device;
pub mod error;
pub mod frame;
pub mod image_provider;
pub mod normalize;
pub mod position;
pub mod screenshot;
pub mod script;
pub mod stitcher;
pub mod strategy;

pub use capabilities::{BrowserKind, Capabilities, PlatformKind, UserAgent};
pub use config::{StitchConfig, StitchMode};
pub use debug::{DebugScreenshotSink, FileDebugSink, NullDebugSink};
pub use error::{CaptureError, CaptureResult};
pub use frame::{CaptureContext, Frame, FrameChain, FrameReference, FrameScope};
pub use image_provider::{Base64ImageProvider, ImageProvider, PngImageProvider};
pub use position::{
    CssTranslatePositionProvider, PositionGuard, PositionMemento, PositionProvider,
    PositionTarget, ScrollPositionProvider,
};
pub use screenshot::{ContextScreenshotFactory, Screenshot, ScreenshotFactory, ScreenshotKind};
pub use script::ScriptExecutor;
pub use stitcher::{CaptureTarget, MIN_SCREENSHOT_PART_HEIGHT, Stitcher};

//! Sources of raw captures.

use anyhow::{Context as _, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use image::{RgbaImage, load_from_memory};

/// Produces one raw capture of whatever is currently visible.
pub trait ImageProvider {
    /// Capture the visible area.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface could not be captured or decoded.
    fn image(&mut self) -> anyhow::Result<RgbaImage>;
}

/// Decode an encoded capture (PNG, JPEG or WebP) to RGBA.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image.
pub fn decode_capture(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    Ok(load_from_memory(bytes)
        .context("capture is not a decodable image")?
        .to_rgba8())
}

/// Adapts a closure returning encoded image bytes.
pub struct PngImageProvider<F> {
    capture: F,
}

impl<F> PngImageProvider<F>
where
    F: FnMut() -> anyhow::Result<Vec<u8>>,
{
    pub const fn new(capture: F) -> Self {
        Self { capture }
    }
}

impl<F> ImageProvider for PngImageProvider<F>
where
    F: FnMut() -> anyhow::Result<Vec<u8>>,
{
    fn image(&mut self) -> anyhow::Result<RgbaImage> {
        let bytes = (self.capture)()?;
        decode_capture(&bytes)
    }
}

/// Adapts a closure returning a base64-encoded capture, as remote protocols deliver them.
pub struct Base64ImageProvider<F> {
    capture: F,
}

impl<F> Base64ImageProvider<F>
where
    F: FnMut() -> anyhow::Result<String>,
{
    pub const fn new(capture: F) -> Self {
        Self { capture }
    }
}

impl<F> ImageProvider for Base64ImageProvider<F>
where
    F: FnMut() -> anyhow::Result<String>,
{
    fn image(&mut self) -> anyhow::Result<RgbaImage> {
        let encoded = (self.capture)()?;
        let bytes = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|err| anyhow!("Failed to decode base64 capture: {err}"))?;
        decode_capture(&bytes)
    }
}

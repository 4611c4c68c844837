//! Nested rendering contexts.
//!
//! A [`FrameChain`] is the single source of truth for "where am I": one [`Frame`]
//! per nested context between the outermost document and the active context,
//! outermost first. Descending is done through [`FrameChain::enter`], which hands
//! back a guard that pops the frame again when it goes out of scope, so the chain
//! cannot drift from the real nesting depth when a step fails half way.

use crate::error::{CaptureError, CaptureResult};
use crate::screenshot::ScreenshotKind;
use core::fmt;
use core::ops::{Deref, DerefMut};
use core::slice;
use geometry::{Location, RectangleSize};
use log::{trace, warn};

/// How the embedding element of a nested context was located.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameReference {
    /// Position among the parent's frames.
    Index(usize),
    /// Frame name or id attribute.
    Name(String),
    /// CSS selector of the embedding element.
    Selector(String),
}

impl fmt::Display for FrameReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Name(name) => write!(f, "name={name}"),
            Self::Selector(selector) => write!(f, "css={selector}"),
        }
    }
}

/// One nested context in a [`FrameChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Handle to the embedding element.
    pub reference: FrameReference,
    /// Location of the frame's content box in its parent's document, unscrolled.
    pub location: Location,
    /// Border box size of the embedding element.
    pub outer_size: RectangleSize,
    /// Content box size, i.e. the frame's own viewport.
    pub inner_size: RectangleSize,
    /// Scroll position of the parent context when this frame was entered.
    pub parent_scroll_position: Location,
}

impl Frame {
    /// Create a frame record.
    pub const fn new(
        reference: FrameReference,
        location: Location,
        outer_size: RectangleSize,
        inner_size: RectangleSize,
        parent_scroll_position: Location,
    ) -> Self {
        Self {
            reference,
            location,
            outer_size,
            inner_size,
            parent_scroll_position,
        }
    }

    /// Where the frame currently appears inside its parent's viewport.
    pub fn visible_location(&self) -> Location {
        self.location - self.parent_scroll_position
    }
}

/// Ordered stack of nested contexts, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameChain {
    frames: Vec<Frame>,
}

impl FrameChain {
    /// An empty chain: the outermost document is active.
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Record a descent into `frame`.
    pub fn push(&mut self, frame: Frame) {
        trace!("Entering frame {} at {}", frame.reference, frame.location);
        self.frames.push(frame);
    }

    /// Record an ascent out of the active frame.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::EmptyFrameChain`] if the outermost document is already
    /// active. This is a contract violation on the caller's side.
    pub fn pop(&mut self) -> CaptureResult<Frame> {
        let frame = self.frames.pop().ok_or(CaptureError::EmptyFrameChain)?;
        trace!("Leaving frame {}", frame.reference);
        Ok(frame)
    }

    /// Descend into `frame` for the lifetime of the returned guard.
    pub fn enter(&mut self, frame: Frame) -> FrameScope<'_> {
        self.push(frame);
        FrameScope { chain: self }
    }

    /// Drop every frame, returning to the outermost document.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Nesting depth.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the outermost document is active.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames from outermost to innermost.
    pub fn iter(&self) -> slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// The innermost (active) frame.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Outer size of the active frame.
    pub fn current_frame_size(&self) -> Option<RectangleSize> {
        self.current_frame().map(|frame| frame.outer_size)
    }

    /// Content size of the active frame.
    pub fn current_frame_inner_size(&self) -> Option<RectangleSize> {
        self.current_frame().map(|frame| frame.inner_size)
    }

    /// Scroll position of the outermost document when the first frame was entered.
    pub fn default_content_scroll_position(&self) -> Location {
        self.frames
            .first()
            .map_or(Location::ZERO, |frame| frame.parent_scroll_position)
    }

    /// Cumulative offset of the active context from the outermost document.
    pub fn current_offset(&self) -> Location {
        self.frames
            .iter()
            .fold(Location::ZERO, |offset, frame| offset + frame.location)
    }

    /// Where the active context's origin lands inside a capture of the given kind.
    ///
    /// The outermost frame contributes its document location, minus the outermost
    /// scroll for viewport captures. Every nested frame contributes where it is
    /// visible inside its parent, i.e. its location minus the parent's scroll at the
    /// time it was entered.
    pub fn location_in_screenshot(&self, kind: ScreenshotKind) -> Location {
        let mut frames = self.frames.iter();
        let Some(outermost) = frames.next() else {
            return Location::ZERO;
        };
        let mut location = outermost.location;
        if kind == ScreenshotKind::Viewport {
            location = location - outermost.parent_scroll_position;
        }
        frames.fold(location, |acc, frame| acc + frame.visible_location())
    }
}

impl<'chain> IntoIterator for &'chain FrameChain {
    type Item = &'chain Frame;
    type IntoIter = slice::Iter<'chain, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Guard returned by [`FrameChain::enter`]; pops its frame when dropped.
pub struct FrameScope<'chain> {
    chain: &'chain mut FrameChain,
}

impl Deref for FrameScope<'_> {
    type Target = FrameChain;

    fn deref(&self) -> &Self::Target {
        self.chain
    }
}

impl DerefMut for FrameScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.chain
    }
}

impl Drop for FrameScope<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.chain.pop() {
            warn!("Frame scope ended on an already empty chain: {err}");
        }
    }
}

/// Everything known about the active context at the moment of a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureContext {
    /// Path from the outermost document to the active context.
    pub frame_chain: FrameChain,
    /// Size of the outermost viewport.
    pub viewport_size: RectangleSize,
    /// Scroll position of the active context.
    pub scroll_position: Location,
}

impl CaptureContext {
    /// Context for the outermost document, unscrolled.
    pub const fn new(viewport_size: RectangleSize) -> Self {
        Self {
            frame_chain: FrameChain::new(),
            viewport_size,
            scroll_position: Location::ZERO,
        }
    }

    /// Same context with another scroll position for the active context.
    #[must_use]
    pub fn scrolled_to(mut self, scroll_position: Location) -> Self {
        self.scroll_position = scroll_position;
        self
    }
}

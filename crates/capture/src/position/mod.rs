//! Position providers: how the visible part of a context is moved.
//!
//! Every provider answers the same five questions (where am I, go there, how big is
//! everything, remember this, go back) and differs only in the mechanism. Callers
//! that move a provider must put it back; [`PositionGuard`] does that on every exit
//! path.

mod css_translate;
mod scroll;

pub use css_translate::CssTranslatePositionProvider;
pub use scroll::ScrollPositionProvider;

use crate::error::CaptureResult;
use crate::script::string_literal;
use anyhow::Context as _;
use core::ops::{Deref, DerefMut};
use geometry::{Location, RectangleSize};
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// Moves the visible part of the active context.
pub trait PositionProvider {
    /// Current position, or `None` when the surface cannot tell.
    fn current_position(&self) -> Option<Location>;

    /// Move to `location`. The surface may stop short near the end of the content.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CaptureError::PositionUpdateFailed`] if the surface refused.
    fn set_position(&mut self, location: Location) -> CaptureResult<()>;

    /// Full scrollable extent of the positioned context.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CaptureError::PositionQueryFailed`] if the context cannot be
    /// queried; callers substitute a known size.
    fn entire_size(&self) -> CaptureResult<RectangleSize>;

    /// Snapshot everything needed to come back to the current state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CaptureError::PositionQueryFailed`] if the state is unreadable.
    fn state(&self) -> CaptureResult<PositionMemento>;

    /// Return to a snapshot taken by [`Self::state`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::CaptureError::PositionUpdateFailed`] if the surface refused.
    fn restore_state(&mut self, memento: PositionMemento) -> CaptureResult<()>;
}

/// Saved provider state. Not `Clone`: a memento is restored at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct PositionMemento {
    position: Location,
    transforms: Option<BTreeMap<String, String>>,
}

impl PositionMemento {
    /// Memento of a provider that only tracks a position.
    pub const fn from_position(position: Location) -> Self {
        Self {
            position,
            transforms: None,
        }
    }

    /// Memento that also carries style values to write back, keyed by property.
    pub const fn with_transforms(position: Location, transforms: BTreeMap<String, String>) -> Self {
        Self {
            position,
            transforms: Some(transforms),
        }
    }

    pub const fn position(&self) -> Location {
        self.position
    }

    pub const fn transforms(&self) -> Option<&BTreeMap<String, String>> {
        self.transforms.as_ref()
    }
}

/// Which scrollable box a script-backed provider positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PositionTarget {
    /// The active context's document.
    #[default]
    Document,
    /// The first element matching a CSS selector.
    Element(String),
}

impl PositionTarget {
    /// Script expression evaluating to the positioned element.
    fn element_expression(&self) -> String {
        match self {
            Self::Document => "document.documentElement".to_owned(),
            Self::Element(selector) => format!("document.querySelector({})", string_literal(selector)),
        }
    }

    /// Script returning `[width, height]` of the scrollable extent.
    fn entire_size_script(&self) -> String {
        match self {
            Self::Document => concat!(
                "var doc = document.documentElement; var body = document.body; ",
                "var width = Math.max(doc.scrollWidth, body ? body.scrollWidth : 0, doc.clientWidth); ",
                "var height = Math.max(doc.scrollHeight, body ? body.scrollHeight : 0, doc.clientHeight); ",
                "return [width, height];"
            )
            .to_owned(),
            Self::Element(_) => format!(
                "var el = {}; return [el.scrollWidth, el.scrollHeight];",
                self.element_expression()
            ),
        }
    }
}

/// Parse a `[a, b]` script result.
fn parse_pair(value: Value, what: &str) -> anyhow::Result<(f64, f64)> {
    let [first, second]: [f64; 2] = serde_json::from_value(value)
        .with_context(|| format!("{what} script did not return a pair of numbers"))?;
    Ok((first, second))
}

fn pair_to_location((x, y): (f64, f64)) -> Location {
    Location::new(x.round() as i32, y.round() as i32)
}

fn pair_to_size((width, height): (f64, f64)) -> RectangleSize {
    RectangleSize::new(width.max(0.0).ceil() as u32, height.max(0.0).ceil() as u32)
}

/// Snapshots a provider on creation and restores it when dropped.
///
/// Use [`PositionGuard::restore`] on the success path to surface restore failures;
/// a restore from `Drop` can only be logged.
pub struct PositionGuard<'provider, P: PositionProvider + ?Sized> {
    provider: &'provider mut P,
    memento: Option<PositionMemento>,
}

impl<'provider, P: PositionProvider + ?Sized> PositionGuard<'provider, P> {
    /// Snapshot `provider`.
    ///
    /// # Errors
    ///
    /// Propagates the provider's [`PositionProvider::state`] failure.
    pub fn new(provider: &'provider mut P) -> CaptureResult<Self> {
        let memento = provider.state()?;
        debug!("Saved position state at {}", memento.position());
        Ok(Self {
            provider,
            memento: Some(memento),
        })
    }

    /// Restore the snapshot now.
    ///
    /// # Errors
    ///
    /// Propagates the provider's [`PositionProvider::restore_state`] failure.
    pub fn restore(mut self) -> CaptureResult<()> {
        self.memento
            .take()
            .map_or(Ok(()), |memento| self.provider.restore_state(memento))
    }
}

impl<P: PositionProvider + ?Sized> Deref for PositionGuard<'_, P> {
    type Target = P;

    fn deref(&self) -> &Self::Target {
        self.provider
    }
}

impl<P: PositionProvider + ?Sized> DerefMut for PositionGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.provider
    }
}

impl<P: PositionProvider + ?Sized> Drop for PositionGuard<'_, P> {
    fn drop(&mut self) {
        if let Some(memento) = self.memento.take() {
            let position = memento.position();
            if let Err(err) = self.provider.restore_state(memento) {
                warn!("Failed to restore position {position}: {err}");
            }
        }
    }
}

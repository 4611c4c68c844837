//! Native scrolling.

use super::{PositionMemento, PositionProvider, PositionTarget, pair_to_location, pair_to_size, parse_pair};
use crate::error::{CaptureError, CaptureResult};
use crate::script::ScriptExecutor;
use geometry::{Location, RectangleSize};
use log::{debug, trace};
use std::rc::Rc;

const DOCUMENT_POSITION_SCRIPT: &str = concat!(
    "var doc = document.documentElement; ",
    "var x = window.scrollX || ((window.pageXOffset || doc.scrollLeft) - (doc.clientLeft || 0)); ",
    "var y = window.scrollY || ((window.pageYOffset || doc.scrollTop) - (doc.clientTop || 0)); ",
    "return [x, y];"
);

/// Positions a document or element by scrolling it.
pub struct ScrollPositionProvider {
    executor: Rc<dyn ScriptExecutor>,
    target: PositionTarget,
}

impl ScrollPositionProvider {
    /// Scroll the active context's document.
    pub fn document(executor: Rc<dyn ScriptExecutor>) -> Self {
        Self {
            executor,
            target: PositionTarget::Document,
        }
    }

    /// Scroll the element matching `selector` inside its own box.
    pub fn element(executor: Rc<dyn ScriptExecutor>, selector: &str) -> Self {
        Self {
            executor,
            target: PositionTarget::Element(selector.to_owned()),
        }
    }

    pub const fn target(&self) -> &PositionTarget {
        &self.target
    }

    fn position_script(&self) -> String {
        match &self.target {
            PositionTarget::Document => DOCUMENT_POSITION_SCRIPT.to_owned(),
            PositionTarget::Element(_) => format!(
                "var el = {}; return [el.scrollLeft, el.scrollTop];",
                self.target.element_expression()
            ),
        }
    }

    fn set_position_script(&self, location: Location) -> String {
        match &self.target {
            PositionTarget::Document => format!("window.scrollTo({}, {});", location.x, location.y),
            PositionTarget::Element(_) => format!(
                "var el = {}; el.scrollLeft = {}; el.scrollTop = {};",
                self.target.element_expression(),
                location.x,
                location.y
            ),
        }
    }
}

impl PositionProvider for ScrollPositionProvider {
    fn current_position(&self) -> Option<Location> {
        self.executor
            .execute_script(&self.position_script())
            .and_then(|value| parse_pair(value, "scroll position"))
            .map(pair_to_location)
            .inspect_err(|err| debug!("Could not read scroll position: {err:#}"))
            .ok()
    }

    fn set_position(&mut self, location: Location) -> CaptureResult<()> {
        trace!("Scrolling to {location}");
        self.executor
            .execute_script(&self.set_position_script(location))
            .map_err(|err| CaptureError::PositionUpdateFailed(format!("{err:#}")))?;
        Ok(())
    }

    fn entire_size(&self) -> CaptureResult<RectangleSize> {
        let value = self
            .executor
            .execute_script(&self.target.entire_size_script())
            .and_then(|value| parse_pair(value, "entire size"))
            .map_err(|err| CaptureError::PositionQueryFailed(format!("{err:#}")))?;
        let size = pair_to_size(value);
        debug!("Entire size: {size}");
        Ok(size)
    }

    fn state(&self) -> CaptureResult<PositionMemento> {
        self.current_position()
            .map(PositionMemento::from_position)
            .ok_or_else(|| CaptureError::PositionQueryFailed("scroll position unavailable".to_owned()))
    }

    fn restore_state(&mut self, memento: PositionMemento) -> CaptureResult<()> {
        self.set_position(memento.position())
    }
}

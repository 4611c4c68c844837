//! Positioning by translating the content layer.
//!
//! Elements with fixed or sticky positioning stay put when a page scrolls, so a
//! scrolled capture repeats them in every tile. Translating the content layer
//! instead moves everything, and the captures line up like a single tall image.

use super::{PositionMemento, PositionProvider, PositionTarget, pair_to_size, parse_pair};
use crate::error::{CaptureError, CaptureResult};
use crate::script::{ScriptExecutor, string_literal};
use anyhow::Context as _;
use core::fmt::Write as _;
use geometry::{Location, RectangleSize};
use log::{debug, trace};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Style properties written on every move.
const TRANSFORM_KEYS: [&str; 2] = ["transform", "webkitTransform"];

/// Positions a document or element through a CSS `translate` transform.
pub struct CssTranslatePositionProvider {
    executor: Rc<dyn ScriptExecutor>,
    target: PositionTarget,
    last_set_position: Option<Location>,
}

impl CssTranslatePositionProvider {
    /// Translate the active context's root element.
    pub fn document(executor: Rc<dyn ScriptExecutor>) -> Self {
        Self {
            executor,
            target: PositionTarget::Document,
            last_set_position: None,
        }
    }

    /// Translate the element matching `selector`.
    pub fn element(executor: Rc<dyn ScriptExecutor>, selector: &str) -> Self {
        Self {
            executor,
            target: PositionTarget::Element(selector.to_owned()),
            last_set_position: None,
        }
    }

    pub const fn target(&self) -> &PositionTarget {
        &self.target
    }

    fn write_transforms<'value>(
        &self,
        values: impl Iterator<Item = (&'value str, &'value str)>,
    ) -> anyhow::Result<()> {
        let mut script = format!("var el = {}; ", self.target.element_expression());
        for (key, value) in values {
            let _ignore = write!(
                script,
                "el.style[{}] = {}; ",
                string_literal(key),
                string_literal(value)
            );
        }
        self.executor.execute_script(script.trim_end())?;
        Ok(())
    }

    fn read_transforms(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let reads = TRANSFORM_KEYS
            .iter()
            .map(|key| format!("{}: el.style[{}] || ''", string_literal(key), string_literal(key)))
            .collect::<Vec<_>>()
            .join(", ");
        let script = format!("var el = {}; return {{{reads}}};", self.target.element_expression());
        let value = self.executor.execute_script(&script)?;
        serde_json::from_value(value).context("transform script did not return an object of strings")
    }
}

impl PositionProvider for CssTranslatePositionProvider {
    /// The content layer has no readable position; the last translation set is it.
    fn current_position(&self) -> Option<Location> {
        self.last_set_position
    }

    fn set_position(&mut self, location: Location) -> CaptureResult<()> {
        trace!("Translating content to {location}");
        let transform = format!("translate({}px, {}px)", -location.x, -location.y);
        self.write_transforms(TRANSFORM_KEYS.iter().map(|key| (*key, transform.as_str())))
            .map_err(|err| CaptureError::PositionUpdateFailed(format!("{err:#}")))?;
        self.last_set_position = Some(location);
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
        let transforms = self
            .read_transforms()
            .map_err(|err| CaptureError::PositionQueryFailed(format!("{err:#}")))?;
        Ok(PositionMemento::with_transforms(
            self.last_set_position.unwrap_or(Location::ZERO),
            transforms,
        ))
    }

    fn restore_state(&mut self, memento: PositionMemento) -> CaptureResult<()> {
        match memento.transforms() {
            Some(transforms) => {
                self.write_transforms(
                    transforms
                        .iter()
                        .map(|(key, value)| (key.as_str(), value.as_str())),
                )
                .map_err(|err| CaptureError::PositionUpdateFailed(format!("{err:#}")))?;
                self.last_set_position = Some(memento.position());
                Ok(())
            }
            None => self.set_position(memento.position()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::testing::RecordingExecutor;
    use serde_json::json;

    fn provider(executor: &Rc<RecordingExecutor>) -> CssTranslatePositionProvider {
        CssTranslatePositionProvider::document(Rc::clone(executor) as Rc<dyn ScriptExecutor>)
    }

    /// Moving writes a negative translation and remembers the position.
    ///
    /// # Panics
    /// Panics if the transform or the tracked position is wrong.
    #[test]
    #[allow(clippy::unwrap_used, reason = "Test code may use unwrap for simplicity")]
    fn set_position_translates() {
        let executor = Rc::new(RecordingExecutor::default());
        let mut provider = provider(&executor);
        assert_eq!(provider.current_position(), None);
        provider.set_position(Location::new(0, 750)).unwrap();
        assert_eq!(
            executor.last_script(),
            concat!(
                r#"var el = document.documentElement; "#,
                r#"el.style["transform"] = "translate(0px, -750px)"; "#,
                r#"el.style["webkitTransform"] = "translate(0px, -750px)";"#
            )
        );
        assert_eq!(provider.current_position(), Some(Location::new(0, 750)));
    }

    /// Saved transforms are written back verbatim on restore.
    ///
    /// # Panics
    /// Panics if the original transform is not restored.
    #[test]
    #[allow(clippy::unwrap_used, reason = "Test code may use unwrap for simplicity")]
    fn restore_writes_saved_transforms() {
        let executor = Rc::new(RecordingExecutor::default());
        let mut provider = provider(&executor);
        executor.respond(json!({"transform": "scale(2)", "webkitTransform": ""}));
        let memento = provider.state().unwrap();
        assert_eq!(memento.position(), Location::ZERO);
        assert_eq!(
            memento.transforms().and_then(|saved| saved.get("transform")).map(String::as_str),
            Some("scale(2)")
        );

        provider.set_position(Location::new(0, 400)).unwrap();
        provider.restore_state(memento).unwrap();
        assert!(executor.last_script().contains(r#"el.style["transform"] = "scale(2)";"#));
        assert_eq!(provider.current_position(), Some(Location::ZERO));
    }

    /// An unreadable style is a query failure.
    ///
    /// # Panics
    /// Panics if the failure is misclassified.
    #[test]
    fn unreadable_state_fails() {
        let executor = Rc::new(RecordingExecutor::default());
        let provider = provider(&executor);
        executor.respond(json!([1, 2]));
        assert!(matches!(provider.state(), Err(CaptureError::PositionQueryFailed(_))));
    }

    /// Element targets are selected by literal selector.
    ///
    /// # Panics
    /// Panics if the element expression is wrong.
    #[test]
    #[allow(clippy::unwrap_used, reason = "Test code may use unwrap for simplicity")]
    fn element_target() {
        let executor = Rc::new(RecordingExecutor::default());
        let mut provider =
            CssTranslatePositionProvider::element(Rc::clone(&executor) as Rc<dyn ScriptExecutor>, "main");
        provider.set_position(Location::new(1, 2)).unwrap();
        assert!(
            executor
                .last_script()
                .starts_with(r#"var el = document.querySelector("main");"#)
        );
    }
}

//! Access to a scriptable rendering surface.

use serde_json::Value;

/// Runs a script in the active context and hands back its JSON result.
///
/// Scripts end with a `return` statement; a script without one yields `Value::Null`.
pub trait ScriptExecutor {
    /// Execute `script` in the active context.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface rejects the script or the script throws.
    fn execute_script(&self, script: &str) -> anyhow::Result<Value>;
}

/// Quote `text` as a script string literal.
pub fn string_literal(text: &str) -> String {
    Value::String(text.to_owned()).to_string()
}

#[cfg(test)]
pub mod testing {
    use super::ScriptExecutor;
    use anyhow::anyhow;
    use core::cell::RefCell;
    use serde_json::Value;
    use std::collections::VecDeque;

    /// Executor that records every script and replays canned results.
    #[derive(Default)]
    pub struct RecordingExecutor {
        pub scripts: RefCell<Vec<String>>,
        responses: RefCell<VecDeque<Result<Value, String>>>,
    }

    impl RecordingExecutor {
        pub fn respond(&self, value: Value) {
            self.responses.borrow_mut().push_back(Ok(value));
        }

        pub fn fail(&self, message: &str) {
            self.responses.borrow_mut().push_back(Err(message.to_owned()));
        }

        pub fn last_script(&self) -> String {
            self.scripts.borrow().last().cloned().unwrap_or_default()
        }
    }

    impl ScriptExecutor for RecordingExecutor {
        fn execute_script(&self, script: &str) -> anyhow::Result<Value> {
            self.scripts.borrow_mut().push(script.to_owned());
            let response = self.responses.borrow_mut().pop_front();
            match response {
                Some(Ok(value)) => Ok(value),
                Some(Err(message)) => Err(anyhow!(message)),
                None => Ok(Value::Null),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Selectors are quoted and escaped.
    ///
    /// # Panics
    /// Panics if escaping is wrong.
    #[test]
    fn literal_escapes_quotes() {
        assert_eq!(string_literal(r#"div[title="a"]"#), r#""div[title=\"a\"]""#);
    }
}

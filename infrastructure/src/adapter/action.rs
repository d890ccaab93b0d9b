//! Closure adapter for tool actions.

use async_trait::async_trait;
use serde_json::{Map, Value};

use formfix_application::ports::action::{ActionError, ToolActionPort};

/// Adapter turning a plain closure into a [`ToolActionPort`].
///
/// Covers synchronous business actions; actions that genuinely suspend
/// implement [`ToolActionPort`] directly.
pub struct FnToolAction<F> {
    func: F,
}

impl<F> FnToolAction<F>
where
    F: Fn(&Map<String, Value>) -> Result<Value, ActionError> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> ToolActionPort for FnToolAction<F>
where
    F: Fn(&Map<String, Value>) -> Result<Value, ActionError> + Send + Sync,
{
    async fn execute(&self, value: &Map<String, Value>) -> Result<Value, ActionError> {
        (self.func)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn closure_action_runs_against_the_value() {
        let action = FnToolAction::new(|value: &Map<String, Value>| {
            Ok(json!({"echo": Value::Object(value.clone())}))
        });

        let value = json!({"departure": "London"});
        let output = action.execute(value.as_object().unwrap()).await.unwrap();
        assert_eq!(output["echo"]["departure"], json!("London"));
    }
}

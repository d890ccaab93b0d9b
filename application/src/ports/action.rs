//! Tool action port.
//!
//! The tool's actual business action. The surrounding framework invokes it
//! only after a fixup produced an acceptance; the fixup engine itself never
//! calls it.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Error raised by a tool action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("action failed: {0}")]
    Failed(String),
}

/// Port for the tool's business action.
///
/// Implementations (adapters) live in the infrastructure layer or in the
/// embedding application.
#[async_trait]
pub trait ToolActionPort: Send + Sync {
    /// Run the action against a fully validated, normalized value.
    async fn execute(&self, value: &Map<String, Value>) -> Result<Value, ActionError>;
}

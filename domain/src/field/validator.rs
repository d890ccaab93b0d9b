//! Field validator abstraction.
//!
//! Per-field validation is async: a validator may suspend on external work
//! (inventory lookups, availability checks) before yielding its outcome.
//! The fixup engine awaits validators strictly one at a time, in evaluation
//! order, and performs no blocking work of its own.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::value_objects::{ContextView, FieldOutcome};

/// Unexpected fault raised by a validator.
///
/// Faults are absorbed by the engine and translated into a refusal outcome
/// for that field; they never escape to the caller as a crash. A faulted
/// field still blocks its dependents the usual way.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidatorFault {
    /// Description of the fault.
    pub message: String,
}

impl ValidatorFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ValidatorFault {
    fn from(message: String) -> Self {
        Self { message }
    }
}

/// Validator for a single field.
///
/// `raw` is the caller-provided value for the field, absent when the caller
/// has not filled it yet. `context` exposes the *normalized* values of the
/// field's hard dependencies, plus any declared influences that happen to
/// be validated already.
#[async_trait]
pub trait FieldValidator: Send + Sync {
    async fn validate(
        &self,
        raw: Option<&Value>,
        context: &ContextView,
    ) -> Result<FieldOutcome, ValidatorFault>;
}

/// Adapter turning a plain closure into a [`FieldValidator`].
///
/// Covers the common case of synchronous validation logic. Validators that
/// genuinely suspend implement [`FieldValidator`] directly.
pub struct FnValidator<F> {
    func: F,
}

impl<F> FnValidator<F>
where
    F: Fn(Option<&Value>, &ContextView) -> FieldOutcome + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> FieldValidator for FnValidator<F>
where
    F: Fn(Option<&Value>, &ContextView) -> FieldOutcome + Send + Sync,
{
    async fn validate(
        &self,
        raw: Option<&Value>,
        context: &ContextView,
    ) -> Result<FieldOutcome, ValidatorFault> {
        Ok((self.func)(raw, context))
    }
}

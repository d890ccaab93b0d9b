//! Run Fixup use case.
//!
//! The incremental validator: walks the spec's precomputed evaluation order
//! over a raw partial input, short-circuits fields whose hard dependencies
//! are unresolved, and aggregates the per-field outcomes into a single
//! accept/reject result.
//!
//! The walk is strictly sequential. A field's validator may suspend on
//! external work, but the next field is never touched until the current
//! outcome is fully resolved — downstream validators consume the
//! *normalized* values of their dependencies, so there is nothing sound to
//! run ahead of time.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use formfix_domain::{
    FieldOutcome, FixupInput, FixupResult, FixupSpec, OutcomeViolation, ValidationContext,
};

use crate::ports::progress::{FixupProgressNotifier, NoFixupProgress};
use crate::ports::shape_check::ShapeCheckPort;
use crate::use_cases::shared::check_cancelled;

/// Refusal reason substituted for a structurally malformed validator
/// outcome under the lenient policy.
const MALFORMED_OUTCOME_REASON: &str = "field validator produced malformed feedback";

/// How the walk treats a validator outcome that violates the structural
/// invariants.
///
/// A violation is a programming error in the validator, not a user input
/// problem, and must not silently corrupt the protocol contract
/// downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvariantPolicy {
    /// Log the violation and substitute a generic refusal so the caller
    /// still receives a well-formed result. Production default.
    #[default]
    Lenient,
    /// Fail the call with [`FixupError::MalformedOutcome`]. Development
    /// and test mode.
    Strict,
}

/// Errors surfaced by [`RunFixupUseCase::execute`].
///
/// Validator faults are *not* here: they are absorbed into the faulted
/// field's outcome, so the caller receives a well-formed [`FixupResult`]
/// for any syntactically valid input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FixupError {
    /// The caller aborted the call; the partial context is discarded.
    #[error("fixup cancelled")]
    Cancelled,

    /// A validator returned a malformed outcome under
    /// [`InvariantPolicy::Strict`].
    #[error("validator for field '{field}' returned a malformed outcome: {violation}")]
    MalformedOutcome {
        field: String,
        violation: OutcomeViolation,
    },
}

impl FixupError {
    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FixupError::Cancelled)
    }
}

/// Use case driving one fixup call.
///
/// Holds the immutable spec (shared read-only across concurrent calls) and
/// per-instance behavior: optional shape checking, progress notification,
/// cooperative cancellation, and the invariant policy. Each
/// [`execute`](Self::execute) runs a fresh, stateless evaluation — nothing
/// is cached across calls.
pub struct RunFixupUseCase {
    spec: Arc<FixupSpec>,
    shape_check: Option<Arc<dyn ShapeCheckPort>>,
    progress: Arc<dyn FixupProgressNotifier>,
    cancellation_token: Option<CancellationToken>,
    invariant_policy: InvariantPolicy,
}

impl RunFixupUseCase {
    pub fn new(spec: Arc<FixupSpec>) -> Self {
        Self {
            spec,
            shape_check: None,
            progress: Arc::new(NoFixupProgress),
            cancellation_token: None,
            invariant_policy: InvariantPolicy::default(),
        }
    }

    /// Check the assembled value against the declared shape before
    /// accepting.
    pub fn with_shape_check(mut self, port: Arc<dyn ShapeCheckPort>) -> Self {
        self.shape_check = Some(port);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn FixupProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn with_invariant_policy(mut self, policy: InvariantPolicy) -> Self {
        self.invariant_policy = policy;
        self
    }

    pub fn spec(&self) -> &Arc<FixupSpec> {
        &self.spec
    }

    /// Run one fixup walk over `input`.
    ///
    /// Fields are evaluated strictly sequentially in the precomputed
    /// order; a field's validator runs only once every outcome in its
    /// `requires` set is valid. Yields a well-formed [`FixupResult`]
    /// unless the call is cancelled (or a validator misbehaves under the
    /// strict invariant policy).
    pub async fn execute(&self, input: &FixupInput) -> Result<FixupResult, FixupError> {
        let mut context = ValidationContext::new();
        let mut valid_fields: HashSet<String> = HashSet::new();
        let mut outcomes: Vec<(String, FieldOutcome)> = Vec::with_capacity(self.spec.len());

        for decl in self.spec.ordered_fields() {
            check_cancelled(&self.cancellation_token)?;

            // Unmet hard dependencies block the field without invoking its
            // validator: validating on top of untrusted prerequisites is
            // meaningless, and validators may perform expensive external
            // work.
            let unmet: Vec<String> = decl
                .requires
                .iter()
                .filter(|name| !valid_fields.contains(name.as_str()))
                .cloned()
                .collect();
            if !unmet.is_empty() {
                debug!(field = %decl.name, unmet = ?unmet, "dependencies unresolved, field blocked");
                self.progress.on_field_blocked(&decl.name, &unmet);
                outcomes.push((decl.name.clone(), FieldOutcome::blocked_on(unmet)));
                continue;
            }

            // The validator sees exactly its declared dependencies, plus
            // any influences that happen to be validated already.
            let mut visible: Vec<&str> = decl.requires.iter().map(String::as_str).collect();
            for influence in &decl.influenced_by {
                if context.contains(influence) && !visible.contains(&influence.as_str()) {
                    visible.push(influence);
                }
            }
            let view = context.view(visible);

            self.progress.on_field_start(&decl.name);
            let raw = input.get(&decl.name);

            let outcome = match decl.validator().validate(raw, &view).await {
                Ok(outcome) => self.screen_outcome(&decl.name, outcome)?,
                Err(fault) => {
                    warn!(field = %decl.name, fault = %fault, "validator fault absorbed into refusal");
                    FieldOutcome::refused(fault.to_string())
                }
            };

            self.progress.on_field_outcome(&decl.name, outcome.valid);

            if outcome.valid {
                // Downstream fields consume the validator's normalized
                // value; when it yields none, the raw value is already
                // canonical.
                let normalized = outcome
                    .normalized_value
                    .clone()
                    .or_else(|| raw.cloned())
                    .unwrap_or(Value::Null);
                context.insert(decl.name.clone(), normalized);
                valid_fields.insert(decl.name.clone());
            }
            outcomes.push((decl.name.clone(), outcome));
        }

        // Submission-level feasibility: the declared shape is only proven
        // when every field validated individually.
        let mut reasons = Vec::new();
        if outcomes.iter().all(|(_, outcome)| outcome.valid)
            && let Some(shape_check) = &self.shape_check
        {
            let assembled = context.to_object(outcomes.iter().map(|(name, _)| name.as_str()));
            if let Err(mismatch) = shape_check.check(&assembled) {
                warn!(%mismatch, "assembled value fails the declared shape");
                reasons.push(mismatch.to_string());
            }
        }

        let result = FixupResult::aggregate(&outcomes, &context, reasons);
        self.progress.on_result(result.is_accepted());
        Ok(result)
    }

    /// Enforce the structural invariants on a validator-returned outcome.
    fn screen_outcome(
        &self,
        field: &str,
        outcome: FieldOutcome,
    ) -> Result<FieldOutcome, FixupError> {
        match outcome.check_invariants() {
            Ok(()) => Ok(outcome),
            Err(violation) => match self.invariant_policy {
                InvariantPolicy::Strict => Err(FixupError::MalformedOutcome {
                    field: field.to_string(),
                    violation,
                }),
                InvariantPolicy::Lenient => {
                    error!(field = %field, violation = %violation, "validator outcome violates structural invariants");
                    Ok(FieldOutcome::refused(MALFORMED_OUTCOME_REASON))
                }
            },
        }
    }
}

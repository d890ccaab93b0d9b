//! Field value objects — per-field outcomes and the call-level result.
//!
//! These types form the **output side** of the fixup pipeline. Every field
//! evaluation produces a [`FieldOutcome`]; one full walk aggregates them
//! into a [`FixupResult`].
//!
//! The serialized form is the interchange shape consumed by orchestration
//! frameworks, so member names are camelCase on the wire
//! (`refusalReasons`, `requiresValidParameters`, `allowedValues`,
//! `suggestedValues`, `validationResults`).
//!
//! Structural invariants on an outcome:
//!
//! | Invariant | Rule |
//! |-----------|------|
//! | at-least-one | an invalid outcome carries `refusalReasons` and/or `requiresValidParameters` |
//! | at-most-one | `allowedValues` and `suggestedValues` never appear together |
//! | non-empty-list | every list member is non-empty when present, except `allowedValues`, which may be empty ("no option currently satisfies the constraints") |

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Structural violation in a validator-returned outcome.
///
/// A violation is a programming error in the validator, not a user input
/// problem; the engine surfaces it distinctly instead of passing the
/// malformed outcome through.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OutcomeViolation {
    #[error("invalid outcome carries neither refusal reasons nor unmet dependencies")]
    MissingFeedback,

    #[error("allowedValues and suggestedValues are mutually exclusive")]
    ConflictingValueSets,

    #[error("{list} must not be empty when present")]
    EmptyList { list: &'static str },
}

/// Outcome of evaluating one field.
///
/// Produced by field validators (or by the engine itself for blocked
/// fields) and aggregated into a [`FixupResult`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOutcome {
    /// Whether the field's raw value was accepted.
    pub valid: bool,
    /// Canonical form of the value as produced by the validator. Absent on
    /// a valid outcome means the raw value is already canonical.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_value: Option<Value>,
    /// Why the value was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refusal_reasons: Option<Vec<String>>,
    /// Direct dependencies that must become valid before this field can be
    /// evaluated, in declaration order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_valid_parameters: Option<Vec<String>>,
    /// Exhaustive set of values that would currently be accepted. May be
    /// empty: no option satisfies the constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
    /// Non-exhaustive hints at values likely to be accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_values: Option<Vec<Value>>,
}

impl FieldOutcome {
    /// Valid outcome with an explicitly normalized value.
    pub fn accepted(normalized: impl Into<Value>) -> Self {
        Self {
            valid: true,
            normalized_value: Some(normalized.into()),
            ..Self::default()
        }
    }

    /// Valid outcome that keeps the caller's raw value as the canonical one.
    pub fn accepted_verbatim() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    /// Invalid outcome with a single refusal reason.
    pub fn refused(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            refusal_reasons: Some(vec![reason.into()]),
            ..Self::default()
        }
    }

    /// Invalid outcome with several refusal reasons.
    pub fn refused_all(reasons: Vec<String>) -> Self {
        Self {
            valid: false,
            refusal_reasons: Some(reasons),
            ..Self::default()
        }
    }

    /// Blocked outcome: the named dependencies are not yet valid, so the
    /// field's validator was not invoked.
    pub fn blocked_on(unmet: Vec<String>) -> Self {
        Self {
            valid: false,
            requires_valid_parameters: Some(unmet),
            ..Self::default()
        }
    }

    /// Append a refusal reason.
    pub fn with_refusal_reason(mut self, reason: impl Into<String>) -> Self {
        self.refusal_reasons
            .get_or_insert_with(Vec::new)
            .push(reason.into());
        self
    }

    /// Attach the exhaustive set of currently acceptable values. Replaces
    /// any suggested values: the two sets are mutually exclusive.
    pub fn with_allowed_values(mut self, values: Vec<Value>) -> Self {
        self.allowed_values = Some(values);
        self.suggested_values = None;
        self
    }

    /// Attach non-exhaustive value hints. Replaces any allowed values: the
    /// two sets are mutually exclusive.
    pub fn with_suggested_values(mut self, values: Vec<Value>) -> Self {
        self.suggested_values = Some(values);
        self.allowed_values = None;
        self
    }

    /// Set the normalized value.
    pub fn with_normalized(mut self, value: impl Into<Value>) -> Self {
        self.normalized_value = Some(value.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether this field was skipped because of unresolved dependencies.
    pub fn is_blocked(&self) -> bool {
        !self.valid && self.requires_valid_parameters.is_some()
    }

    /// Whether the outcome narrows the acceptable value set.
    pub fn has_value_hints(&self) -> bool {
        self.allowed_values.is_some() || self.suggested_values.is_some()
    }

    /// Check the structural invariants this outcome must obey.
    pub fn check_invariants(&self) -> Result<(), OutcomeViolation> {
        if !self.valid
            && self.refusal_reasons.is_none()
            && self.requires_valid_parameters.is_none()
        {
            return Err(OutcomeViolation::MissingFeedback);
        }
        if self.allowed_values.is_some() && self.suggested_values.is_some() {
            return Err(OutcomeViolation::ConflictingValueSets);
        }
        if self.refusal_reasons.as_ref().is_some_and(Vec::is_empty) {
            return Err(OutcomeViolation::EmptyList {
                list: "refusalReasons",
            });
        }
        if self
            .requires_valid_parameters
            .as_ref()
            .is_some_and(Vec::is_empty)
        {
            return Err(OutcomeViolation::EmptyList {
                list: "requiresValidParameters",
            });
        }
        if self.suggested_values.as_ref().is_some_and(Vec::is_empty) {
            return Err(OutcomeViolation::EmptyList {
                list: "suggestedValues",
            });
        }
        // allowedValues may legitimately be empty.
        Ok(())
    }
}

/// Mapping from field name to its normalized value, built incrementally
/// during one fixup call and discarded afterwards.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    values: HashMap<String, Value>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field's normalized value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// View restricted to the `visible` names currently in the context.
    pub fn view<'a>(&self, visible: impl IntoIterator<Item = &'a str>) -> ContextView {
        let mut values = HashMap::new();
        for name in visible {
            if let Some(value) = self.values.get(name) {
                values.insert(name.to_string(), value.clone());
            }
        }
        ContextView { values }
    }

    /// Assemble the context into one object, in `names` order. Names with
    /// no recorded value become JSON null.
    pub fn to_object<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Map<String, Value> {
        let mut object = Map::new();
        for name in names {
            let value = self.values.get(name).cloned().unwrap_or(Value::Null);
            object.insert(name.to_string(), value);
        }
        object
    }
}

/// Read-only lookup capability handed to a validator.
///
/// Scoped to exactly the field's declared `requires` set, plus any
/// `influencedBy` fields that happen to be validated already. The view is
/// over *normalized* values, never the caller's raw input.
#[derive(Debug, Clone, Default)]
pub struct ContextView {
    values: HashMap<String, Value>,
}

impl ContextView {
    /// View with nothing visible, for fields without dependencies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a view directly from values. Mostly useful in tests.
    pub fn from_values(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Get a dependency's value as a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    /// Get a dependency's value as an i64.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    /// Get a dependency's value as a bool.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Call-level result of one fixup walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FixupResult {
    /// Every field validated; carries the fully normalized value.
    #[serde(rename_all = "camelCase")]
    Accepted { value: Map<String, Value> },
    /// At least one field is invalid or blocked, and/or the submission is
    /// infeasible as a whole. Never carries zero information.
    #[serde(rename_all = "camelCase")]
    Rejected {
        /// Per-field feedback for every invalid or blocked field, plus
        /// valid fields whose acceptable value set narrowed.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        validation_results: BTreeMap<String, FieldOutcome>,
        /// Submission-level rejection reasons, independent of any single
        /// field.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        reasons: Vec<String>,
    },
}

impl FixupResult {
    /// Aggregate per-field outcomes into one result.
    ///
    /// `outcomes` must be in evaluation order; `context` holds the
    /// normalized value of every valid field. Individually valid fields are
    /// omitted from a rejection's per-field map (they carry no actionable
    /// feedback) unless they narrow the acceptable value set. A rejection
    /// always carries at least one field entry or one top-level reason.
    pub fn aggregate(
        outcomes: &[(String, FieldOutcome)],
        context: &ValidationContext,
        reasons: Vec<String>,
    ) -> Self {
        let all_valid = outcomes.iter().all(|(_, outcome)| outcome.valid);
        if all_valid && reasons.is_empty() {
            let value = context.to_object(outcomes.iter().map(|(name, _)| name.as_str()));
            return FixupResult::Accepted { value };
        }

        let validation_results = outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.valid || outcome.has_value_hints())
            .map(|(name, outcome)| (name.clone(), outcome.clone()))
            .collect();

        FixupResult::Rejected {
            validation_results,
            reasons,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, FixupResult::Accepted { .. })
    }

    /// The fully normalized value, when accepted.
    pub fn accepted_value(&self) -> Option<&Map<String, Value>> {
        match self {
            FixupResult::Accepted { value } => Some(value),
            FixupResult::Rejected { .. } => None,
        }
    }

    /// Per-field feedback for `name`, when rejected.
    pub fn field_result(&self, name: &str) -> Option<&FieldOutcome> {
        match self {
            FixupResult::Accepted { .. } => None,
            FixupResult::Rejected {
                validation_results, ..
            } => validation_results.get(name),
        }
    }

    /// Top-level rejection reasons. Empty for an acceptance.
    pub fn reasons(&self) -> &[String] {
        match self {
            FixupResult::Accepted { .. } => &[],
            FixupResult::Rejected { reasons, .. } => reasons,
        }
    }
}

//! Callable fixup tool adapter.
//!
//! [`FixupToolAdapter`] exposes one fixup spec as a callable tool: the host
//! framework advertises [`schema`](FixupToolAdapter::schema), forwards raw
//! arguments to [`call`](FixupToolAdapter::call), and relays the response
//! to the model. The configured action runs only after an acceptance; a
//! rejection carries the structured per-field feedback instead, so the
//! model can fill in or fix the offending fields and call again.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use formfix_application::ports::action::ToolActionPort;
use formfix_application::ports::progress::FixupProgressNotifier;
use formfix_application::use_cases::run_fixup::{FixupError, InvariantPolicy, RunFixupUseCase};
use formfix_domain::{FixupInput, FixupResult, FixupSpec};

use crate::adapter::schema::JsonSchemaSpecConverter;
use crate::shape::DeclaredShapeChecker;

/// Response returned to the host framework for one tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    /// Name of the tool that was called.
    pub tool_name: String,
    /// Whether the fixup accepted the arguments.
    pub accepted: bool,
    /// Output of the tool action, present when the fixup was accepted and
    /// an action is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_output: Option<Value>,
    /// Error raised by the tool action, if it ran and failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_error: Option<String>,
    /// Structured fixup feedback in interchange form.
    pub fixup: FixupResult,
}

/// One fixup spec exposed as a callable tool.
pub struct FixupToolAdapter {
    spec: Arc<FixupSpec>,
    fixup: RunFixupUseCase,
    action: Option<Arc<dyn ToolActionPort>>,
}

impl FixupToolAdapter {
    /// Create an adapter with the default shape check derived from the
    /// spec's declared value kinds.
    pub fn new(spec: Arc<FixupSpec>) -> Self {
        let shape_check = Arc::new(DeclaredShapeChecker::from_spec(&spec));
        let fixup = RunFixupUseCase::new(spec.clone()).with_shape_check(shape_check);
        Self {
            spec,
            fixup,
            action: None,
        }
    }

    /// Attach the tool's business action, invoked only on acceptance.
    pub fn with_action(mut self, action: Arc<dyn ToolActionPort>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn FixupProgressNotifier>) -> Self {
        self.fixup = self.fixup.with_progress(progress);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.fixup = self.fixup.with_cancellation(token);
        self
    }

    pub fn with_invariant_policy(mut self, policy: InvariantPolicy) -> Self {
        self.fixup = self.fixup.with_invariant_policy(policy);
        self
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn description(&self) -> &str {
        self.spec.description()
    }

    /// JSON Schema declaration the host framework advertises to the model.
    pub fn schema(&self) -> Value {
        JsonSchemaSpecConverter.spec_to_schema(&self.spec)
    }

    /// Run one fixup over `arguments` and, on acceptance, the configured
    /// action.
    pub async fn call(
        &self,
        arguments: HashMap<String, Value>,
    ) -> Result<ToolResponse, FixupError> {
        debug!(tool = self.spec.name(), "fixup tool call");
        let input = FixupInput::from(arguments);
        let result = self.fixup.execute(&input).await?;

        let mut response = ToolResponse {
            tool_name: self.spec.name().to_string(),
            accepted: result.is_accepted(),
            action_output: None,
            action_error: None,
            fixup: result,
        };

        if let (Some(action), FixupResult::Accepted { value }) = (&self.action, &response.fixup) {
            match action.execute(value).await {
                Ok(output) => {
                    info!(tool = self.spec.name(), "tool action executed");
                    response.action_output = Some(output);
                }
                Err(error) => {
                    warn!(tool = self.spec.name(), error = %error, "tool action failed");
                    response.action_error = Some(error.to_string());
                }
            }
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::adapter::action::FnToolAction;
    use formfix_domain::{ContextView, FieldDecl, FieldOutcome, FnValidator, ValueKind};

    fn booking_spec() -> Arc<FixupSpec> {
        let city = FieldDecl::new(
            "city",
            "Destination city",
            FnValidator::new(|raw: Option<&Value>, _: &ContextView| {
                let known = ["Berlin", "London"];
                match raw.and_then(Value::as_str) {
                    Some(city) if known.contains(&city) => FieldOutcome::accepted(city),
                    Some(city) => FieldOutcome::refused(format!("unknown city {city}"))
                        .with_allowed_values(known.iter().map(|c| json!(c)).collect()),
                    None => FieldOutcome::refused("city is required")
                        .with_allowed_values(known.iter().map(|c| json!(c)).collect()),
                }
            }),
        );

        let guests = FieldDecl::new(
            "guests",
            "Number of guests",
            FnValidator::new(|raw: Option<&Value>, _: &ContextView| {
                match raw.and_then(Value::as_i64) {
                    Some(count) if count >= 1 => FieldOutcome::accepted(count),
                    Some(_) => FieldOutcome::refused("at least one guest is required"),
                    None => FieldOutcome::refused("guest count is required"),
                }
            }),
        )
        .with_kind(ValueKind::Integer)
        .requires("city");

        Arc::new(
            FixupSpec::builder("book_stay", "Book a stay")
                .field(city)
                .field(guests)
                .build()
                .unwrap(),
        )
    }

    fn counting_action(counter: Arc<AtomicUsize>) -> Arc<dyn ToolActionPort> {
        Arc::new(FnToolAction::new(
            move |value: &serde_json::Map<String, Value>| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"booked": Value::Object(value.clone())}))
            },
        ))
    }

    #[tokio::test]
    async fn rejected_call_never_runs_the_action() {
        let calls = Arc::new(AtomicUsize::new(0));
        let adapter =
            FixupToolAdapter::new(booking_spec()).with_action(counting_action(calls.clone()));

        let mut arguments = HashMap::new();
        arguments.insert("city".to_string(), json!("Tokyo"));
        let response = adapter.call(arguments).await.unwrap();

        assert!(!response.accepted);
        assert!(response.action_output.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let city = response.fixup.field_result("city").unwrap();
        assert_eq!(
            city.allowed_values,
            Some(vec![json!("Berlin"), json!("London")])
        );
        let guests = response.fixup.field_result("guests").unwrap();
        assert!(guests.is_blocked());
    }

    #[tokio::test]
    async fn accepted_call_runs_the_action_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let adapter =
            FixupToolAdapter::new(booking_spec()).with_action(counting_action(calls.clone()));

        let mut arguments = HashMap::new();
        arguments.insert("city".to_string(), json!("Berlin"));
        arguments.insert("guests".to_string(), json!(2));
        let response = adapter.call(arguments).await.unwrap();

        assert!(response.accepted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let output = response.action_output.unwrap();
        assert_eq!(output["booked"]["city"], json!("Berlin"));
        assert_eq!(output["booked"]["guests"], json!(2));
    }

    #[tokio::test]
    async fn accepted_call_without_action_returns_the_value() {
        let adapter = FixupToolAdapter::new(booking_spec());

        let mut arguments = HashMap::new();
        arguments.insert("city".to_string(), json!("London"));
        arguments.insert("guests".to_string(), json!(3));
        let response = adapter.call(arguments).await.unwrap();

        assert!(response.accepted);
        assert!(response.action_output.is_none());
        let value = response.fixup.accepted_value().unwrap();
        assert_eq!(value.get("city"), Some(&json!("London")));
    }

    #[tokio::test]
    async fn failing_action_is_reported_not_propagated() {
        let action: Arc<dyn ToolActionPort> = Arc::new(FnToolAction::new(
            |_: &serde_json::Map<String, Value>| {
                Err(formfix_application::ActionError::Failed(
                    "booking backend unavailable".to_string(),
                ))
            },
        ));
        let adapter = FixupToolAdapter::new(booking_spec()).with_action(action);

        let mut arguments = HashMap::new();
        arguments.insert("city".to_string(), json!("Berlin"));
        arguments.insert("guests".to_string(), json!(1));
        let response = adapter.call(arguments).await.unwrap();

        assert!(response.accepted);
        assert!(response.action_output.is_none());
        assert!(
            response
                .action_error
                .unwrap()
                .contains("booking backend unavailable")
        );
    }

    #[tokio::test]
    async fn response_serializes_in_interchange_form() {
        let adapter = FixupToolAdapter::new(booking_spec());

        let response = adapter.call(HashMap::new()).await.unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["toolName"], json!("book_stay"));
        assert_eq!(json["accepted"], json!(false));
        assert_eq!(json["fixup"]["status"], json!("rejected"));
        assert_eq!(
            json["fixup"]["validationResults"]["guests"]["requiresValidParameters"],
            json!(["city"])
        );
    }

    #[test]
    fn schema_carries_dependency_hints() {
        let adapter = FixupToolAdapter::new(booking_spec());
        let schema = adapter.schema();

        assert_eq!(schema["name"], "book_stay");
        let guests = &schema["input_schema"]["properties"]["guests"];
        assert_eq!(guests["type"], "integer");
        assert!(
            guests["description"]
                .as_str()
                .unwrap()
                .contains("Requires: city.")
        );
    }
}

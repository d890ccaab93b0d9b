//! Field spec entities

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{CycleList, SpecError};
use crate::field::validator::FieldValidator;
use crate::graph::DependencyGraph;

/// Declared kind of a field's normalized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ValueKind {
    pub fn as_str(&self) -> &str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }

    /// Whether `value` structurally matches this kind.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Number => value.is_number(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Array => value.is_array(),
            ValueKind::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declaration of a single fixup field.
///
/// Carries the field's hard dependency set (`requires`), its informational
/// influence set (`influenced_by`), a description, and the validator that
/// judges raw values for it.
#[derive(Clone)]
pub struct FieldDecl {
    /// Field name, unique within a spec.
    pub name: String,
    /// Human-readable description, surfaced in the tool declaration.
    pub description: String,
    /// Declared kind of the normalized value.
    pub kind: ValueKind,
    /// Hard dependencies: every one must be valid before this field's
    /// validator runs.
    pub requires: Vec<String>,
    /// Soft influences: may narrow this field's acceptable values, never
    /// gate evaluation order.
    pub influenced_by: Vec<String>,
    validator: Arc<dyn FieldValidator>,
}

impl FieldDecl {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        validator: impl FieldValidator + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: ValueKind::String,
            requires: Vec::new(),
            influenced_by: Vec::new(),
            validator: Arc::new(validator),
        }
    }

    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a hard dependency. Duplicates are ignored.
    pub fn requires(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.requires.contains(&name) {
            self.requires.push(name);
        }
        self
    }

    /// Add a soft influence. Duplicates are ignored.
    pub fn influenced_by(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.influenced_by.contains(&name) {
            self.influenced_by.push(name);
        }
        self
    }

    pub fn validator(&self) -> &Arc<dyn FieldValidator> {
        &self.validator
    }
}

impl fmt::Debug for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("kind", &self.kind)
            .field("requires", &self.requires)
            .field("influenced_by", &self.influenced_by)
            .finish_non_exhaustive()
    }
}

/// Immutable registry of field declarations with a precomputed evaluation
/// order.
///
/// Built once when a tool is defined via [`FixupSpec::builder`]; shared
/// read-only across every call to that tool. Construction rejects dangling
/// references and dependency cycles, so a usable spec is always a DAG.
#[derive(Debug, Clone)]
pub struct FixupSpec {
    name: String,
    description: String,
    fields: Vec<FieldDecl>,
    index: HashMap<String, usize>,
    order: Vec<usize>,
}

impl FixupSpec {
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> FixupSpecBuilder {
        FixupSpecBuilder {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declarations in declaration order.
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDecl> {
        self.index.get(name).map(|&position| &self.fields[position])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in evaluation order: every field appears after all
    /// members of its `requires` set. Identical across calls for the same
    /// spec.
    pub fn evaluation_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|&position| self.fields[position].name.as_str())
            .collect()
    }

    /// Declarations in evaluation order.
    pub fn ordered_fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.order.iter().map(|&position| &self.fields[position])
    }

    /// Declared output shape: field name and value kind, in declaration
    /// order.
    pub fn output_shape(&self) -> Vec<(String, ValueKind)> {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.kind))
            .collect()
    }
}

/// Builder collecting field declarations for a [`FixupSpec`].
///
/// Validation is two-pass: references are only checked in [`build`], after
/// the full declaration list is known, so declaration order does not
/// constrain which fields may reference which.
///
/// [`build`]: FixupSpecBuilder::build
pub struct FixupSpecBuilder {
    name: String,
    description: String,
    fields: Vec<FieldDecl>,
}

impl FixupSpecBuilder {
    pub fn field(mut self, decl: FieldDecl) -> Self {
        self.fields.push(decl);
        self
    }

    /// Validate references, reject cycles, and precompute the evaluation
    /// order.
    pub fn build(self) -> Result<FixupSpec, SpecError> {
        let mut index = HashMap::with_capacity(self.fields.len());
        for (position, field) in self.fields.iter().enumerate() {
            if index.insert(field.name.clone(), position).is_some() {
                return Err(SpecError::DuplicateField {
                    name: field.name.clone(),
                });
            }
        }

        // Every requires/influencedBy reference must name a declared field.
        let mut edges = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let mut field_edges = Vec::with_capacity(field.requires.len());
            for reference in &field.requires {
                match index.get(reference) {
                    Some(&target) => field_edges.push(target),
                    None => {
                        return Err(SpecError::UnknownRequirement {
                            field: field.name.clone(),
                            reference: reference.clone(),
                        });
                    }
                }
            }
            for reference in &field.influenced_by {
                if !index.contains_key(reference) {
                    return Err(SpecError::UnknownInfluence {
                        field: field.name.clone(),
                        reference: reference.clone(),
                    });
                }
            }
            edges.push(field_edges);
        }

        let graph = DependencyGraph::new(edges);
        let cycles = graph.find_cycles();
        if !cycles.is_empty() {
            let named = cycles
                .into_iter()
                .map(|cycle| {
                    cycle
                        .into_iter()
                        .map(|position| self.fields[position].name.clone())
                        .collect()
                })
                .collect();
            return Err(SpecError::DependencyCycle {
                cycles: CycleList(named),
            });
        }

        // No cycles, so Kahn's sweep covers every field.
        let order = graph.evaluation_order();

        Ok(FixupSpec {
            name: self.name,
            description: self.description,
            fields: self.fields,
            index,
            order,
        })
    }
}

/// Raw, partially-filled input for one fixup call.
///
/// Serializes as the plain argument object an orchestration framework
/// forwards for a tool call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixupInput {
    /// Caller-provided raw values by field name.
    #[serde(flatten)]
    pub values: HashMap<String, Value>,
}

impl FixupInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Get a raw value as a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, Value>> for FixupInput {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

impl From<Map<String, Value>> for FixupInput {
    fn from(values: Map<String, Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::validator::FnValidator;
    use crate::field::value_objects::{ContextView, FieldOutcome};
    use serde_json::json;

    fn accept_anything() -> FnValidator<fn(Option<&Value>, &ContextView) -> FieldOutcome> {
        FnValidator::new(|_, _| FieldOutcome::accepted_verbatim())
    }

    fn decl(name: &str) -> FieldDecl {
        FieldDecl::new(name, format!("The {name} field"), accept_anything())
    }

    #[test]
    fn value_kind_matches_json_values() {
        assert!(ValueKind::String.matches(&json!("x")));
        assert!(ValueKind::Integer.matches(&json!(3)));
        assert!(!ValueKind::Integer.matches(&json!(3.5)));
        assert!(ValueKind::Number.matches(&json!(3.5)));
        assert!(ValueKind::Boolean.matches(&json!(true)));
        assert!(!ValueKind::Array.matches(&json!({})));
    }

    #[test]
    fn builder_produces_a_spec_with_dependency_consistent_order() {
        let spec = FixupSpec::builder("search_flights", "Search for flights")
            .field(decl("departure"))
            .field(decl("arrival").requires("departure"))
            .field(decl("date").requires("departure").requires("arrival"))
            .field(
                decl("passengers")
                    .requires("departure")
                    .requires("arrival")
                    .requires("date"),
            )
            .build()
            .unwrap();

        let order = spec.evaluation_order();
        assert_eq!(order, vec!["departure", "arrival", "date", "passengers"]);
        for field in spec.fields() {
            let position = order.iter().position(|n| *n == field.name).unwrap();
            for requirement in &field.requires {
                let required_position = order.iter().position(|n| n == requirement).unwrap();
                assert!(required_position < position);
            }
        }
        // Determinism across repeated computations.
        assert_eq!(spec.evaluation_order(), order);
    }

    #[test]
    fn independent_fields_keep_declaration_order() {
        let spec = FixupSpec::builder("tool", "desc")
            .field(decl("beta"))
            .field(decl("alpha"))
            .field(decl("gamma").requires("alpha").requires("beta"))
            .build()
            .unwrap();

        assert_eq!(spec.evaluation_order(), vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn cycle_fails_construction_naming_the_cycle() {
        let error = FixupSpec::builder("tool", "desc")
            .field(decl("a").requires("b"))
            .field(decl("b").requires("a"))
            .build()
            .unwrap_err();

        match error {
            SpecError::DependencyCycle { cycles } => {
                assert_eq!(cycles.cycles(), vec![vec!["a".to_string(), "b".to_string()]]);
            }
            other => panic!("expected cycle error, got {other}"),
        }
    }

    #[test]
    fn unknown_requirement_fails_construction() {
        let error = FixupSpec::builder("tool", "desc")
            .field(decl("arrival").requires("departure"))
            .build()
            .unwrap_err();

        assert_eq!(
            error,
            SpecError::UnknownRequirement {
                field: "arrival".to_string(),
                reference: "departure".to_string(),
            }
        );
    }

    #[test]
    fn unknown_influence_fails_construction() {
        let error = FixupSpec::builder("tool", "desc")
            .field(decl("date").influenced_by("season"))
            .build()
            .unwrap_err();

        assert_eq!(
            error,
            SpecError::UnknownInfluence {
                field: "date".to_string(),
                reference: "season".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_field_fails_construction() {
        let error = FixupSpec::builder("tool", "desc")
            .field(decl("departure"))
            .field(decl("departure"))
            .build()
            .unwrap_err();

        assert_eq!(
            error,
            SpecError::DuplicateField {
                name: "departure".to_string()
            }
        );
    }

    #[test]
    fn duplicate_requires_are_collapsed() {
        let field = decl("date").requires("departure").requires("departure");
        assert_eq!(field.requires, vec!["departure"]);
    }

    #[test]
    fn fixup_input_round_trips_as_a_plain_object() {
        let input = FixupInput::new()
            .with_value("departure", "London")
            .with_value("passengers", 2);

        assert_eq!(input.get_str("departure"), Some("London"));
        assert_eq!(input.get("passengers"), Some(&json!(2)));

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["departure"], json!("London"));
        assert_eq!(json["passengers"], json!(2));
    }

    #[test]
    fn output_shape_follows_declaration_order() {
        let spec = FixupSpec::builder("tool", "desc")
            .field(decl("departure"))
            .field(decl("passengers").with_kind(ValueKind::Integer))
            .build()
            .unwrap();

        assert_eq!(
            spec.output_shape(),
            vec![
                ("departure".to_string(), ValueKind::String),
                ("passengers".to_string(), ValueKind::Integer),
            ]
        );
    }
}

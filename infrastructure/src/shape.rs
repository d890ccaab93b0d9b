//! Declared-shape checking.
//!
//! Default implementation of [`ShapeCheckPort`] driven by the value kinds
//! declared on the spec's fields.

use serde_json::{Map, Value};

use formfix_application::ports::shape_check::{ShapeCheckPort, ShapeMismatch};
use formfix_domain::{FixupSpec, ValueKind};

/// Checks an assembled value against the spec's declared output shape.
///
/// Kind checks are structural: `integer` accepts any JSON integer,
/// `number` any JSON number, and so on. Every declared member must be
/// present and no undeclared member may appear.
#[derive(Debug, Clone)]
pub struct DeclaredShapeChecker {
    shape: Vec<(String, ValueKind)>,
}

impl DeclaredShapeChecker {
    pub fn from_spec(spec: &FixupSpec) -> Self {
        Self {
            shape: spec.output_shape(),
        }
    }
}

impl ShapeCheckPort for DeclaredShapeChecker {
    fn check(&self, value: &Map<String, Value>) -> Result<(), ShapeMismatch> {
        let mut problems = Vec::new();

        for (name, kind) in &self.shape {
            match value.get(name) {
                Some(member) if kind.matches(member) => {}
                Some(member) => {
                    problems.push(format!("member '{name}' is not a {kind}: {member}"));
                }
                None => problems.push(format!("member '{name}' is missing")),
            }
        }
        for name in value.keys() {
            if !self.shape.iter().any(|(declared, _)| declared == name) {
                problems.push(format!("member '{name}' is not declared"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ShapeMismatch::new(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfix_domain::{ContextView, FieldDecl, FieldOutcome, FnValidator};
    use serde_json::json;

    fn spec() -> FixupSpec {
        let accept = || {
            FnValidator::new(|_: Option<&Value>, _: &ContextView| FieldOutcome::accepted_verbatim())
        };
        FixupSpec::builder("search_flights", "Search for flights")
            .field(FieldDecl::new("departure", "Departure city", accept()))
            .field(
                FieldDecl::new("passengers", "Passenger count", accept())
                    .with_kind(ValueKind::Integer),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn conforming_value_passes() {
        let checker = DeclaredShapeChecker::from_spec(&spec());
        let value = json!({"departure": "London", "passengers": 2});
        assert!(checker.check(value.as_object().unwrap()).is_ok());
    }

    #[test]
    fn wrong_kind_is_reported() {
        let checker = DeclaredShapeChecker::from_spec(&spec());
        let value = json!({"departure": "London", "passengers": "two"});
        let mismatch = checker.check(value.as_object().unwrap()).unwrap_err();
        assert_eq!(
            mismatch.problems,
            vec!["member 'passengers' is not a integer: \"two\""]
        );
    }

    #[test]
    fn missing_and_undeclared_members_are_reported() {
        let checker = DeclaredShapeChecker::from_spec(&spec());
        let value = json!({"departure": "London", "cabin": "economy"});
        let mismatch = checker.check(value.as_object().unwrap()).unwrap_err();
        assert!(
            mismatch
                .problems
                .contains(&"member 'passengers' is missing".to_string())
        );
        assert!(
            mismatch
                .problems
                .contains(&"member 'cabin' is not declared".to_string())
        );
    }
}

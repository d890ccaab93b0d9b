//! JSON Schema spec converter.
//!
//! Produces the provider-neutral JSON Schema declaration an orchestration
//! framework advertises to the model for a fixup-backed tool.

use formfix_domain::{FieldDecl, FixupSpec};

/// Converts a [`FixupSpec`] into a provider-neutral tool declaration.
///
/// Dependency metadata has no JSON Schema counterpart, so `requires` and
/// `influenced_by` are folded into the per-property descriptions as
/// human-readable hints. Nothing is marked `required`: incremental filling
/// is the point, and the fixup feedback drives completion.
pub struct JsonSchemaSpecConverter;

impl JsonSchemaSpecConverter {
    pub fn spec_to_schema(&self, spec: &FixupSpec) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        for field in spec.fields() {
            properties.insert(field.name.clone(), Self::property_schema(field));
        }

        serde_json::json!({
            "name": spec.name(),
            "description": spec.description(),
            "input_schema": {
                "type": "object",
                "properties": properties,
                "required": [],
            }
        })
    }

    fn property_schema(field: &FieldDecl) -> serde_json::Value {
        let mut description = field.description.clone();
        if !field.requires.is_empty() {
            description.push_str(&format!(" Requires: {}.", field.requires.join(", ")));
        }
        if !field.influenced_by.is_empty() {
            description.push_str(&format!(
                " Influenced by: {}.",
                field.influenced_by.join(", ")
            ));
        }

        serde_json::json!({
            "type": field.kind.as_str(),
            "description": description,
        })
    }
}

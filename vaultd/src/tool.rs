//! Tool descriptors for function-calling LLM loops.
//!
//! Each registered action is exported as `{ name, description, inputSchema }`
//! where `inputSchema` is a JSON Schema object. The schema is advisory; the
//! dispatcher validates every call regardless of what the model produced.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::action::{ActionDefinition, ActionRegistry};
use crate::schema::{FieldKind, FieldSpec};

/// A single callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Action name.
    pub name: String,
    /// What the action does.
    pub description: String,
    /// JSON Schema of the arguments object.
    pub input_schema: Value,
}

impl From<&ActionDefinition> for ToolDescriptor {
    fn from(definition: &ActionDefinition) -> Self {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in definition.fields() {
            properties.insert(field.name.to_owned(), field_schema(field));
            if field.required {
                required.push(Value::from(field.name));
            }
        }
        Self {
            name: definition.name().to_owned(),
            description: definition.description().to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": false,
            }),
        }
    }
}

impl ActionRegistry {
    /// Describes every registered action as a tool, in registration order.
    #[must_use]
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.definitions().map(ToolDescriptor::from).collect()
    }
}

fn field_schema(field: &FieldSpec) -> Value {
    let mut schema = match field.kind {
        FieldKind::Address => json!({
            "type": "string",
            "pattern": "^0x[0-9a-fA-F]{40}$",
        }),
        FieldKind::Amount => json!({
            "type": ["string", "integer"],
            "pattern": "^[0-9]*\\.?[0-9]+( ?wei)?$",
            "minimum": 1,
        }),
        FieldKind::Uint { allow_zero } => json!({
            "type": ["integer", "string"],
            "pattern": "^[0-9]+$",
            "minimum": u8::from(!allow_zero),
        }),
        FieldKind::Text { max_len } => {
            let mut schema = json!({ "type": "string", "minLength": 1 });
            if let Some(max) = max_len {
                schema["maxLength"] = Value::from(max);
            }
            schema
        }
        FieldKind::Boolean => json!({ "type": "boolean" }),
    };
    schema["description"] = Value::from(field.description);
    schema
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Bytes;

    use super::*;
    use crate::error::EncodingError;
    use crate::schema::ValidatedArgs;

    fn noop(_: &ValidatedArgs) -> Result<Bytes, EncodingError> {
        Ok(Bytes::new())
    }

    #[test]
    fn test_descriptor_lists_required_fields() {
        let definition = ActionDefinition::new("vote", "Cast a vote", noop)
            .with_field(FieldSpec::required(
                "proposalId",
                FieldKind::Uint { allow_zero: true },
                "Proposal id",
            ))
            .with_field(FieldSpec::optional("note", FieldKind::Text { max_len: Some(10) }, "Note"));
        let tool = ToolDescriptor::from(&definition);
        assert_eq!(tool.name, "vote");
        assert_eq!(tool.input_schema["required"], json!(["proposalId"]));
        assert_eq!(
            tool.input_schema["properties"]["proposalId"]["minimum"],
            json!(0)
        );
        assert_eq!(
            tool.input_schema["properties"]["note"]["maxLength"],
            json!(10)
        );
        assert_eq!(tool.input_schema["additionalProperties"], json!(false));
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let tool = ToolDescriptor::from(&ActionDefinition::new("noop", "", noop));
        let value = serde_json::to_value(&tool).unwrap();
        assert!(value.get("inputSchema").is_some());
    }
}

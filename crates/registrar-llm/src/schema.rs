//! JSON schemas for structured outputs and tool parameters.
//!
//! Schemas are generated with `schemars` and then tightened for strict mode:
//! every object gets `additionalProperties: false`, every property is listed
//! in `required` (nullable ones included), and `$ref`s are inlined.

use schemars::{schema_for, JsonSchema};
use serde_json::{Map, Value};

/// A named schema constraining a structured-output call.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Schema name reported to the provider
    pub name: String,

    /// The JSON schema itself
    pub schema: Value,
}

impl OutputSchema {
    /// Build the strict schema for `T`, named after the type.
    pub fn for_type<T: JsonSchema>() -> Self {
        Self {
            name: T::schema_name(),
            schema: strict_schema::<T>(),
        }
    }
}

/// Strict-mode schema for `T`.
pub fn strict_schema<T: JsonSchema>() -> Value {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or_default();

    let definitions = match &mut value {
        Value::Object(root) => {
            root.remove("$schema");
            root.remove("definitions")
        }
        _ => None,
    };

    if let Some(Value::Object(defs)) = definitions {
        inline_refs(&mut value, &defs);
    }
    close_objects(&mut value);

    value
}

fn inline_refs(value: &mut Value, defs: &Map<String, Value>) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| defs.get(name))
                .cloned();

            if let Some(mut inlined) = target {
                inline_refs(&mut inlined, defs);
                *value = inlined;
                return;
            }

            map.values_mut().for_each(|v| inline_refs(v, defs));
        }
        Value::Array(items) => items.iter_mut().for_each(|v| inline_refs(v, defs)),
        _ => {}
    }
}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("object") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
                let keys: Option<Vec<Value>> = map
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| props.keys().cloned().map(Value::String).collect());
                if let Some(keys) = keys {
                    map.insert("required".to_string(), Value::Array(keys));
                }
            }
            map.values_mut().for_each(close_objects);
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Founder {
        name: String,
        role: Option<String>,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Company {
        company_name: Option<String>,
        founders: Vec<Founder>,
    }

    #[test]
    fn test_nullable_fields_are_required() {
        let schema = strict_schema::<Founder>();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(required.contains(&"name"));
        assert!(required.contains(&"role"));
        assert_eq!(schema["additionalProperties"], Value::Bool(false));
    }

    #[test]
    fn test_nested_refs_inlined_and_closed() {
        let schema = strict_schema::<Company>();
        let text = serde_json::to_string(&schema).unwrap();
        assert!(!text.contains("$ref"));
        assert!(schema.get("definitions").is_none());
        assert!(schema.get("$schema").is_none());

        let item = &schema["properties"]["founders"]["items"];
        assert_eq!(item["type"], "object");
        assert_eq!(item["additionalProperties"], Value::Bool(false));
    }

    #[test]
    fn test_output_schema_named_after_type() {
        let output = OutputSchema::for_type::<Company>();
        assert_eq!(output.name, "Company");
        assert_eq!(output.schema["type"], "object");
    }
}

use schemars::{schema_for, JsonSchema};
use serde_json::{Map, Value};

/// A JSON schema plus the name OpenAI reports it under.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSchema {
    pub name: String,
    pub schema: Value,
}

impl NamedSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Derive a strict-mode schema from a `schemars` type.
    pub fn of<T: JsonSchema>(name: impl Into<String>) -> Self {
        Self::new(name, strict_schema::<T>())
    }

    /// Constrain every string item of the array property `property` with a
    /// regex. No-op when the property is not an array.
    pub fn with_item_pattern(mut self, property: &str, pattern: &str) -> Self {
        let pointer = format!("/properties/{property}/items");
        if let Some(items) = self
            .schema
            .pointer_mut(&pointer)
            .and_then(Value::as_object_mut)
        {
            items.insert("pattern".to_string(), Value::String(pattern.to_string()));
        }
        self
    }
}

/// Generate a schema OpenAI accepts in strict mode:
/// every object closed with `additionalProperties: false`, every property
/// listed in `required` (nullable ones included), no `$ref`.
pub fn strict_schema<T: JsonSchema>() -> Value {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or_default();

    let definitions = match &mut value {
        Value::Object(root) => {
            root.remove("$schema");
            root.remove("definitions")
        }
        _ => None,
    };

    let definitions = match definitions {
        Some(Value::Object(defs)) => defs,
        _ => Map::new(),
    };

    resolve(&mut value, &definitions);
    value
}

fn resolve(value: &mut Value, definitions: &Map<String, Value>) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();
            let replacement = target.or_else(|| match map.get("allOf") {
                Some(Value::Array(all_of)) if all_of.len() == 1 => Some(all_of[0].clone()),
                _ => None,
            });
            if let Some(inner) = replacement {
                *value = inner;
                resolve(value, definitions);
                return;
            }

            if map.get("type").and_then(Value::as_str) == Some("object") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
                let keys: Vec<Value> = map
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| props.keys().cloned().map(Value::String).collect())
                    .unwrap_or_default();
                map.insert("required".to_string(), Value::Array(keys));
            }

            for child in map.values_mut() {
                resolve(child, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                resolve(item, definitions);
            }
        }
        _ => {}
    }
}

//! Converts JSON-Schema documents into the plain subset inference endpoints accept.
//!
//! Typed argument structs derive [`schemars::JsonSchema`]; [`parameters_schema`]
//! generates their schema and runs it through [`convert_schema`].
//!
//! ```rust
//! use serde_json::json;
//! use tctooling::convert_schema;
//!
//! let plain = convert_schema(&json!({
//!     "$schema": "http://json-schema.org/draft-07/schema#",
//!     "title": "NewsArgs",
//!     "type": "object",
//!     "properties": {
//!         "limit": {"type": "integer", "format": "uint32", "default": 5, "description": "Max articles"}
//!     }
//! }))
//! .expect("schema converts");
//!
//! assert!(plain.get("$schema").is_none());
//! assert_eq!(plain["properties"]["limit"]["default"], 5);
//! ```

use schemars::JsonSchema;
use serde_json::{Map, Value};

use crate::ToolError;

/// Keywords passed through to the endpoint. Everything else is dropped.
const PASSTHROUGH_KEYWORDS: &[&str] = &["description", "enum", "default", "examples", "required"];

const REJECTED_COMBINATORS: &[&str] = &["not", "if", "then", "else", "patternProperties"];

/// Generates the endpoint-ready parameter schema for an argument type.
pub fn parameters_schema<A: JsonSchema>() -> Result<Value, ToolError> {
    let root = schemars::schema_for!(A);
    let value = serde_json::to_value(root)
        .map_err(|err| ToolError::schema_unsupported(format!("schema serialization failed: {err}")))?;
    convert_schema(&value)
}

pub fn convert_schema(schema: &Value) -> Result<Value, ToolError> {
    let mut converter = Converter {
        root: schema,
        expanding: Vec::new(),
    };
    converter.convert(schema)
}

struct Converter<'a> {
    root: &'a Value,
    expanding: Vec<String>,
}

impl<'a> Converter<'a> {
    fn convert(&mut self, schema: &'a Value) -> Result<Value, ToolError> {
        match schema {
            Value::Bool(true) => Ok(Value::Object(Map::new())),
            Value::Bool(false) => Err(ToolError::schema_unsupported(
                "`false` schemas cannot be expressed",
            )),
            Value::Object(map) => self.convert_object(map),
            other => Err(ToolError::schema_unsupported(format!(
                "expected a schema object, found {other}"
            ))),
        }
    }

    fn convert_object(&mut self, map: &'a Map<String, Value>) -> Result<Value, ToolError> {
        if let Some(keyword) = REJECTED_COMBINATORS.iter().find(|key| map.contains_key(**key)) {
            return Err(ToolError::schema_unsupported(format!(
                "`{keyword}` is not supported"
            )));
        }

        let mut output = match self.base_schema(map)? {
            Some(Value::Object(base)) => base,
            Some(_) | None => Map::new(),
        };

        for (key, value) in map {
            match key.as_str() {
                "type" => {
                    output.insert(key.clone(), normalize_type(value)?);
                }
                "properties" => {
                    let Value::Object(properties) = value else {
                        return Err(ToolError::schema_unsupported("`properties` must be an object"));
                    };
                    let mut converted = Map::new();
                    for (name, property) in properties {
                        converted.insert(name.clone(), self.convert(property)?);
                    }
                    output.insert(key.clone(), Value::Object(converted));
                }
                "items" => {
                    if value.is_array() {
                        return Err(ToolError::schema_unsupported(
                            "tuple-style `items` is not supported",
                        ));
                    }
                    output.insert(key.clone(), self.convert(value)?);
                }
                "additionalProperties" => {
                    let converted = match value {
                        Value::Bool(flag) => Value::Bool(*flag),
                        other => self.convert(other)?,
                    };
                    output.insert(key.clone(), converted);
                }
                keyword if PASSTHROUGH_KEYWORDS.contains(&keyword) => {
                    output.insert(key.clone(), value.clone());
                }
                _ => {}
            }
        }

        Ok(Value::Object(output))
    }

    /// Resolves `$ref`, single-branch `allOf`, and nullable `anyOf`/`oneOf` into a base
    /// schema that the remaining sibling keywords are layered over.
    fn base_schema(&mut self, map: &'a Map<String, Value>) -> Result<Option<Value>, ToolError> {
        if let Some(reference) = map.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| ToolError::schema_unsupported("`$ref` must be a string"))?;
            return self.expand_reference(reference).map(Some);
        }

        if let Some(all_of) = map.get("allOf") {
            return match all_of.as_array().map(Vec::as_slice) {
                Some([single]) => self.convert(single).map(Some),
                _ => Err(ToolError::schema_unsupported(
                    "`allOf` with more than one branch is not supported",
                )),
            };
        }

        for combinator in ["anyOf", "oneOf"] {
            let Some(branches) = map.get(combinator) else {
                continue;
            };
            let branches = branches.as_array().ok_or_else(|| {
                ToolError::schema_unsupported(format!("`{combinator}` must be an array"))
            })?;
            let non_null = branches
                .iter()
                .filter(|branch| !is_null_schema(branch))
                .collect::<Vec<_>>();

            return match non_null.as_slice() {
                [single] => self.convert(single).map(Some),
                _ => Err(ToolError::schema_unsupported(format!(
                    "`{combinator}` with {} alternatives is not supported",
                    non_null.len()
                ))),
            };
        }

        Ok(None)
    }

    fn expand_reference(&mut self, reference: &str) -> Result<Value, ToolError> {
        if self.expanding.iter().any(|active| active == reference) {
            return Err(ToolError::schema_unsupported(format!(
                "recursive reference `{reference}`"
            )));
        }

        let target = reference
            .strip_prefix('#')
            .and_then(|pointer| self.root.pointer(pointer))
            .ok_or_else(|| {
                ToolError::schema_unsupported(format!("unresolvable reference `{reference}`"))
            })?;

        self.expanding.push(reference.to_string());
        let expanded = self.convert(target);
        self.expanding.pop();
        expanded
    }
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

/// Collapses `["string", "null"]` style unions; optionality is carried by `required`.
fn normalize_type(value: &Value) -> Result<Value, ToolError> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Array(types) => {
            let concrete = types
                .iter()
                .filter(|entry| entry.as_str() != Some("null"))
                .collect::<Vec<_>>();
            match concrete.as_slice() {
                [single] => Ok((*single).clone()),
                _ => Err(ToolError::schema_unsupported(format!(
                    "union type {value} is not supported"
                ))),
            }
        }
        other => Err(ToolError::schema_unsupported(format!(
            "invalid `type` value {other}"
        ))),
    }
}

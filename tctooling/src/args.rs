//! Argument parsing and schema-guided coercion for tool inputs.
//!
//! ```rust
//! use serde_json::json;
//! use tctooling::{coerce_arguments, parse_json_object};
//!
//! let schema = json!({"type": "object", "properties": {"limit": {"type": "integer"}}});
//! let coerced = coerce_arguments(&schema, json!({"limit": "5"})).expect("coerces");
//! assert_eq!(coerced["limit"], 5);
//!
//! let args = parse_json_object(r#"{"ticker":"AAPL"}"#).expect("object should parse");
//! assert_eq!(args["ticker"], "AAPL");
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::ToolError;

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

/// Parses raw call arguments. Blank input is treated as an empty object.
pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    if args_json.trim().is_empty() {
        return Ok(Map::new());
    }

    match parse_json_value(args_json)? {
        Value::Object(map) => Ok(map),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

/// Rewrites stringly-typed scalars to the types the schema declares.
pub fn coerce_arguments(schema: &Value, args: Value) -> Result<Value, ToolError> {
    match args {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(coerce_value(schema, args)),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

/// Coerces against the schema, then deserializes; serde applies declared defaults.
pub fn parse_typed_arguments<A: DeserializeOwned>(
    tool_name: &str,
    schema: &Value,
    args: Value,
) -> Result<A, ToolError> {
    let coerced = coerce_arguments(schema, args)?;
    serde_json::from_value(coerced).map_err(|err| {
        ToolError::invalid_arguments(format!("Invalid arguments for {tool_name}: {err}"))
            .with_tool_name(tool_name)
    })
}

fn coerce_value(schema: &Value, value: Value) -> Value {
    let declared = schema.get("type").and_then(Value::as_str);

    match (declared, value) {
        (Some("integer"), Value::String(text)) => match text.trim().parse::<i64>() {
            Ok(parsed) => Value::Number(parsed.into()),
            Err(_) => Value::String(text),
        },
        (Some("number"), Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::String(text)),
        (Some("boolean"), Value::String(text)) => match text.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text),
        },
        (Some("string"), Value::Number(number)) => Value::String(number.to_string()),
        (Some("array"), Value::Array(items)) => {
            let item_schema = schema.get("items").cloned().unwrap_or(Value::Null);
            Value::Array(
                items
                    .into_iter()
                    .map(|item| coerce_value(&item_schema, item))
                    .collect(),
            )
        }
        (_, Value::Object(map)) => {
            let properties = schema.get("properties").and_then(Value::as_object);
            Value::Object(
                map.into_iter()
                    .map(|(key, inner)| {
                        let coerced = match properties.and_then(|props| props.get(&key)) {
                            Some(property_schema) => coerce_value(property_schema, inner),
                            None => inner,
                        };
                        (key, coerced)
                    })
                    .collect(),
            )
        }
        (_, other) => other,
    }
}

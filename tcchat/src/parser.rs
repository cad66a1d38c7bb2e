//! Extraction of `🔧 CALL_TOOL:<name>:<json>` markers from model text.
//!
//! ```rust
//! use tcchat::parse_tool_calls;
//!
//! let text = "Fetching prices.\n🔧 CALL_TOOL:getStockPrices:{\"ticker\":\"AAPL\"}\nOne moment.";
//! let calls = parse_tool_calls(text);
//!
//! assert_eq!(calls.len(), 1);
//! assert_eq!(calls[0].tool_name, "getStockPrices");
//! assert_eq!(calls[0].arguments["ticker"], "AAPL");
//! ```

use serde_json::{Deserializer, Map, Value};
use tctooling::ToolCallRequest;

pub const TOOL_CALL_MARKER: &str = "🔧 CALL_TOOL:";

/// Returns every well-formed marker in order of appearance. Malformed markers are
/// logged and skipped; scanning resumes right after the broken marker.
pub fn parse_tool_calls(text: &str) -> Vec<ToolCallRequest> {
    let mut calls = Vec::new();
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(TOOL_CALL_MARKER) {
        let start = cursor + found;
        let body = start + TOOL_CALL_MARKER.len();

        match parse_marker(text, body) {
            Ok((tool_name, arguments, end)) => {
                let request = ToolCallRequest::new(
                    format!("prompt_call_{}", calls.len() + 1),
                    tool_name,
                    arguments,
                )
                .with_raw_source_text(&text[start..end]);
                calls.push(request);
                cursor = end;
            }
            Err(reason) => {
                tracing::warn!(offset = start, reason = %reason, "skipping malformed tool call marker");
                cursor = body;
            }
        }
    }

    calls
}

fn parse_marker(text: &str, body: usize) -> Result<(String, Map<String, Value>, usize), String> {
    let rest = &text[body..];
    let name_len = rest
        .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return Err("missing tool name".to_string());
    }

    let tool_name = &rest[..name_len];
    let Some(payload) = rest[name_len..].strip_prefix(':') else {
        return Err(format!("missing ':' after tool name '{tool_name}'"));
    };
    if !payload.starts_with('{') {
        return Err(format!("arguments for '{tool_name}' are not a JSON object"));
    }

    let mut values = Deserializer::from_str(payload).into_iter::<Value>();
    match values.next() {
        Some(Ok(Value::Object(arguments))) => {
            let end = body + name_len + 1 + values.byte_offset();
            Ok((tool_name.to_string(), arguments, end))
        }
        Some(Ok(_)) => Err(format!("arguments for '{tool_name}' are not a JSON object")),
        Some(Err(err)) => Err(format!("invalid JSON arguments for '{tool_name}': {err}")),
        None => Err(format!("missing arguments for '{tool_name}'")),
    }
}

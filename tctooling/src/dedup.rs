//! Per-session suppression of repeated tool calls with identical arguments.
//!
//! ```rust
//! use serde_json::json;
//! use tctooling::CallDeduplicator;
//!
//! let mut dedup = CallDeduplicator::new();
//! assert!(dedup.should_execute("getNews", &json!({"ticker": "AAPL", "limit": 5})));
//! assert!(!dedup.should_execute("getNews", &json!({"limit": 5, "ticker": "AAPL"})));
//! assert!(dedup.should_execute("getNews", &json!({"ticker": "MSFT"})));
//! ```

use std::collections::HashSet;

use serde_json::{Map, Value, json};

/// Canonical key of a `{toolName, arguments}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolCallRecord(String);

impl ToolCallRecord {
    pub fn new(tool_name: &str, arguments: &Value) -> Self {
        let envelope = json!({
            "toolName": tool_name,
            "arguments": canonicalize(arguments),
        });
        Self(envelope.to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Owned by a single session and driven sequentially; not a cross-request cache.
#[derive(Debug, Default)]
pub struct CallDeduplicator {
    seen: HashSet<ToolCallRecord>,
}

impl CallDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and records the call the first time a record is seen.
    pub fn should_execute(&mut self, tool_name: &str, arguments: &Value) -> bool {
        let record = ToolCallRecord::new(tool_name, arguments);
        let fresh = self.seen.insert(record);
        if !fresh {
            tracing::debug!(tool = tool_name, "suppressing duplicate tool call");
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys = map.keys().collect::<Vec<_>>();
            keys.sort_unstable();
            let mut ordered = Map::new();
            for key in keys {
                if let Some(inner) = map.get(key) {
                    ordered.insert(key.clone(), canonicalize(inner));
                }
            }
            Value::Object(ordered)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

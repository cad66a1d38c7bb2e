//! Tool invocation requests, execution context, and outcomes.

use serde_json::{Map, Value, json};
use tccommon::{MetadataMap, SessionId};
use tcprovider::{ToolCall, ToolResult};

use crate::{ToolError, parse_json_object};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    pub session_id: SessionId,
    pub metadata: MetadataMap,
}

impl ToolExecutionContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A single tool invocation, produced either by a native tool call or by a
/// prompt marker found in model text.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub tool_name: String,
    pub arguments: Map<String, Value>,
    /// The marker text the call was parsed from, when it came from a prompt.
    pub raw_source_text: Option<String>,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments,
            raw_source_text: None,
        }
    }

    pub fn with_raw_source_text(mut self, raw: impl Into<String>) -> Self {
        self.raw_source_text = Some(raw.into());
        self
    }

    pub fn from_tool_call(call: &ToolCall) -> Result<Self, ToolError> {
        let arguments = parse_json_object(&call.arguments).map_err(|err| {
            err.with_tool_name(call.name.clone())
                .with_tool_call_id(call.id.clone())
        })?;
        Ok(Self::new(call.id.clone(), call.name.clone(), arguments))
    }

    pub fn arguments_value(&self) -> Value {
        Value::Object(self.arguments.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Payload(Value),
    /// Safe description surfaced to the model and the client.
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub arguments: Value,
    pub outcome: ToolOutcome,
}

impl ToolExecutionResult {
    pub fn success(request: &ToolCallRequest, payload: Value) -> Self {
        Self {
            tool_call_id: request.id.clone(),
            tool_name: request.tool_name.clone(),
            arguments: request.arguments_value(),
            outcome: ToolOutcome::Payload(payload),
        }
    }

    pub fn failure(request: &ToolCallRequest, description: impl Into<String>) -> Self {
        Self {
            tool_call_id: request.id.clone(),
            tool_name: request.tool_name.clone(),
            arguments: request.arguments_value(),
            outcome: ToolOutcome::Error(description.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Error(_))
    }

    pub fn payload(&self) -> Option<&Value> {
        match &self.outcome {
            ToolOutcome::Payload(value) => Some(value),
            ToolOutcome::Error(_) => None,
        }
    }

    pub fn error_description(&self) -> Option<&str> {
        match &self.outcome {
            ToolOutcome::Payload(_) => None,
            ToolOutcome::Error(description) => Some(description),
        }
    }

    /// The value fed back to the model: the payload, or `{"error": description}`.
    pub fn model_value(&self) -> Value {
        match &self.outcome {
            ToolOutcome::Payload(value) => value.clone(),
            ToolOutcome::Error(description) => json!({ "error": description }),
        }
    }

    pub fn model_output(&self) -> String {
        self.model_value().to_string()
    }

    pub fn into_tool_result(self) -> ToolResult {
        let output = self.model_output();
        ToolResult {
            tool_call_id: self.tool_call_id,
            output,
        }
    }
}

//! System prompt templates for prompt-based tool calling.

use serde_json::{Map, Value};
use tcprovider::ToolDefinition;
use tctooling::ToolExecutionResult;

use crate::TOOL_CALL_MARKER;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly financial assistant. Keep your responses concise and helpful. \
When the user asks about a company, use the available financial data tools to ground your answer in real numbers.";

pub const FOLLOW_UP_USER_REQUEST: &str =
    "Please provide a comprehensive financial analysis using the real data from the tools you just called.";

/// Appends the marker rules and one example per tool to `base`.
pub fn prompt_tool_instructions(base: &str, tools: &[ToolDefinition]) -> String {
    let mut prompt = String::from(base);
    prompt.push_str(
        "\n\nIMPORTANT: You have access to real-time financial data tools. \
When users ask about financial information, use this exact format:\n\n",
    );

    for tool in tools {
        prompt.push_str(&format!(
            "{TOOL_CALL_MARKER}{}:{}\n",
            tool.name,
            example_arguments(&tool.parameters)
        ));
    }

    prompt.push_str("\nAVAILABLE TOOLS:\n");
    for tool in tools {
        prompt.push_str(&format!("- {}: {}\n", tool.name, tool.description));
    }

    prompt.push_str(&format!(
        "\nRULES:\n\
1. Use the exact format above with the {TOOL_CALL_MARKER} prefix\n\
2. Provide valid JSON arguments\n\
3. Always explain what tool you're calling and why\n\
4. After calling a tool, I will provide real data and you should incorporate it into your response\n\
5. Use real ticker symbols (AAPL, MSFT, TSLA, AMZN, GOOGL, etc.)\n"
    ));
    prompt
}

/// Renders executed calls as `Tool: name(args)` / `Result: json` pairs.
pub fn render_tool_results(results: &[ToolExecutionResult]) -> String {
    results
        .iter()
        .map(|result| {
            let value = result.model_value();
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            format!("Tool: {}({})\nResult: {}", result.tool_name, result.arguments, pretty)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn follow_up_system_prompt(results: &[ToolExecutionResult]) -> String {
    format!(
        "You are a financial assistant. The user asked a question and you called some tools. \
Here are the real results from those tools:\n\n{}\n\n\
Now provide a comprehensive response incorporating this real financial data. \
Be specific with numbers, dates, and analysis. \
Don't mention the tool calls - just provide the information naturally.",
        render_tool_results(results)
    )
}

fn example_arguments(schema: &Value) -> Value {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Value::Object(Map::new());
    };
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();

    let mut example = Map::new();
    for (name, property) in properties {
        let sample = property
            .get("examples")
            .and_then(Value::as_array)
            .and_then(|examples| examples.first());
        let value = if name == "ticker" {
            Some(Value::String("AAPL".to_string()))
        } else if let Some(sample) = sample {
            Some(sample.clone())
        } else if let Some(default) = property.get("default") {
            Some(default.clone())
        } else if required.contains(&name.as_str()) {
            Some(placeholder(name, property))
        } else {
            None
        };
        if let Some(value) = value {
            example.insert(name.clone(), value);
        }
    }
    Value::Object(example)
}

fn placeholder(name: &str, schema: &Value) -> Value {
    if let Some(first) = schema
        .get("enum")
        .and_then(Value::as_array)
        .and_then(|values| values.first())
    {
        return first.clone();
    }

    match schema.get("type").and_then(Value::as_str) {
        Some("integer") | Some("number") => Value::from(0),
        Some("boolean") => Value::Bool(false),
        Some("array") => {
            let item = schema
                .get("items")
                .map(|items| placeholder(name, items))
                .unwrap_or(Value::Null);
            Value::Array(vec![item])
        }
        Some("object") => example_arguments(schema),
        _ => Value::String(format!("<{name}>")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tctooling::ToolCallRequest;

    use super::*;

    fn news_definition() -> ToolDefinition {
        ToolDefinition {
            name: "getNews".to_string(),
            description: "Recent company news".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "ticker": {"type": "string"},
                    "limit": {"type": "integer", "default": 5}
                },
                "required": ["ticker"]
            }),
        }
    }

    #[test]
    fn instructions_render_a_parseable_example_per_tool() {
        let prompt = prompt_tool_instructions("Base prompt.", &[news_definition()]);

        assert!(prompt.starts_with("Base prompt."));
        assert!(prompt.contains("- getNews: Recent company news"));
        let calls = crate::parse_tool_calls(&prompt);
        assert_eq!(calls.len(), 1);
        assert_eq!(
            Value::Object(calls[0].arguments.clone()),
            json!({"ticker": "AAPL", "limit": 5})
        );
    }

    #[test]
    fn nested_required_arrays_get_placeholders() {
        let example = example_arguments(&json!({
            "type": "object",
            "properties": {
                "filters": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "field": {"type": "string"},
                            "operator": {"type": "string", "enum": ["eq", "gt"]},
                            "value": {"type": "number"}
                        },
                        "required": ["field", "operator", "value"]
                    }
                },
                "limit": {"type": "integer", "default": 10}
            },
            "required": ["filters"]
        }));

        assert_eq!(
            example,
            json!({
                "filters": [{"field": "<field>", "operator": "eq", "value": 0}],
                "limit": 10
            })
        );
    }

    #[test]
    fn schema_examples_win_over_placeholders() {
        let definition = ToolDefinition {
            name: "searchStocksByFilters".to_string(),
            description: "Screen companies by financial metrics".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "filters": {
                        "type": "array",
                        "examples": [[{"field": "revenue", "operator": "gt", "value": 50000000000u64}]],
                        "items": {
                            "type": "object",
                            "properties": {
                                "field": {"type": "string"},
                                "operator": {"type": "string", "enum": ["eq", "gt"]},
                                "value": {"type": "number"}
                            },
                            "required": ["field", "operator", "value"]
                        }
                    },
                    "limit": {"type": "integer", "default": 10}
                },
                "required": ["filters"]
            }),
        };

        let prompt = prompt_tool_instructions("Base prompt.", &[definition]);

        assert!(prompt.contains(
            "searchStocksByFilters:{\"filters\":[{\"field\":\"revenue\",\"operator\":\"gt\",\"value\":50000000000}],\"limit\":10}"
        ));
    }

    #[test]
    fn follow_up_prompt_embeds_tool_results_and_errors() {
        let mut arguments = Map::new();
        arguments.insert("ticker".to_string(), json!("AAPL"));
        let request = ToolCallRequest::new("prompt_call_1", "getNews", arguments);
        let results = vec![
            ToolExecutionResult::success(&request, json!({"news": []})),
            ToolExecutionResult::failure(&request, "Failed to fetch news data"),
        ];

        let prompt = follow_up_system_prompt(&results);
        assert!(prompt.contains("Tool: getNews({\"ticker\":\"AAPL\"})\nResult: {\n  \"news\": []\n}"));
        assert!(prompt.contains("\"error\": \"Failed to fetch news data\""));
        assert!(prompt.ends_with("just provide the information naturally."));
    }
}

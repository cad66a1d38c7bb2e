//! Tool runtime trait and default registry-backed executor.
//!
//! Execution never fails outright: lookup errors, argument errors, and tool
//! failures all come back as [`ToolExecutionResult`]s carrying an error
//! description, so one bad call cannot abort a chat turn.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use tcprovider::ToolDefinition;

use crate::{
    NoopToolRuntimeHooks, ToolCallRequest, ToolExecutionContext, ToolExecutionResult, ToolFuture,
    ToolRegistry, ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;

    fn execute<'a>(
        &'a self,
        request: ToolCallRequest,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult>;

    /// Runs every request concurrently; results keep request order.
    fn execute_all<'a>(
        &'a self,
        requests: Vec<ToolCallRequest>,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Vec<ToolExecutionResult>> {
        Box::pin(async move {
            let pending = requests
                .into_iter()
                .map(|request| self.execute(request, context.clone()));
            join_all(pending).await
        })
    }
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.list()
    }

    fn execute<'a>(
        &'a self,
        request: ToolCallRequest,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult> {
        Box::pin(async move {
            let started = Instant::now();
            self.hooks.on_execution_start(&request, &context);

            let outcome = match self.registry.get(&request.tool_name) {
                Ok(tool) => tool.invoke(request.arguments_value(), &context).await,
                Err(error) => Err(error),
            };

            match outcome {
                Ok(payload) => {
                    let result = ToolExecutionResult::success(&request, payload);
                    self.hooks
                        .on_execution_success(&request, &context, &result, started.elapsed());
                    result
                }
                Err(error) => {
                    let error = error
                        .with_tool_name(request.tool_name.clone())
                        .with_tool_call_id(request.id.clone());
                    self.hooks
                        .on_execution_failure(&request, &context, &error, started.elapsed());
                    ToolExecutionResult::failure(&request, error.message)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::{Map, Value, json};
    use tcprovider::ToolDefinition;

    use super::*;
    use crate::{Tool, ToolError};

    #[derive(Debug)]
    struct EchoTool;

    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "echo".to_string(),
                description: "Echoes arguments".to_string(),
                parameters: json!({"type": "object"}),
            }
        }

        fn invoke<'a>(
            &'a self,
            arguments: Value,
            context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<Value, ToolError>> {
            Box::pin(async move {
                Ok(json!({"session": context.session_id.as_str(), "args": arguments}))
            })
        }
    }

    #[derive(Debug)]
    struct BrokenTool;

    impl Tool for BrokenTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "broken".to_string(),
                description: "Always fails".to_string(),
                parameters: json!({"type": "object"}),
            }
        }

        fn invoke<'a>(
            &'a self,
            _arguments: Value,
            _context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<Value, ToolError>> {
            Box::pin(async move { Err(ToolError::upstream("Failed to fetch news data")) })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_execution_start(&self, request: &ToolCallRequest, _context: &ToolExecutionContext) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", request.tool_name));
        }

        fn on_execution_success(
            &self,
            request: &ToolCallRequest,
            _context: &ToolExecutionContext,
            _result: &ToolExecutionResult,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{}", request.tool_name));
        }

        fn on_execution_failure(
            &self,
            request: &ToolCallRequest,
            _context: &ToolExecutionContext,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{}:{:?}", request.tool_name, error.kind));
        }
    }

    fn request(id: &str, tool_name: &str) -> ToolCallRequest {
        let mut arguments = Map::new();
        arguments.insert("ticker".to_string(), json!("AAPL"));
        ToolCallRequest::new(id, tool_name, arguments)
    }

    fn runtime(hooks: Arc<RecordingHooks>) -> DefaultToolRuntime {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        registry.register(BrokenTool);
        DefaultToolRuntime::new(Arc::new(registry)).with_hooks(hooks)
    }

    #[tokio::test]
    async fn runtime_executes_registered_tool() {
        let runtime = runtime(Arc::new(RecordingHooks::default()));
        let result = runtime
            .execute(request("call_1", "echo"), ToolExecutionContext::new("session-1"))
            .await;

        assert_eq!(result.tool_call_id, "call_1");
        assert_eq!(
            result.payload(),
            Some(&json!({"session": "session-1", "args": {"ticker": "AAPL"}}))
        );
    }

    #[tokio::test]
    async fn unknown_tool_and_tool_failure_become_error_results() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = runtime(Arc::clone(&hooks));

        let results = runtime
            .execute_all(
                vec![
                    request("call_1", "missing"),
                    request("call_2", "broken"),
                    request("call_3", "echo"),
                ],
                ToolExecutionContext::new("session-2"),
            )
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].error_description(), Some("Unknown tool: missing"));
        assert_eq!(results[1].error_description(), Some("Failed to fetch news data"));
        assert!(!results[2].is_error());

        let events = hooks.events.lock().expect("events lock").clone();
        assert!(events.contains(&"failure:missing:NotFound".to_string()));
        assert!(events.contains(&"failure:broken:Upstream".to_string()));
        assert!(events.contains(&"success:echo".to_string()));
    }

    #[test]
    fn runtime_exposes_registry_definitions() {
        let runtime = runtime(Arc::new(RecordingHooks::default()));
        let names = runtime
            .definitions()
            .into_iter()
            .map(|definition| definition.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["broken", "echo"]);
    }
}

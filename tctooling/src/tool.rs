//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use serde_json::json;
//! use tcprovider::ToolDefinition;
//! use tctooling::{FunctionTool, Tool};
//!
//! let tool = FunctionTool::new(
//!     ToolDefinition {
//!         name: "echo".to_string(),
//!         description: "Echoes input".to_string(),
//!         parameters: json!({"type": "object"}),
//!     },
//!     |args, _ctx| async move { Ok(args) },
//! );
//!
//! assert_eq!(tool.definition().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tccommon::BoxFuture;
use tcprovider::ToolDefinition;

use crate::{ToolError, ToolExecutionContext, parameters_schema, parse_typed_arguments};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn invoke<'a>(
        &'a self,
        arguments: Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>>;
}

type ToolHandler =
    dyn Fn(Value, ToolExecutionContext) -> ToolFuture<'static, Result<Value, ToolError>> + Send + Sync;

pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |arguments, context| Box::pin(handler(arguments, context)));

        Self {
            definition,
            handler,
        }
    }

    /// Builds a tool whose parameter schema is derived from `A`. Incoming arguments
    /// are coerced against that schema and deserialized before `handler` runs.
    pub fn typed<A, F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> Result<Self, ToolError>
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(A, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let name = name.into();
        let parameters = parameters_schema::<A>().map_err(|err| err.with_tool_name(name.clone()))?;
        let definition = ToolDefinition {
            name: name.clone(),
            description: description.into(),
            parameters: parameters.clone(),
        };
        let handler = Arc::new(handler);

        Ok(Self::new(definition, move |arguments, context| {
            let parsed = parse_typed_arguments::<A>(&name, &parameters, arguments);
            let handler = Arc::clone(&handler);
            async move { handler(parsed?, context).await }
        }))
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke<'a>(
        &'a self,
        arguments: Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        (self.handler)(arguments, context.clone())
    }
}

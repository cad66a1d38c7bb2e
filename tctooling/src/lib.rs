//! Capability layer for registering, describing, and executing tools.

mod args;
mod dedup;
mod error;
mod hooks;
mod registry;
mod runtime;
mod schema;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        CallDeduplicator, DefaultToolRuntime, FunctionTool, Tool, ToolCallRequest, ToolError,
        ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolOutcome,
        ToolRegistry, ToolRuntime, ToolRuntimeHooks, convert_schema, parameters_schema,
    };
}

pub use args::{coerce_arguments, parse_json_object, parse_json_value, parse_typed_arguments};
pub use dedup::{CallDeduplicator, ToolCallRecord};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use schema::{convert_schema, parameters_schema};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use types::{ToolCallRequest, ToolExecutionContext, ToolExecutionResult, ToolOutcome};

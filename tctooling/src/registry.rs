//! Tool registry for lookup by tool definition name.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tccommon::Registry;
use tcprovider::ToolDefinition;

use crate::{FunctionTool, Tool, ToolError, ToolExecutionContext};

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool, replacing any earlier tool with the same name.
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let name = tool.definition().name;
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            tracing::warn!(tool = %name, "replaced previously registered tool");
        }
    }

    pub fn register_fn<F, Fut>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(definition, handler));
    }

    pub fn register_sync_fn<F>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register_fn(definition, move |arguments, context| {
            let output = handler(arguments, context);
            async move { output }
        });
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::not_found(format!("Unknown tool: {name}")).with_tool_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    /// Definitions in name order, ready to hand to a provider or render into a prompt.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: format!("{name} tool"),
            parameters: json!({"type": "object", "properties": {}}),
        }
    }

    #[test]
    fn registry_lists_tools_in_name_order() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register_sync_fn(definition("getNews"), |args, _| Ok(args));
        registry.register_sync_fn(definition("getBalanceSheets"), |args, _| Ok(args));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["getBalanceSheets", "getNews"]);
        assert_eq!(registry.list()[0].name, "getBalanceSheets");

        assert!(registry.remove("getNews").is_some());
        assert!(!registry.contains("getNews"));
    }

    #[test]
    fn unknown_tool_lookup_names_the_tool() {
        let registry = ToolRegistry::new();
        let error = match registry.get("getWeather") {
            Ok(_) => panic!("lookup should fail"),
            Err(error) => error,
        };

        assert_eq!(error.kind, ToolErrorKind::NotFound);
        assert_eq!(error.message, "Unknown tool: getWeather");
    }
}

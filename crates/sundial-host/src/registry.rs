//! Tool registry for name-based dispatch.

use futures_util::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use sundial_types::{Tool, ToolDefinition, ToolError, ToolOutput};

/// Registry of available tools, supporting name-based dispatch.
///
/// Discovery order is registration order and never changes after
/// construction.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a registry with all built-in tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::ForecastTool));
        registry
    }

    /// Register a tool. Re-registering a name replaces the handler in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            tracing::info!("Registered tool '{name}'");
            self.order.push(name);
        }
    }

    /// All tool descriptors, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.definition())
            .collect()
    }

    /// Execute a tool by name with the given arguments.
    ///
    /// A panicking handler is reported as [`ToolError::Panicked`] instead of
    /// unwinding into the caller.
    pub async fn execute(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;
        match AssertUnwindSafe(tool.execute(input)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Panicked {
                tool: name.to_string(),
            }),
        }
    }

    /// Check if a tool exists by name.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

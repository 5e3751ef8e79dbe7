//! Tool registry - name-based dispatch table for the orchestrator

use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::error::Result;

use super::traits::{Tool, ToolCall, ToolDefinition, ToolResult};

/// Registry of available tools
///
/// Names are not namespaced per endpoint; registering a second tool under
/// an existing name replaces the first.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        ToolRegistry {
            tools: HashMap::new(),
        }
    }

    /// Register a tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            warn!(tool = %name, "Tool name registered twice; keeping the latest");
        }
    }

    /// Register every tool of a catalog
    pub fn register_all<T: Tool + 'static>(&mut self, tools: impl IntoIterator<Item = T>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        match self.get(&call.name) {
            Some(tool) => tool.execute(call.arguments.clone()).await,
            None => Ok(ToolResult::failure(format!(
                "Unknown tool: {}",
                call.name
            ))),
        }
    }

    /// Get tool count
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// List tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

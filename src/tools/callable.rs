//! MCP-to-Tool bridge
//!
//! Wraps a tool advertised by an MCP server as a callable the orchestrator
//! can invoke from synchronous code (`invoke`) or asynchronously (`Tool`).
//! Failures never escape: they come back as text starting with
//! [`ERROR_MARKER`](super::traits::ERROR_MARKER).

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

use super::schema::ParameterContract;
use super::traits::{Tool, ToolResult};
use crate::bridge::{self, CallerContext};
use crate::error::{Error, Result};
use crate::mcp::{ToolDescriptor, ToolProvider};

/// Provider shared by every tool of one endpoint
///
/// The mutex serializes calls, so one client never has two requests in flight.
pub type SharedProvider = Arc<Mutex<dyn ToolProvider>>;

/// Wrap a provider for sharing between tools
pub fn share<P: ToolProvider + 'static>(provider: P) -> SharedProvider {
    Arc::new(Mutex::new(provider))
}

/// Client-side, invokable representation of one MCP tool
#[derive(Clone)]
pub struct CallableTool {
    name: String,
    description: String,
    contract: ParameterContract,
    provider: SharedProvider,
}

impl CallableTool {
    /// Create a callable for a specific MCP tool
    pub fn new(descriptor: ToolDescriptor, provider: SharedProvider) -> Self {
        let contract = ParameterContract::from_schema(&descriptor.input_schema);
        let description = if descriptor.description.trim().is_empty() {
            format!("MCP tool: {}", descriptor.name)
        } else {
            descriptor.description
        };
        CallableTool {
            name: descriptor.name,
            description,
            contract,
            provider,
        }
    }

    pub fn contract(&self) -> &ParameterContract {
        &self.contract
    }

    /// Invoke the tool from synchronous code and return its text result
    ///
    /// Safe to call with or without a tokio runtime on the current thread.
    /// On a current-thread runtime, an endpoint already serving another call
    /// fails fast with [`Error::Busy`] instead of blocking the runtime.
    pub fn invoke(&self, args: Value) -> String {
        let outcome = self
            .contract
            .prepare(args)
            .and_then(|arguments| self.dispatch(arguments));
        self.render(outcome)
    }

    fn dispatch(&self, arguments: Value) -> Result<String> {
        // On a current-thread runtime the holder of the endpoint lock may be a
        // task on this very thread, which cannot run while we block on it.
        let held = match CallerContext::detect() {
            CallerContext::CurrentThreadRuntime => {
                let guard = Arc::clone(&self.provider).try_lock_owned().map_err(|_| {
                    Error::Busy(format!("endpoint for '{}' is serving another call", self.name))
                })?;
                Some(guard)
            }
            _ => None,
        };

        let provider = Arc::clone(&self.provider);
        let name = self.name.clone();
        bridge::block_on(move || async move {
            let mut provider = match held {
                Some(guard) => guard,
                None => provider.lock_owned().await,
            };
            provider.call_tool(&name, arguments).await
        })
    }

    /// Invoke the tool from async code and return its text result
    pub async fn invoke_async(&self, args: Value) -> String {
        let outcome = self.call(args).await;
        self.render(outcome)
    }

    async fn call(&self, args: Value) -> Result<String> {
        let arguments = self.contract.prepare(args)?;
        let mut provider = self.provider.lock().await;
        provider.call_tool(&self.name, arguments).await
    }

    fn render(&self, outcome: Result<String>) -> String {
        match outcome {
            Ok(text) => ToolResult::success(text).to_string(),
            Err(e) => self.failure(e).to_string(),
        }
    }

    fn failure(&self, e: Error) -> ToolResult {
        error!(tool = %self.name, "Error calling MCP tool: {}", e);
        ToolResult::failure(format!("MCP tool '{}' failed: {}", self.name, e))
    }
}

impl fmt::Debug for CallableTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for CallableTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.contract.to_json_schema()
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        match self.call(args).await {
            Ok(text) => Ok(ToolResult::success(text)),
            Err(e) => Ok(self.failure(e)),
        }
    }
}

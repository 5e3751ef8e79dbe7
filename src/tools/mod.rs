//! Tools module - callable tools built from MCP tool catalogs
//!
//! Each remote tool becomes a [`CallableTool`]: its input schema is turned
//! into a [`ParameterContract`], and calls go through the blocking bridge so
//! they work from synchronous and async callers alike. Tools can also be
//! registered into a [`ToolRegistry`] and dispatched by name.

mod callable;
mod registry;
mod schema;
mod traits;

// Core trait and types
pub use traits::{FunctionDefinition, Tool, ToolCall, ToolDefinition, ToolResult, ERROR_MARKER};

// Registry
pub use registry::ToolRegistry;

// Schema adapter
pub use schema::{ParamDefault, ParamKind, ParamSpec, ParameterContract, SIMPLE_INPUT};

// MCP-backed tools
pub use callable::{share, CallableTool, SharedProvider};

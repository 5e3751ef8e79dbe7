//! MCP (Model Context Protocol) module
//!
//! Client side of MCP over Streamable HTTP: JSON-RPC 2.0 requests POSTed to
//! one endpoint, answered as a JSON body or as an event stream.
//!
//! ## Architecture
//!
//! - **protocol**: Wire protocol types (JSON-RPC based)
//! - **codec**: Response decoding for JSON, event-stream and mislabeled SSE bodies
//! - **session**: Negotiated version, session token and handshake flag
//! - **client**: `McpClient` and the `ToolProvider` interface it implements
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mcp_bridge::mcp::{ClientOptions, McpClient};
//!
//! # async fn example() -> mcp_bridge::Result<()> {
//! let mut client = McpClient::new("http://localhost:8080/mcp", ClientOptions::default())?;
//!
//! // The handshake runs implicitly on first use
//! let tools = client.list_tools().await?;
//!
//! let text = client.call_tool("tool_name", serde_json::json!({"arg": "value"})).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod codec;
mod protocol;
mod session;

pub use client::{ClientOptions, Endpoint, McpClient, Timeouts, ToolProvider};
pub use codec::{decode_buffered, into_result, is_event_stream, parse_sse_like_body, EventSelector};
pub use protocol::{
    InputSchema, McpContent, RpcError, RpcNotification, RpcRequest, RpcResponse, ToolDescriptor,
    DEFAULT_PROTOCOL_VERSION, PROTOCOL_VERSION_HEADER, SESSION_ID_HEADER,
};
pub use session::Session;

//! MCP wire protocol types
//!
//! Based on the Model Context Protocol specification (JSON-RPC 2.0 over
//! Streamable HTTP).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protocol version sent when none is configured
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-06-18";

/// Header carrying the negotiated protocol version
pub const PROTOCOL_VERSION_HEADER: &str = "MCP-Protocol-Version";

/// Header carrying the server-issued session token
pub const SESSION_ID_HEADER: &str = "Mcp-Session-Id";

/// Accept header value: the server may answer with JSON or an event stream
pub const ACCEPT_VALUE: &str = "application/json, text/event-stream";

/// JSON-RPC request to an MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    /// Create a new request with a fresh random id
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: uuid::Uuid::new_v4().simple().to_string(),
            method: method.into(),
            params,
        }
    }

    /// Create an initialize request
    pub fn initialize(protocol_version: &str, client_name: &str, client_version: &str) -> Self {
        Self::new(
            "initialize",
            serde_json::json!({
                "protocolVersion": protocol_version,
                "capabilities": {
                    "sampling": null,
                    "experimental": null,
                    "roots": { "listChanged": true }
                },
                "clientInfo": {
                    "name": client_name,
                    "version": client_version
                }
            }),
        )
    }

    /// Create a tools/list request
    pub fn list_tools() -> Self {
        Self::new("tools/list", Value::Object(Map::new()))
    }

    /// Create a tools/call request
    pub fn call_tool(name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Self::new(
            "tools/call",
            serde_json::json!({
                "name": name.into(),
                "arguments": arguments
            }),
        )
    }
}

/// JSON-RPC notification (no id, no response expected)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
}

impl RpcNotification {
    /// The notification that completes the lifecycle handshake
    pub fn initialized() -> Self {
        RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: "notifications/initialized".to_string(),
        }
    }
}

/// JSON-RPC response from an MCP server
///
/// Every field is optional on the wire; servers in the wild omit `jsonrpc`
/// and send numeric ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Whether this response answers the request with the given id
    pub fn matches(&self, request_id: &str) -> bool {
        match &self.id {
            Some(Value::String(id)) => id == request_id,
            Some(Value::Number(n)) => n.to_string() == request_id,
            _ => false,
        }
    }

    /// Printable form of the response id, for logs
    pub fn id_display(&self) -> String {
        match &self.id {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => "<none>".to_string(),
        }
    }
}

/// MCP error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Tool definition from an MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name
    #[serde(default)]
    pub name: String,
    /// Tool description
    #[serde(default, deserialize_with = "string_or_empty")]
    pub description: String,
    /// Input schema (JSON Schema)
    #[serde(rename = "inputSchema", default, deserialize_with = "schema_or_empty")]
    pub input_schema: InputSchema,
}

/// Tool input schema
///
/// Servers are loose about this object, so every field falls back to empty
/// when it has the wrong shape instead of rejecting the whole tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_type: Option<String>,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub properties: Map<String, Value>,
    #[serde(default, deserialize_with = "names_or_empty")]
    pub required: Vec<String>,
}

/// Content block returned by a tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpContent {
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn string_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(string_or_none(deserializer)?.unwrap_or_default())
}

fn object_or_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

fn names_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn schema_or_empty<'de, D>(deserializer: D) -> std::result::Result<InputSchema, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RpcRequest::list_tools();
        let b = RpcRequest::list_tools();
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 32);
    }

    #[test]
    fn test_call_tool_params() {
        let req = RpcRequest::call_tool("demo", serde_json::json!({"count": 2}));
        assert_eq!(req.method, "tools/call");
        assert_eq!(
            req.params,
            serde_json::json!({"name": "demo", "arguments": {"count": 2}})
        );

        let req = RpcRequest::call_tool("demo", Value::Null);
        assert_eq!(req.params["arguments"], serde_json::json!({}));
    }

    #[test]
    fn test_descriptor_defaults() {
        let tool: ToolDescriptor =
            serde_json::from_value(serde_json::json!({"name": "bare"})).unwrap();
        assert_eq!(tool.name, "bare");
        assert!(tool.description.is_empty());
        assert!(tool.input_schema.properties.is_empty());

        let tool: ToolDescriptor = serde_json::from_value(serde_json::json!({
            "name": "nulls",
            "description": null,
            "inputSchema": null
        }))
        .unwrap();
        assert!(tool.description.is_empty());
        assert!(tool.input_schema.required.is_empty());
    }

    #[test]
    fn test_descriptor_tolerates_malformed_schema() {
        let tool: ToolDescriptor = serde_json::from_value(serde_json::json!({
            "name": "odd",
            "description": 42,
            "inputSchema": {"type": ["object"], "properties": [], "required": "x"}
        }))
        .unwrap();
        assert_eq!(tool.name, "odd");
        assert!(tool.description.is_empty());
        assert!(tool.input_schema.schema_type.is_none());
        assert!(tool.input_schema.properties.is_empty());
        assert!(tool.input_schema.required.is_empty());

        let tool: ToolDescriptor = serde_json::from_value(serde_json::json!({
            "name": "mixed",
            "inputSchema": {"properties": {"a": {"type": "string"}}, "required": ["a", 1]}
        }))
        .unwrap();
        assert_eq!(tool.input_schema.required, vec!["a"]);

        let tool: ToolDescriptor =
            serde_json::from_value(serde_json::json!({"name": "flat", "inputSchema": "none"}))
                .unwrap();
        assert!(tool.input_schema.properties.is_empty());
    }

    #[test]
    fn test_response_matches_numeric_id() {
        let resp: RpcResponse =
            serde_json::from_value(serde_json::json!({"id": 7, "result": {}})).unwrap();
        assert!(resp.matches("7"));
        assert!(!resp.matches("8"));
        assert_eq!(resp.id_display(), "7");
    }
}

//! Shared wiremock fixtures for MCP servers

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// How a mock server frames its JSON-RPC answer
#[derive(Debug, Clone, Copy)]
pub enum Framing {
    Json,
    EventStream,
    MislabeledSse,
    Empty,
}

/// Answers a JSON-RPC request, echoing its id
#[derive(Debug, Clone)]
pub struct RpcResponder {
    pub result: Value,
    pub error: Option<Value>,
    pub framing: Framing,
    pub session: Option<String>,
}

impl RpcResponder {
    pub fn result(result: Value) -> Self {
        RpcResponder {
            result,
            error: None,
            framing: Framing::Json,
            session: None,
        }
    }

    pub fn error(code: i64, message: &str) -> Self {
        RpcResponder {
            result: Value::Null,
            error: Some(json!({"code": code, "message": message})),
            framing: Framing::Json,
            session: None,
        }
    }

    pub fn framed(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_session(mut self, token: &str) -> Self {
        self.session = Some(token.to_string());
        self
    }
}

pub fn request_id(request: &Request) -> Value {
    serde_json::from_slice::<Value>(&request.body)
        .ok()
        .and_then(|body| body.get("id").cloned())
        .unwrap_or(Value::Null)
}

impl Respond for RpcResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = request_id(request);
        let message = match &self.error {
            Some(error) => json!({"jsonrpc": "2.0", "id": id, "error": error}),
            None => json!({"jsonrpc": "2.0", "id": id, "result": self.result}),
        };

        let template = match self.framing {
            Framing::Json => ResponseTemplate::new(200).set_body_json(&message),
            Framing::EventStream => ResponseTemplate::new(200).set_body_raw(
                format!(": ping\n\nevent: message\ndata: {}\n\n", message),
                "text/event-stream",
            ),
            Framing::MislabeledSse => ResponseTemplate::new(200).set_body_raw(
                format!("event: message\ndata: {}\n\n", message),
                "text/plain",
            ),
            Framing::Empty => ResponseTemplate::new(200),
        };

        match &self.session {
            Some(token) => template.insert_header("Mcp-Session-Id", token.as_str()),
            None => template,
        }
    }
}

/// Answer requests for one JSON-RPC method
pub async fn mount_method<R: Respond + 'static>(server: &MockServer, rpc_method: &str, responder: R) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": rpc_method})))
        .respond_with(responder)
        .mount(server)
        .await;
}

/// Accept the handshake, optionally issuing a session token
pub async fn mount_handshake(server: &MockServer, session: Option<&str>) {
    let mut responder = RpcResponder::result(json!({
        "protocolVersion": "2025-06-18",
        "capabilities": {"tools": {}},
        "serverInfo": {"name": "mock", "version": "0.0.0"}
    }));
    if let Some(token) = session {
        responder = responder.with_session(token);
    }
    mount_method(server, "initialize", responder).await;
    mount_method(server, "notifications/initialized", ResponseTemplate::new(202)).await;
}

/// A tools/list result with one demo tool per name
pub fn tool_list(names: &[&str]) -> Value {
    let tools: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "description": format!("{} tool", name),
                "inputSchema": {
                    "type": "object",
                    "properties": {"count": {"type": "integer", "description": "amount"}},
                    "required": ["count"]
                }
            })
        })
        .collect();
    json!({ "tools": tools })
}

/// Requests received for one JSON-RPC method, as parsed bodies
pub async fn received(server: &MockServer, rpc_method: &str) -> Vec<(Request, Value)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter_map(|request| {
            let body: Value = serde_json::from_slice(&request.body).ok()?;
            (body["method"] == rpc_method).then_some((request, body))
        })
        .collect()
}

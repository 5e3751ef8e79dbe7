//! MCP client for Streamable HTTP servers
//!
//! Every exchange is a JSON-RPC POST to one endpoint URL. The server answers
//! either with a plain JSON body or with an event stream carrying the
//! response as one of its events.

use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use super::codec::{decode_buffered, into_result, is_event_stream, EventSelector};
use super::protocol::{
    McpContent, RpcNotification, RpcRequest, RpcResponse, ToolDescriptor, ACCEPT_VALUE,
    DEFAULT_PROTOCOL_VERSION, PROTOCOL_VERSION_HEADER, SESSION_ID_HEADER,
};
use super::session::Session;
use crate::error::{Error, Result};

/// Source of tools the rest of the crate talks to
///
/// `McpClient` is the real implementation; anything else (test fakes,
/// in-process servers) can stand in for it.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Human-readable endpoint identity, for logs
    fn endpoint(&self) -> &str;

    /// Enumerate the tools the provider offers
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>>;

    /// Invoke a tool and return its text result
    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<String>;
}

/// Per-operation deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub handshake: Duration,
    pub list: Duration,
    pub call: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            handshake: Duration::from_secs(30),
            list: Duration::from_secs(60),
            call: Duration::from_secs(120),
        }
    }
}

/// Options shared by every client a catalog creates
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Protocol version requested in the handshake
    pub protocol_version: String,
    /// Deadlines for handshake, enumerate and invoke
    pub timeouts: Timeouts,
    /// Client identity sent in the handshake
    pub client_name: String,
    pub client_version: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            timeouts: Timeouts::default(),
            client_name: crate::NAME.to_string(),
            client_version: crate::VERSION.to_string(),
        }
    }
}

/// One remote MCP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    protocol_version: String,
}

impl Endpoint {
    /// Parse a base URL; a trailing slash is dropped
    pub fn parse(raw: &str, protocol_version: impl Into<String>) -> Result<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        let url = Url::parse(trimmed)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Unsupported MCP endpoint scheme '{}' in {}",
                url.scheme(),
                trimmed
            )));
        }
        Ok(Endpoint {
            url,
            protocol_version: protocol_version.into(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }
}

/// MCP client for communicating with one MCP server
///
/// Requests are issued strictly one at a time; the `&mut self` receivers
/// make concurrent use a compile error rather than a protocol hazard.
pub struct McpClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    session: Session,
    options: ClientOptions,
}

impl McpClient {
    /// Create a client for the given URL; no network traffic happens yet
    pub fn new(url: &str, options: ClientOptions) -> Result<Self> {
        let endpoint = Endpoint::parse(url, options.protocol_version.clone())?;

        // Pooled connections are bound to the runtime that opened them, and
        // a client may be driven from several short-lived runtimes.
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(McpClient {
            http,
            session: Session::new(endpoint.protocol_version()),
            endpoint,
            options,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_initialized()
    }

    /// Perform the handshake unless it already happened
    pub async fn ensure_initialized(&mut self) -> Result<()> {
        if self.session.is_initialized() {
            return Ok(());
        }

        info!(endpoint = %self.endpoint.as_str(), "Initializing MCP session");
        let request = RpcRequest::initialize(
            self.session.protocol_version(),
            &self.options.client_name,
            &self.options.client_version,
        );
        let timeout = self.options.timeouts.handshake;
        let result = self.send_request(request, timeout).await?;

        self.session
            .negotiate(result.get("protocolVersion").and_then(Value::as_str));
        self.session.mark_initialized();
        debug!(
            endpoint = %self.endpoint.as_str(),
            protocol_version = %self.session.protocol_version(),
            session = ?self.session.session_token(),
            "MCP session initialized"
        );

        self.notify_initialized().await;
        Ok(())
    }

    /// List available tools from the MCP server
    pub async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>> {
        self.ensure_initialized().await?;

        let timeout = self.options.timeouts.list;
        let result = self.send_request(RpcRequest::list_tools(), timeout).await?;

        let tools: Vec<ToolDescriptor> = result
            .get("tools")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| match serde_json::from_value(entry.clone()) {
                        Ok(tool) => Some(tool),
                        Err(e) => {
                            warn!(endpoint = %self.endpoint.as_str(), "Skipping malformed tool entry: {}", e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        debug!(endpoint = %self.endpoint.as_str(), "MCP server has {} tools", tools.len());
        Ok(tools)
    }

    /// Call a tool on the MCP server
    ///
    /// Returns the text of the first content item, or the whole result
    /// serialized as JSON when there is no such text.
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<String> {
        self.ensure_initialized().await?;

        debug!(endpoint = %self.endpoint.as_str(), tool = %name, arguments = %arguments, "Calling MCP tool");
        let timeout = self.options.timeouts.call;
        let result = self
            .send_request(RpcRequest::call_tool(name, arguments), timeout)
            .await?;

        if result.get("isError").and_then(Value::as_bool).unwrap_or(false) {
            warn!(tool = %name, "MCP tool returned error");
        }

        Ok(first_text(&result).unwrap_or_else(|| result.to_string()))
    }

    /// Send a request and wait for the response answering it
    async fn send_request(&mut self, request: RpcRequest, timeout: Duration) -> Result<Value> {
        debug!(
            endpoint = %self.endpoint.as_str(),
            method = %request.method,
            id = %request.id,
            "MCP request ->"
        );

        let response = self
            .post(&request, timeout)
            .send()
            .await
            .map_err(|e| self.classify(&request.method, timeout, e))?;

        self.session.record_token(
            response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|h| h.to_str().ok()),
        );

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("")
            .to_string();

        let selected = if status < 400 && is_event_stream(&content_type) {
            read_event_stream(response, &request.id)
                .await
                .map_err(|e| self.reclassify(&request.method, timeout, e))?
        } else {
            let body = response
                .text()
                .await
                .map_err(|e| self.classify(&request.method, timeout, e))?;
            if status >= 400 {
                error!(endpoint = %self.endpoint.as_str(), status, body = %body, "MCP HTTP error");
            } else {
                debug!(endpoint = %self.endpoint.as_str(), content_type = %content_type, body = %body, "MCP response <-");
            }
            decode_buffered(status, &body)?
        };

        into_result(selected, &request.id)
    }

    /// Complete the lifecycle handshake; failures are logged only
    async fn notify_initialized(&mut self) {
        let timeout = self.options.timeouts.handshake;
        match self.post(&RpcNotification::initialized(), timeout).send().await {
            Ok(response) => {
                self.session.record_token(
                    response
                        .headers()
                        .get(SESSION_ID_HEADER)
                        .and_then(|h| h.to_str().ok()),
                );
                if !response.status().is_success() {
                    warn!(
                        endpoint = %self.endpoint.as_str(),
                        status = response.status().as_u16(),
                        "initialized notification rejected"
                    );
                }
            }
            Err(e) => warn!(endpoint = %self.endpoint.as_str(), "initialized notification failed: {}", e),
        }
    }

    fn post<T: Serialize>(&self, body: &T, timeout: Duration) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .post(self.endpoint.url().clone())
            .timeout(timeout)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(CONTENT_TYPE, "application/json")
            .header(PROTOCOL_VERSION_HEADER, self.session.protocol_version())
            .json(body);

        if let Some(token) = self.session.session_token() {
            request = request.header(SESSION_ID_HEADER, token);
        }
        request
    }

    fn classify(&self, method: &str, timeout: Duration, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(format!(
                "{} to {} exceeded {:?}",
                method,
                self.endpoint.as_str(),
                timeout
            ))
        } else {
            Error::Transport(format!(
                "{} to {} failed: {}",
                method,
                self.endpoint.as_str(),
                err
            ))
        }
    }

    fn reclassify(&self, method: &str, timeout: Duration, err: Error) -> Error {
        match err {
            Error::Timeout(_) => Error::Timeout(format!(
                "{} to {} exceeded {:?}",
                method,
                self.endpoint.as_str(),
                timeout
            )),
            other => other,
        }
    }
}

#[async_trait]
impl ToolProvider for McpClient {
    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>> {
        McpClient::list_tools(self).await
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<String> {
        McpClient::call_tool(self, name, arguments).await
    }
}

/// Read events until the one answering `request_id` arrives
///
/// Returning early drops the body stream, which closes the connection
/// without waiting for further events.
async fn read_event_stream(
    response: reqwest::Response,
    request_id: &str,
) -> Result<Option<RpcResponse>> {
    let mut events = response.bytes_stream().eventsource();
    let mut selector = EventSelector::new(request_id);

    while let Some(event) = events.next().await {
        let event = event.map_err(stream_error)?;
        if let Some(hit) = selector.offer(&event.data) {
            return Ok(Some(hit));
        }
    }

    debug!(id = %request_id, "Event stream closed without a matching response");
    Ok(selector.finish())
}

fn stream_error(err: EventStreamError<reqwest::Error>) -> Error {
    match err {
        EventStreamError::Transport(e) => Error::from(e),
        other => Error::Decode {
            message: format!("Malformed event stream: {}", other),
            body: String::new(),
        },
    }
}

/// Text of the first content item of a tools/call result
fn first_text(result: &Value) -> Option<String> {
    let first = result.get("content")?.as_array()?.first()?;
    if let Ok(content) = serde_json::from_value::<McpContent>(first.clone()) {
        if let Some(text) = content.text {
            return Some(text);
        }
    }
    first.get("text").map(|text| match text {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

//! Transport codec for Streamable HTTP responses
//!
//! A JSON-RPC answer arrives in one of three shapes:
//!
//! - `application/json` body holding the response object
//! - `text/event-stream` where each event's `data:` payload is a JSON message
//! - a body framed as SSE `data:` lines but labeled as something else
//!
//! Event streams are framed by `eventsource-stream`; the client feeds each
//! event's data to an [`EventSelector`]. Everything else goes through
//! [`decode_buffered`]. [`into_result`] turns the selected response into the
//! call result.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::protocol::RpcResponse;
use crate::error::{Error, Result};

/// Whether a Content-Type header value announces an event stream
pub fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case("text/event-stream"))
        .unwrap_or(false)
}

/// Picks the event answering one outstanding request out of a stream
#[derive(Debug)]
pub struct EventSelector {
    request_id: String,
    last_response: Option<RpcResponse>,
}

impl EventSelector {
    pub fn new(request_id: impl Into<String>) -> Self {
        EventSelector {
            request_id: request_id.into(),
            last_response: None,
        }
    }

    /// Offer one event payload; returns the response once the matching id arrives
    pub fn offer(&mut self, data: &str) -> Option<RpcResponse> {
        if data.trim().is_empty() {
            return None;
        }
        let message: RpcResponse = match serde_json::from_str(data) {
            Ok(message) => message,
            Err(e) => {
                warn!(id = %self.request_id, "Failed to parse SSE JSON: {}", e);
                return None;
            }
        };

        if message.matches(&self.request_id) {
            return Some(message);
        }

        debug!(
            id = %self.request_id,
            got = %message.id_display(),
            "Skipping SSE message for another id"
        );
        if message.result.is_some() || message.error.is_some() {
            self.last_response = Some(message);
        }
        None
    }

    /// The stream closed without a matching event: hand back the last response seen
    pub fn finish(self) -> Option<RpcResponse> {
        self.last_response
    }
}

/// Decode a fully buffered HTTP response
///
/// Returns `Ok(None)` for an empty body, which callers treat as an empty
/// successful result.
pub fn decode_buffered(status: u16, body: &str) -> Result<Option<RpcResponse>> {
    if status >= 400 {
        return Err(Error::Http {
            status,
            body: body.to_string(),
        });
    }

    if body.trim().is_empty() {
        debug!("MCP HTTP response is empty body; returning empty result");
        return Ok(None);
    }

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(e) => match parse_sse_like_body(body) {
            Some(value) => {
                debug!("Recovered JSON-RPC payload from SSE-framed body");
                value
            }
            None => {
                return Err(Error::Decode {
                    message: format!("Failed to parse MCP JSON response: {}", e),
                    body: body.to_string(),
                })
            }
        },
    };

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| Error::Decode {
            message: format!("Not a JSON-RPC response: {}", e),
            body: body.to_string(),
        })
}

/// Recover a JSON payload from a body organized as SSE `data:` lines
///
/// All `data:` payloads are concatenated before parsing, so a message split
/// across several lines is reassembled.
pub fn parse_sse_like_body(body: &str) -> Option<Value> {
    let data: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect();

    if data.is_empty() {
        return None;
    }
    serde_json::from_str(&data.concat()).ok()
}

/// Turn the selected response into the call result
///
/// A remote `error` fails regardless of HTTP status. An id mismatch only
/// warns: the client never has more than one request in flight.
pub fn into_result(response: Option<RpcResponse>, request_id: &str) -> Result<Value> {
    let Some(response) = response else {
        return Ok(Value::Object(Map::new()));
    };

    if let Some(err) = response.error {
        return Err(Error::Protocol {
            code: err.code,
            message: err.message,
        });
    }

    if !response.matches(request_id) {
        warn!(
            expected = %request_id,
            got = %response.id_display(),
            "Mismatched response id"
        );
    }

    Ok(response.result.unwrap_or_else(|| Value::Object(Map::new())))
}

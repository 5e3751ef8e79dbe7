//! Error types for the MCP bridge

use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the MCP bridge
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failure or unreadable response
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP status >= 400, with the raw body for diagnostics
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Remote JSON-RPC error object
    #[error("MCP error {code}: {message}")]
    Protocol { code: i64, message: String },

    /// Body is neither JSON nor recoverable SSE-shaped JSON
    #[error("Decode error: {message} (raw: {body})")]
    Decode { message: String, body: String },

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Tool arguments rejected by the parameter contract
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint is serving another call and the caller cannot wait for it
    #[error("Endpoint busy: {0}")]
    Busy(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if error is retryable
    ///
    /// The client itself never retries; this is for callers deciding whether
    /// to discard and recreate a client.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) | Error::Timeout(_) | Error::Busy(_) => true,
            Error::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("Invalid endpoint URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(Error::Timeout("call".into()).is_retryable());
        assert!(Error::Transport("refused".into()).is_retryable());
        assert!(Error::Busy("demo".into()).is_retryable());
        assert!(Error::Http { status: 503, body: String::new() }.is_retryable());
        assert!(!Error::Http { status: 404, body: String::new() }.is_retryable());
        assert!(!Error::Protocol { code: -32601, message: "nope".into() }.is_retryable());
    }

    #[test]
    fn test_display_keeps_raw_body() {
        let err = Error::Http { status: 500, body: "boom".into() };
        assert_eq!(err.to_string(), "HTTP error 500: boom");

        let err = Error::Decode { message: "not json".into(), body: "<html>".into() };
        assert!(err.to_string().contains("<html>"));
    }
}

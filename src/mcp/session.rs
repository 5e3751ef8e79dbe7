//! Per-client session state

/// Negotiated protocol state for one client
///
/// Created uninitialized. The session token, once issued by the server, is
/// kept for the life of the owning client and never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    protocol_version: String,
    session_token: Option<String>,
    initialized: bool,
}

impl Session {
    pub fn new(protocol_version: impl Into<String>) -> Self {
        Session {
            protocol_version: protocol_version.into(),
            session_token: None,
            initialized: false,
        }
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Record a token seen on a response; absent or blank values are ignored
    pub fn record_token(&mut self, token: Option<&str>) {
        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            self.session_token = Some(token.to_string());
        }
    }

    /// Adopt the version the server answered the handshake with
    pub fn negotiate(&mut self, server_version: Option<&str>) {
        if let Some(version) = server_version.filter(|v| !v.is_empty()) {
            self.protocol_version = version.to_string();
        }
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }
}

//! Configuration management for the MCP bridge
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present).

use crate::catalog::parse_endpoint_list;
use crate::mcp::{ClientOptions, Timeouts, DEFAULT_PROTOCOL_VERSION};
use crate::{Error, Result};
use secrecy::SecretString;
use std::time::Duration;
use tracing::info;

/// Prefix one hosting vendor puts on model ids that its endpoint does not accept
pub const HOSTED_VLLM_PREFIX: &str = "hosted_vllm/";

/// System prompt used when `AGENT_SYSTEM_PROMPT` is not set
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Use the available tools to solve the user's tasks.";

/// MCP endpoint configuration
#[derive(Debug, Clone)]
pub struct McpConfig {
    /// Comma-separated endpoint URLs, as configured
    pub urls: Option<String>,
    /// Protocol version requested in the handshake
    pub protocol_version: String,
    /// Handshake timeout in seconds
    pub handshake_timeout_secs: u64,
    /// tools/list timeout in seconds
    pub list_timeout_secs: u64,
    /// tools/call timeout in seconds
    pub call_timeout_secs: u64,
}

impl McpConfig {
    /// Configured endpoints, trimmed, empty entries skipped
    pub fn endpoints(&self) -> Vec<String> {
        parse_endpoint_list(self.urls.as_deref())
    }

    /// Client options derived from this configuration
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            protocol_version: self.protocol_version.clone(),
            timeouts: Timeouts {
                handshake: Duration::from_secs(self.handshake_timeout_secs),
                list: Duration::from_secs(self.list_timeout_secs),
                call: Duration::from_secs(self.call_timeout_secs),
            },
            ..ClientOptions::default()
        }
    }
}

/// LLM endpoint configuration, consumed by the external orchestrator
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model id, normalized
    pub model: Option<String>,
    /// Base URL of the OpenAI-compatible API
    pub api_base: Option<String>,
    /// API key
    pub api_key: Option<SecretString>,
}

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// System prompt for the orchestrator
    pub system_prompt: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter
    pub level: String,
    /// Log format (pretty, json)
    pub format: String,
}

impl LogConfig {
    /// Logging settings alone, so a subscriber can be installed before the
    /// rest of the configuration is read
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        LogConfig {
            level: lookup("RUST_LOG").unwrap_or_else(|| "info,mcp_bridge=debug".to_string()),
            format: lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// MCP endpoint settings
    pub mcp: McpConfig,
    /// LLM settings
    pub llm: LlmConfig,
    /// Agent settings
    pub agent: AgentConfig,
    /// Logging settings
    pub log: LogConfig,
}

/// Strip the vendor prefix from a model id
pub fn normalize_model(raw: &str) -> &str {
    raw.strip_prefix(HOSTED_VLLM_PREFIX).unwrap_or(raw)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str, default: u64| -> Result<u64> {
            match non_empty(key) {
                None => Ok(default),
                Some(v) => v.trim().parse().map_err(|_| {
                    Error::Config(format!("{} must be a whole number of seconds, got '{}'", key, v))
                }),
            }
        };

        let model = non_empty("LLM_MODEL").map(|raw| {
            let model = normalize_model(&raw).to_string();
            if model != raw {
                info!("Normalized LLM_MODEL from {} to {}", raw, model);
            }
            model
        });

        Ok(Config {
            mcp: McpConfig {
                urls: lookup("MCP_URL"),
                protocol_version: non_empty("MCP_PROTOCOL_VERSION")
                    .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string()),
                handshake_timeout_secs: secs("MCP_HANDSHAKE_TIMEOUT", 30)?,
                list_timeout_secs: secs("MCP_LIST_TIMEOUT", 60)?,
                call_timeout_secs: secs("MCP_CALL_TIMEOUT", 120)?,
            },
            llm: LlmConfig {
                model,
                api_base: non_empty("LLM_API_BASE"),
                api_key: non_empty("LLM_API_KEY").map(SecretString::from),
            },
            agent: AgentConfig {
                system_prompt: non_empty("AGENT_SYSTEM_PROMPT")
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            },
            log: LogConfig::from_lookup(&lookup),
        })
    }

    /// Create a minimal config for testing or commands that don't need full config
    pub fn minimal() -> Self {
        Config {
            mcp: McpConfig {
                urls: None,
                protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
                handshake_timeout_secs: 30,
                list_timeout_secs: 60,
                call_timeout_secs: 120,
            },
            llm: LlmConfig {
                model: None,
                api_base: None,
                api_key: None,
            },
            agent: AgentConfig {
                system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            },
            log: LogConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.mcp.handshake_timeout_secs == 0
            || self.mcp.list_timeout_secs == 0
            || self.mcp.call_timeout_secs == 0
        {
            return Err(Error::Config("MCP timeouts must be greater than zero".to_string()));
        }
        if let Some(base) = &self.llm.api_base {
            url::Url::parse(base)
                .map_err(|e| Error::Config(format!("LLM_API_BASE is not a valid URL: {}", e)))?;
        }
        if !matches!(self.log.format.as_str(), "pretty" | "json") {
            return Err(Error::Config(format!(
                "Invalid LOG_FORMAT: {}. Valid options: pretty, json",
                self.log.format
            )));
        }
        Ok(())
    }
}

//! # MCP Bridge
//!
//! Client for MCP servers over Streamable HTTP, and an adapter turning a
//! server's tool catalog into typed, callable tools for an LLM orchestrator.
//!
//! ## Features
//!
//! - **Dual transport:** JSON bodies, event streams, and SSE-framed bodies served with the wrong content type
//! - **Session handling:** one handshake per client, session token echoed on every later request
//! - **Typed tools:** input schemas become parameter contracts validated before dispatch
//! - **Blocking bridge:** tools callable from sync code or from inside a running tokio runtime
//! - **Fault isolation:** tool failures come back as text, unreachable endpoints are skipped

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;

pub use catalog::CatalogBuilder;
pub use config::Config;
pub use error::{Error, Result};
pub use tools::{CallableTool, Tool};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");

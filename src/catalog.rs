//! Tool catalog builder
//!
//! Connects to every configured MCP endpoint, lists its tools and wraps each
//! one as a [`CallableTool`]. An endpoint that cannot be reached is logged
//! and skipped; building a catalog never fails as a whole.

use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::bridge;
use crate::error::Result;
use crate::mcp::{ClientOptions, McpClient};
use crate::tools::{share, CallableTool, SharedProvider};

/// Factory creating the provider for one endpoint URL
pub type Connector = Arc<dyn Fn(&str, &ClientOptions) -> Result<SharedProvider> + Send + Sync>;

/// Split a comma-separated endpoint list, trimming entries and skipping empty ones
pub fn parse_endpoint_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds a flat list of callable tools from one or more endpoints
#[derive(Clone)]
pub struct CatalogBuilder {
    options: ClientOptions,
    connector: Connector,
}

impl CatalogBuilder {
    /// Builder connecting with a fresh `McpClient` per endpoint
    pub fn new(options: ClientOptions) -> Self {
        CatalogBuilder {
            options,
            connector: Arc::new(|url: &str, options: &ClientOptions| -> Result<SharedProvider> {
                Ok(share(McpClient::new(url, options.clone())?))
            }),
        }
    }

    /// Replace how providers are created
    pub fn with_connector<F>(mut self, connector: F) -> Self
    where
        F: Fn(&str, &ClientOptions) -> Result<SharedProvider> + Send + Sync + 'static,
    {
        self.connector = Arc::new(connector);
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Collect tools from every endpoint in a comma-separated list
    pub async fn build(&self, urls: Option<&str>) -> Vec<CallableTool> {
        let endpoints = parse_endpoint_list(urls);
        if endpoints.is_empty() {
            info!("No MCP_URL configured, running without MCP tools");
            return Vec::new();
        }

        let mut tools = Vec::new();
        for url in &endpoints {
            info!(endpoint = %url, "Connecting to MCP server");
            match self.build_endpoint(url).await {
                Ok(found) => {
                    info!(endpoint = %url, "Found {} tools", found.len());
                    tools.extend(found);
                }
                Err(e) => error!(endpoint = %url, "Failed to connect to MCP server: {}", e),
            }
        }
        tools
    }

    /// Collect tools from a single endpoint
    pub async fn build_endpoint(&self, url: &str) -> Result<Vec<CallableTool>> {
        let provider = (self.connector)(url, &self.options)?;
        let descriptors = provider.lock().await.list_tools().await?;

        Ok(descriptors
            .into_iter()
            .map(|descriptor| {
                info!(endpoint = %url, tool = %descriptor.name, "Added tool");
                CallableTool::new(descriptor, Arc::clone(&provider))
            })
            .collect())
    }

    /// Blocking variant of [`build`](Self::build), safe inside or outside a runtime
    pub fn load_tools(&self, urls: Option<&str>) -> Vec<CallableTool> {
        let builder = self.clone();
        let urls = urls.map(str::to_string);
        match bridge::block_on(move || async move { Ok(builder.build(urls.as_deref()).await) }) {
            Ok(tools) => tools,
            Err(e) => {
                error!("Error getting MCP tools: {}", e);
                Vec::new()
            }
        }
    }
}

impl fmt::Debug for CatalogBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogBuilder")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

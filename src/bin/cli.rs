//! MCP tools CLI
//!
//! Lists and calls the tools exposed by the configured MCP servers.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mcp_bridge::config::LogConfig;
use mcp_bridge::tools::{ParamSpec, Tool};
use mcp_bridge::{CatalogBuilder, Config, VERSION};
use serde_json::Value;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "mcp-tools",
    version = VERSION,
    about = "Inspect and call tools served by MCP endpoints",
    long_about = None
)]
struct Cli {
    /// Comma-separated MCP endpoint URLs (overrides MCP_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every tool of every endpoint
    List,

    /// Call one tool and print its result
    Call {
        /// Tool name
        name: String,
        /// Arguments as a JSON object
        #[arg(long, conflicts_with = "input")]
        args: Option<String>,
        /// Text input for tools without declared parameters
        #[arg(long)]
        input: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging first, so messages emitted while loading the config are kept.
    init_logging(&LogConfig::from_env());

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    info!("Starting mcp-tools v{}", VERSION);

    let urls = cli.url.or_else(|| config.mcp.urls.clone());
    let builder = CatalogBuilder::new(config.mcp.client_options());
    let tools = builder.build(urls.as_deref()).await;

    match cli.command {
        Commands::List => {
            if tools.is_empty() {
                println!("No tools available.");
            }
            for tool in &tools {
                println!("{} - {}", tool.name(), tool.description());
                if tool.contract().is_simple() {
                    println!("    <input: string>");
                }
                for param in tool.contract().params() {
                    println!("    {}", describe_param(param));
                }
            }
        }
        Commands::Call { name, args, input } => {
            let tool = tools
                .iter()
                .find(|t| t.name() == name)
                .with_context(|| format!("No tool named '{}' on the configured endpoints", name))?;

            let arguments = match (args, input) {
                (Some(json), _) => serde_json::from_str(&json).context("--args must be valid JSON")?,
                (None, Some(text)) => Value::String(text),
                (None, None) => Value::Null,
            };

            println!("{}", tool.invoke(arguments));
        }
    }

    Ok(())
}

fn describe_param(param: &ParamSpec) -> String {
    let marker = if param.is_required() { "" } else { "?" };
    if param.description.is_empty() {
        format!("{}{}: {}", param.name, marker, param.kind.as_str())
    } else {
        format!(
            "{}{}: {} - {}",
            param.name,
            marker,
            param.kind.as_str(),
            param.description
        )
    }
}

fn init_logging(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_new(&log.level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if log.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

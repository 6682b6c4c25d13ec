//! Kumiko MCP server binary.
//!
//! Exposes a Notion workspace to MCP clients (Claude Code, Gemini CLI,
//! opencode) over stdio. Requires `NOTION_API_KEY` in the environment.
//!
//! Usage:
//!   NOTION_API_KEY=secret_... cargo run -p kumiko-mcp
//!
//! Test with MCP inspector:
//!   npx @modelcontextprotocol/inspector cargo run -p kumiko-mcp

use anyhow::Result;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::{EnvFilter, fmt};

use kumiko_client::NotionClient;
use kumiko_mcp::KumikoMcp;

/// MCP server exposing a Notion workspace.
#[derive(Parser, Debug)]
#[command(name = "kumiko-mcp")]
#[command(about = "MCP server for Notion workspaces")]
struct Args {
    /// Notion API base URL override (proxies, test servers)
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing goes to stderr — stdout carries the MCP protocol.
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();

    let mut client = NotionClient::from_env()?;
    if let Some(base_url) = args.base_url {
        tracing::info!(%base_url, "Using API base URL override");
        client = client.with_base_url(base_url);
    }

    let service = KumikoMcp::with_client(client)
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("MCP server error: {:?}", e);
        })?;

    tracing::info!("kumiko-mcp server ready");

    service.waiting().await?;

    tracing::info!("kumiko-mcp server shutting down");
    Ok(())
}

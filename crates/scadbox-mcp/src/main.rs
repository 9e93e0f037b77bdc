//! scadbox MCP Server
//!
//! This binary runs the scadbox file tools as an MCP server over stdio,
//! confined to a single project directory.

use std::path::PathBuf;

use clap::Parser;
use rmcp::ServiceExt;
use scadbox_mcp::ScadServer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// scadbox MCP Server - OpenSCAD project files and reference over MCP
#[derive(Parser, Debug)]
#[command(name = "scadbox-mcp")]
#[command(about = "MCP server giving agents sandboxed access to an OpenSCAD project")]
struct Args {
    /// Project directory all file tools are confined to
    #[arg(long, env = "SCADBOX_ROOT", default_value = ".")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - output to stderr so it doesn't interfere with MCP stdio
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let server = ScadServer::new(&args.root)
        .inspect_err(|e| tracing::error!("Cannot open project: {}", e))?;
    tracing::info!(root = %server.root().display(), "Starting scadbox MCP server");

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("Failed to start MCP service: {}", e);
        })?;

    tracing::info!("scadbox MCP server running");

    service.waiting().await?;

    tracing::info!("scadbox MCP server shutting down");

    Ok(())
}

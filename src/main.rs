//! PipeRun MCP Server - Main entry point
//!
//! Exposes the PipeRun CRM REST API and a set of RevOps workflows to AI
//! assistants over the Model Context Protocol (stdio transport).

use anyhow::Result;
use piperun_mcp_server::client::{AsyncPipeRunClient, AsyncPipeRunClientImpl};
use piperun_mcp_server::{Config, PipeRunClient, PipeRunMcpServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration before logging so LOG_LEVEL can seed the filter
    let config = Config::from_env();

    let default_level = config
        .as_ref()
        .map(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|_| "error".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stderr only; stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match config {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Starting PipeRun MCP Server with API URL: {}",
        config.api_base_url
    );
    if config.default_token.is_none() {
        info!("No default API token configured; callers must pass 'api_token'");
    }

    let sync_client = PipeRunClient::new(&config);
    let async_client = Arc::new(AsyncPipeRunClientImpl::new(sync_client));
    let client = async_client.clone() as Arc<dyn AsyncPipeRunClient>;

    let server = PipeRunMcpServer::new(client, &config);
    info!("PipeRun MCP Server initialized");

    info!("Starting MCP server with stdio transport");
    piperun_mcp_server::server::run_server(server).await?;

    let summary = async_client.inner().metrics().summary();
    info!(
        requests = summary.http_requests_total,
        errors = summary.http_errors_total,
        avg_ms = summary.http_duration_avg_ms,
        fetched = summary.records_fetched_total,
        created = summary.records_created_total,
        "PipeRun MCP Server shutdown complete"
    );
    Ok(())
}

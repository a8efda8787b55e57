//! MCP server implementation for the PipeRun CRM.
//!
//! This module provides the MCP protocol server that exposes PipeRun
//! resources and workflows to AI assistants through the Model Context Protocol.

pub mod handlers;

pub use handlers::PipeRunMcpServer;

use anyhow::Result;
use rmcp::transport::io::stdio;
use rmcp::ServiceExt;

/// Run the PipeRun MCP server with stdio transport.
///
/// Communicates via stdin/stdout using the MCP protocol and returns once the
/// peer closes the stream.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a fatal error.
pub async fn run_server(server: PipeRunMcpServer) -> Result<()> {
    let service = server.serve(stdio()).await?;

    service.waiting().await?;

    Ok(())
}

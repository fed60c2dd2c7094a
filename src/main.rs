//! Kusto MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to explore and query Azure Data Explorer (Kusto) clusters.

use kusto_mcp_server::config::Config;
use kusto_mcp_server::kusto::{ClusterConnector, RestClientFactory};
use kusto_mcp_server::mcp::KustoService;
use kusto_mcp_server::tools::QueryGuard;
use kusto_mcp_server::transport::{StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs always go to stderr; stdout carries the protocol.
fn init_tracing(config: &Config) {
    if !config.enable_logs {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse_args();

    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  kusto-mcp-server");
        eprintln!("  kusto-mcp-server --endpoint-template 'https://{{cluster}}.kusto.windows.net'");
        eprintln!("  KUSTO_ACCESS_TOKEN=<token> kusto-mcp-server --enable-logs");
        std::process::exit(1);
    }

    init_tracing(&config);

    let endpoints = config.endpoint_template()?;
    info!(
        endpoint_template = endpoints.as_str(),
        static_token = config.access_token.is_some(),
        read_only = config.read_only_queries(),
        "Starting Kusto MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let factory = RestClientFactory::from_config(&config);
    let connector = ClusterConnector::new(Arc::new(factory), endpoints);
    let guard = QueryGuard::new(config.read_only_queries());
    let service = KustoService::new(connector, guard);

    let transport = StdioTransport::new(service);
    info!(transport = transport.name(), "Using stdio transport");

    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

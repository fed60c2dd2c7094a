//! Configuration handling for the Kusto MCP Server.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use clap::Parser;
use std::time::Duration;

use crate::kusto::EndpointTemplate;

pub const DEFAULT_ENDPOINT_TEMPLATE: &str = "https://{cluster}.kusto.windows.net";
/// Matches the Kusto service's own default server timeout for queries.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 240;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the Kusto MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "kusto-mcp-server",
    about = "MCP server for Azure Data Explorer - enables AI assistants to explore and query Kusto clusters",
    version,
    author
)]
pub struct Config {
    /// Cluster URL template. `{cluster}` is replaced by the cluster name given to each tool.
    #[arg(
        long,
        value_name = "TEMPLATE",
        default_value = DEFAULT_ENDPOINT_TEMPLATE,
        env = "KUSTO_ENDPOINT_TEMPLATE"
    )]
    pub endpoint_template: String,

    /// OAuth scope requested for cluster tokens. Defaults to `<cluster url>/.default`.
    #[arg(long, value_name = "SCOPE", env = "KUSTO_TOKEN_SCOPE")]
    pub token_scope: Option<String>,

    /// Pre-acquired bearer token (sensitive - not logged).
    /// When unset, credentials are discovered from the environment
    /// (service principal variables, managed identity, Azure CLI).
    #[arg(long, value_name = "TOKEN", env = "KUSTO_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Query timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "MCP_QUERY_TIMEOUT"
    )]
    pub query_timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MCP_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Allow management commands (text starting with '.') in execute_query and
    /// stop marking queries as read-only.
    #[arg(long, env = "MCP_ALLOW_MANAGEMENT_QUERIES")]
    pub allow_management_queries: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output to stderr (disabled by default to keep stdio hosts quiet)
    #[arg(long, env = "MCP_ENABLE_LOGS")]
    pub enable_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            endpoint_template: DEFAULT_ENDPOINT_TEMPLATE.to_string(),
            token_scope: None,
            access_token: None,
            query_timeout: DEFAULT_QUERY_TIMEOUT_SECS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            allow_management_queries: false,
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
        }
    }

    /// Parse and validate the endpoint template.
    pub fn endpoint_template(&self) -> Result<EndpointTemplate, String> {
        EndpointTemplate::parse(&self.endpoint_template)
    }

    /// Validate settings that clap cannot check on its own.
    pub fn validate(&self) -> Result<(), String> {
        self.endpoint_template()?;
        if self.query_timeout == 0 {
            return Err("query_timeout must be greater than 0".to_string());
        }
        if self.connect_timeout == 0 {
            return Err("connect_timeout must be greater than 0".to_string());
        }
        if let Some(token) = &self.access_token {
            if token.trim().is_empty() {
                return Err("access_token must not be empty when set".to_string());
            }
        }
        Ok(())
    }

    /// Get the query timeout as a Duration.
    pub fn query_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Whether execute_query runs behind the read-only guard.
    pub fn read_only_queries(&self) -> bool {
        !self.allow_management_queries
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

//! Query execution tool.
//!
//! This module implements the `execute_query` MCP tool. The query text is
//! sent as written; the service's JSON response is returned as written.

use crate::error::KustoResult;
use crate::kusto::{ClusterConnector, Command};
use crate::tools::args::ToolInput;
use crate::tools::guard::QueryGuard;
use crate::tools::require_arg;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, info};

/// Input for the execute_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// Name of the Azure Data Explorer cluster, e.g. "help" for help.kusto.windows.net.
    /// Include the region when the cluster URL has one, e.g. "mycluster.westeurope".
    pub cluster: String,
    /// Name of the database.
    pub database: String,
    /// The query to execute.
    pub query: String,
}

impl ToolInput for ExecuteQueryInput {
    const REQUIRED: &'static [&'static str] = &["cluster", "database", "query"];
}

/// Handler for the execute_query tool.
#[derive(Clone)]
pub struct QueryToolHandler {
    connector: ClusterConnector,
    guard: QueryGuard,
}

impl QueryToolHandler {
    pub fn new(connector: ClusterConnector, guard: QueryGuard) -> Self {
        Self { connector, guard }
    }

    /// Handle the execute_query tool call.
    ///
    /// Management commands are rejected before a client is opened unless the
    /// guard is permissive.
    pub async fn execute_query(&self, input: ExecuteQueryInput) -> KustoResult<String> {
        let cluster = require_arg("cluster", &input.cluster)?;
        let database = require_arg("database", &input.database)?;
        let query = require_arg("query", &input.query)?;
        self.guard.check(query)?;

        let client = self.connector.connect(cluster).await?;
        let statement = Command::from_unsafe(query);
        debug!(cluster, database, query = %statement, "Running query");

        let response = client
            .query_to_json(database, &statement, self.guard.query_options())
            .await?;

        info!(
            cluster,
            database,
            bytes = response.len(),
            read_only = self.guard.is_read_only(),
            "Executed query"
        );

        Ok(response)
    }
}

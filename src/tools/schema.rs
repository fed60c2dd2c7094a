//! Schema discovery tools.
//!
//! This module implements the `list_databases`, `list_tables` and
//! `get_table_schema` MCP tools. Each call opens one client, runs one
//! management command and releases the client before returning.

use crate::error::{KustoError, KustoResult};
use crate::kusto::{ClusterConnector, Command};
use crate::tools::args::ToolInput;
use crate::tools::{require_arg, to_json_text};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DATABASE_NAME_COLUMN: &str = "DatabaseName";
const TABLE_NAME_COLUMN: &str = "TableName";
const SCHEMA_COLUMN: &str = "Schema";

/// Input for the list_databases tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListDatabasesInput {
    /// Name of the Azure Data Explorer cluster, e.g. "help" for help.kusto.windows.net.
    /// Include the region when the cluster URL has one, e.g. "mycluster.westeurope".
    pub cluster: String,
}

/// Input for the list_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Name of the Azure Data Explorer cluster, e.g. "help" for help.kusto.windows.net.
    /// Include the region when the cluster URL has one, e.g. "mycluster.westeurope".
    pub cluster: String,
    /// Name of the database to list tables from.
    pub database: String,
}

/// Input for the get_table_schema tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTableSchemaInput {
    /// Name of the Azure Data Explorer cluster, e.g. "help" for help.kusto.windows.net.
    /// Include the region when the cluster URL has one, e.g. "mycluster.westeurope".
    pub cluster: String,
    /// Name of the database.
    pub database: String,
    /// Name of the table to get the schema for.
    pub table: String,
}

impl ToolInput for ListDatabasesInput {
    const REQUIRED: &'static [&'static str] = &["cluster"];
}

impl ToolInput for ListTablesInput {
    const REQUIRED: &'static [&'static str] = &["cluster", "database"];
}

impl ToolInput for GetTableSchemaInput {
    const REQUIRED: &'static [&'static str] = &["cluster", "database", "table"];
}

/// Output for the list_databases tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListDatabasesOutput {
    pub databases: Vec<String>,
}

/// Output for the list_tables tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListTablesOutput {
    /// Cluster name as given in the request
    pub cluster: String,
    /// Database name as given in the request
    pub database: String,
    pub tables: Vec<String>,
}

/// Handler for schema discovery tools.
#[derive(Clone)]
pub struct SchemaToolHandler {
    connector: ClusterConnector,
}

impl SchemaToolHandler {
    pub fn new(connector: ClusterConnector) -> Self {
        Self { connector }
    }

    pub async fn list_databases(&self, input: ListDatabasesInput) -> KustoResult<String> {
        let cluster = require_arg("cluster", &input.cluster)?;

        let client = self.connector.connect(cluster).await?;
        let command = Command::show_databases();
        debug!(cluster, command = %command, "Running management command");

        let dataset = client.mgmt("", &command).await?;
        let databases = dataset.primary_table()?.string_column(DATABASE_NAME_COLUMN)?;

        info!(cluster, count = databases.len(), "Listed databases");

        to_json_text(&ListDatabasesOutput { databases })
    }

    pub async fn list_tables(&self, input: ListTablesInput) -> KustoResult<String> {
        let cluster = require_arg("cluster", &input.cluster)?;
        let database = require_arg("database", &input.database)?;

        let client = self.connector.connect(cluster).await?;
        let command = Command::show_tables();
        debug!(cluster, database, command = %command, "Running management command");

        let dataset = client.mgmt(database, &command).await?;
        let tables = dataset.primary_table()?.string_column(TABLE_NAME_COLUMN)?;

        info!(cluster, database, count = tables.len(), "Listed tables");

        to_json_text(&ListTablesOutput {
            cluster: input.cluster.clone(),
            database: input.database.clone(),
            tables,
        })
    }

    /// Returns the service's JSON schema text for the table unchanged.
    pub async fn get_table_schema(&self, input: GetTableSchemaInput) -> KustoResult<String> {
        let cluster = require_arg("cluster", &input.cluster)?;
        let database = require_arg("database", &input.database)?;
        let table = require_arg("table", &input.table)?;

        let client = self.connector.connect(cluster).await?;
        let command = Command::show_table_schema(table);
        debug!(cluster, database, command = %command, "Running management command");

        let dataset = client.mgmt(database, &command).await?;
        let primary = dataset.primary_table()?;
        let row = primary.first_row().ok_or_else(|| {
            KustoError::unexpected_response(format!("no schema returned for table '{table}'"))
        })?;
        let schema = row.string_by_name(SCHEMA_COLUMN)?.to_string();

        info!(cluster, database, table, bytes = schema.len(), "Fetched table schema");

        Ok(schema)
    }
}

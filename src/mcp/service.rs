//! MCP service implementation using rmcp.
//!
//! This module defines the KustoService struct with the four Kusto tools
//! exposed via the MCP protocol using the rmcp framework's macros.

use crate::error::{KustoError, KustoResult};
use crate::kusto::ClusterConnector;
use crate::tools::args::ToolArgs;
use crate::tools::guard::QueryGuard;
use crate::tools::query::{ExecuteQueryInput, QueryToolHandler};
use crate::tools::schema::{
    GetTableSchemaInput, ListDatabasesInput, ListTablesInput, SchemaToolHandler,
};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::{RequestContext, RoleServer},
    tool, tool_handler, tool_router,
};
use std::future::Future;
use tracing::warn;

/// Run a tool future until it finishes or the request is cancelled.
///
/// On cancellation the tool future is dropped, which releases any client it
/// holds.
pub async fn run_cancellable<T>(
    operation: &str,
    cancelled: impl Future<Output = ()>,
    work: impl Future<Output = KustoResult<T>>,
) -> KustoResult<T> {
    tokio::select! {
        result = work => result,
        _ = cancelled => {
            warn!(operation, "Tool call cancelled by client");
            Err(KustoError::cancelled(operation))
        }
    }
}

fn text_result(operation: &str, result: KustoResult<String>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) => {
            warn!(
                operation,
                error = %e,
                retryable = e.is_retryable(),
                "Tool call failed"
            );
            Err(McpError::from(e))
        }
    }
}

#[derive(Clone)]
pub struct KustoService {
    /// Opens a leased client per tool call
    connector: ClusterConnector,
    /// Policy for execute_query
    guard: QueryGuard,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl KustoService {
    /// Create a new KustoService instance.
    ///
    /// # Arguments
    ///
    /// * `connector` - Resolves cluster names and opens clients
    /// * `guard` - Read-only policy applied to execute_query
    pub fn new(connector: ClusterConnector, guard: QueryGuard) -> Self {
        Self {
            connector,
            guard,
            tool_router: Self::tool_router(),
        }
    }

    /// Tools advertised to clients.
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }
}

#[tool_router]
impl KustoService {
    #[tool(description = "List all databases in a specific Azure Data Explorer cluster")]
    async fn list_databases(
        &self,
        context: RequestContext<RoleServer>,
        Parameters(args): Parameters<ToolArgs<ListDatabasesInput>>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.connector.clone());
        let result = run_cancellable("list_databases", context.ct.cancelled(), async {
            handler.list_databases(args.parse()?).await
        })
        .await;
        text_result("list_databases", result)
    }

    #[tool(description = "List all tables in a specific Azure Data Explorer database")]
    async fn list_tables(
        &self,
        context: RequestContext<RoleServer>,
        Parameters(args): Parameters<ToolArgs<ListTablesInput>>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.connector.clone());
        let result = run_cancellable("list_tables", context.ct.cancelled(), async {
            handler.list_tables(args.parse()?).await
        })
        .await;
        text_result("list_tables", result)
    }

    #[tool(
        description = "Get the schema of a specific table in an Azure Data Explorer database"
    )]
    async fn get_table_schema(
        &self,
        context: RequestContext<RoleServer>,
        Parameters(args): Parameters<ToolArgs<GetTableSchemaInput>>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.connector.clone());
        let result = run_cancellable("get_table_schema", context.ct.cancelled(), async {
            handler.get_table_schema(args.parse()?).await
        })
        .await;
        text_result("get_table_schema", result)
    }

    #[tool(
        description = "Execute a read-only query. Ask the user for permission before executing the query. It has to be a valid KQL query. Write queries are not allowed.\n\
        Result truncation is a limit set by default on the result set returned by the query. Kusto limits the number of records returned to the client to 500,000, and the overall data size for those records to 64 MB. When either of these limits is exceeded, the query fails with a partial query failure.\n\
        Reduce the result set size by modifying the query to only return interesting data:\n\
        1. Use the summarize operator to group and aggregate over similar records.\n\
        2. Sample some columns with the take_any aggregation function.\n\
        3. Use the take operator to sample the query output.\n\
        4. Use the substring function to trim wide free-text columns.\n\
        5. Use the project operator to drop uninteresting columns."
    )]
    async fn execute_query(
        &self,
        context: RequestContext<RoleServer>,
        Parameters(args): Parameters<ToolArgs<ExecuteQueryInput>>,
    ) -> Result<CallToolResult, McpError> {
        let handler = QueryToolHandler::new(self.connector.clone(), self.guard);
        let result = run_cancellable("execute_query", context.ct.cancelled(), async {
            handler.execute_query(args.parse()?).await
        })
        .await;
        text_result("execute_query", result)
    }
}

#[tool_handler]
impl ServerHandler for KustoService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "kusto-mcp-server".to_owned(),
                title: Some("Kusto MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for exploring and querying Azure Data Explorer (Kusto) clusters.\n\
                \n\
                ## Workflow\n\
                1. Call `list_databases` with the cluster name (e.g. `help` for help.kusto.windows.net)\n\
                2. Call `list_tables` for a database from step 1\n\
                3. Call `get_table_schema` to see column names and types before writing KQL\n\
                4. Call `execute_query` with a KQL query; ask the user before running it\n\
                \n\
                ## Notes\n\
                - Credentials come from the server's environment; no credentials are passed to tools.\n\
                - `execute_query` rejects management commands (text starting with `.`) unless the server runs with --allow-management-queries.\n\
                - Keep results small with `take`, `project` and `summarize`; large results fail with a partial query failure."
                    .to_string(),
            ),
        }
    }
}

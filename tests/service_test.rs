//! Tests for the MCP service surface: advertised tools and server info.

mod common;

use common::*;
use kusto_mcp_server::mcp::KustoService;
use kusto_mcp_server::tools::QueryGuard;
use rmcp::ServerHandler;
use std::sync::Arc;

fn service() -> KustoService {
    let backend = Arc::new(StubBackend::new());
    KustoService::new(stub_connector(&backend), QueryGuard::read_only())
}

fn required_fields(tool: &rmcp::model::Tool) -> Vec<String> {
    let mut fields: Vec<String> = tool
        .input_schema
        .get("required")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    fields.sort();
    fields
}

#[test]
fn test_advertises_four_tools() {
    let mut names: Vec<String> = service()
        .tools()
        .iter()
        .map(|tool| tool.name.to_string())
        .collect();
    names.sort();

    assert_eq!(
        names,
        vec![
            "execute_query",
            "get_table_schema",
            "list_databases",
            "list_tables"
        ]
    );
}

#[test]
fn test_tool_parameters_are_required() {
    let tools = service().tools();
    let find = |name: &str| {
        tools
            .iter()
            .find(|tool| tool.name == name)
            .unwrap_or_else(|| panic!("tool {name} not registered"))
    };

    assert_eq!(required_fields(find("list_databases")), vec!["cluster"]);
    assert_eq!(
        required_fields(find("list_tables")),
        vec!["cluster", "database"]
    );
    assert_eq!(
        required_fields(find("get_table_schema")),
        vec!["cluster", "database", "table"]
    );
    assert_eq!(
        required_fields(find("execute_query")),
        vec!["cluster", "database", "query"]
    );
}

#[test]
fn test_execute_query_description_mentions_limits() {
    let tools = service().tools();
    let tool = tools
        .iter()
        .find(|tool| tool.name == "execute_query")
        .unwrap();
    let description = tool.description.as_deref().unwrap_or_default();

    assert!(description.contains("read-only"));
    assert!(description.contains("500,000"));
    assert!(description.contains("64 MB"));
}

#[test]
fn test_server_info() {
    let info = service().get_info();
    assert_eq!(info.server_info.name, "kusto-mcp-server");
    assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    assert!(info.capabilities.tools.is_some());
    assert!(info.instructions.unwrap().contains("list_databases"));
}

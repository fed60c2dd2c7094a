//! MCP tool implementations.
//!
//! - `schema`: `list_databases`, `list_tables`, `get_table_schema`
//! - `query`: `execute_query`
//! - `guard`: read-only policy for caller-supplied KQL
//! - `args`: named validation of raw tool arguments

pub mod args;
pub mod guard;
pub mod query;
pub mod schema;

pub use args::{ToolArgs, ToolInput};
pub use guard::{QueryGuard, StatementKind};
pub use query::{ExecuteQueryInput, QueryToolHandler};
pub use schema::{
    GetTableSchemaInput, ListDatabasesInput, ListDatabasesOutput, ListTablesInput,
    ListTablesOutput, SchemaToolHandler,
};

use crate::error::{KustoError, KustoResult};
use serde::Serialize;

/// Reject an empty or whitespace-only argument, naming the field.
pub(crate) fn require_arg<'a>(field: &str, value: &'a str) -> KustoResult<&'a str> {
    if value.trim().is_empty() {
        return Err(KustoError::invalid_argument(field, "must not be empty"));
    }
    Ok(value)
}

pub(crate) fn to_json_text<T: Serialize>(value: &T) -> KustoResult<String> {
    Ok(serde_json::to_string(value)?)
}

//! Kusto MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI assistants
//! to explore and query Azure Data Explorer (Kusto) clusters: list databases,
//! list tables, fetch table schemas and run KQL queries.

pub mod config;
pub mod error;
pub mod kusto;
pub mod mcp;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{KustoError, KustoResult};
pub use mcp::KustoService;

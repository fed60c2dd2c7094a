//! Transport layer for the MCP server.
//!
//! Only stdio is provided: the server is launched as a child process by an
//! MCP host and speaks JSON-RPC over stdin/stdout.

pub mod stdio;

pub use stdio::StdioTransport;

use crate::error::KustoResult;
use std::future::Future;

/// Trait for MCP transport implementations.
pub trait Transport: Send + Sync {
    /// Start the transport and begin handling requests.
    ///
    /// This method should block until the transport is shut down.
    fn run(&self) -> impl Future<Output = KustoResult<()>> + Send;

    /// Get the name of this transport for logging.
    fn name(&self) -> &'static str;
}

//! Error types for the Kusto MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Each error variant provides actionable messages to help AI assistants understand
//! and recover from error conditions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KustoError {
    #[error("Invalid argument '{field}': {message}")]
    InvalidArgument { field: String, message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Kusto error: {message}")]
    Backend {
        message: String,
        /// e.g., "BadRequest_SyntaxError"
        code: Option<String>,
        suggestion: String,
    },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    #[error("Query rejected: {reason}")]
    QueryRejected { reason: String },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("Cancelled: {operation}")]
    Cancelled { operation: String },

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl KustoError {
    /// Create an invalid argument error for a named tool parameter.
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a backend error with an optional Kusto error code.
    pub fn backend(
        message: impl Into<String>,
        code: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            code,
            suggestion: suggestion.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn query_rejected(reason: impl Into<String>) -> Self {
        Self::QueryRejected {
            reason: reason.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Backend { suggestion, .. } => Some(suggestion),
            Self::QueryRejected { .. } => Some(
                "Use list_tables or get_table_schema for metadata; execute_query only runs KQL queries",
            ),
            Self::Timeout { .. } => Some("Narrow the query with take, project or summarize"),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    ///
    /// The server never retries on its own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for KustoError {
    fn from(err: serde_json::Error) -> Self {
        KustoError::serialization(err.to_string())
    }
}

/// Result type alias for Kusto operations.
pub type KustoResult<T> = Result<T, KustoError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert KustoError to MCP ErrorData for semantic error categorization.
/// Includes the suggestion field in the `data` object when available.
impl From<KustoError> for rmcp::ErrorData {
    fn from(err: KustoError) -> Self {
        let data = suggestion_data(err.suggestion());
        match &err {
            // Caller-side problems -> invalid_params
            KustoError::InvalidArgument { .. } | KustoError::QueryRejected { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), data)
            }

            // Backend rejected the command -> invalid_params with the Kusto code in message
            KustoError::Backend { message, code, .. } => {
                let msg = match code {
                    Some(code) => format!("{} (code: {})", message, code),
                    None => message.clone(),
                };
                rmcp::ErrorData::invalid_params(msg, data)
            }

            KustoError::Connection { .. }
            | KustoError::Timeout { .. }
            | KustoError::Cancelled { .. }
            | KustoError::Serialization { .. }
            | KustoError::UnexpectedResponse { .. }
            | KustoError::Internal { .. } => {
                rmcp::ErrorData::internal_error(err.to_string(), data)
            }
        }
    }
}

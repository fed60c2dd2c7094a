//! Kusto REST protocol client.
//!
//! Management commands go to `/v1/rest/mgmt` and are parsed into a
//! [`DataSet`]; queries go to `/v2/rest/query` and the response body is
//! handed back untouched.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{KustoError, KustoResult};
use crate::kusto::credential::{AmbientCredential, StaticToken, TokenProvider, default_scope};
use crate::kusto::{ClientFactory, Command, DataSet, KustoClient, QueryOptions};

pub const MGMT_PATH: &str = "/v1/rest/mgmt";
pub const QUERY_PATH: &str = "/v2/rest/query";

const APP_NAME: &str = "kusto-mcp-server";
const CLIENT_VERSION: &str = concat!("Kusto.MCP.Rust:", env!("CARGO_PKG_VERSION"));

/// Opens [`RestClient`]s, acquiring a token per connection.
pub struct RestClientFactory {
    tokens: Arc<dyn TokenProvider>,
    token_scope: Option<String>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl RestClientFactory {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            tokens,
            token_scope: None,
            connect_timeout: Duration::from_secs(crate::config::DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(crate::config::DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }

    /// Build a factory from server configuration.
    ///
    /// A configured access token wins over ambient credential discovery.
    pub fn from_config(config: &Config) -> Self {
        let tokens: Arc<dyn TokenProvider> = match &config.access_token {
            Some(token) => Arc::new(StaticToken::new(token.trim())),
            None => Arc::new(AmbientCredential),
        };
        Self::new(tokens)
            .with_token_scope(config.token_scope.clone())
            .with_timeouts(
                config.connect_timeout_duration(),
                config.query_timeout_duration(),
            )
    }

    pub fn with_token_scope(mut self, scope: Option<String>) -> Self {
        self.token_scope = scope;
        self
    }

    pub fn with_timeouts(mut self, connect_timeout: Duration, request_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.request_timeout = request_timeout;
        self
    }
}

#[async_trait]
impl ClientFactory for RestClientFactory {
    async fn connect(&self, endpoint: &str) -> KustoResult<Box<dyn KustoClient>> {
        let endpoint = endpoint.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .user_agent(CLIENT_VERSION)
            .build()
            .map_err(|e| {
                KustoError::connection(
                    format!("Failed to build HTTP client: {e}"),
                    "Check the TLS feature the server was built with",
                )
            })?;

        let scope = self
            .token_scope
            .clone()
            .unwrap_or_else(|| default_scope(&endpoint));
        let token = self.tokens.token(&scope).await?;

        debug!(endpoint = %endpoint, "Opened Kusto REST client");
        Ok(Box::new(RestClient {
            endpoint,
            session: Some(Session { http, token }),
            request_timeout: self.request_timeout,
        }))
    }
}

struct Session {
    http: reqwest::Client,
    token: String,
}

/// Client for one cluster endpoint.
pub struct RestClient {
    endpoint: String,
    session: Option<Session>,
    request_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    db: &'a str,
    csl: &'a str,
    /// Client request properties, sent as a JSON-encoded string.
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "@message", default)]
    detail: Option<String>,
}

impl RestClient {
    fn session(&self) -> KustoResult<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| KustoError::internal("Kusto client used after close"))
    }

    fn properties(&self, read_only: bool) -> KustoResult<String> {
        let mut options = Map::new();
        options.insert(
            "servertimeout".to_string(),
            JsonValue::String(format_timespan(self.request_timeout)),
        );
        if read_only {
            options.insert("request_readonly".to_string(), JsonValue::Bool(true));
        }
        let properties = serde_json::json!({ "Options": options });
        Ok(serde_json::to_string(&properties)?)
    }

    async fn post(&self, path: &str, operation: &str, body: &RequestBody<'_>) -> KustoResult<String> {
        let session = self.session()?;
        let url = format!("{}{}", self.endpoint, path);
        let request_id = format!("KMCP.{};{}", operation, Uuid::new_v4());

        debug!(url = %url, request_id = %request_id, csl = body.csl, "Sending Kusto request");

        let response = session
            .http
            .post(&url)
            .bearer_auth(&session.token)
            .header(ACCEPT, "application/json")
            .header("x-ms-client-request-id", &request_id)
            .header("x-ms-app", APP_NAME)
            .header("x-ms-client-version", CLIENT_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e, operation))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e, operation))?;

        if !status.is_success() {
            warn!(status = %status, request_id = %request_id, "Kusto request failed");
            return Err(backend_error(status, &text));
        }

        Ok(text)
    }

    fn transport_error(&self, err: reqwest::Error, operation: &str) -> KustoError {
        if err.is_timeout() {
            KustoError::timeout(operation, self.request_timeout.as_secs())
        } else {
            KustoError::connection(
                format!("Failed to reach {}: {}", self.endpoint, err),
                "Check the cluster name and network connectivity",
            )
        }
    }
}

#[async_trait]
impl KustoClient for RestClient {
    async fn mgmt(&self, database: &str, command: &Command) -> KustoResult<DataSet> {
        let properties = self.properties(false)?;
        let body = RequestBody {
            db: database,
            csl: command.as_str(),
            properties: Some(properties),
        };
        let text = self.post(MGMT_PATH, "mgmt", &body).await?;
        DataSet::from_v1_json(&text)
    }

    async fn query_to_json(
        &self,
        database: &str,
        query: &Command,
        options: QueryOptions,
    ) -> KustoResult<String> {
        let properties = self.properties(options.read_only)?;
        let body = RequestBody {
            db: database,
            csl: query.as_str(),
            properties: Some(properties),
        };
        self.post(QUERY_PATH, "query", &body).await
    }

    fn close(&mut self) {
        if self.session.take().is_some() {
            debug!(endpoint = %self.endpoint, "Closed Kusto REST client");
        }
    }
}

/// Map a non-success response to a backend error.
fn backend_error(status: StatusCode, body: &str) -> KustoError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let (code, message) = match parsed {
        Some(envelope) => {
            let message = envelope
                .error
                .detail
                .or(envelope.error.message)
                .unwrap_or_else(|| status.to_string());
            (envelope.error.code, message)
        }
        None => {
            let trimmed = body.trim();
            let message = if trimmed.is_empty() {
                status.to_string()
            } else {
                trimmed.to_string()
            };
            (None, message)
        }
    };

    let suggestion = match status {
        StatusCode::UNAUTHORIZED => "Verify the signed-in identity is valid for this cluster",
        StatusCode::FORBIDDEN => {
            "The identity lacks permission on this database; ask for viewer access"
        }
        StatusCode::NOT_FOUND => "Check the database and table names with list_databases/list_tables",
        StatusCode::BAD_REQUEST => "Check the KQL syntax and referenced tables",
        StatusCode::TOO_MANY_REQUESTS => "The cluster is throttling requests; retry later",
        _ => "Check the cluster health and retry",
    };

    KustoError::backend(
        message,
        code.or_else(|| Some(format!("HTTP {}", status.as_u16()))),
        suggestion,
    )
}

/// Format a duration as a Kusto timespan (`[d.]hh:mm:ss`).
pub fn format_timespan(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    if days > 0 {
        format!("{days}.{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

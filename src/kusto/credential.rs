//! Bearer token acquisition for cluster requests.

use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use azure_identity::{DefaultAzureCredential, TokenCredentialOptions};
use std::fmt;
use tracing::debug;

use crate::error::{KustoError, KustoResult};

/// Source of bearer tokens for a given OAuth scope.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self, scope: &str) -> KustoResult<String>;
}

/// Default scope for a cluster: `<cluster url>/.default`.
pub fn default_scope(endpoint: &str) -> String {
    format!("{}/.default", endpoint.trim_end_matches('/'))
}

/// Ambient credential discovery through `DefaultAzureCredential`.
///
/// Tries environment service-principal variables, managed identity and the
/// Azure CLI, in that order. A fresh credential is built per call so nothing
/// is cached between tool calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct AmbientCredential;

#[async_trait]
impl TokenProvider for AmbientCredential {
    async fn token(&self, scope: &str) -> KustoResult<String> {
        let credential = build_default_credential()?;

        debug!(scope, "Acquiring token via default Azure credential");
        let token = credential.get_token(&[scope]).await.map_err(|e| {
            KustoError::connection(
                format!("Failed to acquire token for {scope}: {e}"),
                "Verify the signed-in identity can access the cluster",
            )
        })?;

        Ok(token.token.secret().to_string())
    }
}

/// Build the default credential chain with default options.
fn build_default_credential() -> KustoResult<DefaultAzureCredential> {
    DefaultAzureCredential::create(TokenCredentialOptions::default()).map_err(|e| {
        KustoError::connection(
            format!("Failed to set up Azure credentials: {e}"),
            "Sign in with `az login`, set AZURE_TENANT_ID/AZURE_CLIENT_ID/AZURE_CLIENT_SECRET, or run under a managed identity",
        )
    })
}

/// A token supplied up front, e.g. through `KUSTO_ACCESS_TOKEN`.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self, _scope: &str) -> KustoResult<String> {
        Ok(self.0.clone())
    }
}

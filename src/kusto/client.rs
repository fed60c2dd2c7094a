//! Client handle abstraction and per-call lifetime management.

use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

use crate::error::KustoResult;
use crate::kusto::{Command, DataSet, EndpointTemplate};

/// Options attached to a query request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Ask the service to refuse any operation that writes data.
    pub read_only: bool,
}

/// An open session with one cluster.
#[async_trait]
pub trait KustoClient: Send + Sync {
    /// Run a management command against a database context.
    /// An empty database name runs the command cluster-wide.
    async fn mgmt(&self, database: &str, command: &Command) -> KustoResult<DataSet>;

    /// Run a query and return the service's JSON response text unchanged.
    async fn query_to_json(
        &self,
        database: &str,
        query: &Command,
        options: QueryOptions,
    ) -> KustoResult<String>;

    /// Release the session. Must be safe to call more than once.
    fn close(&mut self);
}

/// Opens clients for a cluster endpoint URL.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, endpoint: &str) -> KustoResult<Box<dyn KustoClient>>;
}

/// A client that is closed when the lease is dropped.
///
/// Dropping covers early returns, errors and futures cancelled mid-await.
pub struct ClientLease {
    endpoint: String,
    client: Box<dyn KustoClient>,
}

impl ClientLease {
    pub async fn acquire(factory: &dyn ClientFactory, endpoint: &str) -> KustoResult<Self> {
        let client = factory.connect(endpoint).await?;
        debug!(endpoint, "Acquired Kusto client");
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Deref for ClientLease {
    type Target = dyn KustoClient;

    fn deref(&self) -> &Self::Target {
        self.client.as_ref()
    }
}

impl Drop for ClientLease {
    fn drop(&mut self) {
        self.client.close();
        debug!(endpoint = %self.endpoint, "Released Kusto client");
    }
}

/// Resolves cluster names to endpoints and opens leased clients.
#[derive(Clone)]
pub struct ClusterConnector {
    factory: Arc<dyn ClientFactory>,
    endpoints: EndpointTemplate,
}

impl ClusterConnector {
    pub fn new(factory: Arc<dyn ClientFactory>, endpoints: EndpointTemplate) -> Self {
        Self { factory, endpoints }
    }

    pub fn endpoint_for(&self, cluster: &str) -> String {
        self.endpoints.expand(cluster)
    }

    pub async fn connect(&self, cluster: &str) -> KustoResult<ClientLease> {
        let endpoint = self.endpoint_for(cluster);
        ClientLease::acquire(self.factory.as_ref(), &endpoint).await
    }
}

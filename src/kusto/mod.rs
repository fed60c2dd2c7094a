//! Kusto (Azure Data Explorer) backend layer.
//!
//! Everything the tool handlers need to talk to a cluster: endpoint
//! expansion, credentials, command text, the client seam and the REST
//! implementation behind it.

pub mod client;
pub mod command;
pub mod credential;
pub mod dataset;
pub mod endpoint;
pub mod rest;

pub use client::{ClientFactory, ClientLease, ClusterConnector, KustoClient, QueryOptions};
pub use command::{Command, normalize_name};
pub use credential::{AmbientCredential, StaticToken, TokenProvider};
pub use dataset::{Column, DataSet, DataTable, Row};
pub use endpoint::EndpointTemplate;
pub use rest::RestClientFactory;

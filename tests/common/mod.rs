//! Shared test helpers: an in-memory Kusto backend that counts what it sees.

#![allow(dead_code)]

use async_trait::async_trait;
use kusto_mcp_server::error::{KustoError, KustoResult};
use kusto_mcp_server::kusto::{
    ClientFactory, ClusterConnector, Column, Command, DataSet, DataTable, EndpointTemplate,
    KustoClient, QueryOptions,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One command as the backend received it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub endpoint: String,
    pub database: String,
    pub text: String,
    pub options: Option<QueryOptions>,
}

#[derive(Default)]
pub struct StubBackend {
    pub connects: AtomicUsize,
    pub closes: AtomicUsize,
    pub commands: AtomicUsize,
    pub recorded: Mutex<Vec<Recorded>>,
    mgmt_result: Mutex<Option<DataSet>>,
    query_response: Mutex<String>,
    fail_connect: bool,
    command_error: Option<String>,
    delay: Option<Duration>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mgmt_result(self, dataset: DataSet) -> Self {
        *self.mgmt_result.lock().unwrap() = Some(dataset);
        self
    }

    pub fn with_query_response(self, body: &str) -> Self {
        *self.query_response.lock().unwrap() = body.to_string();
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_commands(mut self, message: &str) -> Self {
        self.command_error = Some(message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    async fn run(
        &self,
        endpoint: &str,
        database: &str,
        command: &Command,
        options: Option<QueryOptions>,
    ) -> KustoResult<()> {
        self.commands.fetch_add(1, Ordering::SeqCst);
        self.recorded.lock().unwrap().push(Recorded {
            endpoint: endpoint.to_string(),
            database: database.to_string(),
            text: command.as_str().to_string(),
            options,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.command_error {
            Some(message) => Err(KustoError::backend(
                message.clone(),
                Some("BadRequest_SemanticError".to_string()),
                "check the command",
            )),
            None => Ok(()),
        }
    }
}

pub struct StubFactory(pub Arc<StubBackend>);

#[async_trait]
impl ClientFactory for StubFactory {
    async fn connect(&self, endpoint: &str) -> KustoResult<Box<dyn KustoClient>> {
        if self.0.fail_connect {
            return Err(KustoError::connection(
                format!("no route to {endpoint}"),
                "check the cluster name",
            ));
        }
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubClient {
            backend: self.0.clone(),
            endpoint: endpoint.to_string(),
        }))
    }
}

struct StubClient {
    backend: Arc<StubBackend>,
    endpoint: String,
}

#[async_trait]
impl KustoClient for StubClient {
    async fn mgmt(&self, database: &str, command: &Command) -> KustoResult<DataSet> {
        self.backend
            .run(&self.endpoint, database, command, None)
            .await?;
        Ok(self
            .backend
            .mgmt_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_default())
    }

    async fn query_to_json(
        &self,
        database: &str,
        query: &Command,
        options: QueryOptions,
    ) -> KustoResult<String> {
        self.backend
            .run(&self.endpoint, database, query, Some(options))
            .await?;
        Ok(self.backend.query_response.lock().unwrap().clone())
    }

    fn close(&mut self) {
        self.backend.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Connector over the stub with the default endpoint template.
pub fn stub_connector(backend: &Arc<StubBackend>) -> ClusterConnector {
    ClusterConnector::new(
        Arc::new(StubFactory(backend.clone())),
        EndpointTemplate::default(),
    )
}

pub fn databases_dataset(names: &[&str]) -> DataSet {
    let rows = names
        .iter()
        .map(|name| vec![json!(name), json!("https://storage/".to_string() + name)])
        .collect();
    DataSet::new(vec![DataTable::new(
        "Table_0",
        vec![
            Column::new("DatabaseName", "string"),
            Column::new("PersistentStorage", "string"),
        ],
        rows,
    )])
}

pub fn tables_dataset(database: &str, names: &[&str]) -> DataSet {
    let rows = names
        .iter()
        .map(|name| vec![json!(name), json!(database)])
        .collect();
    DataSet::new(vec![DataTable::new(
        "Table_0",
        vec![
            Column::new("TableName", "string"),
            Column::new("DatabaseName", "string"),
        ],
        rows,
    )])
}

pub fn schema_dataset(table: &str, schema: &str) -> DataSet {
    DataSet::new(vec![DataTable::new(
        "Table_0",
        vec![
            Column::new("TableName", "string"),
            Column::new("Schema", "string"),
            Column::new("DatabaseName", "string"),
            Column::new("Folder", "string"),
            Column::new("DocString", "string"),
        ],
        vec![vec![
            json!(table),
            json!(schema),
            json!("Samples"),
            json!(""),
            json!(""),
        ]],
    )])
}

pub const STORM_EVENTS_SCHEMA: &str = r#"{"Name":"StormEvents","OrderedColumns":[{"Name":"StartTime","Type":"System.DateTime","CslType":"datetime"},{"Name":"State","Type":"System.String","CslType":"string"},{"Name":"DamageProperty","Type":"System.Int32","CslType":"int"}]}"#;

pub const COUNT_RESPONSE: &str = r#"[{"FrameType":"DataSetHeader","IsProgressive":false,"Version":"v2.0"},{"FrameType":"DataTable","TableId":0,"TableKind":"PrimaryResult","TableName":"PrimaryResult","Columns":[{"ColumnName":"Count","ColumnType":"long"}],"Rows":[[5]]},{"FrameType":"DataSetCompletion","HasErrors":false,"Cancelled":false}]"#;

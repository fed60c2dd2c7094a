//! Tabular results returned by management commands.
//!
//! Only the subset of the v1 REST response needed by the tools is modelled:
//! tables with named columns and rows of JSON values.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{KustoError, KustoResult};

/// Column metadata of a result table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Column {
    #[serde(rename = "ColumnName")]
    pub name: String,
    /// e.g. "string", "long", "datetime"
    #[serde(rename = "ColumnType", default)]
    pub column_type: Option<String>,
    /// .NET type name, e.g. "String"
    #[serde(rename = "DataType", default)]
    pub data_type: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: Some(column_type.into()),
            data_type: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDataSet {
    #[serde(rename = "Tables")]
    tables: Vec<RawTable>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(rename = "TableName", default)]
    name: String,
    #[serde(rename = "Columns")]
    columns: Vec<Column>,
    #[serde(rename = "Rows", default)]
    rows: Vec<JsonValue>,
}

/// A result table.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<JsonValue>>,
}

impl DataTable {
    pub fn new(name: impl Into<String>, columns: Vec<Column>, rows: Vec<Vec<JsonValue>>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            table: self,
            values,
        })
    }

    pub fn first_row(&self) -> Option<Row<'_>> {
        self.rows().next()
    }

    /// Read one string column from every row, in row order.
    pub fn string_column(&self, name: &str) -> KustoResult<Vec<String>> {
        self.rows()
            .map(|row| row.string_by_name(name).map(str::to_string))
            .collect()
    }
}

/// A borrowed row of a [`DataTable`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a DataTable,
    values: &'a [JsonValue],
}

impl<'a> Row<'a> {
    pub fn value_by_name(&self, column: &str) -> KustoResult<&'a JsonValue> {
        let index = self.table.column_index(column).ok_or_else(|| {
            KustoError::unexpected_response(format!(
                "column '{}' not found in table '{}'",
                column, self.table.name
            ))
        })?;
        self.values.get(index).ok_or_else(|| {
            KustoError::unexpected_response(format!(
                "row in table '{}' has {} values, expected column '{}' at index {}",
                self.table.name,
                self.values.len(),
                column,
                index
            ))
        })
    }

    pub fn string_by_name(&self, column: &str) -> KustoResult<&'a str> {
        match self.value_by_name(column)? {
            JsonValue::String(s) => Ok(s.as_str()),
            other => Err(KustoError::unexpected_response(format!(
                "column '{}' is not a string (got {})",
                column, other
            ))),
        }
    }
}

/// Result of a management command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    tables: Vec<DataTable>,
}

impl DataSet {
    pub fn new(tables: Vec<DataTable>) -> Self {
        Self { tables }
    }

    /// Parse a v1 REST response body.
    ///
    /// Rows carrying an `Exceptions` object instead of values are in-band
    /// failures and are reported as backend errors.
    pub fn from_v1_json(body: &str) -> KustoResult<Self> {
        let raw: RawDataSet = serde_json::from_str(body).map_err(|e| {
            KustoError::unexpected_response(format!("malformed management response: {e}"))
        })?;

        let mut tables = Vec::with_capacity(raw.tables.len());
        for table in raw.tables {
            let mut rows = Vec::with_capacity(table.rows.len());
            for row in table.rows {
                match row {
                    JsonValue::Array(values) => rows.push(values),
                    JsonValue::Object(obj) => {
                        let message = obj
                            .get("Exceptions")
                            .map(exception_text)
                            .unwrap_or_else(|| JsonValue::Object(obj.clone()).to_string());
                        return Err(KustoError::backend(
                            message,
                            None,
                            "The command failed while producing results; narrow it and retry",
                        ));
                    }
                    other => {
                        return Err(KustoError::unexpected_response(format!(
                            "unexpected row in table '{}': {}",
                            table.name, other
                        )));
                    }
                }
            }
            tables.push(DataTable::new(table.name, table.columns, rows));
        }

        Ok(Self { tables })
    }

    /// The first table, which carries the primary result of a command.
    pub fn primary_table(&self) -> KustoResult<&DataTable> {
        self.tables
            .first()
            .ok_or_else(|| KustoError::unexpected_response("response contains no tables"))
    }
}

fn exception_text(exceptions: &JsonValue) -> String {
    match exceptions {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

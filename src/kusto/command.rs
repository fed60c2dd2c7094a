//! Kusto command construction.
//!
//! Commands are built from static literals plus identifiers that are
//! normalized before interpolation. Free-form text only enters through
//! [`Command::from_unsafe`], which is reserved for caller-supplied queries.

use std::fmt;

/// KQL words that cannot appear as bare identifiers.
const RESERVED_WORDS: &[&str] = &[
    "and", "as", "by", "contains", "database", "datatable", "extend", "false", "from", "has",
    "in", "json", "let", "not", "null", "on", "or", "project", "schema", "set", "table", "true",
    "where", "with",
];

/// Text of a management command or query sent to the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
}

impl Command {
    /// Start a command from a literal.
    pub fn new(literal: &'static str) -> Self {
        Self {
            text: literal.to_string(),
        }
    }

    /// Wrap caller-supplied text verbatim.
    pub fn from_unsafe(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Append a literal.
    pub fn add_literal(mut self, literal: &'static str) -> Self {
        self.text.push_str(literal);
        self
    }

    /// Append a table name as a normalized identifier.
    pub fn add_table(mut self, name: &str) -> Self {
        self.text.push_str(&normalize_name(name));
        self
    }

    /// `.show databases`
    pub fn show_databases() -> Self {
        Self::new(".show databases")
    }

    /// `.show tables`
    pub fn show_tables() -> Self {
        Self::new(".show tables")
    }

    /// `.show table <T> schema as json`
    pub fn show_table_schema(table: &str) -> Self {
        Self::new(".show table ")
            .add_table(table)
            .add_literal(" schema as json")
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Render an entity name so it can be embedded in a command.
///
/// Plain identifiers are emitted as-is; anything else becomes a bracketed
/// string literal `['...']`.
pub fn normalize_name(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        format!("['{}']", escape_literal(name))
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    !RESERVED_WORDS.contains(&name.to_ascii_lowercase().as_str())
}

fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

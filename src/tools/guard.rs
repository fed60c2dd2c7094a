//! Read-only guard for the execute_query tool.
//!
//! Kusto distinguishes queries from management commands lexically: a
//! management command is any request whose text starts with `.` once
//! leading whitespace and `//` comments are skipped. The guard rejects those
//! before a client is opened and asks the service to treat queries as
//! read-only.

use crate::error::{KustoError, KustoResult};
use crate::kusto::QueryOptions;

/// What kind of request a piece of KQL text is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// A regular query (tabular expression, `let`, `set`, `declare` ...).
    Query,
    /// A management command such as `.show` or `.drop table`.
    Management,
    /// Only whitespace and comments.
    Empty,
}

/// Classify request text by its first significant character.
///
/// # Examples
///
/// ```
/// use kusto_mcp_server::tools::guard::{classify, StatementKind};
///
/// assert_eq!(classify("StormEvents | count"), StatementKind::Query);
/// assert_eq!(classify("// cleanup\n.drop table T"), StatementKind::Management);
/// assert_eq!(classify("  // nothing here"), StatementKind::Empty);
/// ```
pub fn classify(text: &str) -> StatementKind {
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        if let Some(comment) = rest.strip_prefix("//") {
            rest = match comment.find('\n') {
                Some(end) => &comment[end + 1..],
                None => "",
            };
            continue;
        }
        break;
    }

    match rest.chars().next() {
        None => StatementKind::Empty,
        Some('.') => StatementKind::Management,
        Some(_) => StatementKind::Query,
    }
}

/// Policy applied to caller-supplied query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryGuard {
    read_only: bool,
}

impl QueryGuard {
    /// Reject management commands and mark queries read-only.
    pub fn read_only() -> Self {
        Self { read_only: true }
    }

    /// Pass any text through unchanged.
    pub fn permissive() -> Self {
        Self { read_only: false }
    }

    pub fn new(read_only: bool) -> Self {
        Self { read_only }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Check query text before it is sent anywhere.
    pub fn check(&self, query: &str) -> KustoResult<()> {
        match classify(query) {
            StatementKind::Empty => Err(KustoError::invalid_argument(
                "query",
                "query contains only comments",
            )),
            StatementKind::Management if self.read_only => Err(KustoError::query_rejected(
                "management commands (text starting with '.') are not allowed in execute_query",
            )),
            _ => Ok(()),
        }
    }

    /// Request options matching this policy.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            read_only: self.read_only,
        }
    }
}

impl Default for QueryGuard {
    fn default() -> Self {
        Self::read_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_queries() {
        assert_eq!(classify("StormEvents | take 10"), StatementKind::Query);
        assert_eq!(
            classify("let x = 1;\nprint x"),
            StatementKind::Query
        );
        assert_eq!(
            classify("set notruncation;\nT | count"),
            StatementKind::Query
        );
        assert_eq!(classify("print '.drop table T'"), StatementKind::Query);
    }

    #[test]
    fn test_classify_management() {
        assert_eq!(classify(".show tables"), StatementKind::Management);
        assert_eq!(classify("   \n\t.drop table T"), StatementKind::Management);
        assert_eq!(
            classify("// first\n  // second\n.set-or-append T <| print 1"),
            StatementKind::Management
        );
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(""), StatementKind::Empty);
        assert_eq!(classify("   \n"), StatementKind::Empty);
        assert_eq!(classify("// only a comment"), StatementKind::Empty);
        assert_eq!(classify("// a\n// b\n"), StatementKind::Empty);
    }

    #[test]
    fn test_read_only_guard_rejects_management() {
        let guard = QueryGuard::read_only();
        let err = guard.check(".drop table StormEvents").unwrap_err();
        assert!(matches!(err, KustoError::QueryRejected { .. }));
        assert!(guard.check("StormEvents | count").is_ok());
        assert!(guard.query_options().read_only);
    }

    #[test]
    fn test_permissive_guard_allows_management() {
        let guard = QueryGuard::permissive();
        assert!(guard.check(".show tables").is_ok());
        assert!(!guard.query_options().read_only);
    }

    #[test]
    fn test_comment_only_query_is_invalid_argument() {
        let err = QueryGuard::permissive().check("// nothing").unwrap_err();
        assert!(matches!(err, KustoError::InvalidArgument { ref field, .. } if field == "query"));
    }
}

//! Search engine errors.
//!
//! None of these reach a search caller. Reads recover by falling back to
//! the store; writes are logged and repaired by the next resync. A version
//! conflict is not an error at all: it is reported as a stale write.

use thiserror::Error;

/// Errors raised by a [`SearchEngineClient`](crate::SearchEngineClient).
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// The cluster could not be reached, or the client could not be built.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A search request was rejected.
    #[error("Query error: {0}")]
    QueryError(String),

    /// A single-document upsert was rejected.
    #[error("Index error: {0}")]
    IndexError(String),

    /// A single-document delete was rejected.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// A bulk request was rejected as a whole.
    #[error("Bulk operation error: {0}")]
    BulkOperationError(String),

    /// The entity's index could not be created.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// The engine answered with a body we could not read.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A search did not answer within its budget, in milliseconds.
    #[error("Timed out after {0} ms")]
    Timeout(u64),
}

impl SearchIndexError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    pub fn bulk_operation(msg: impl Into<String>) -> Self {
        Self::BulkOperationError(msg.into())
    }

    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

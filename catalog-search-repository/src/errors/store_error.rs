//! Catalog store error types.

use thiserror::Error;

/// Errors raised by the authoritative catalog store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected or failed a statement.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row could not be mapped onto a catalog entity.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The store backend is unavailable (used by non-SQL backends).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

//! Errors raised while synchronizing the index from the store.

use thiserror::Error;

use catalog_search_repository::{SearchIndexError, StoreError};
use catalog_search_shared::EntityType;

/// Errors that abort a bulk resync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Reading rows from the store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A bulk request to the index failed entirely.
    #[error("Index error: {0}")]
    Index(#[from] SearchIndexError),

    /// No engine client was registered for the entity type.
    #[error("No search engine registered for {0}")]
    MissingEngine(EntityType),
}

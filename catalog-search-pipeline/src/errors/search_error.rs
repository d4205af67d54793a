//! Errors surfaced to search callers.

use thiserror::Error;

use catalog_search_repository::StoreError;
use catalog_search_shared::ValidationError;

/// Errors a search request can end with.
///
/// Index failures never appear here: they are recovered by falling back to
/// the store. A store failure is final because the store is the source of
/// truth.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The caller's query was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The catalog store could not answer.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl SearchError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

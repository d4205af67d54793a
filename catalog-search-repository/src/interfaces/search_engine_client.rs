//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, in-memory).

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationSummary, IndexHits, IndexQuery, IndexStatus, WriteOutcome};
use catalog_search_shared::{EntityType, IndexDocument};

/// Abstract interface for search engine operations on one entity type's index.
///
/// One client is constructed per entity type at process start and handed to
/// the components that need it.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// The entity type whose index this client serves.
    fn entity_type(&self) -> EntityType;

    /// Ensure the index exists with the entity's mapping.
    ///
    /// Creates the index if absent. An existing index is left untouched; no
    /// destructive schema migration is attempted.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexStatus)` - Whether the index was created or already existed
    /// * `Err(SearchIndexError)` - If the engine is unreachable or creation fails
    async fn ensure_index_exists(&self) -> Result<IndexStatus, SearchIndexError>;

    /// Execute a compiled query and return ranked identifiers.
    ///
    /// # Arguments
    ///
    /// * `query` - Filter clauses, optional relevance text, sort and window
    ///
    /// # Returns
    ///
    /// * `Ok(IndexHits)` - The estimated total and the identifiers of the window
    /// * `Err(SearchIndexError)` - If the search fails
    async fn search(&self, query: &IndexQuery) -> Result<IndexHits, SearchIndexError>;

    /// Upsert a single document by identifier.
    ///
    /// Writes are versioned: a document older than the one held by the index
    /// is rejected and reported as [`WriteOutcome::Stale`].
    async fn upsert_document(
        &self,
        document: &IndexDocument,
    ) -> Result<WriteOutcome, SearchIndexError>;

    /// Upsert many documents and return a summary of successful and failed items.
    ///
    /// Stale documents count as successful: the index already holds newer data.
    async fn bulk_upsert(
        &self,
        documents: &[IndexDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Delete a document by identifier.
    ///
    /// A missing document is not an error.
    ///
    /// # Arguments
    ///
    /// * `id` - The entity's unique identifier
    /// * `version` - Write version of the delete
    async fn delete_document(
        &self,
        id: &Uuid,
        version: i64,
    ) -> Result<WriteOutcome, SearchIndexError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchIndexError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}

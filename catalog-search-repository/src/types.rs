//! Request and response types for search index and store operations.

use catalog_search_shared::{EntityType, FilterClause, SortMode};
use uuid::Uuid;

use crate::errors::SearchIndexError;

/// A slice of a result list: `offset` rows skipped, at most `limit` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

impl Window {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

/// A compiled query as sent to the search engine.
///
/// `clauses` restrict membership. `relevance_text` only influences scoring.
#[derive(Debug, Clone)]
pub struct IndexQuery {
    pub clauses: Vec<FilterClause>,
    pub relevance_text: Option<String>,
    pub sort: SortMode,
    pub window: Window,
}

/// Ranked identifiers returned by the search engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexHits {
    /// The engine's estimate of the total number of matches.
    pub estimated_total: u64,
    pub ids: Vec<Uuid>,
}

/// A compiled query as executed against the relational store.
///
/// The store always adds its implicit "not soft-deleted" condition and
/// orders by the entity's natural sort.
#[derive(Debug, Clone)]
pub struct StoreQuery {
    pub entity_type: EntityType,
    pub clauses: Vec<FilterClause>,
    pub window: Window,
}

/// Result of ensuring an index exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    Created,
    AlreadyExists,
}

/// Result of a versioned write against the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write was applied.
    Applied,
    /// The index already holds a newer version; the write was dropped.
    Stale,
}

/// Related records used to score an event's popularity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRelations {
    pub artist_ids: Vec<Uuid>,
    pub venue_id: Option<Uuid>,
}

/// Result of a batch operation for a single item.
///
/// This struct represents the outcome of a single operation within a batch.
/// It indicates whether the operation succeeded and includes error details if
/// it failed.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The entity's unique identifier.
    pub entity_id: Uuid,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// This allows callers to handle partial failures gracefully.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Record the outcome of one item.
    pub fn record(&mut self, entity_id: Uuid, error: Option<SearchIndexError>) {
        self.total += 1;
        if error.is_some() {
            self.failed += 1;
        } else {
            self.succeeded += 1;
        }
        self.results.push(BatchOperationResult {
            entity_id,
            success: error.is_none(),
            error,
        });
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: BatchOperationSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.results.extend(other.results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_record_and_merge() {
        let mut first = BatchOperationSummary::default();
        first.record(Uuid::new_v4(), None);
        first.record(Uuid::new_v4(), Some(SearchIndexError::index("boom")));

        let mut second = BatchOperationSummary::default();
        second.record(Uuid::new_v4(), None);

        first.merge(second);

        assert_eq!(first.total, 3);
        assert_eq!(first.succeeded, 2);
        assert_eq!(first.failed, 1);
        assert_eq!(first.results.len(), 3);
        assert!(!first.results[1].success);
    }
}

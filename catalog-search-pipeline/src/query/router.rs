//! Execution router.
//!
//! Chooses between the Index Path and the Store Path for one compiled
//! query. The index is only consulted for free-text queries on an available
//! index; any failure, timeout or inconsistent answer falls back to the
//! store without surfacing an error.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::availability::IndexAvailability;
use crate::engines::SearchEngines;
use crate::query::CompiledQuery;
use catalog_search_repository::{CatalogStore, IndexHits, SearchIndexError, StoreError, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPath {
    Index,
    Store,
}

/// Ordered identifiers for one window, plus the total match count.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedIds {
    pub total: u64,
    pub ids: Vec<Uuid>,
    pub path: ExecutionPath,
}

pub struct ExecutionRouter {
    engines: SearchEngines,
    store: Arc<dyn CatalogStore>,
    availability: Arc<IndexAvailability>,
    index_timeout: Duration,
}

impl ExecutionRouter {
    pub fn new(
        engines: SearchEngines,
        store: Arc<dyn CatalogStore>,
        availability: Arc<IndexAvailability>,
        index_timeout: Duration,
    ) -> Self {
        Self {
            engines,
            store,
            availability,
            index_timeout,
        }
    }

    /// Resolve `window` of the query's matches. Only store errors escape.
    #[instrument(skip(self, query), fields(entity_type = %query.entity_type, offset = window.offset, limit = window.limit))]
    pub async fn execute(
        &self,
        query: &CompiledQuery,
        window: Window,
    ) -> Result<RoutedIds, StoreError> {
        if let Some(hits) = self.try_index(query, window).await {
            debug!(total = hits.estimated_total, returned = hits.ids.len(), "Served by the index");
            return Ok(RoutedIds {
                total: hits.estimated_total,
                ids: hits.ids,
                path: ExecutionPath::Index,
            });
        }
        self.execute_store(query, window).await
    }

    /// Resolve `window` against the store alone.
    pub async fn execute_store(
        &self,
        query: &CompiledQuery,
        window: Window,
    ) -> Result<RoutedIds, StoreError> {
        let store_query = query.store_query(window);
        let (total, ids) = tokio::try_join!(
            self.store.count(&store_query),
            self.store.page_ids(&store_query)
        )?;
        debug!(total = total, returned = ids.len(), "Served by the store");
        Ok(RoutedIds {
            total,
            ids,
            path: ExecutionPath::Store,
        })
    }

    async fn try_index(&self, query: &CompiledQuery, window: Window) -> Option<IndexHits> {
        if !self.availability.is_available(query.entity_type) {
            debug!("Index unavailable; using the store");
            return None;
        }
        if !query.has_text() {
            return None;
        }
        let engine = self.engines.get(query.entity_type)?;

        let budget_ms = self.index_timeout.as_millis() as u64;
        let result = timeout(self.index_timeout, engine.search(&query.index_query(window)))
            .await
            .unwrap_or(Err(SearchIndexError::Timeout(budget_ms)));

        match result {
            Err(e) => {
                warn!(
                    error = %e,
                    timed_out = e.is_timeout(),
                    "Index query failed; falling back to the store"
                );
                None
            }
            // Matches reported but no hits returned: the index is out of step
            // with itself, so its answer is not trusted.
            Ok(hits) if hits.ids.is_empty() && hits.estimated_total > 0 => {
                warn!(
                    estimated_total = hits.estimated_total,
                    "Index reported matches but returned no hits; falling back to the store"
                );
                None
            }
            Ok(hits) => Some(hits),
        }
    }
}

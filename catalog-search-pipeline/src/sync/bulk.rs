//! Bulk synchronizer.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::engines::SearchEngines;
use crate::errors::SyncError;
use catalog_search_repository::{BatchOperationSummary, CatalogStore};
use catalog_search_shared::{EntityType, IndexDocument};

/// Configuration for bulk resynchronisation.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Rows read from the store and sent to the index per batch.
    pub batch_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { batch_size: 500 }
    }
}

/// Rebuilds search indexes from the live rows of the catalog store.
///
/// Rows are read in identifier order with a keyset cursor and written with
/// their store version, so a resync running alongside live mutations can
/// never overwrite a newer document.
pub struct BulkSynchronizer {
    store: Arc<dyn CatalogStore>,
    engines: SearchEngines,
    config: SyncConfig,
}

impl BulkSynchronizer {
    pub fn new(store: Arc<dyn CatalogStore>, engines: SearchEngines) -> Self {
        Self::with_config(store, engines, SyncConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn CatalogStore>,
        engines: SearchEngines,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            engines,
            config,
        }
    }

    /// Upsert every live row of `entity_type` into its index.
    ///
    /// Store and transport errors abort the run; per-document failures are
    /// counted in the returned summary.
    #[instrument(skip(self), fields(entity_type = %entity_type, batch_size = self.config.batch_size))]
    pub async fn resync(
        &self,
        entity_type: EntityType,
    ) -> Result<BatchOperationSummary, SyncError> {
        let engine = self
            .engines
            .get(entity_type)
            .ok_or(SyncError::MissingEngine(entity_type))?;
        let batch_size = self.config.batch_size.max(1);

        let mut summary = BatchOperationSummary::default();
        let mut cursor: Option<Uuid> = None;
        let mut batches = 0usize;

        loop {
            let batch = self
                .store
                .fetch_live_batch(entity_type, cursor, batch_size)
                .await?;
            let Some(last) = batch.last() else {
                break;
            };
            cursor = Some(last.id());

            let documents: Vec<IndexDocument> = batch.iter().map(IndexDocument::from).collect();
            let result = engine.bulk_upsert(&documents).await?;
            if result.failed > 0 {
                warn!(
                    batch = batches,
                    failed = result.failed,
                    "Some documents failed to index"
                );
            }
            summary.merge(result);
            batches += 1;
            debug!(batch = batches, indexed = summary.total, "Synced batch");

            if batch.len() < batch_size {
                break;
            }
        }

        info!(
            batches = batches,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Resync completed"
        );
        Ok(summary)
    }
}

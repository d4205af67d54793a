//! Schema registrar.
//!
//! Ensures every entity type has its index and records which ones can be
//! queried. A failure here never stops the process: the entity type is
//! marked unavailable and served from the store until the monitor recovers
//! it.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::availability::IndexAvailability;
use crate::engines::SearchEngines;
use catalog_search_repository::{IndexStatus, SearchIndexError};
use catalog_search_shared::EntityType;

pub struct SchemaRegistrar {
    engines: SearchEngines,
    availability: Arc<IndexAvailability>,
}

impl SchemaRegistrar {
    pub fn new(engines: SearchEngines, availability: Arc<IndexAvailability>) -> Self {
        Self {
            engines,
            availability,
        }
    }

    pub fn availability(&self) -> &Arc<IndexAvailability> {
        &self.availability
    }

    /// Create the entity's index if absent, without touching availability.
    pub async fn create_if_missing(
        &self,
        entity_type: EntityType,
    ) -> Result<IndexStatus, SearchIndexError> {
        let engine = self.engines.get(entity_type).ok_or_else(|| {
            SearchIndexError::connection(format!("no search engine registered for {}", entity_type))
        })?;
        engine.ensure_index_exists().await
    }

    /// Ensure the entity's index exists and record the outcome.
    ///
    /// Returns whether the index is now available.
    #[instrument(skip(self), fields(entity_type = %entity_type))]
    pub async fn ensure_index(&self, entity_type: EntityType) -> bool {
        match self.create_if_missing(entity_type).await {
            Ok(status) => {
                info!(status = ?status, "Search index ready");
                self.availability.mark_available(entity_type);
                true
            }
            Err(e) => {
                warn!(error = %e, "Search index unavailable; queries will use the store");
                self.availability.mark_unavailable(entity_type);
                false
            }
        }
    }
}

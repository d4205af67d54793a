//! Incremental mutator.

use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::engines::SearchEngines;
use catalog_search_repository::WriteOutcome;
use catalog_search_shared::{CatalogEntity, IndexDocument};

/// Mirrors single catalog writes into the search index.
///
/// Every call runs after the store commit and is best effort: failures are
/// logged and reported as `None`, never raised. A missed write is repaired
/// by the next bulk resync.
#[derive(Clone)]
pub struct IncrementalMutator {
    engines: SearchEngines,
}

impl IncrementalMutator {
    pub fn new(engines: SearchEngines) -> Self {
        Self { engines }
    }

    /// Index a newly created entity.
    pub async fn on_create(&self, entity: &CatalogEntity) -> Option<WriteOutcome> {
        self.upsert(entity).await
    }

    /// Reindex an updated entity. An update that soft-deletes the entity
    /// removes its document.
    pub async fn on_update(&self, entity: &CatalogEntity) -> Option<WriteOutcome> {
        if entity.is_deleted() {
            self.delete(entity).await
        } else {
            self.upsert(entity).await
        }
    }

    /// Remove a deleted entity's document.
    pub async fn on_delete(&self, entity: &CatalogEntity) -> Option<WriteOutcome> {
        self.delete(entity).await
    }

    /// Run [`Self::on_create`] on a background task.
    pub fn spawn_create(&self, entity: CatalogEntity) -> JoinHandle<Option<WriteOutcome>> {
        let mutator = self.clone();
        tokio::spawn(async move { mutator.on_create(&entity).await })
    }

    /// Run [`Self::on_update`] on a background task.
    pub fn spawn_update(&self, entity: CatalogEntity) -> JoinHandle<Option<WriteOutcome>> {
        let mutator = self.clone();
        tokio::spawn(async move { mutator.on_update(&entity).await })
    }

    /// Run [`Self::on_delete`] on a background task.
    pub fn spawn_delete(&self, entity: CatalogEntity) -> JoinHandle<Option<WriteOutcome>> {
        let mutator = self.clone();
        tokio::spawn(async move { mutator.on_delete(&entity).await })
    }

    #[instrument(skip(self, entity), fields(entity_type = %entity.entity_type(), id = %entity.id(), version = entity.version()))]
    async fn upsert(&self, entity: &CatalogEntity) -> Option<WriteOutcome> {
        let Some(engine) = self.engines.get(entity.entity_type()) else {
            warn!("No search engine registered; skipping index write");
            return None;
        };
        match engine.upsert_document(&IndexDocument::from(entity)).await {
            Ok(WriteOutcome::Stale) => {
                debug!("Index holds a newer version; upsert dropped");
                Some(WriteOutcome::Stale)
            }
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Failed to index document; the next resync will repair it");
                None
            }
        }
    }

    #[instrument(skip(self, entity), fields(entity_type = %entity.entity_type(), id = %entity.id(), version = entity.version()))]
    async fn delete(&self, entity: &CatalogEntity) -> Option<WriteOutcome> {
        let Some(engine) = self.engines.get(entity.entity_type()) else {
            warn!("No search engine registered; skipping index delete");
            return None;
        };
        match engine.delete_document(&entity.id(), entity.version()).await {
            Ok(WriteOutcome::Stale) => {
                debug!("Index holds a newer version; delete dropped");
                Some(WriteOutcome::Stale)
            }
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Failed to delete document; the next resync will repair it");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use catalog_search_repository::InMemorySearchEngine;
    use catalog_search_shared::{EntityType, Field, Organizer};
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    fn organizer(name: &str, updated_at: DateTime<Utc>) -> Organizer {
        Organizer {
            id: Uuid::from_u128(42),
            name: name.to_string(),
            description: None,
            city: Some("Izmir".to_string()),
            created_at: updated_at,
            updated_at,
            deleted_at: None,
        }
    }

    fn setup() -> (Arc<InMemorySearchEngine>, IncrementalMutator) {
        let engine = Arc::new(InMemorySearchEngine::new(EntityType::Organizer));
        let mutator = IncrementalMutator::new(SearchEngines::new().with(engine.clone()));
        (engine, mutator)
    }

    #[tokio::test]
    async fn test_create_then_update_reindexes() {
        let (engine, mutator) = setup();
        let now = Utc::now();

        let created = CatalogEntity::Organizer(organizer("Acme", now));
        assert_eq!(mutator.on_create(&created).await, Some(WriteOutcome::Applied));

        let updated = CatalogEntity::Organizer(organizer("Acme Live", now + Duration::seconds(1)));
        assert_eq!(mutator.on_update(&updated).await, Some(WriteOutcome::Applied));

        let document = engine.document(&Uuid::from_u128(42)).await.unwrap();
        assert_eq!(document.text(Field::Name), Some("Acme Live"));
    }

    #[tokio::test]
    async fn test_soft_delete_update_removes_document() {
        let (engine, mutator) = setup();
        let now = Utc::now();
        mutator
            .on_create(&CatalogEntity::Organizer(organizer("Acme", now)))
            .await;

        let mut deleted = organizer("Acme", now);
        deleted.deleted_at = Some(now + Duration::seconds(1));
        assert_eq!(
            mutator.on_update(&CatalogEntity::Organizer(deleted)).await,
            Some(WriteOutcome::Applied)
        );
        assert!(engine.is_empty().await);
    }

    #[tokio::test]
    async fn test_out_of_order_writes_converge_to_latest() {
        let (engine, mutator) = setup();
        let now = Utc::now();
        let older = CatalogEntity::Organizer(organizer("First", now));
        let newer = CatalogEntity::Organizer(organizer("Second", now + Duration::seconds(1)));

        // The later write is delivered first.
        mutator.on_update(&newer).await;
        assert_eq!(mutator.on_update(&older).await, Some(WriteOutcome::Stale));

        let document = engine.document(&Uuid::from_u128(42)).await.unwrap();
        assert_eq!(document.text(Field::Name), Some("Second"));
    }

    #[tokio::test]
    async fn test_delayed_upsert_cannot_resurrect_deleted_document() {
        let (engine, mutator) = setup();
        let now = Utc::now();
        let live = CatalogEntity::Organizer(organizer("Acme", now));
        let mut deleted = organizer("Acme", now);
        deleted.deleted_at = Some(now + Duration::seconds(2));

        mutator.on_create(&live).await;
        mutator.on_delete(&CatalogEntity::Organizer(deleted)).await;
        assert_eq!(mutator.on_update(&live).await, Some(WriteOutcome::Stale));
        assert!(engine.is_empty().await);
    }

    #[tokio::test]
    async fn test_index_failure_is_swallowed() {
        let (engine, mutator) = setup();
        engine.set_failing_writes(true);

        let entity = CatalogEntity::Organizer(organizer("Acme", Utc::now()));
        assert_eq!(mutator.on_create(&entity).await, None);
        assert_eq!(mutator.on_delete(&entity).await, None);
    }

    #[tokio::test]
    async fn test_missing_engine_is_skipped() {
        let mutator = IncrementalMutator::new(SearchEngines::new());
        let entity = CatalogEntity::Organizer(organizer("Acme", Utc::now()));
        assert_eq!(mutator.on_create(&entity).await, None);
    }

    #[tokio::test]
    async fn test_spawned_writes_complete_in_background() {
        let (engine, mutator) = setup();
        let entity = CatalogEntity::Organizer(organizer("Acme", Utc::now()));

        let outcome = mutator.spawn_create(entity.clone()).await.unwrap();
        assert_eq!(outcome, Some(WriteOutcome::Applied));

        let outcome = mutator.spawn_update(entity.clone()).await.unwrap();
        assert_eq!(outcome, Some(WriteOutcome::Applied));

        let outcome = mutator.spawn_delete(entity).await.unwrap();
        assert_eq!(outcome, Some(WriteOutcome::Applied));
        assert!(engine.is_empty().await);
    }
}

//! Result hydration.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use catalog_search_repository::{CatalogStore, StoreError};
use catalog_search_shared::{CatalogEntity, EntityType};

/// Loads full records for an ordered identifier list.
///
/// The store answers in any order; the hydrator restores the candidate
/// order, drops identifiers the store no longer has (deleted since they
/// were indexed) and keeps only the first occurrence of a duplicate.
pub struct ResultHydrator {
    store: Arc<dyn CatalogStore>,
}

impl ResultHydrator {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn hydrate(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<Vec<CatalogEntity>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        let records = self.store.fetch_by_ids(entity_type, &unique).await?;
        let hydrated = restore_order(&unique, records);
        if hydrated.len() < unique.len() {
            debug!(
                requested = unique.len(),
                missing = unique.len() - hydrated.len(),
                "Dropped identifiers missing from the store"
            );
        }
        Ok(hydrated)
    }
}

/// Arrange `records` in the order of `ids`. Records not listed are ignored;
/// identifiers without a record are skipped.
pub fn restore_order(ids: &[Uuid], records: Vec<CatalogEntity>) -> Vec<CatalogEntity> {
    let mut by_id: HashMap<Uuid, CatalogEntity> =
        records.into_iter().map(|record| (record.id(), record)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use catalog_search_repository::StoreQuery;
    use catalog_search_shared::{GeoPoint, Organizer};
    use chrono::Utc;

    fn organizer(n: u128) -> CatalogEntity {
        let now = Utc::now();
        CatalogEntity::Organizer(Organizer {
            id: Uuid::from_u128(n),
            name: format!("Organizer {}", n),
            description: None,
            city: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Store that answers id lookups in reverse and omits one record.
    struct ShuffledStore {
        records: Vec<CatalogEntity>,
        missing: Uuid,
        requested: AtomicUsize,
    }

    #[async_trait]
    impl CatalogStore for ShuffledStore {
        async fn count(&self, _query: &StoreQuery) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn page_ids(&self, _query: &StoreQuery) -> Result<Vec<Uuid>, StoreError> {
            Ok(Vec::new())
        }

        async fn fetch_by_ids(
            &self,
            _entity_type: EntityType,
            ids: &[Uuid],
        ) -> Result<Vec<CatalogEntity>, StoreError> {
            self.requested.fetch_add(ids.len(), Ordering::SeqCst);
            Ok(self
                .records
                .iter()
                .rev()
                .filter(|record| ids.contains(&record.id()) && record.id() != self.missing)
                .cloned()
                .collect())
        }

        async fn fetch_live_batch(
            &self,
            _entity_type: EntityType,
            _after: Option<Uuid>,
            _limit: usize,
        ) -> Result<Vec<CatalogEntity>, StoreError> {
            Ok(Vec::new())
        }

        async fn coordinates(
            &self,
            _entity_type: EntityType,
            _ids: &[Uuid],
        ) -> Result<HashMap<Uuid, GeoPoint>, StoreError> {
            Ok(HashMap::new())
        }
    }

    #[tokio::test]
    async fn test_hydrate_restores_order_drops_missing_and_dedupes() {
        let store = Arc::new(ShuffledStore {
            records: (1..=4).map(organizer).collect(),
            missing: Uuid::from_u128(3),
            requested: AtomicUsize::new(0),
        });
        let hydrator = ResultHydrator::new(store.clone());
        let ids: Vec<Uuid> = [2u128, 4, 3, 1, 2].into_iter().map(Uuid::from_u128).collect();

        let hydrated = hydrator.hydrate(EntityType::Organizer, &ids).await.unwrap();

        let order: Vec<Uuid> = hydrated.iter().map(CatalogEntity::id).collect();
        assert_eq!(
            order,
            vec![Uuid::from_u128(2), Uuid::from_u128(4), Uuid::from_u128(1)]
        );
        assert_eq!(store.requested.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_empty_input_skips_the_store() {
        let store = Arc::new(ShuffledStore {
            records: Vec::new(),
            missing: Uuid::nil(),
            requested: AtomicUsize::new(0),
        });
        let hydrator = ResultHydrator::new(store.clone());

        assert!(hydrator.hydrate(EntityType::Organizer, &[]).await.unwrap().is_empty());
        assert_eq!(store.requested.load(Ordering::SeqCst), 0);
    }
}

//! Geo post-filter for entities located through a related record.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use catalog_search_repository::{CatalogStore, StoreError};
use catalog_search_shared::{EntityType, GeoPoint, GeoRadius};

pub struct GeoPostFilter {
    store: Arc<dyn CatalogStore>,
}

impl GeoPostFilter {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Drop candidates located outside `radius`, keeping candidate order.
    pub async fn apply(
        &self,
        entity_type: EntityType,
        ids: Vec<Uuid>,
        radius: &GeoRadius,
    ) -> Result<Vec<Uuid>, StoreError> {
        if ids.is_empty() {
            return Ok(ids);
        }
        let coordinates = self.store.coordinates(entity_type, &ids).await?;
        let before = ids.len();
        let retained = retain_within(ids, &coordinates, radius);
        debug!(
            candidates = before,
            located = coordinates.len(),
            retained = retained.len(),
            "Geo post-filter applied"
        );
        Ok(retained)
    }
}

/// Keep the identifiers within `radius`. A candidate without known
/// coordinates cannot be placed and is kept.
pub fn retain_within(
    ids: Vec<Uuid>,
    coordinates: &HashMap<Uuid, GeoPoint>,
    radius: &GeoRadius,
) -> Vec<Uuid> {
    ids.into_iter()
        .filter(|id| {
            coordinates
                .get(id)
                .map_or(true, |point| radius.contains(point))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_search_repository::InMemoryCatalogStore;
    use catalog_search_shared::{haversine_km, CatalogEntity, Event, EventStatus, Venue};
    use chrono::Utc;

    #[test]
    fn test_boundary_is_inclusive_and_order_preserved() {
        let center = GeoPoint::new(38.4237, 27.1428);
        let edge = GeoPoint::new(38.50, 27.20);
        let far = GeoPoint::new(41.0082, 28.9784);
        let radius = GeoRadius {
            center,
            radius_km: haversine_km(&center, &edge),
        };

        let ids: Vec<Uuid> = (1..=4).map(Uuid::from_u128).collect();
        let coordinates = HashMap::from([
            (ids[0], far),
            (ids[1], edge),
            (ids[3], center),
        ]);

        let retained = retain_within(ids.clone(), &coordinates, &radius);

        // ids[2] has no coordinates and is kept.
        assert_eq!(retained, vec![ids[1], ids[2], ids[3]]);
    }

    #[tokio::test]
    async fn test_events_are_located_through_their_venue() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let now = Utc::now();
        let venue_id = Uuid::from_u128(100);
        store
            .put(CatalogEntity::Venue(Venue {
                id: venue_id,
                name: "Istanbul Arena".to_string(),
                address: None,
                city: "Istanbul".to_string(),
                location: Some(GeoPoint::new(41.0082, 28.9784)),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            }))
            .await;
        for (id, venue) in [(1u128, Some(venue_id)), (2, None)] {
            store
                .put(CatalogEntity::Event(Event {
                    id: Uuid::from_u128(id),
                    title: format!("Event {}", id),
                    description: None,
                    category: "CONCERT".to_string(),
                    city: "Istanbul".to_string(),
                    status: EventStatus::Published,
                    start_date: now,
                    end_date: None,
                    min_price: None,
                    venue_id: venue,
                    organizer_id: None,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                }))
                .await;
        }

        let filter = GeoPostFilter::new(store);
        let izmir = GeoRadius {
            center: GeoPoint::new(38.4237, 27.1428),
            radius_km: 50.0,
        };
        let retained = filter
            .apply(
                EntityType::Event,
                vec![Uuid::from_u128(1), Uuid::from_u128(2)],
                &izmir,
            )
            .await
            .unwrap();

        assert_eq!(retained, vec![Uuid::from_u128(2)]);
    }
}

//! In-memory catalog store and popularity source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::interfaces::{CatalogStore, PopularitySource};
use crate::memory::natural_order;
use crate::types::{EventRelations, StoreQuery};
use catalog_search_shared::{CatalogEntity, EntityType, GeoPoint, IndexDocument};

#[derive(Debug, Clone, Copy)]
struct TicketSale {
    event_id: Uuid,
    purchased_at: DateTime<Utc>,
}

/// Catalog store holding entities and their aggregates in memory.
///
/// Soft-deleted entities are kept but never returned, as in the relational
/// store.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    entities: RwLock<HashMap<Uuid, CatalogEntity>>,
    favorites: RwLock<HashMap<(EntityType, Uuid), u64>>,
    event_artists: RwLock<HashMap<Uuid, Vec<Uuid>>>,
    ticket_sales: RwLock<Vec<TicketSale>>,
    unavailable: AtomicBool,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity.
    pub async fn put(&self, entity: CatalogEntity) {
        self.entities.write().await.insert(entity.id(), entity);
    }

    pub async fn get(&self, id: &Uuid) -> Option<CatalogEntity> {
        self.entities.read().await.get(id).cloned()
    }

    pub async fn set_favorites(&self, entity_type: EntityType, id: Uuid, count: u64) {
        self.favorites.write().await.insert((entity_type, id), count);
    }

    pub async fn link_artist(&self, event_id: Uuid, artist_id: Uuid) {
        self.event_artists
            .write()
            .await
            .entry(event_id)
            .or_default()
            .push(artist_id);
    }

    pub async fn record_ticket_sale(&self, event_id: Uuid, purchased_at: DateTime<Utc>) {
        self.ticket_sales.write().await.push(TicketSale {
            event_id,
            purchased_at,
        });
    }

    /// Make every call fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store is unavailable"));
        }
        Ok(())
    }

    /// Live entities of the query's type matching every clause, in natural order.
    async fn matching_documents(&self, query: &StoreQuery) -> Vec<IndexDocument> {
        let entities = self.entities.read().await;
        let mut documents: Vec<IndexDocument> = entities
            .values()
            .filter(|entity| entity.entity_type() == query.entity_type && !entity.is_deleted())
            .map(IndexDocument::from)
            .filter(|doc| query.clauses.iter().all(|clause| clause.matches(doc)))
            .collect();
        documents.sort_by(|a, b| natural_order(query.entity_type, a, b));
        documents
    }

    fn live<'a>(
        entities: &'a HashMap<Uuid, CatalogEntity>,
        id: &Uuid,
    ) -> Option<&'a CatalogEntity> {
        entities.get(id).filter(|entity| !entity.is_deleted())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn count(&self, query: &StoreQuery) -> Result<u64, StoreError> {
        self.check_available()?;
        Ok(self.matching_documents(query).await.len() as u64)
    }

    async fn page_ids(&self, query: &StoreQuery) -> Result<Vec<Uuid>, StoreError> {
        self.check_available()?;
        Ok(self
            .matching_documents(query)
            .await
            .into_iter()
            .skip(query.window.offset as usize)
            .take(query.window.limit as usize)
            .map(|doc| doc.id)
            .collect())
    }

    async fn fetch_by_ids(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<Vec<CatalogEntity>, StoreError> {
        self.check_available()?;
        let entities = self.entities.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| Self::live(&entities, id))
            .filter(|entity| entity.entity_type() == entity_type)
            .cloned()
            .collect())
    }

    async fn fetch_live_batch(
        &self,
        entity_type: EntityType,
        after: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<CatalogEntity>, StoreError> {
        self.check_available()?;
        let entities = self.entities.read().await;
        let mut batch: Vec<CatalogEntity> = entities
            .values()
            .filter(|entity| entity.entity_type() == entity_type && !entity.is_deleted())
            .filter(|entity| after.map_or(true, |cursor| entity.id() > cursor))
            .cloned()
            .collect();
        batch.sort_by_key(|entity| entity.id());
        batch.truncate(limit);
        Ok(batch)
    }

    async fn coordinates(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, GeoPoint>, StoreError> {
        self.check_available()?;
        let entities = self.entities.read().await;
        let mut coordinates = HashMap::new();
        for id in ids {
            let location = match (entity_type, entities.get(id)) {
                (EntityType::Event, Some(CatalogEntity::Event(event))) => event
                    .venue_id
                    .and_then(|venue_id| Self::live(&entities, &venue_id))
                    .and_then(|venue| match venue {
                        CatalogEntity::Venue(venue) => venue.location,
                        _ => None,
                    }),
                (EntityType::Venue, Some(CatalogEntity::Venue(venue))) => venue.location,
                _ => None,
            };
            if let Some(location) = location {
                coordinates.insert(*id, location);
            }
        }
        Ok(coordinates)
    }
}

#[async_trait]
impl PopularitySource for InMemoryCatalogStore {
    async fn favorite_counts(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, StoreError> {
        self.check_available()?;
        let favorites = self.favorites.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| favorites.get(&(entity_type, *id)).map(|count| (*id, *count)))
            .collect())
    }

    async fn event_relations(
        &self,
        event_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, EventRelations>, StoreError> {
        self.check_available()?;
        let entities = self.entities.read().await;
        let event_artists = self.event_artists.read().await;

        let mut relations = HashMap::new();
        for id in event_ids {
            let Some(CatalogEntity::Event(event)) = entities.get(id) else {
                continue;
            };
            let artist_ids = event_artists
                .get(id)
                .map(|artists| {
                    artists
                        .iter()
                        .filter(|artist_id| Self::live(&entities, artist_id).is_some())
                        .copied()
                        .collect()
                })
                .unwrap_or_default();
            relations.insert(
                *id,
                EventRelations {
                    artist_ids,
                    venue_id: event.venue_id,
                },
            );
        }
        Ok(relations)
    }

    async fn artist_ticket_sales(
        &self,
        artist_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> Result<HashMap<Uuid, u64>, StoreError> {
        self.check_available()?;
        let event_artists = self.event_artists.read().await;
        let ticket_sales = self.ticket_sales.read().await;

        let mut sales = HashMap::new();
        for sale in ticket_sales.iter().filter(|sale| sale.purchased_at >= since) {
            let Some(artists) = event_artists.get(&sale.event_id) else {
                continue;
            };
            for artist_id in artists.iter().filter(|id| artist_ids.contains(id)) {
                *sales.entry(*artist_id).or_insert(0) += 1;
            }
        }
        Ok(sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Window;
    use catalog_search_shared::{Event, EventStatus, Field, FilterClause, Venue};
    use chrono::{Duration, TimeZone};

    fn venue(id: u128, location: Option<GeoPoint>) -> CatalogEntity {
        let now = Utc::now();
        CatalogEntity::Venue(Venue {
            id: Uuid::from_u128(id),
            name: format!("Venue {}", id),
            address: None,
            city: "Izmir".to_string(),
            location,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    fn event(id: u128, title: &str, day: u32, venue_id: Option<u128>) -> CatalogEntity {
        let now = Utc::now();
        CatalogEntity::Event(Event {
            id: Uuid::from_u128(id),
            title: title.to_string(),
            description: None,
            category: "CONCERT".to_string(),
            city: "Izmir".to_string(),
            status: EventStatus::Published,
            start_date: Utc.with_ymd_and_hms(2025, 6, day, 20, 0, 0).unwrap(),
            end_date: None,
            min_price: None,
            venue_id: venue_id.map(Uuid::from_u128),
            organizer_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    #[tokio::test]
    async fn test_page_ids_in_natural_order_excluding_deleted() {
        let store = InMemoryCatalogStore::new();
        store.put(event(1, "Late", 20, None)).await;
        store.put(event(2, "Early", 1, None)).await;
        let mut deleted = event(3, "Gone", 2, None);
        if let CatalogEntity::Event(e) = &mut deleted {
            e.deleted_at = Some(Utc::now());
        }
        store.put(deleted).await;

        let query = StoreQuery {
            entity_type: EntityType::Event,
            clauses: vec![],
            window: Window::new(0, 10),
        };

        assert_eq!(store.count(&query).await.unwrap(), 2);
        assert_eq!(
            store.page_ids(&query).await.unwrap(),
            vec![Uuid::from_u128(2), Uuid::from_u128(1)]
        );
    }

    #[tokio::test]
    async fn test_clauses_filter_store_rows() {
        let store = InMemoryCatalogStore::new();
        store.put(event(1, "Jazz Night", 1, None)).await;
        store.put(event(2, "Rock Night", 2, None)).await;

        let query = StoreQuery {
            entity_type: EntityType::Event,
            clauses: vec![FilterClause::Text {
                fields: vec![Field::Title, Field::Description],
                term: "JAZZ".to_string(),
            }],
            window: Window::new(0, 10),
        };

        assert_eq!(store.page_ids(&query).await.unwrap(), vec![Uuid::from_u128(1)]);
    }

    #[tokio::test]
    async fn test_event_coordinates_come_from_the_venue() {
        let store = InMemoryCatalogStore::new();
        store.put(venue(10, Some(GeoPoint::new(38.4, 27.1)))).await;
        store.put(venue(11, None)).await;
        store.put(event(1, "A", 1, Some(10))).await;
        store.put(event(2, "B", 1, Some(11))).await;
        store.put(event(3, "C", 1, None)).await;

        let ids = [Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3)];
        let coordinates = store.coordinates(EntityType::Event, &ids).await.unwrap();

        assert_eq!(coordinates.len(), 1);
        assert_eq!(coordinates[&Uuid::from_u128(1)], GeoPoint::new(38.4, 27.1));
    }

    #[tokio::test]
    async fn test_live_batches_are_keyset_paginated() {
        let store = InMemoryCatalogStore::new();
        for id in 1..=5 {
            store.put(venue(id, None)).await;
        }

        let first = store.fetch_live_batch(EntityType::Venue, None, 2).await.unwrap();
        let cursor = first.last().map(CatalogEntity::id);
        let second = store.fetch_live_batch(EntityType::Venue, cursor, 10).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 3);
        assert!(second.iter().all(|e| Some(e.id()) > cursor));
    }

    #[tokio::test]
    async fn test_artist_ticket_sales_respect_window() {
        let store = InMemoryCatalogStore::new();
        let artist = Uuid::from_u128(50);
        let event_id = Uuid::from_u128(1);
        store.link_artist(event_id, artist).await;
        let now = Utc::now();
        store.record_ticket_sale(event_id, now - Duration::days(10)).await;
        store.record_ticket_sale(event_id, now - Duration::days(400)).await;

        let sales = store
            .artist_ticket_sales(&[artist], now - Duration::days(365))
            .await
            .unwrap();
        assert_eq!(sales.get(&artist), Some(&1));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = InMemoryCatalogStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.fetch_by_ids(EntityType::Event, &[Uuid::new_v4()]).await,
            Err(StoreError::Unavailable(_))
        ));
    }
}

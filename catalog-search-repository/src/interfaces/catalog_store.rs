//! Catalog store trait definition.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::types::StoreQuery;
use catalog_search_shared::{CatalogEntity, EntityType, GeoPoint};

/// Read access to the authoritative relational store.
///
/// Every query excludes soft-deleted rows.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Exact number of rows matching the query's clauses.
    async fn count(&self, query: &StoreQuery) -> Result<u64, StoreError>;

    /// Identifiers of the query's window in the entity's natural order.
    async fn page_ids(&self, query: &StoreQuery) -> Result<Vec<Uuid>, StoreError>;

    /// Full records for an identifier set, in no particular order.
    ///
    /// Identifiers with no live row are absent from the result.
    async fn fetch_by_ids(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<Vec<CatalogEntity>, StoreError>;

    /// Live rows ordered by identifier, starting strictly after `after`.
    ///
    /// Used to stream a whole table in keyset-paginated chunks.
    async fn fetch_live_batch(
        &self,
        entity_type: EntityType,
        after: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<CatalogEntity>, StoreError>;

    /// Known coordinates for an identifier set.
    ///
    /// For events these are the coordinates of the linked venue. Identifiers
    /// without coordinates are absent from the map.
    async fn coordinates(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, GeoPoint>, StoreError>;
}

//! Popularity aggregate trait definition.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::types::EventRelations;
use catalog_search_shared::EntityType;

/// Live aggregate signals used for popularity ranking.
///
/// Counts are always computed by the store for the given identifiers only;
/// the search index never holds them. Identifiers with a zero count may be
/// absent from the returned maps.
#[async_trait]
pub trait PopularitySource: Send + Sync {
    /// Favorite (or follow) count per entity.
    async fn favorite_counts(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, StoreError>;

    /// Linked artists and venue per event.
    async fn event_relations(
        &self,
        event_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, EventRelations>, StoreError>;

    /// Tickets sold since `since`, summed over each artist's events.
    async fn artist_ticket_sales(
        &self,
        artist_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> Result<HashMap<Uuid, u64>, StoreError>;
}

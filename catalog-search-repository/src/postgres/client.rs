//! PostgreSQL implementation of the catalog store and popularity source.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::interfaces::{CatalogStore, PopularitySource};
use crate::postgres::predicate::{push_natural_order, push_predicate, table_name};
use crate::postgres::rows::{
    ArtistRow, CoordinateRow, CountRow, EventRow, OrganizerRow, VenueRow, ARTIST_COLUMNS,
    EVENT_COLUMNS, ORGANIZER_COLUMNS, VENUE_COLUMNS,
};
use crate::types::{EventRelations, StoreQuery};
use catalog_search_shared::{CatalogEntity, EntityType, GeoPoint};

/// Ticket status counted as a sale.
const SOLD_TICKET_STATUS: &str = "PAID";

/// How a row query is parameterized.
#[derive(Debug, Clone, Copy)]
enum RowFilter<'a> {
    /// `$1` is an identifier array.
    Ids(&'a [Uuid]),
    /// `$1` is the keyset cursor, `$2` the batch size.
    After(Option<Uuid>, i64),
}

/// Catalog store backed by a PostgreSQL connection pool.
///
/// Tables follow the entity names (`events`, `artists`, `venues`,
/// `organizers`); popularity reads `favorites`, `event_artists` and
/// `tickets`. See `migrations/` for the expected schema.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;
        info!(max_connections, "Connected to catalog database");
        Ok(Self::new(pool))
    }

    async fn fetch_rows<R>(&self, sql: &str, filter: RowFilter<'_>) -> Result<Vec<R>, StoreError>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let query = sqlx::query_as::<_, R>(sql);
        let query = match filter {
            RowFilter::Ids(ids) => query.bind(ids),
            RowFilter::After(after, limit) => query.bind(after).bind(limit),
        };
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn load_entities(
        &self,
        entity_type: EntityType,
        sql: &str,
        filter: RowFilter<'_>,
    ) -> Result<Vec<CatalogEntity>, StoreError> {
        match entity_type {
            EntityType::Event => self
                .fetch_rows::<EventRow>(sql, filter)
                .await?
                .into_iter()
                .map(CatalogEntity::try_from)
                .collect(),
            EntityType::Artist => Ok(self
                .fetch_rows::<ArtistRow>(sql, filter)
                .await?
                .into_iter()
                .map(CatalogEntity::from)
                .collect()),
            EntityType::Venue => Ok(self
                .fetch_rows::<VenueRow>(sql, filter)
                .await?
                .into_iter()
                .map(CatalogEntity::from)
                .collect()),
            EntityType::Organizer => Ok(self
                .fetch_rows::<OrganizerRow>(sql, filter)
                .await?
                .into_iter()
                .map(CatalogEntity::from)
                .collect()),
        }
    }
}

fn columns(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Event => EVENT_COLUMNS,
        EntityType::Artist => ARTIST_COLUMNS,
        EntityType::Venue => VENUE_COLUMNS,
        EntityType::Organizer => ORGANIZER_COLUMNS,
    }
}

fn select_by_ids_sql(entity_type: EntityType) -> String {
    format!(
        "SELECT {} FROM {} WHERE id = ANY($1) AND deleted_at IS NULL",
        columns(entity_type),
        table_name(entity_type)
    )
}

fn select_live_batch_sql(entity_type: EntityType) -> String {
    format!(
        "SELECT {} FROM {} WHERE deleted_at IS NULL AND ($1::uuid IS NULL OR id > $1) \
         ORDER BY id ASC LIMIT $2",
        columns(entity_type),
        table_name(entity_type)
    )
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn into_count_map(rows: Vec<CountRow>) -> HashMap<Uuid, u64> {
    rows.into_iter()
        .map(|row| (row.id, u64::try_from(row.count).unwrap_or(0)))
        .collect()
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[instrument(skip(self, query), fields(entity_type = %query.entity_type))]
    async fn count(&self, query: &StoreQuery) -> Result<u64, StoreError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", table_name(query.entity_type)));
        push_predicate(&mut builder, &query.clauses);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[instrument(skip(self, query), fields(entity_type = %query.entity_type))]
    async fn page_ids(&self, query: &StoreQuery) -> Result<Vec<Uuid>, StoreError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT id FROM {}", table_name(query.entity_type)));
        push_predicate(&mut builder, &query.clauses);
        push_natural_order(&mut builder, query.entity_type);
        builder
            .push(" LIMIT ")
            .push_bind(to_i64(query.window.limit))
            .push(" OFFSET ")
            .push_bind(to_i64(query.window.offset));

        let ids: Vec<Uuid> = builder.build_query_scalar().fetch_all(&self.pool).await?;
        debug!(returned = ids.len(), "Store page fetched");
        Ok(ids)
    }

    async fn fetch_by_ids(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<Vec<CatalogEntity>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = select_by_ids_sql(entity_type);
        self.load_entities(entity_type, &sql, RowFilter::Ids(ids)).await
    }

    async fn fetch_live_batch(
        &self,
        entity_type: EntityType,
        after: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<CatalogEntity>, StoreError> {
        let sql = select_live_batch_sql(entity_type);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.load_entities(entity_type, &sql, RowFilter::After(after, limit))
            .await
    }

    async fn coordinates(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, GeoPoint>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let sql = match entity_type {
            EntityType::Event => {
                "SELECT e.id AS id, v.latitude AS latitude, v.longitude AS longitude \
                 FROM events e JOIN venues v ON v.id = e.venue_id \
                 WHERE e.id = ANY($1) AND v.deleted_at IS NULL \
                 AND v.latitude IS NOT NULL AND v.longitude IS NOT NULL"
            }
            EntityType::Venue => {
                "SELECT id, latitude, longitude FROM venues \
                 WHERE id = ANY($1) AND latitude IS NOT NULL AND longitude IS NOT NULL"
            }
            EntityType::Artist | EntityType::Organizer => return Ok(HashMap::new()),
        };

        let rows = self
            .fetch_rows::<CoordinateRow>(sql, RowFilter::Ids(ids))
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.id, GeoPoint::new(row.latitude, row.longitude)))
            .collect())
    }
}

#[async_trait]
impl PopularitySource for PgCatalogStore {
    async fn favorite_counts(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, CountRow>(
            "SELECT target_id AS id, COUNT(*) AS count FROM favorites \
             WHERE target_type = $1 AND target_id = ANY($2) GROUP BY target_id",
        )
        .bind(entity_type.as_str())
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(into_count_map(rows))
    }

    async fn event_relations(
        &self,
        event_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, EventRelations>, StoreError> {
        if event_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let venues: Vec<(Uuid, Option<Uuid>)> =
            sqlx::query_as("SELECT id, venue_id FROM events WHERE id = ANY($1)")
                .bind(event_ids)
                .fetch_all(&self.pool)
                .await?;

        let artists: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT ea.event_id, ea.artist_id FROM event_artists ea \
             JOIN artists a ON a.id = ea.artist_id \
             WHERE ea.event_id = ANY($1) AND a.deleted_at IS NULL \
             ORDER BY ea.event_id, ea.artist_id",
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut relations: HashMap<Uuid, EventRelations> = venues
            .into_iter()
            .map(|(id, venue_id)| {
                (
                    id,
                    EventRelations {
                        artist_ids: Vec::new(),
                        venue_id,
                    },
                )
            })
            .collect();
        for (event_id, artist_id) in artists {
            relations
                .entry(event_id)
                .or_default()
                .artist_ids
                .push(artist_id);
        }
        Ok(relations)
    }

    async fn artist_ticket_sales(
        &self,
        artist_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> Result<HashMap<Uuid, u64>, StoreError> {
        if artist_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, CountRow>(
            "SELECT ea.artist_id AS id, COUNT(t.id) AS count FROM tickets t \
             JOIN event_artists ea ON ea.event_id = t.event_id \
             WHERE ea.artist_id = ANY($1) AND t.status = $2 AND t.purchased_at >= $3 \
             GROUP BY ea.artist_id",
        )
        .bind(artist_ids)
        .bind(SOLD_TICKET_STATUS)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(into_count_map(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_by_ids_sql_excludes_deleted_rows() {
        assert_eq!(
            select_by_ids_sql(EntityType::Organizer),
            "SELECT id, name, description, city, created_at, updated_at, deleted_at \
             FROM organizers WHERE id = ANY($1) AND deleted_at IS NULL"
        );
    }

    #[test]
    fn test_live_batch_sql_is_keyset_paginated() {
        let sql = select_live_batch_sql(EntityType::Venue);
        assert!(sql.starts_with("SELECT id, name, address, city, latitude, longitude"));
        assert!(sql.contains("($1::uuid IS NULL OR id > $1)"));
        assert!(sql.ends_with("ORDER BY id ASC LIMIT $2"));
    }

    #[test]
    fn test_count_map_clamps_negative_counts() {
        let id = Uuid::new_v4();
        let map = into_count_map(vec![CountRow { id, count: -1 }]);
        assert_eq!(map.get(&id), Some(&0));
    }

    #[test]
    fn test_to_i64_saturates() {
        assert_eq!(to_i64(10), 10);
        assert_eq!(to_i64(u64::MAX), i64::MAX);
    }
}

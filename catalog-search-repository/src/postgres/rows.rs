//! Row types read from the catalog tables and their mapping onto entities.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::StoreError;
use catalog_search_shared::{Artist, CatalogEntity, Event, GeoPoint, Organizer, Venue};

pub const EVENT_COLUMNS: &str = "id, title, description, category, city, status, start_date, \
     end_date, min_price, venue_id, organizer_id, created_at, updated_at, deleted_at";
pub const ARTIST_COLUMNS: &str = "id, name, bio, genre, city, created_at, updated_at, deleted_at";
pub const VENUE_COLUMNS: &str =
    "id, name, address, city, latitude, longitude, created_at, updated_at, deleted_at";
pub const ORGANIZER_COLUMNS: &str =
    "id, name, description, city, created_at, updated_at, deleted_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub city: String,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_price: Option<f64>,
    pub venue_id: Option<Uuid>,
    pub organizer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArtistRow {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub genre: String,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VenueRow {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrganizerRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CoordinateRow {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CountRow {
    pub id: Uuid,
    pub count: i64,
}

impl TryFrom<EventRow> for CatalogEntity {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e| StoreError::decode(format!("event {}: {}", row.id, e)))?;
        Ok(CatalogEntity::Event(Event {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            city: row.city,
            status,
            start_date: row.start_date,
            end_date: row.end_date,
            min_price: row.min_price,
            venue_id: row.venue_id,
            organizer_id: row.organizer_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }))
    }
}

impl From<ArtistRow> for CatalogEntity {
    fn from(row: ArtistRow) -> Self {
        CatalogEntity::Artist(Artist {
            id: row.id,
            name: row.name,
            bio: row.bio,
            genre: row.genre,
            city: row.city,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

impl From<VenueRow> for CatalogEntity {
    fn from(row: VenueRow) -> Self {
        // A half-filled coordinate pair is treated as unknown.
        let location = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };
        CatalogEntity::Venue(Venue {
            id: row.id,
            name: row.name,
            address: row.address,
            city: row.city,
            location,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

impl From<OrganizerRow> for CatalogEntity {
    fn from(row: OrganizerRow) -> Self {
        CatalogEntity::Organizer(Organizer {
            id: row.id,
            name: row.name,
            description: row.description,
            city: row.city,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

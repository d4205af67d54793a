//! Catalog entities as held by the relational store.
//!
//! These are the records of truth. The search index only ever holds a
//! projection of them (see [`crate::document`]) and every result shown to a
//! caller is re-read from the store in this shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::geo::GeoPoint;

/// The searchable catalog entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Event,
    Artist,
    Venue,
    Organizer,
}

impl EntityType {
    /// All entity types, in registration order.
    pub const ALL: [EntityType; 4] = [
        EntityType::Event,
        EntityType::Artist,
        EntityType::Venue,
        EntityType::Organizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Event => "event",
            EntityType::Artist => "artist",
            EntityType::Venue => "venue",
            EntityType::Organizer => "organizer",
        }
    }

    /// Plural form, used for table and index names.
    pub fn plural(&self) -> &'static str {
        match self {
            EntityType::Event => "events",
            EntityType::Artist => "artists",
            EntityType::Venue => "venues",
            EntityType::Organizer => "organizers",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "event" | "events" => Ok(EntityType::Event),
            "artist" | "artists" => Ok(EntityType::Artist),
            "venue" | "venues" => Ok(EntityType::Venue),
            "organizer" | "organizers" => Ok(EntityType::Organizer),
            other => Err(ValidationError::new(
                "entityType",
                format!("unknown entity type '{}'", other),
            )),
        }
    }
}

/// Publication status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
}

impl EventStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "DRAFT",
            EventStatus::Published => "PUBLISHED",
            EventStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for EventStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(EventStatus::Draft),
            "PUBLISHED" => Ok(EventStatus::Published),
            "CANCELLED" => Ok(EventStatus::Cancelled),
            other => Err(ValidationError::new(
                "status",
                format!("unknown event status '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub city: String,
    pub status: EventStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_price: Option<f64>,
    pub venue_id: Option<Uuid>,
    pub organizer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub genre: String,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: String,
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Any authoritative catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogEntity {
    Event(Event),
    Artist(Artist),
    Venue(Venue),
    Organizer(Organizer),
}

impl CatalogEntity {
    pub fn id(&self) -> Uuid {
        match self {
            CatalogEntity::Event(e) => e.id,
            CatalogEntity::Artist(a) => a.id,
            CatalogEntity::Venue(v) => v.id,
            CatalogEntity::Organizer(o) => o.id,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            CatalogEntity::Event(_) => EntityType::Event,
            CatalogEntity::Artist(_) => EntityType::Artist,
            CatalogEntity::Venue(_) => EntityType::Venue,
            CatalogEntity::Organizer(_) => EntityType::Organizer,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            CatalogEntity::Event(e) => e.updated_at,
            CatalogEntity::Artist(a) => a.updated_at,
            CatalogEntity::Venue(v) => v.updated_at,
            CatalogEntity::Organizer(o) => o.updated_at,
        }
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            CatalogEntity::Event(e) => e.deleted_at,
            CatalogEntity::Artist(a) => a.deleted_at,
            CatalogEntity::Venue(v) => v.deleted_at,
            CatalogEntity::Organizer(o) => o.deleted_at,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }

    /// Monotonic write version of this record.
    ///
    /// Soft deletes bump the version past the last update so that a delayed
    /// upsert can never resurrect a deleted document.
    pub fn version(&self) -> i64 {
        let updated = self.updated_at().timestamp_millis();
        match self.deleted_at() {
            Some(deleted) => updated.max(deleted.timestamp_millis()),
            None => updated,
        }
    }
}

//! # Catalog Search Shared
//!
//! Types shared by the catalog search crates: the authoritative catalog
//! entities, their per-type search schemas, the derived index documents,
//! typed filter clauses, query filters and the result envelope.

pub mod document;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod geo;
pub mod query;
pub mod schema;

pub use document::{FieldValue, IndexDocument};
pub use entity::{Artist, CatalogEntity, EntityType, Event, EventStatus, Organizer, Venue};
pub use envelope::ResultEnvelope;
pub use error::ValidationError;
pub use filter::{FilterClause, RangeValue};
pub use geo::{haversine_km, GeoPoint, GeoRadius};
pub use query::{DateRange, QueryFilter, RawQuery, SortMode};
pub use schema::{EntitySchema, FacetFields, Field, FieldKind, GeoSupport};

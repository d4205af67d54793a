//! Index documents derived from catalog entities.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entity::{CatalogEntity, EntityType};
use crate::geo::GeoPoint;
use crate::schema::Field;

/// A single field value on an index document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Keyword(String),
    Date(DateTime<Utc>),
    Number(f64),
    Geo(GeoPoint),
}

/// The derived, ID-plus-facets record held by the search engine.
///
/// It carries only what matching and filtering need. Nothing on it is ever
/// shown to a caller: search returns identifiers and the content is re-read
/// from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    pub id: Uuid,
    pub entity_type: EntityType,
    /// Write version, see [`CatalogEntity::version`].
    pub version: i64,
    pub fields: BTreeMap<Field, FieldValue>,
}

impl IndexDocument {
    pub fn new(id: Uuid, entity_type: EntityType, version: i64) -> Self {
        Self {
            id,
            entity_type,
            version,
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: Field, value: FieldValue) -> Self {
        self.fields.insert(field, value);
        self
    }

    pub fn with_opt(self, field: Field, value: Option<FieldValue>) -> Self {
        match value {
            Some(value) => self.with(field, value),
            None => self,
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// String content of a text or keyword field.
    pub fn text(&self, field: Field) -> Option<&str> {
        match self.fields.get(&field)? {
            FieldValue::Text(s) | FieldValue::Keyword(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&CatalogEntity> for IndexDocument {
    /// Project an entity onto its index document. The projection is fixed:
    /// the same entity always yields the same document.
    fn from(entity: &CatalogEntity) -> Self {
        let doc = IndexDocument::new(entity.id(), entity.entity_type(), entity.version());
        match entity {
            CatalogEntity::Event(e) => doc
                .with(Field::Title, FieldValue::Text(e.title.clone()))
                .with_opt(Field::Description, e.description.clone().map(FieldValue::Text))
                .with(Field::Category, FieldValue::Keyword(e.category.clone()))
                .with(Field::City, FieldValue::Keyword(e.city.clone()))
                .with(Field::Status, FieldValue::Keyword(e.status.as_str().to_string()))
                .with(Field::StartDate, FieldValue::Date(e.start_date))
                .with_opt(Field::MinPrice, e.min_price.map(FieldValue::Number)),
            CatalogEntity::Artist(a) => doc
                .with(Field::Name, FieldValue::Text(a.name.clone()))
                .with_opt(Field::Bio, a.bio.clone().map(FieldValue::Text))
                .with(Field::Genre, FieldValue::Keyword(a.genre.clone()))
                .with_opt(Field::City, a.city.clone().map(FieldValue::Keyword)),
            CatalogEntity::Venue(v) => doc
                .with(Field::Name, FieldValue::Text(v.name.clone()))
                .with_opt(Field::Address, v.address.clone().map(FieldValue::Text))
                .with(Field::City, FieldValue::Keyword(v.city.clone()))
                .with_opt(Field::Location, v.location.map(FieldValue::Geo)),
            CatalogEntity::Organizer(o) => doc
                .with(Field::Name, FieldValue::Text(o.name.clone()))
                .with_opt(Field::Description, o.description.clone().map(FieldValue::Text))
                .with_opt(Field::City, o.city.clone().map(FieldValue::Keyword)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Event, EventStatus, Venue};

    #[test]
    fn test_event_projection_uses_schema_fields() {
        let now = Utc::now();
        let event = CatalogEntity::Event(Event {
            id: Uuid::new_v4(),
            title: "Jazz Night".to_string(),
            description: None,
            category: "CONCERT".to_string(),
            city: "Izmir".to_string(),
            status: EventStatus::Published,
            start_date: now,
            end_date: None,
            min_price: Some(150.0),
            venue_id: Some(Uuid::new_v4()),
            organizer_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        });

        let doc = IndexDocument::from(&event);
        let schema = EntityType::Event.schema();

        assert_eq!(doc.id, event.id());
        assert_eq!(doc.version, now.timestamp_millis());
        assert_eq!(doc.text(Field::Title), Some("Jazz Night"));
        assert_eq!(doc.text(Field::Status), Some("PUBLISHED"));
        assert!(doc.get(Field::Description).is_none());
        for field in doc.fields.keys() {
            assert!(schema.document_fields().any(|f| f == *field), "{:?}", field);
        }
    }

    #[test]
    fn test_venue_projection_carries_location() {
        let now = Utc::now();
        let venue = CatalogEntity::Venue(Venue {
            id: Uuid::new_v4(),
            name: "Arena".to_string(),
            address: Some("Kordon 1".to_string()),
            city: "Izmir".to_string(),
            location: Some(GeoPoint::new(38.42, 27.14)),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        });

        let doc = IndexDocument::from(&venue);
        assert_eq!(
            doc.get(Field::Location),
            Some(&FieldValue::Geo(GeoPoint::new(38.42, 27.14)))
        );
    }
}

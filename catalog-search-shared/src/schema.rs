//! Per-entity search schemas.
//!
//! A schema declares which fields are searchable (free text), which are
//! filterable (facets), how caller facets map onto fields, and how the
//! entity is ordered when no relevance is available. The index mapping, the
//! filter compiler and the relational predicate all read from here, so a
//! field is named in exactly one place.

use crate::entity::{EntityType, EventStatus};

/// Fields that may appear in an index document or a filter clause.
///
/// The field name doubles as the index property name and the store column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Name,
    Description,
    Bio,
    Address,
    Category,
    Genre,
    City,
    Status,
    StartDate,
    MinPrice,
    Location,
}

/// Storage kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Keyword,
    Date,
    Number,
    GeoPoint,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Name => "name",
            Field::Description => "description",
            Field::Bio => "bio",
            Field::Address => "address",
            Field::Category => "category",
            Field::Genre => "genre",
            Field::City => "city",
            Field::Status => "status",
            Field::StartDate => "start_date",
            Field::MinPrice => "min_price",
            Field::Location => "location",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Title | Field::Name | Field::Description | Field::Bio | Field::Address => {
                FieldKind::Text
            }
            Field::Category | Field::Genre | Field::City | Field::Status => FieldKind::Keyword,
            Field::StartDate => FieldKind::Date,
            Field::MinPrice => FieldKind::Number,
            Field::Location => FieldKind::GeoPoint,
        }
    }
}

/// How a geo-radius facet is honoured for an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoSupport {
    /// Coordinates live on the document itself; filtered by index and store.
    Native(Field),
    /// Coordinates live on a related record; filtered after hydration.
    PostFilter,
    /// The entity has no location.
    Unsupported,
}

/// Mapping from caller facets to schema fields. `None` means the facet is
/// not available for the entity type.
#[derive(Debug, Clone, Copy)]
pub struct FacetFields {
    pub category: Option<Field>,
    pub city: Option<Field>,
    pub date: Option<Field>,
    pub price: Option<Field>,
}

/// Search schema of one entity type.
#[derive(Debug)]
pub struct EntitySchema {
    pub entity_type: EntityType,
    pub searchable: &'static [Field],
    pub filterable: &'static [Field],
    pub facets: FacetFields,
    pub geo: GeoSupport,
    /// Status a record must have to be searchable at all.
    pub default_status: Option<(Field, &'static str)>,
    /// Allowed values of the category facet, upper case.
    pub categories: &'static [&'static str],
    /// Natural ascending order used by the store path; ties break on `id`.
    pub natural_sort: Field,
}

pub static EVENT_SCHEMA: EntitySchema = EntitySchema {
    entity_type: EntityType::Event,
    searchable: &[Field::Title, Field::Description],
    filterable: &[
        Field::Category,
        Field::City,
        Field::Status,
        Field::StartDate,
        Field::MinPrice,
    ],
    facets: FacetFields {
        category: Some(Field::Category),
        city: Some(Field::City),
        date: Some(Field::StartDate),
        price: Some(Field::MinPrice),
    },
    geo: GeoSupport::PostFilter,
    default_status: Some((Field::Status, EventStatus::Published.as_str())),
    categories: &[
        "CONCERT",
        "SPORT",
        "THEATER",
        "FESTIVAL",
        "COMEDY",
        "EXHIBITION",
        "CONFERENCE",
        "WORKSHOP",
        "OTHER",
    ],
    natural_sort: Field::StartDate,
};

pub static ARTIST_SCHEMA: EntitySchema = EntitySchema {
    entity_type: EntityType::Artist,
    searchable: &[Field::Name, Field::Bio],
    filterable: &[Field::Genre, Field::City],
    facets: FacetFields {
        category: Some(Field::Genre),
        city: Some(Field::City),
        date: None,
        price: None,
    },
    geo: GeoSupport::Unsupported,
    default_status: None,
    categories: &[
        "ROCK",
        "POP",
        "JAZZ",
        "CLASSICAL",
        "ELECTRONIC",
        "HIP_HOP",
        "FOLK",
        "METAL",
        "OTHER",
    ],
    natural_sort: Field::Name,
};

pub static VENUE_SCHEMA: EntitySchema = EntitySchema {
    entity_type: EntityType::Venue,
    searchable: &[Field::Name, Field::Address],
    filterable: &[Field::City, Field::Location],
    facets: FacetFields {
        category: None,
        city: Some(Field::City),
        date: None,
        price: None,
    },
    geo: GeoSupport::Native(Field::Location),
    default_status: None,
    categories: &[],
    natural_sort: Field::Name,
};

pub static ORGANIZER_SCHEMA: EntitySchema = EntitySchema {
    entity_type: EntityType::Organizer,
    searchable: &[Field::Name, Field::Description],
    filterable: &[Field::City],
    facets: FacetFields {
        category: None,
        city: Some(Field::City),
        date: None,
        price: None,
    },
    geo: GeoSupport::Unsupported,
    default_status: None,
    categories: &[],
    natural_sort: Field::Name,
};

impl EntityType {
    pub fn schema(&self) -> &'static EntitySchema {
        match self {
            EntityType::Event => &EVENT_SCHEMA,
            EntityType::Artist => &ARTIST_SCHEMA,
            EntityType::Venue => &VENUE_SCHEMA,
            EntityType::Organizer => &ORGANIZER_SCHEMA,
        }
    }
}

impl EntitySchema {
    /// The primary searchable field, boosted for relevance.
    pub fn primary_text_field(&self) -> Field {
        self.searchable[0]
    }

    /// Every field carried on the index document.
    pub fn document_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.searchable.iter().chain(self.filterable.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_fields_are_disjoint() {
        for entity_type in EntityType::ALL {
            let schema = entity_type.schema();
            assert_eq!(schema.entity_type, entity_type);
            for field in schema.searchable {
                assert_eq!(field.kind(), FieldKind::Text);
                assert!(!schema.filterable.contains(field));
            }
        }
    }

    #[test]
    fn test_facet_fields_are_filterable() {
        for entity_type in EntityType::ALL {
            let schema = entity_type.schema();
            let facets = [
                schema.facets.category,
                schema.facets.city,
                schema.facets.date,
                schema.facets.price,
            ];
            for field in facets.into_iter().flatten() {
                assert!(schema.filterable.contains(&field), "{:?}", field);
            }
            if let Some((field, _)) = schema.default_status {
                assert!(schema.filterable.contains(&field));
            }
            if let GeoSupport::Native(field) = schema.geo {
                assert!(schema.filterable.contains(&field));
            }
        }
    }

    #[test]
    fn test_default_status_matches_event_status() {
        let (_, status) = EVENT_SCHEMA.default_status.unwrap();
        assert_eq!(status, "PUBLISHED");
    }
}

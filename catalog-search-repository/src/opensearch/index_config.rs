//! OpenSearch index configuration and mappings.
//!
//! Mappings are derived from the entity's [`EntitySchema`] so the indexed
//! field set can never drift from the schema the query compiler uses.

use serde_json::{json, Map, Value};

use crate::config::SearchIndexConfig;
use catalog_search_shared::{EntitySchema, EntityType, Field, FieldKind};

/// Name of the normalizer applied to every keyword field.
pub const LOWERCASE_NORMALIZER: &str = "lowercase_normalizer";

/// Index name for an entity type, e.g. `catalog_events`.
pub fn index_name(prefix: &str, entity_type: EntityType) -> String {
    format!("{}_{}", prefix, entity_type.plural())
}

/// Get the index settings and mappings for one entity type.
///
/// The configuration includes:
/// - **text** fields with a `raw` keyword subfield for substring filters and sorting
/// - **keyword** fields lowercased by a normalizer, so equality is case-insensitive
/// - **date**, **double** and **geo_point** fields for ranges and radius filters
/// - `_source` trimmed to the identifier: the index is never a display source
pub fn get_index_settings(schema: &EntitySchema, config: &SearchIndexConfig) -> Value {
    let mut properties = Map::new();
    properties.insert("id".to_string(), json!({ "type": "keyword" }));
    for field in schema.document_fields() {
        properties.insert(field.name().to_string(), field_mapping(field));
    }

    json!({
        "settings": {
            "number_of_shards": config.number_of_shards,
            "number_of_replicas": config.number_of_replicas,
            "analysis": {
                "normalizer": {
                    (LOWERCASE_NORMALIZER): {
                        "type": "custom",
                        "filter": ["lowercase"]
                    }
                }
            }
        },
        "mappings": {
            "_source": {
                "includes": ["id"]
            },
            "properties": properties
        }
    })
}

fn field_mapping(field: Field) -> Value {
    match field.kind() {
        FieldKind::Text => json!({
            "type": "text",
            "fields": {
                "raw": { "type": "keyword" }
            }
        }),
        FieldKind::Keyword => json!({
            "type": "keyword",
            "normalizer": LOWERCASE_NORMALIZER
        }),
        FieldKind::Date => json!({ "type": "date" }),
        FieldKind::Number => json!({ "type": "double" }),
        FieldKind::GeoPoint => json!({ "type": "geo_point" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_name() {
        assert_eq!(index_name("catalog", EntityType::Event), "catalog_events");
        assert_eq!(index_name("test", EntityType::Organizer), "test_organizers");
    }

    #[test]
    fn test_event_mapping_structure() {
        let settings = get_index_settings(EntityType::Event.schema(), &SearchIndexConfig::default());
        let properties = &settings["mappings"]["properties"];

        assert_eq!(settings["settings"]["number_of_shards"], 1);
        assert_eq!(properties["id"]["type"], "keyword");
        assert_eq!(properties["title"]["type"], "text");
        assert_eq!(properties["title"]["fields"]["raw"]["type"], "keyword");
        assert_eq!(properties["category"]["normalizer"], LOWERCASE_NORMALIZER);
        assert_eq!(properties["status"]["type"], "keyword");
        assert_eq!(properties["start_date"]["type"], "date");
        assert_eq!(properties["min_price"]["type"], "double");
        assert!(properties.get("location").is_none());
        assert_eq!(settings["mappings"]["_source"]["includes"], json!(["id"]));
    }

    #[test]
    fn test_venue_mapping_has_geo_point() {
        let settings = get_index_settings(EntityType::Venue.schema(), &SearchIndexConfig::default());
        assert_eq!(
            settings["mappings"]["properties"]["location"]["type"],
            "geo_point"
        );
    }

    #[test]
    fn test_mapping_covers_every_schema_field() {
        for entity_type in EntityType::ALL {
            let schema = entity_type.schema();
            let settings = get_index_settings(schema, &SearchIndexConfig::default());
            for field in schema.document_fields() {
                assert!(
                    settings["mappings"]["properties"][field.name()].is_object(),
                    "{} missing in {}",
                    field.name(),
                    entity_type
                );
            }
        }
    }
}

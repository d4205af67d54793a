//! OpenSearch query builders.
//!
//! Every [`FilterClause`] renders to exactly one bool `filter` entry. The
//! relational store renders the same clauses to SQL, so both paths agree on
//! which records match; only the optional relevance `should` differs, and it
//! affects ordering alone.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::errors::SearchIndexError;
use crate::types::{IndexHits, IndexQuery};
use catalog_search_shared::{
    EntitySchema, FieldKind, FieldValue, FilterClause, IndexDocument, RangeValue, SortMode,
};

/// Boost applied to the schema's primary text field in relevance scoring.
const PRIMARY_FIELD_BOOST: f32 = 2.0;

/// Build the request body for a compiled query.
///
/// The body carries:
/// - one bool `filter` entry per clause (membership)
/// - a `multi_match` `should` over the searchable fields when relevance text is present
/// - a deterministic sort that always ends with the identifier
/// - `_source: false`, since only identifiers are read back
pub fn build_search_query(schema: &EntitySchema, query: &IndexQuery) -> Value {
    let filters: Vec<Value> = query.clauses.iter().map(render_clause).collect();

    let mut bool_query = Map::new();
    bool_query.insert("filter".to_string(), Value::Array(filters));
    if let Some(text) = query.relevance_text.as_deref() {
        let primary = schema.primary_text_field();
        let fields: Vec<String> = schema
            .searchable
            .iter()
            .map(|field| {
                if *field == primary {
                    format!("{}^{}", field.name(), PRIMARY_FIELD_BOOST)
                } else {
                    field.name().to_string()
                }
            })
            .collect();
        bool_query.insert(
            "should".to_string(),
            json!([{
                "multi_match": {
                    "query": text,
                    "fields": fields
                }
            }]),
        );
    }

    json!({
        "query": { "bool": bool_query },
        "sort": build_sort(schema, query.sort),
        "from": query.window.offset,
        "size": query.window.limit,
        "track_total_hits": true,
        "_source": false
    })
}

fn build_sort(schema: &EntitySchema, sort: SortMode) -> Value {
    match sort {
        SortMode::Relevance | SortMode::Popularity => json!([
            { "_score": { "order": "desc" } },
            { "id": { "order": "asc" } }
        ]),
        SortMode::Natural => {
            let field = schema.natural_sort;
            let sort_field = match field.kind() {
                FieldKind::Text => format!("{}.raw", field.name()),
                _ => field.name().to_string(),
            };
            json!([
                { (sort_field): { "order": "asc" } },
                { "id": { "order": "asc" } }
            ])
        }
    }
}

/// Render a single filter clause.
pub fn render_clause(clause: &FilterClause) -> Value {
    match clause {
        FilterClause::Text { fields, term } => {
            let pattern = format!("*{}*", escape_wildcard(term));
            let should: Vec<Value> = fields
                .iter()
                .map(|field| {
                    json!({
                        "wildcard": {
                            (format!("{}.raw", field.name())): {
                                "value": pattern,
                                "case_insensitive": true
                            }
                        }
                    })
                })
                .collect();
            json!({
                "bool": {
                    "should": should,
                    "minimum_should_match": 1
                }
            })
        }
        FilterClause::Equals { field, value } => json!({
            "term": { (field.name()): value.to_lowercase() }
        }),
        FilterClause::AnyOf { field, values } => {
            let values: Vec<String> = values.iter().map(|v| v.to_lowercase()).collect();
            json!({ "terms": { (field.name()): values } })
        }
        FilterClause::Range { field, gte, lte } => {
            let mut bounds = Map::new();
            if let Some(gte) = gte {
                bounds.insert("gte".to_string(), range_value(gte));
            }
            if let Some(lte) = lte {
                bounds.insert("lte".to_string(), range_value(lte));
            }
            json!({ "range": { (field.name()): bounds } })
        }
        FilterClause::WithinRadius {
            field,
            center,
            radius_km,
        } => json!({
            "geo_distance": {
                "distance": format!("{}km", radius_km),
                (field.name()): { "lat": center.lat, "lon": center.lon }
            }
        }),
    }
}

fn range_value(value: &RangeValue) -> Value {
    match value {
        RangeValue::Date(date) => json!(date.to_rfc3339()),
        RangeValue::Number(number) => json!(number),
    }
}

/// Escape the wildcard metacharacters of a literal term.
fn escape_wildcard(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '*' | '?' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the JSON source of an index document.
pub fn build_document_body(document: &IndexDocument) -> Value {
    let mut body = Map::new();
    body.insert("id".to_string(), json!(document.id.to_string()));
    for (field, value) in &document.fields {
        let value = match value {
            FieldValue::Text(s) | FieldValue::Keyword(s) => json!(s),
            FieldValue::Date(date) => json!(date.to_rfc3339()),
            FieldValue::Number(number) => json!(number),
            FieldValue::Geo(point) => json!({ "lat": point.lat, "lon": point.lon }),
        };
        body.insert(field.name().to_string(), value);
    }
    Value::Object(body)
}

/// Parse a search response into ranked identifiers.
///
/// Document ids are read from `_id`; a hit whose id is not a UUID is a
/// foreign document and makes the whole response invalid.
pub fn parse_hits(response: &Value) -> Result<IndexHits, SearchIndexError> {
    let hits = response
        .get("hits")
        .ok_or_else(|| SearchIndexError::parse("Response has no hits section"))?;

    let estimated_total = match hits.get("total") {
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        Some(total) => total.as_u64().unwrap_or(0),
        None => 0,
    };

    let ids = hits
        .get("hits")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|hit| {
                    let id = hit
                        .get("_id")
                        .and_then(Value::as_str)
                        .ok_or_else(|| SearchIndexError::parse("Hit has no _id"))?;
                    Uuid::parse_str(id)
                        .map_err(|e| SearchIndexError::parse(format!("Invalid hit id {}: {}", id, e)))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    Ok(IndexHits {
        estimated_total,
        ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Window;
    use catalog_search_shared::{EntityType, Field, GeoPoint};
    use chrono::{TimeZone, Utc};

    fn query(clauses: Vec<FilterClause>, relevance_text: Option<&str>, sort: SortMode) -> IndexQuery {
        IndexQuery {
            clauses,
            relevance_text: relevance_text.map(str::to_string),
            sort,
            window: Window::new(20, 10),
        }
    }

    #[test]
    fn test_text_clause_is_case_insensitive_wildcard() {
        let clause = FilterClause::Text {
            fields: vec![Field::Title, Field::Description],
            term: "Jazz*".to_string(),
        };
        let rendered = render_clause(&clause);

        let should = rendered["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 2);
        assert_eq!(should[0]["wildcard"]["title.raw"]["value"], "*Jazz\\**");
        assert_eq!(should[0]["wildcard"]["title.raw"]["case_insensitive"], true);
        assert_eq!(rendered["bool"]["minimum_should_match"], 1);
    }

    #[test]
    fn test_keyword_clauses_are_lowercased() {
        let equals = render_clause(&FilterClause::Equals {
            field: Field::City,
            value: "Izmir".to_string(),
        });
        assert_eq!(equals, json!({ "term": { "city": "izmir" } }));

        let any = render_clause(&FilterClause::AnyOf {
            field: Field::Category,
            values: vec!["CONCERT".to_string(), "SPORT".to_string()],
        });
        assert_eq!(any, json!({ "terms": { "category": ["concert", "sport"] } }));
    }

    #[test]
    fn test_range_clause_omits_missing_bounds() {
        let rendered = render_clause(&FilterClause::Range {
            field: Field::MinPrice,
            gte: None,
            lte: Some(RangeValue::Number(200.0)),
        });
        assert_eq!(rendered, json!({ "range": { "min_price": { "lte": 200.0 } } }));

        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let dates = render_clause(&FilterClause::Range {
            field: Field::StartDate,
            gte: Some(RangeValue::Date(from)),
            lte: None,
        });
        assert_eq!(
            dates["range"]["start_date"]["gte"],
            "2025-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_geo_distance_clause() {
        let rendered = render_clause(&FilterClause::WithinRadius {
            field: Field::Location,
            center: GeoPoint::new(38.42, 27.14),
            radius_km: 5.0,
        });
        assert_eq!(rendered["geo_distance"]["distance"], "5km");
        assert_eq!(rendered["geo_distance"]["location"]["lat"], 38.42);
    }

    #[test]
    fn test_search_body_with_relevance_text() {
        let schema = EntityType::Event.schema();
        let body = build_search_query(
            schema,
            &query(
                vec![FilterClause::Equals {
                    field: Field::Status,
                    value: "PUBLISHED".to_string(),
                }],
                Some("jazz"),
                SortMode::Relevance,
            ),
        );

        assert_eq!(body["from"], 20);
        assert_eq!(body["size"], 10);
        assert_eq!(body["_source"], false);
        assert_eq!(body["query"]["bool"]["filter"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["query"]["bool"]["should"][0]["multi_match"]["fields"],
            json!(["title^2", "description"])
        );
        assert_eq!(body["sort"][0]["_score"]["order"], "desc");
        assert_eq!(body["sort"][1]["id"]["order"], "asc");
    }

    #[test]
    fn test_natural_sort_uses_raw_subfield_for_text() {
        let body = build_search_query(
            EntityType::Artist.schema(),
            &query(vec![], None, SortMode::Natural),
        );
        assert!(body["query"]["bool"].get("should").is_none());
        assert_eq!(body["sort"][0]["name.raw"]["order"], "asc");

        let events = build_search_query(
            EntityType::Event.schema(),
            &query(vec![], None, SortMode::Natural),
        );
        assert_eq!(events["sort"][0]["start_date"]["order"], "asc");
    }

    #[test]
    fn test_document_body() {
        let id = Uuid::new_v4();
        let doc = IndexDocument::new(id, EntityType::Venue, 7)
            .with(Field::Name, FieldValue::Text("Arena".to_string()))
            .with(Field::Location, FieldValue::Geo(GeoPoint::new(1.5, 2.5)));

        let body = build_document_body(&doc);
        assert_eq!(body["id"], id.to_string());
        assert_eq!(body["name"], "Arena");
        assert_eq!(body["location"], json!({ "lat": 1.5, "lon": 2.5 }));
    }

    #[test]
    fn test_parse_hits() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let response = json!({
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "hits": [
                    { "_id": first.to_string(), "_score": 2.0 },
                    { "_id": second.to_string(), "_score": 1.0 }
                ]
            }
        });

        let hits = parse_hits(&response).unwrap();
        assert_eq!(hits.estimated_total, 42);
        assert_eq!(hits.ids, vec![first, second]);
    }

    #[test]
    fn test_parse_hits_empty() {
        let response = json!({ "hits": { "total": { "value": 0 }, "hits": [] } });
        assert_eq!(parse_hits(&response).unwrap(), IndexHits::default());
    }

    #[test]
    fn test_parse_hits_invalid() {
        let response = json!({ "hits": { "hits": [{ "_id": "not-a-uuid" }] } });
        assert!(parse_hits(&response).is_err());
        assert!(parse_hits(&json!({})).is_err());
    }
}

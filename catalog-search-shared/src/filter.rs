//! Typed filter clauses.
//!
//! A compiled query is a conjunction of [`FilterClause`]s. The same clause
//! list is rendered into the index engine's filter and into the relational
//! predicate; both renderers match on this enum exhaustively, so a clause
//! kind cannot be supported by one path and silently dropped by the other.
//!
//! [`FilterClause::matches`] is the reference semantics both renderers must
//! reproduce:
//! - keyword comparisons are case-insensitive,
//! - free text is a case-insensitive substring match on any listed field,
//! - a missing field never satisfies a clause.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::document::{FieldValue, IndexDocument};
use crate::geo::{GeoPoint, GeoRadius};
use crate::schema::Field;

/// A range endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeValue {
    Date(DateTime<Utc>),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// Case-insensitive substring match on at least one of `fields`.
    Text { fields: Vec<Field>, term: String },
    /// Keyword equality.
    Equals { field: Field, value: String },
    /// Keyword membership (OR-group).
    AnyOf { field: Field, values: Vec<String> },
    /// Inclusive range; either bound may be open.
    Range {
        field: Field,
        gte: Option<RangeValue>,
        lte: Option<RangeValue>,
    },
    /// Great-circle distance from `center` at most `radius_km`.
    WithinRadius {
        field: Field,
        center: GeoPoint,
        radius_km: f64,
    },
}

impl FilterClause {
    /// Evaluate the clause against a document.
    pub fn matches(&self, doc: &IndexDocument) -> bool {
        match self {
            FilterClause::Text { fields, term } => {
                let needle = term.to_lowercase();
                fields.iter().any(|f| {
                    doc.text(*f)
                        .map(|value| value.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            }
            FilterClause::Equals { field, value } => doc
                .text(*field)
                .map(|v| v.to_lowercase() == value.to_lowercase())
                .unwrap_or(false),
            FilterClause::AnyOf { field, values } => doc
                .text(*field)
                .map(|v| {
                    let v = v.to_lowercase();
                    values.iter().any(|candidate| candidate.to_lowercase() == v)
                })
                .unwrap_or(false),
            FilterClause::Range { field, gte, lte } => match doc.get(*field) {
                Some(value) => {
                    gte.map_or(true, |bound| compare(value, &bound).is_some_and(Ordering::is_ge))
                        && lte.map_or(true, |bound| {
                            compare(value, &bound).is_some_and(Ordering::is_le)
                        })
                }
                None => false,
            },
            FilterClause::WithinRadius {
                field,
                center,
                radius_km,
            } => match doc.get(*field) {
                Some(FieldValue::Geo(point)) => GeoRadius {
                    center: *center,
                    radius_km: *radius_km,
                }
                .contains(point),
                _ => false,
            },
        }
    }
}

/// Compare a document value to a bound of the same kind.
fn compare(value: &FieldValue, bound: &RangeValue) -> Option<Ordering> {
    match (value, bound) {
        (FieldValue::Date(v), RangeValue::Date(b)) => v.partial_cmp(b),
        (FieldValue::Number(v), RangeValue::Number(b)) => v.partial_cmp(b),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn event_doc() -> IndexDocument {
        IndexDocument::new(Uuid::new_v4(), EntityType::Event, 1)
            .with(Field::Title, FieldValue::Text("Smooth JAZZ evening".to_string()))
            .with(Field::Category, FieldValue::Keyword("CONCERT".to_string()))
            .with(Field::City, FieldValue::Keyword("Izmir".to_string()))
            .with(
                Field::StartDate,
                FieldValue::Date(Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap()),
            )
            .with(Field::MinPrice, FieldValue::Number(200.0))
    }

    #[test]
    fn test_text_is_case_insensitive_substring() {
        let doc = event_doc();
        let clause = FilterClause::Text {
            fields: vec![Field::Title, Field::Description],
            term: "jazz".to_string(),
        };
        assert!(clause.matches(&doc));

        let miss = FilterClause::Text {
            fields: vec![Field::Description],
            term: "jazz".to_string(),
        };
        assert!(!miss.matches(&doc));
    }

    #[test]
    fn test_keyword_equality_ignores_case() {
        let doc = event_doc();
        let clause = FilterClause::Equals {
            field: Field::City,
            value: "izmir".to_string(),
        };
        assert!(clause.matches(&doc));

        let any = FilterClause::AnyOf {
            field: Field::Category,
            values: vec!["sport".to_string(), "concert".to_string()],
        };
        assert!(any.matches(&doc));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let doc = event_doc();
        let at_ceiling = FilterClause::Range {
            field: Field::MinPrice,
            gte: None,
            lte: Some(RangeValue::Number(200.0)),
        };
        assert!(at_ceiling.matches(&doc));

        let below = FilterClause::Range {
            field: Field::MinPrice,
            gte: None,
            lte: Some(RangeValue::Number(199.99)),
        };
        assert!(!below.matches(&doc));

        let dates = FilterClause::Range {
            field: Field::StartDate,
            gte: Some(RangeValue::Date(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())),
            lte: Some(RangeValue::Date(Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap())),
        };
        assert!(dates.matches(&doc));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let doc = IndexDocument::new(Uuid::new_v4(), EntityType::Event, 1);
        let clause = FilterClause::Range {
            field: Field::MinPrice,
            gte: None,
            lte: Some(RangeValue::Number(1000.0)),
        };
        assert!(!clause.matches(&doc));
    }
}

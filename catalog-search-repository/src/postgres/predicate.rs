//! Relational rendering of filter clauses.
//!
//! This is the SQL twin of `opensearch::queries::render_clause`. Keyword
//! equality lowercases both sides, free text is an `ILIKE` substring match and
//! ranges are inclusive, so a record matches here exactly when it matches in
//! the index.

use sqlx::{Postgres, QueryBuilder};

use catalog_search_shared::geo::EARTH_RADIUS_KM;
use catalog_search_shared::{EntityType, Field, FilterClause, RangeValue};

/// Table holding an entity type's rows.
pub fn table_name(entity_type: EntityType) -> &'static str {
    entity_type.plural()
}

/// Append `WHERE deleted_at IS NULL` plus one `AND (...)` group per clause.
pub fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, clauses: &[FilterClause]) {
    builder.push(" WHERE deleted_at IS NULL");
    for clause in clauses {
        builder.push(" AND (");
        push_clause(builder, clause);
        builder.push(")");
    }
}

/// Append the entity's natural order, always ending with the identifier.
pub fn push_natural_order(builder: &mut QueryBuilder<'_, Postgres>, entity_type: EntityType) {
    let field = entity_type.schema().natural_sort;
    builder.push(format!(" ORDER BY {} ASC, id ASC", field.name()));
}

fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, clause: &FilterClause) {
    match clause {
        FilterClause::Text { fields, term } => {
            let pattern = format!("%{}%", escape_like(term));
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder.push(format!("{} ILIKE ", field.name()));
                builder.push_bind(pattern.clone());
            }
        }
        FilterClause::Equals { field, value } => {
            builder.push(format!("LOWER({}) = ", field.name()));
            builder.push_bind(value.to_lowercase());
        }
        FilterClause::AnyOf { field, values } => {
            let values: Vec<String> = values.iter().map(|v| v.to_lowercase()).collect();
            builder.push(format!("LOWER({}) = ANY(", field.name()));
            builder.push_bind(values);
            builder.push(")");
        }
        FilterClause::Range { field, gte, lte } => {
            builder.push(format!("{} IS NOT NULL", field.name()));
            if let Some(gte) = gte {
                builder.push(format!(" AND {} >= ", field.name()));
                push_range_value(builder, gte);
            }
            if let Some(lte) = lte {
                builder.push(format!(" AND {} <= ", field.name()));
                push_range_value(builder, lte);
            }
        }
        FilterClause::WithinRadius {
            field,
            center,
            radius_km,
        } => {
            let (lat, lon) = coordinate_columns(*field);
            builder.push(format!("{lat} IS NOT NULL AND {lon} IS NOT NULL AND "));
            builder.push(format!(
                "2 * {EARTH_RADIUS_KM} * ASIN(LEAST(1, SQRT(POWER(SIN(RADIANS({lat} - "
            ));
            builder.push_bind(center.lat);
            builder.push(") / 2), 2) + COS(RADIANS(");
            builder.push_bind(center.lat);
            builder.push(format!(
                ")) * COS(RADIANS({lat})) * POWER(SIN(RADIANS({lon} - "
            ));
            builder.push_bind(center.lon);
            builder.push(") / 2), 2)))) <= ");
            builder.push_bind(*radius_km);
        }
    }
}

fn push_range_value(builder: &mut QueryBuilder<'_, Postgres>, value: &RangeValue) {
    match value {
        RangeValue::Date(date) => builder.push_bind(*date),
        RangeValue::Number(number) => builder.push_bind(*number),
    };
}

/// Latitude and longitude columns backing a geo field.
fn coordinate_columns(field: Field) -> (&'static str, &'static str) {
    match field {
        Field::Location => ("latitude", "longitude"),
        other => (other.name(), other.name()),
    }
}

/// Escape the `LIKE` metacharacters of a literal term (backslash is the
/// default escape character).
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

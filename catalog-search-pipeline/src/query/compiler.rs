//! Query filter compiler.
//!
//! Compiles a validated [`QueryFilter`] into a single list of
//! [`FilterClause`]s. The index and store queries are both built from that
//! list, so the two paths select the same records by construction.

use catalog_search_repository::{IndexQuery, StoreQuery, Window};
use catalog_search_shared::{
    EntityType, FilterClause, GeoRadius, GeoSupport, QueryFilter, RangeValue, SortMode,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub entity_type: EntityType,
    /// Conjunction of clauses shared by both execution paths.
    pub clauses: Vec<FilterClause>,
    /// Free text used for relevance scoring on the Index Path.
    pub relevance_text: Option<String>,
    pub sort: SortMode,
    /// Radius applied after routing, for entities located through a relation.
    pub geo_post_filter: Option<GeoRadius>,
}

impl CompiledQuery {
    pub fn compile(filter: &QueryFilter) -> Self {
        let schema = filter.entity_type.schema();
        let mut clauses = Vec::new();

        if let Some((field, value)) = schema.default_status {
            clauses.push(FilterClause::Equals {
                field,
                value: value.to_string(),
            });
        }

        if let Some(text) = &filter.text {
            clauses.push(FilterClause::Text {
                fields: schema.searchable.to_vec(),
                term: text.clone(),
            });
        }

        if let (Some(field), false) = (schema.facets.category, filter.categories.is_empty()) {
            clauses.push(FilterClause::AnyOf {
                field,
                values: filter.categories.clone(),
            });
        }

        if let (Some(field), Some(city)) = (schema.facets.city, &filter.city) {
            clauses.push(FilterClause::Equals {
                field,
                value: city.clone(),
            });
        }

        if let (Some(field), Some(range)) = (schema.facets.date, filter.date_range) {
            clauses.push(FilterClause::Range {
                field,
                gte: range.from.map(RangeValue::Date),
                lte: range.to.map(RangeValue::Date),
            });
        }

        if let (Some(field), Some(max_price)) = (schema.facets.price, filter.max_price) {
            clauses.push(FilterClause::Range {
                field,
                gte: None,
                lte: Some(RangeValue::Number(max_price)),
            });
        }

        let mut geo_post_filter = None;
        if let Some(geo) = filter.geo {
            match schema.geo {
                GeoSupport::Native(field) => clauses.push(FilterClause::WithinRadius {
                    field,
                    center: geo.center,
                    radius_km: geo.radius_km,
                }),
                GeoSupport::PostFilter => geo_post_filter = Some(geo),
                GeoSupport::Unsupported => {}
            }
        }

        Self {
            entity_type: filter.entity_type,
            clauses,
            relevance_text: filter.text.clone(),
            sort: filter.sort,
            geo_post_filter,
        }
    }

    pub fn has_text(&self) -> bool {
        self.relevance_text.is_some()
    }

    pub fn index_query(&self, window: Window) -> IndexQuery {
        IndexQuery {
            clauses: self.clauses.clone(),
            relevance_text: self.relevance_text.clone(),
            sort: self.sort,
            window,
        }
    }

    pub fn store_query(&self, window: Window) -> StoreQuery {
        StoreQuery {
            entity_type: self.entity_type,
            clauses: self.clauses.clone(),
            window,
        }
    }
}

//! Raw and validated query types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::EntityType;
use crate::geo::GeoRadius;

/// Query exactly as supplied by a caller (HTTP query string or CLI flags).
///
/// Nothing here is trusted; it becomes a [`QueryFilter`] only through
/// validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuery {
    pub q: Option<String>,
    /// Comma-separated category (or genre) values.
    pub category: Option<String>,
    pub city: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub max_price: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Result ordering requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Index relevance when searching text, natural order otherwise.
    #[default]
    Relevance,
    /// The entity's natural order (e.g. start date for events).
    Natural,
    /// Live popularity signals from the store.
    Popularity,
}

/// Inclusive date range; either end may be open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// A validated, immutable set of facets for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub entity_type: EntityType,
    /// Trimmed, non-empty free text.
    pub text: Option<String>,
    /// Upper-cased category values; empty means no category facet.
    pub categories: Vec<String>,
    pub city: Option<String>,
    pub date_range: Option<DateRange>,
    pub max_price: Option<f64>,
    pub geo: Option<GeoRadius>,
    pub sort: SortMode,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl QueryFilter {
    /// An unfiltered first page.
    pub fn new(entity_type: EntityType, limit: u32) -> Self {
        Self {
            entity_type,
            text: None,
            categories: Vec::new(),
            city: None,
            date_range: None,
            max_price: None,
            geo: None,
            sort: SortMode::default(),
            page: 1,
            limit,
        }
    }

    /// Row offset of the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.limit) * u64::from(self.page.saturating_sub(1))
    }
}

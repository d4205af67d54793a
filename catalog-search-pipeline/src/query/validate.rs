//! Raw query validation.
//!
//! Turns untrusted caller input into a [`QueryFilter`]. Every rejection
//! names the offending input key; nothing past this point re-checks input.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use catalog_search_shared::{
    DateRange, EntityType, GeoPoint, GeoRadius, GeoSupport, QueryFilter, RawQuery, SortMode,
    ValidationError,
};

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;
/// Longest accepted free-text query, in characters.
pub const MAX_TEXT_LENGTH: usize = 200;

/// Validate `raw` for `entity_type`.
pub fn validate(entity_type: EntityType, raw: &RawQuery) -> Result<QueryFilter, ValidationError> {
    let schema = entity_type.schema();

    let page = raw.page.unwrap_or(1);
    if page < 1 {
        return Err(ValidationError::new("page", "must be at least 1"));
    }
    let limit = raw.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ValidationError::new(
            "limit",
            format!("must be between 1 and {}", MAX_LIMIT),
        ));
    }

    let mut filter = QueryFilter::new(entity_type, limit);
    filter.page = page;
    filter.text = parse_text(raw.q.as_deref())?;
    filter.sort = parse_sort(raw.sort.as_deref())?;

    if let Some(category) = non_empty(raw.category.as_deref()) {
        if schema.facets.category.is_none() {
            return Err(unsupported("category", entity_type));
        }
        filter.categories = parse_categories(category, schema.categories)?;
    }

    if let Some(city) = non_empty(raw.city.as_deref()) {
        if schema.facets.city.is_none() {
            return Err(unsupported("city", entity_type));
        }
        filter.city = Some(city.to_string());
    }

    let date_from = non_empty(raw.date_from.as_deref());
    let date_to = non_empty(raw.date_to.as_deref());
    if date_from.is_some() || date_to.is_some() {
        if schema.facets.date.is_none() {
            let field = if date_from.is_some() { "dateFrom" } else { "dateTo" };
            return Err(unsupported(field, entity_type));
        }
        let from = date_from
            .map(|value| parse_date("dateFrom", value, false))
            .transpose()?;
        let to = date_to
            .map(|value| parse_date("dateTo", value, true))
            .transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ValidationError::new("dateFrom", "must not be after dateTo"));
            }
        }
        filter.date_range = Some(DateRange { from, to });
    }

    if let Some(max_price) = raw.max_price {
        if schema.facets.price.is_none() {
            return Err(unsupported("maxPrice", entity_type));
        }
        if !max_price.is_finite() || max_price < 0.0 {
            return Err(ValidationError::new("maxPrice", "must be a non-negative number"));
        }
        filter.max_price = Some(max_price);
    }

    filter.geo = parse_geo(entity_type, raw)?;
    Ok(filter)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn unsupported(field: &'static str, entity_type: EntityType) -> ValidationError {
    ValidationError::new(field, format!("not supported for {}", entity_type.plural()))
}

fn parse_text(q: Option<&str>) -> Result<Option<String>, ValidationError> {
    match non_empty(q) {
        Some(text) if text.chars().count() > MAX_TEXT_LENGTH => Err(ValidationError::new(
            "q",
            format!("must be at most {} characters", MAX_TEXT_LENGTH),
        )),
        Some(text) => Ok(Some(text.to_string())),
        None => Ok(None),
    }
}

fn parse_sort(sort: Option<&str>) -> Result<SortMode, ValidationError> {
    match non_empty(sort).map(str::to_ascii_lowercase).as_deref() {
        None | Some("relevance") => Ok(SortMode::Relevance),
        Some("natural") => Ok(SortMode::Natural),
        Some("popularity") => Ok(SortMode::Popularity),
        Some(other) => Err(ValidationError::new(
            "sort",
            format!("unknown sort '{}'; expected relevance, natural or popularity", other),
        )),
    }
}

/// Split a comma-separated list, upper-case it and check every value.
/// Duplicates collapse onto their first occurrence.
fn parse_categories(
    raw: &str,
    allowed: &[&str],
) -> Result<Vec<String>, ValidationError> {
    let mut categories: Vec<String> = Vec::new();
    for value in raw.split(',').map(str::trim).filter(|v| !v.is_empty()) {
        let value = value.to_uppercase();
        if !allowed.contains(&value.as_str()) {
            return Err(ValidationError::new(
                "category",
                format!("unknown value '{}'", value),
            ));
        }
        if !categories.contains(&value) {
            categories.push(value);
        }
    }
    Ok(categories)
}

/// Accept an RFC 3339 timestamp or a bare `YYYY-MM-DD` date. A bare upper
/// bound covers the whole day.
fn parse_date(
    field: &'static str,
    value: &str,
    end_of_day: bool,
) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ValidationError::new(field, format!("'{}' is not a valid date", value))
    })?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    };
    time.map(|time| date.and_time(time).and_utc())
        .ok_or_else(|| ValidationError::new(field, format!("'{}' is not a valid date", value)))
}

fn parse_geo(entity_type: EntityType, raw: &RawQuery) -> Result<Option<GeoRadius>, ValidationError> {
    let (lat, lng, radius_km) = match (raw.lat, raw.lng, raw.radius_km) {
        (None, None, None) => return Ok(None),
        (Some(lat), Some(lng), Some(radius_km)) => (lat, lng, radius_km),
        _ => {
            return Err(ValidationError::new(
                "radiusKm",
                "lat, lng and radiusKm must be supplied together",
            ))
        }
    };
    if entity_type.schema().geo == GeoSupport::Unsupported {
        return Err(unsupported("radiusKm", entity_type));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ValidationError::new("lat", "must be between -90 and 90"));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(ValidationError::new("lng", "must be between -180 and 180"));
    }
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(ValidationError::new("radiusKm", "must be a positive number"));
    }
    Ok(Some(GeoRadius {
        center: GeoPoint::new(lat, lng),
        radius_km,
    }))
}

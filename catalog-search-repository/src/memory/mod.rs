//! In-memory implementations of the engine and store traits.
//!
//! Both evaluate the same [`FilterClause::matches`] semantics the OpenSearch
//! and PostgreSQL renderings follow, so tests can compare the two paths
//! record for record. The engine also exposes fault hooks (unreachable,
//! failing writes, forced responses, latency) to drive the fallback logic.
//!
//! [`FilterClause::matches`]: catalog_search_shared::FilterClause::matches

mod engine;
mod store;

use std::cmp::Ordering;

use catalog_search_shared::{EntityType, FieldValue, IndexDocument};

pub use engine::InMemorySearchEngine;
pub use store::InMemoryCatalogStore;

/// Natural ordering of two documents of `entity_type`: the schema's natural
/// field ascending (missing values last), then identifier ascending.
pub(crate) fn natural_order(
    entity_type: EntityType,
    a: &IndexDocument,
    b: &IndexDocument,
) -> Ordering {
    let field = entity_type.schema().natural_sort;
    let by_field = match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => compare_values(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_field.then_with(|| a.id.cmp(&b.id))
}

fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Text(x) | FieldValue::Keyword(x), FieldValue::Text(y) | FieldValue::Keyword(y)) => {
            x.cmp(y)
        }
        (FieldValue::Date(x), FieldValue::Date(y)) => x.cmp(y),
        (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_search_shared::Field;
    use uuid::Uuid;

    #[test]
    fn test_natural_order_puts_missing_values_last_and_breaks_ties_by_id() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let a = IndexDocument::new(high, EntityType::Artist, 1)
            .with(Field::Name, FieldValue::Text("Alpha".to_string()));
        let b = IndexDocument::new(low, EntityType::Artist, 1)
            .with(Field::Name, FieldValue::Text("Alpha".to_string()));
        let c = IndexDocument::new(low, EntityType::Artist, 1);

        assert_eq!(natural_order(EntityType::Artist, &b, &a), Ordering::Less);
        assert_eq!(natural_order(EntityType::Artist, &a, &c), Ordering::Less);
    }
}

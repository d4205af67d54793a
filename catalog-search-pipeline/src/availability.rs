//! Per-entity index availability flags.

use std::sync::atomic::{AtomicBool, Ordering};

use catalog_search_shared::EntityType;

/// Whether each entity type's index may be queried.
///
/// Every flag starts unavailable; the registrar marks an index available
/// once it is known to exist. Requests for an unavailable index go straight
/// to the store.
#[derive(Debug, Default)]
pub struct IndexAvailability {
    flags: [AtomicBool; 4],
}

impl IndexAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(entity_type: EntityType) -> usize {
        match entity_type {
            EntityType::Event => 0,
            EntityType::Artist => 1,
            EntityType::Venue => 2,
            EntityType::Organizer => 3,
        }
    }

    pub fn is_available(&self, entity_type: EntityType) -> bool {
        self.flags[Self::slot(entity_type)].load(Ordering::Acquire)
    }

    /// Set the flag and return its previous value.
    pub fn set(&self, entity_type: EntityType, available: bool) -> bool {
        self.flags[Self::slot(entity_type)].swap(available, Ordering::AcqRel)
    }

    pub fn mark_available(&self, entity_type: EntityType) -> bool {
        self.set(entity_type, true)
    }

    pub fn mark_unavailable(&self, entity_type: EntityType) -> bool {
        self.set(entity_type, false)
    }

    /// Entity types currently routed to the store.
    pub fn unavailable(&self) -> Vec<EntityType> {
        EntityType::ALL
            .into_iter()
            .filter(|entity_type| !self.is_available(*entity_type))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_start_unavailable() {
        let availability = IndexAvailability::new();
        assert_eq!(availability.unavailable(), EntityType::ALL.to_vec());
    }

    #[test]
    fn test_set_returns_previous_value() {
        let availability = IndexAvailability::new();
        assert!(!availability.mark_available(EntityType::Venue));
        assert!(availability.mark_available(EntityType::Venue));
        assert!(availability.is_available(EntityType::Venue));
        assert!(!availability.is_available(EntityType::Event));

        assert!(availability.mark_unavailable(EntityType::Venue));
        assert!(!availability.is_available(EntityType::Venue));
    }
}

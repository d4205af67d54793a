//! Registry of per-entity search engine clients.

use std::collections::BTreeMap;
use std::sync::Arc;

use catalog_search_repository::SearchEngineClient;
use catalog_search_shared::EntityType;

/// One injected engine client per entity type.
///
/// Built once at process start and cloned into every component that talks
/// to the index.
#[derive(Clone, Default)]
pub struct SearchEngines {
    clients: BTreeMap<EntityType, Arc<dyn SearchEngineClient>>,
}

impl SearchEngines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client under the entity type it reports.
    pub fn with(mut self, client: Arc<dyn SearchEngineClient>) -> Self {
        self.insert(client);
        self
    }

    pub fn insert(&mut self, client: Arc<dyn SearchEngineClient>) {
        self.clients.insert(client.entity_type(), client);
    }

    pub fn get(&self, entity_type: EntityType) -> Option<&Arc<dyn SearchEngineClient>> {
        self.clients.get(&entity_type)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.clients.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityType, &Arc<dyn SearchEngineClient>)> + '_ {
        self.clients.iter().map(|(entity_type, client)| (*entity_type, client))
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_search_repository::InMemorySearchEngine;

    #[test]
    fn test_clients_are_keyed_by_their_entity_type() {
        let engines = SearchEngines::new()
            .with(Arc::new(InMemorySearchEngine::new(EntityType::Venue)))
            .with(Arc::new(InMemorySearchEngine::new(EntityType::Event)));

        assert_eq!(engines.len(), 2);
        assert_eq!(
            engines.get(EntityType::Venue).map(|c| c.entity_type()),
            Some(EntityType::Venue)
        );
        assert!(engines.get(EntityType::Artist).is_none());
        assert_eq!(
            engines.entity_types().collect::<Vec<_>>(),
            vec![EntityType::Event, EntityType::Venue]
        );
    }
}

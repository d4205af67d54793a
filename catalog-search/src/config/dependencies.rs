//! Dependency initialization and wiring for the catalog search layer.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::Settings;
use crate::AppError;
use catalog_search_pipeline::{
    AvailabilityMonitor, BulkSynchronizer, IncrementalMutator, IndexAvailability, MonitorConfig,
    SchemaRegistrar, SearchEngines, SearchService, ServiceConfig, SyncConfig,
};
use catalog_search_repository::opensearch::build_client;
use catalog_search_repository::{OpenSearchClient, PgCatalogStore, SearchIndexConfig};
use catalog_search_shared::EntityType;

/// Time to wait for a pooled PostgreSQL connection.
const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Container for all initialized dependencies.
///
/// Every component receives its engines, store and availability flags from
/// here; nothing is looked up from global state.
pub struct Dependencies {
    pub engines: SearchEngines,
    pub availability: Arc<IndexAvailability>,
    pub registrar: Arc<SchemaRegistrar>,
    pub synchronizer: Arc<BulkSynchronizer>,
    /// Handed to catalog write services, which call it after each commit.
    pub mutator: IncrementalMutator,
    pub service: SearchService,
    monitor_config: MonitorConfig,
}

impl Dependencies {
    /// Initialize all dependencies from `settings`.
    ///
    /// An unreachable OpenSearch cluster is not an error here: the registrar
    /// marks its indexes unavailable and queries are served by the store.
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            index_prefix = %settings.index_prefix,
            "Initializing dependencies"
        );

        let index_config = SearchIndexConfig {
            index_prefix: settings.index_prefix.clone(),
            ..SearchIndexConfig::default()
        };
        let client = build_client(&settings.opensearch_url, &index_config)?;

        let mut engines = SearchEngines::new();
        for entity_type in EntityType::ALL {
            engines.insert(Arc::new(OpenSearchClient::new(
                client.clone(),
                entity_type,
                index_config.clone(),
            )));
        }

        let store = Arc::new(
            PgCatalogStore::connect(
                &settings.database_url,
                settings.db_max_connections,
                DB_ACQUIRE_TIMEOUT,
            )
            .await?,
        );
        info!("PostgreSQL connection pool ready");

        let availability = Arc::new(IndexAvailability::new());
        let registrar = Arc::new(SchemaRegistrar::new(engines.clone(), availability.clone()));
        let synchronizer = Arc::new(BulkSynchronizer::with_config(
            store.clone(),
            engines.clone(),
            SyncConfig {
                batch_size: settings.sync_batch_size,
            },
        ));
        let mutator = IncrementalMutator::new(engines.clone());
        let service = SearchService::new(
            engines.clone(),
            store.clone(),
            store,
            availability.clone(),
            ServiceConfig {
                index_timeout: settings.index_timeout,
                max_candidates: settings.max_candidates,
            },
        );

        Ok(Self {
            engines,
            availability,
            registrar,
            synchronizer,
            mutator,
            service,
            monitor_config: MonitorConfig {
                interval: settings.availability_check,
                resync_on_recovery: true,
            },
        })
    }

    /// Build the availability monitor over these dependencies.
    pub fn monitor(&self) -> AvailabilityMonitor {
        AvailabilityMonitor::new(
            self.registrar.clone(),
            self.synchronizer.clone(),
            self.engines.clone(),
            self.monitor_config.clone(),
        )
    }
}

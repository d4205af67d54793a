//! Background availability monitor.
//!
//! Brings indexes up at startup, then periodically health-checks available
//! indexes and retries unavailable ones. An index is resynced from the store
//! before it is marked available, so the Index Path never serves a
//! half-empty index.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::engines::SearchEngines;
use crate::schema::SchemaRegistrar;
use crate::sync::BulkSynchronizer;
use catalog_search_shared::EntityType;

/// Configuration for the availability monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between two checks.
    pub interval: Duration,
    /// Resync a recovered index before routing queries to it.
    pub resync_on_recovery: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            resync_on_recovery: true,
        }
    }
}

pub struct AvailabilityMonitor {
    registrar: Arc<SchemaRegistrar>,
    synchronizer: Arc<BulkSynchronizer>,
    engines: SearchEngines,
    config: MonitorConfig,
}

impl AvailabilityMonitor {
    pub fn new(
        registrar: Arc<SchemaRegistrar>,
        synchronizer: Arc<BulkSynchronizer>,
        engines: SearchEngines,
        config: MonitorConfig,
    ) -> Self {
        Self {
            registrar,
            synchronizer,
            engines,
            config,
        }
    }

    /// Run one round of checks. Returns the entity types that recovered.
    #[instrument(skip(self))]
    pub async fn check_once(&self) -> Vec<EntityType> {
        let availability = self.registrar.availability();
        let mut recovered = Vec::new();

        for (entity_type, engine) in self.engines.iter() {
            if availability.is_available(entity_type) {
                match engine.health_check().await {
                    Ok(true) => debug!(entity_type = %entity_type, "Search index healthy"),
                    Ok(false) => {
                        warn!(entity_type = %entity_type, "Search index unhealthy; routing to the store");
                        availability.mark_unavailable(entity_type);
                    }
                    Err(e) => {
                        warn!(entity_type = %entity_type, error = %e, "Health check failed; routing to the store");
                        availability.mark_unavailable(entity_type);
                    }
                }
                continue;
            }

            if self.bring_up(entity_type, self.config.resync_on_recovery).await {
                info!(entity_type = %entity_type, "Search index available again");
                recovered.push(entity_type);
            }
        }

        recovered
    }

    /// Bring every registered index up at process start, concurrently.
    ///
    /// With `resync`, each index is filled from the store before it is
    /// marked available. Indexes that fail stay unavailable for the
    /// periodic checks to retry.
    #[instrument(skip(self))]
    pub async fn start(&self, resync: bool) -> Vec<(EntityType, bool)> {
        let entity_types: Vec<EntityType> = self.engines.entity_types().collect();
        let results = join_all(
            entity_types
                .iter()
                .map(|entity_type| self.bring_up(*entity_type, resync)),
        )
        .await;
        entity_types.into_iter().zip(results).collect()
    }

    /// Create the index, optionally resync it, then mark it available.
    async fn bring_up(&self, entity_type: EntityType, resync: bool) -> bool {
        if let Err(e) = self.registrar.create_if_missing(entity_type).await {
            debug!(entity_type = %entity_type, error = %e, "Search index unavailable");
            return false;
        }

        if resync {
            match self.synchronizer.resync(entity_type).await {
                Ok(summary) => info!(
                    entity_type = %entity_type,
                    indexed = summary.succeeded,
                    failed = summary.failed,
                    "Index resynced"
                ),
                Err(e) => {
                    warn!(entity_type = %entity_type, error = %e, "Index resync failed; will retry");
                    return false;
                }
            }
        }

        self.registrar.availability().mark_available(entity_type);
        true
    }

    /// Check on every tick until a shutdown signal arrives.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; `start` already covered it.
        ticker.tick().await;

        info!(interval_secs = self.config.interval.as_secs(), "Availability monitor started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_once().await;
                }
                _ = shutdown.recv() => {
                    info!("Availability monitor stopping");
                    break;
                }
            }
        }
    }
}

//! Search service: the one operation exposed to callers.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::availability::IndexAvailability;
use crate::engines::SearchEngines;
use crate::errors::SearchError;
use crate::query::{
    validate, CompiledQuery, ExecutionRouter, GeoPostFilter, PopularityRanker, ResultHydrator,
};
use catalog_search_repository::{CatalogStore, PopularitySource, Window};
use catalog_search_shared::{EntityType, QueryFilter, RawQuery, ResultEnvelope, SortMode};

/// Configuration for [`SearchService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on a single index query before falling back to the store.
    pub index_timeout: Duration,
    /// Candidates routed when a stage must see more than one page (geo
    /// post-filter, popularity sort). Pages beyond this window are empty.
    pub max_candidates: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            index_timeout: Duration::from_millis(800),
            max_candidates: 1000,
        }
    }
}

pub struct SearchService {
    router: ExecutionRouter,
    geo: GeoPostFilter,
    ranker: PopularityRanker,
    hydrator: ResultHydrator,
    config: ServiceConfig,
}

impl SearchService {
    pub fn new(
        engines: SearchEngines,
        store: Arc<dyn CatalogStore>,
        popularity: Arc<dyn PopularitySource>,
        availability: Arc<IndexAvailability>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            router: ExecutionRouter::new(
                engines,
                store.clone(),
                availability,
                config.index_timeout,
            ),
            geo: GeoPostFilter::new(store.clone()),
            ranker: PopularityRanker::new(popularity),
            hydrator: ResultHydrator::new(store),
            config,
        }
    }

    /// Validate `raw` and resolve one page of `entity_type` records.
    pub async fn search(
        &self,
        entity_type: EntityType,
        raw: &RawQuery,
    ) -> Result<ResultEnvelope, SearchError> {
        let filter = validate(entity_type, raw)?;
        self.search_filter(&filter).await
    }

    /// Resolve an already validated filter.
    #[instrument(skip(self, filter), fields(entity_type = %filter.entity_type, page = filter.page, limit = filter.limit))]
    pub async fn search_filter(&self, filter: &QueryFilter) -> Result<ResultEnvelope, SearchError> {
        let entity_type = filter.entity_type;
        let compiled = CompiledQuery::compile(filter);
        let offset = filter.offset();
        let limit = u64::from(filter.limit);

        let needs_candidates =
            filter.sort == SortMode::Popularity || compiled.geo_post_filter.is_some();

        let (total, ids, path) = if needs_candidates {
            let window = Window::new(0, u64::from(self.config.max_candidates));
            let routed = self.router.execute(&compiled, window).await?;
            let mut total = routed.total;
            let mut candidates = routed.ids;

            if let Some(radius) = &compiled.geo_post_filter {
                // The retained count is exact only when every match was a candidate.
                let exhaustive = routed.total <= window.limit;
                candidates = self.geo.apply(entity_type, candidates, radius).await?;
                if exhaustive {
                    total = candidates.len() as u64;
                }
            }
            if filter.sort == SortMode::Popularity {
                candidates = self.ranker.rank(entity_type, candidates).await?;
            }

            let page = candidates
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect();
            (total, page, routed.path)
        } else {
            let routed = self.router.execute(&compiled, Window::new(offset, limit)).await?;
            (routed.total, routed.ids, routed.path)
        };

        let data = self.hydrator.hydrate(entity_type, &ids).await?;
        debug!(path = ?path, total = total, returned = data.len(), "Search resolved");

        Ok(ResultEnvelope {
            page: filter.page,
            limit: filter.limit,
            total,
            data,
        })
    }
}

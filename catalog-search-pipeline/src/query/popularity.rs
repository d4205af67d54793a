//! Popularity ranking from live store signals.
//!
//! Scores are computed per request and never cached:
//! - event: own favorites, plus the mean favorites of its artists, plus its
//!   venue's favorites
//! - artist: tickets sold for its events over the trailing year
//! - venue and organizer: own favorites

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

use catalog_search_repository::{PopularitySource, StoreError};
use catalog_search_shared::EntityType;

/// Trailing window for artist ticket sales.
pub const TICKET_SALES_WINDOW_DAYS: i64 = 365;

pub struct PopularityRanker {
    source: Arc<dyn PopularitySource>,
}

impl PopularityRanker {
    pub fn new(source: Arc<dyn PopularitySource>) -> Self {
        Self { source }
    }

    /// Reorder `ids` by descending popularity. Ties keep their incoming order.
    #[instrument(skip(self, ids), fields(entity_type = %entity_type, candidates = ids.len()))]
    pub async fn rank(
        &self,
        entity_type: EntityType,
        ids: Vec<Uuid>,
    ) -> Result<Vec<Uuid>, StoreError> {
        if ids.len() < 2 {
            return Ok(ids);
        }
        let scores = self.scores(entity_type, &ids).await?;
        debug!(scored = scores.len(), "Popularity scores loaded");
        Ok(sort_by_score(ids, &scores))
    }

    /// Popularity score of every candidate. Candidates without any signal
    /// score zero and may be absent from the map.
    pub async fn scores(
        &self,
        entity_type: EntityType,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, f64>, StoreError> {
        match entity_type {
            EntityType::Event => self.event_scores(ids).await,
            EntityType::Artist => {
                let since = Utc::now() - Duration::days(TICKET_SALES_WINDOW_DAYS);
                let sales = self.source.artist_ticket_sales(ids, since).await?;
                Ok(to_scores(sales))
            }
            EntityType::Venue | EntityType::Organizer => {
                let favorites = self.source.favorite_counts(entity_type, ids).await?;
                Ok(to_scores(favorites))
            }
        }
    }

    async fn event_scores(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, f64>, StoreError> {
        let (own, relations) = tokio::try_join!(
            self.source.favorite_counts(EntityType::Event, ids),
            self.source.event_relations(ids)
        )?;

        let artist_ids: Vec<Uuid> = relations
            .values()
            .flat_map(|relation| relation.artist_ids.iter().copied())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let venue_ids: Vec<Uuid> = relations
            .values()
            .filter_map(|relation| relation.venue_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let (artist_favorites, venue_favorites) = tokio::try_join!(
            self.source.favorite_counts(EntityType::Artist, &artist_ids),
            self.source.favorite_counts(EntityType::Venue, &venue_ids)
        )?;

        let mut scores = HashMap::with_capacity(ids.len());
        for id in ids {
            let mut score = own.get(id).copied().unwrap_or(0) as f64;
            if let Some(relation) = relations.get(id) {
                if !relation.artist_ids.is_empty() {
                    let sum: u64 = relation
                        .artist_ids
                        .iter()
                        .map(|artist| artist_favorites.get(artist).copied().unwrap_or(0))
                        .sum();
                    score += sum as f64 / relation.artist_ids.len() as f64;
                }
                if let Some(venue) = relation.venue_id {
                    score += venue_favorites.get(&venue).copied().unwrap_or(0) as f64;
                }
            }
            scores.insert(*id, score);
        }
        Ok(scores)
    }
}

fn to_scores(counts: HashMap<Uuid, u64>) -> HashMap<Uuid, f64> {
    counts
        .into_iter()
        .map(|(id, count)| (id, count as f64))
        .collect()
}

/// Stable sort by descending score; missing scores count as zero.
pub fn sort_by_score(mut ids: Vec<Uuid>, scores: &HashMap<Uuid, f64>) -> Vec<Uuid> {
    let score = |id: &Uuid| scores.get(id).copied().unwrap_or(0.0);
    ids.sort_by(|a, b| score(b).total_cmp(&score(a)));
    ids
}

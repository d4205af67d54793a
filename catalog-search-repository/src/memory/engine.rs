//! In-memory search engine.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchEngineClient;
use crate::memory::natural_order;
use crate::types::{BatchOperationSummary, IndexHits, IndexQuery, IndexStatus, WriteOutcome};
use catalog_search_shared::{EntityType, IndexDocument, SortMode};

/// Search engine holding one entity type's documents in memory.
///
/// Writes follow external `gte` versioning: a write whose version is lower
/// than the stored document (or the last delete) is reported as stale.
pub struct InMemorySearchEngine {
    entity_type: EntityType,
    documents: RwLock<BTreeMap<Uuid, IndexDocument>>,
    tombstones: RwLock<HashMap<Uuid, i64>>,
    index_created: AtomicBool,
    unreachable: AtomicBool,
    failing_writes: AtomicBool,
    forced_response: Mutex<Option<IndexHits>>,
    latency: Mutex<Option<Duration>>,
    search_calls: AtomicUsize,
}

impl InMemorySearchEngine {
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            documents: RwLock::new(BTreeMap::new()),
            tombstones: RwLock::new(HashMap::new()),
            index_created: AtomicBool::new(false),
            unreachable: AtomicBool::new(false),
            failing_writes: AtomicBool::new(false),
            forced_response: Mutex::new(None),
            latency: Mutex::new(None),
            search_calls: AtomicUsize::new(0),
        }
    }

    /// Make every call fail with a connection error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, AtomicOrdering::SeqCst);
    }

    /// Make every write fail while searches keep working.
    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, AtomicOrdering::SeqCst);
    }

    /// Answer every search with `hits` regardless of the stored documents.
    pub async fn force_response(&self, hits: Option<IndexHits>) {
        *self.forced_response.lock().await = hits;
    }

    /// Delay every search by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().await = latency;
    }

    pub async fn document(&self, id: &Uuid) -> Option<IndexDocument> {
        self.documents.read().await.get(id).cloned()
    }

    pub async fn ids(&self) -> Vec<Uuid> {
        self.documents.read().await.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    pub fn index_created(&self) -> bool {
        self.index_created.load(AtomicOrdering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(AtomicOrdering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), SearchIndexError> {
        if self.unreachable.load(AtomicOrdering::SeqCst) {
            return Err(SearchIndexError::connection("in-memory engine is unreachable"));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), SearchIndexError> {
        self.check_reachable()?;
        if self.failing_writes.load(AtomicOrdering::SeqCst) {
            return Err(SearchIndexError::index("in-memory engine rejects writes"));
        }
        Ok(())
    }

    async fn apply_upsert(&self, document: &IndexDocument) -> WriteOutcome {
        let mut documents = self.documents.write().await;
        let mut tombstones = self.tombstones.write().await;

        let newest = documents
            .get(&document.id)
            .map(|existing| existing.version)
            .into_iter()
            .chain(tombstones.get(&document.id).copied())
            .max();
        if newest.is_some_and(|version| document.version < version) {
            return WriteOutcome::Stale;
        }

        tombstones.remove(&document.id);
        documents.insert(document.id, document.clone());
        WriteOutcome::Applied
    }

    /// Relevance score: 2 for a primary field hit, 1 for any other field hit.
    fn score(&self, document: &IndexDocument, text: &str) -> u32 {
        let schema = self.entity_type.schema();
        let needle = text.to_lowercase();
        schema
            .searchable
            .iter()
            .filter(|field| {
                document
                    .text(**field)
                    .is_some_and(|value| value.to_lowercase().contains(&needle))
            })
            .map(|field| if *field == schema.primary_text_field() { 2 } else { 1 })
            .sum()
    }
}

#[async_trait]
impl SearchEngineClient for InMemorySearchEngine {
    fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    async fn ensure_index_exists(&self) -> Result<IndexStatus, SearchIndexError> {
        self.check_reachable()?;
        if self.index_created.swap(true, AtomicOrdering::SeqCst) {
            Ok(IndexStatus::AlreadyExists)
        } else {
            Ok(IndexStatus::Created)
        }
    }

    async fn search(&self, query: &IndexQuery) -> Result<IndexHits, SearchIndexError> {
        self.search_calls.fetch_add(1, AtomicOrdering::SeqCst);
        let latency = *self.latency.lock().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.check_reachable()?;
        if let Some(forced) = self.forced_response.lock().await.clone() {
            return Ok(forced);
        }

        let documents = self.documents.read().await;
        let mut matched: Vec<(&IndexDocument, u32)> = documents
            .values()
            .filter(|doc| query.clauses.iter().all(|clause| clause.matches(doc)))
            .map(|doc| {
                let score = query
                    .relevance_text
                    .as_deref()
                    .map_or(0, |text| self.score(doc, text));
                (doc, score)
            })
            .collect();

        match query.sort {
            SortMode::Relevance | SortMode::Popularity => {
                matched.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then_with(|| a.id.cmp(&b.id)))
            }
            SortMode::Natural => {
                matched.sort_by(|(a, _), (b, _)| natural_order(self.entity_type, a, b))
            }
        }

        let estimated_total = matched.len() as u64;
        let ids = matched
            .into_iter()
            .skip(query.window.offset as usize)
            .take(query.window.limit as usize)
            .map(|(doc, _)| doc.id)
            .collect();

        Ok(IndexHits {
            estimated_total,
            ids,
        })
    }

    async fn upsert_document(
        &self,
        document: &IndexDocument,
    ) -> Result<WriteOutcome, SearchIndexError> {
        self.check_writable()?;
        Ok(self.apply_upsert(document).await)
    }

    async fn bulk_upsert(
        &self,
        documents: &[IndexDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        self.check_writable()?;
        let mut summary = BatchOperationSummary::default();
        for document in documents {
            self.apply_upsert(document).await;
            summary.record(document.id, None);
        }
        Ok(summary)
    }

    async fn delete_document(
        &self,
        id: &Uuid,
        version: i64,
    ) -> Result<WriteOutcome, SearchIndexError> {
        self.check_writable()?;
        let mut documents = self.documents.write().await;
        let mut tombstones = self.tombstones.write().await;

        if documents.get(id).is_some_and(|existing| version < existing.version) {
            return Ok(WriteOutcome::Stale);
        }
        documents.remove(id);
        let tombstone = tombstones.entry(*id).or_insert(version);
        *tombstone = (*tombstone).max(version);
        Ok(WriteOutcome::Applied)
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        Ok(!self.unreachable.load(AtomicOrdering::SeqCst))
    }
}

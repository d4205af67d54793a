//! Configuration types for the search engine clients.

use std::time::Duration;

/// Configuration shared by the per-entity search engine clients.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Prefix of every index name (`{prefix}_{events}` and so on).
    pub index_prefix: String,
    /// Maximum number of documents sent in a single bulk request.
    /// Set to None to send every document in one request (not recommended for production).
    pub max_batch_size: Option<usize>,
    /// Number of primary shards for newly created indexes.
    pub number_of_shards: u32,
    /// Number of replicas for newly created indexes.
    pub number_of_replicas: u32,
    /// Transport-level request timeout.
    pub request_timeout: Duration,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            index_prefix: "catalog".to_string(),
            max_batch_size: Some(1000),
            number_of_shards: 1,
            number_of_replicas: 1,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl SearchIndexConfig {
    /// Create a config with no batch size limit (use with caution).
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
            ..Self::default()
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
            ..Self::default()
        }
    }

    /// Chunk size for bulk requests of `len` documents.
    pub fn chunk_size(&self, len: usize) -> usize {
        self.max_batch_size.unwrap_or(len).max(1)
    }
}

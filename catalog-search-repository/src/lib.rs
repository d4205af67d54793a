//! # Catalog Search Repository
//!
//! This crate provides the traits and implementations the search layer talks
//! to: the search engine (one client per entity type), the authoritative
//! catalog store, and the store's popularity aggregates. It includes error
//! definitions, an OpenSearch implementation of the engine, a PostgreSQL
//! implementation of the store, and an in-memory implementation of both.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod postgres;
pub mod types;

pub use config::SearchIndexConfig;
pub use errors::{SearchIndexError, StoreError};
pub use interfaces::{CatalogStore, PopularitySource, SearchEngineClient};
pub use memory::{InMemoryCatalogStore, InMemorySearchEngine};
pub use opensearch::OpenSearchClient;
pub use postgres::PgCatalogStore;
pub use types::{
    BatchOperationResult, BatchOperationSummary, EventRelations, IndexHits, IndexQuery,
    IndexStatus, StoreQuery, Window, WriteOutcome,
};

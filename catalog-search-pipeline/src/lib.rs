//! # Catalog Search Pipeline
//!
//! This crate keeps the search index in step with the catalog store and
//! resolves search requests against whichever of the two can answer.
//!
//! ## Architecture
//!
//! Write side:
//!
//! 1. **Schema Registrar**: ensures one index per entity type and tracks availability
//! 2. **Bulk Synchronizer**: streams every live row into the index (repair path)
//! 3. **Incremental Mutator**: mirrors single writes after the store commit
//!
//! Read side, in request order:
//!
//! 1. **Validation**: raw caller input to a typed `QueryFilter`
//! 2. **Compiler**: one clause list rendered for the index and for the store
//! 3. **Router**: Index Path or Store Path, with transparent fallback
//! 4. **Geo Post-Filter** and **Popularity Ranker**: optional candidate stages
//! 5. **Hydrator**: full records from the store, in candidate order

pub mod availability;
pub mod engines;
pub mod errors;
pub mod query;
pub mod schema;
pub mod service;
pub mod sync;

pub use availability::IndexAvailability;
pub use engines::SearchEngines;
pub use errors::{SearchError, SyncError};
pub use schema::{AvailabilityMonitor, MonitorConfig, SchemaRegistrar};
pub use service::{SearchService, ServiceConfig};
pub use sync::{BulkSynchronizer, IncrementalMutator, SyncConfig};

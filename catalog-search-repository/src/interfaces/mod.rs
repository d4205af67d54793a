//! Interface definitions for the search engine and the catalog store.
//!
//! These traits allow dependency injection and swappable backends: every
//! component receives an `Arc<dyn ...>` at construction time, nothing looks
//! up a shared client from ambient state.

mod catalog_store;
mod popularity_source;
mod search_engine_client;

pub use catalog_store::CatalogStore;
pub use popularity_source::PopularitySource;
pub use search_engine_client::SearchEngineClient;

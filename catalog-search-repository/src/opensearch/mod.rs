//! OpenSearch implementation of the search engine client.
//!
//! This module provides a concrete implementation of `SearchEngineClient`
//! using OpenSearch as the backend, with one index per entity type.

mod client;
mod index_config;
mod queries;

pub use client::{build_client, OpenSearchClient};
pub use index_config::{get_index_settings, index_name, LOWERCASE_NORMALIZER};
pub use queries::{build_document_body, build_search_query, parse_hits, render_clause};

//! # Catalog Search
//!
//! Entry point and configuration for running the catalog search layer:
//! environment settings, dependency wiring and the command line surface.

pub mod cli;
pub mod config;

pub use config::{Dependencies, LogFormat, Settings};

use thiserror::Error;

/// Errors that can end a command.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A search request failed.
    #[error("Search error: {0}")]
    SearchError(#[from] catalog_search_pipeline::SearchError),

    /// The catalog store could not be reached.
    #[error("Store error: {0}")]
    StoreError(#[from] catalog_search_repository::StoreError),

    /// A resync run failed.
    #[error("Sync error: {0}")]
    SyncError(#[from] catalog_search_pipeline::SyncError),

    /// The search engine client could not be built.
    #[error("Index error: {0}")]
    IndexError(#[from] catalog_search_repository::SearchIndexError),

    /// Output could not be serialized.
    #[error("Output error: {0}")]
    OutputError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

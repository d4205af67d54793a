//! Error types for the catalog search pipeline.

mod search_error;
mod sync_error;

pub use search_error::SearchError;
pub use sync_error::SyncError;

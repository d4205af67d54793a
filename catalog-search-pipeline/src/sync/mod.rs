//! Keeping the search indexes in step with the store.
//!
//! [`BulkSynchronizer`] rebuilds an index from the live rows of the store;
//! [`IncrementalMutator`] mirrors single writes as they happen. Both are
//! best effort: the store is the source of truth and a failed index write
//! never fails the caller.

mod bulk;
mod mutator;

pub use bulk::{BulkSynchronizer, SyncConfig};
pub use mutator::IncrementalMutator;

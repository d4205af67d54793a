//! PostgreSQL implementation of the catalog store.
//!
//! The store is the source of truth: the fallback path, hydration, geo
//! coordinates and popularity aggregates all read from here.

mod client;
mod predicate;
mod rows;

pub use client::PgCatalogStore;
pub use predicate::{push_natural_order, push_predicate, table_name};

//! Read side of the search layer.
//!
//! A request flows through these stages in order: validation, compilation,
//! routing, the optional geo and popularity candidate stages, and finally
//! hydration from the store.

mod compiler;
mod geo;
mod hydrator;
mod popularity;
mod router;
mod validate;

pub use compiler::CompiledQuery;
pub use geo::{retain_within, GeoPostFilter};
pub use hydrator::{restore_order, ResultHydrator};
pub use popularity::{sort_by_score, PopularityRanker, TICKET_SALES_WINDOW_DAYS};
pub use router::{ExecutionPath, ExecutionRouter, RoutedIds};
pub use validate::{validate, DEFAULT_LIMIT, MAX_LIMIT, MAX_TEXT_LENGTH};

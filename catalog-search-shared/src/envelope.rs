//! Paginated search response.

use serde::Serialize;

use crate::entity::CatalogEntity;

/// `{ page, limit, total, data }` as returned to callers.
///
/// `data` is ordered as decided by whichever path served the query. `total`
/// is an estimate on the index path and an exact count on the store path;
/// either way callers must treat it as approximate.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEnvelope {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub data: Vec<CatalogEntity>,
}

impl ResultEnvelope {
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            total: 0,
            data: Vec::new(),
        }
    }
}

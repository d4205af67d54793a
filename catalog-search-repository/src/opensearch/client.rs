//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::VersionType,
    BulkParts, DeleteParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::index_config::{get_index_settings, index_name};
use crate::opensearch::queries::{build_document_body, build_search_query, parse_hits};
use crate::types::{BatchOperationSummary, IndexHits, IndexQuery, IndexStatus, WriteOutcome};
use catalog_search_shared::{EntityType, IndexDocument};

/// HTTP status returned when an external version is not newer than the stored one.
const VERSION_CONFLICT: u16 = 409;
const NOT_FOUND: u16 = 404;

/// Build a transport-level OpenSearch client connected to the specified URL.
///
/// One underlying client is shared by the per-entity `OpenSearchClient`s.
///
/// # Arguments
///
/// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
/// * `config` - Supplies the request timeout
///
/// # Returns
///
/// * `Ok(OpenSearch)` - A new client instance
/// * `Err(SearchIndexError)` - If the URL or transport setup is invalid
pub fn build_client(url: &str, config: &SearchIndexConfig) -> Result<OpenSearch, SearchIndexError> {
    let parsed_url = Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

    let conn_pool = SingleNodeConnectionPool::new(parsed_url);
    let transport = TransportBuilder::new(conn_pool)
        .disable_proxy()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| SearchIndexError::connection(e.to_string()))?;

    info!(url = %url, "Created OpenSearch client");

    Ok(OpenSearch::new(transport))
}

/// OpenSearch client for one entity type's index.
///
/// # Example
///
/// ```ignore
/// let config = SearchIndexConfig::default();
/// let transport = build_client("http://localhost:9200", &config)?;
/// let events = OpenSearchClient::new(transport, EntityType::Event, config);
///
/// events.ensure_index_exists().await?;
/// events.upsert_document(&IndexDocument::from(&entity)).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    entity_type: EntityType,
    index_name: String,
    config: SearchIndexConfig,
}

impl OpenSearchClient {
    pub fn new(client: OpenSearch, entity_type: EntityType, config: SearchIndexConfig) -> Self {
        let index_name = index_name(&config.index_prefix, entity_type);
        Self {
            client,
            entity_type,
            index_name,
            config,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn send_bulk_chunk(
        &self,
        documents: &[IndexDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for doc in documents {
            body.push(
                json!({
                    "index": {
                        "_index": self.index_name,
                        "_id": doc.id.to_string(),
                        "version": doc.version,
                        "version_type": "external_gte"
                    }
                })
                .into(),
            );
            body.push(build_document_body(doc).into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(&self.index_name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_operation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_operation(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(summarize_bulk_response(documents, &response_body))
    }
}

/// Turn a bulk response into per-document results.
///
/// Items are matched to documents by position. A version conflict means the
/// index already holds a newer copy and counts as success.
fn summarize_bulk_response(documents: &[IndexDocument], response: &Value) -> BatchOperationSummary {
    let empty = Vec::new();
    let items = response
        .get("items")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let mut summary = BatchOperationSummary::default();
    for (position, doc) in documents.iter().enumerate() {
        let item = items.get(position).and_then(|item| item.get("index"));
        let error = match item {
            None => Some(SearchIndexError::bulk_operation("Missing item in bulk response")),
            Some(item) => {
                let status = item.get("status").and_then(Value::as_u64).unwrap_or(0) as u16;
                match item.get("error") {
                    Some(_) if status == VERSION_CONFLICT => None,
                    Some(err) => Some(SearchIndexError::index(err.to_string())),
                    None => None,
                }
            }
        };
        summary.record(doc.id, error);
    }
    summary
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    #[instrument(skip(self), fields(index = %self.index_name))]
    async fn ensure_index_exists(&self) -> Result<IndexStatus, SearchIndexError> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[&self.index_name]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if exists.status_code().is_success() {
            debug!("Index already exists");
            return Ok(IndexStatus::AlreadyExists);
        }

        let settings = get_index_settings(self.entity_type.schema(), &self.config);
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index_name))
            .body(settings)
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            info!("Created search index");
            return Ok(IndexStatus::Created);
        }

        let error_body = response.text().await.unwrap_or_default();
        // Another process may have created it between the two calls.
        if error_body.contains("resource_already_exists_exception") {
            return Ok(IndexStatus::AlreadyExists);
        }
        error!(status = %status, body = %error_body, "Index creation failed");
        Err(SearchIndexError::index_creation(format!(
            "Index creation failed with status {}: {}",
            status, error_body
        )))
    }

    #[instrument(skip(self, query), fields(index = %self.index_name))]
    async fn search(&self, query: &IndexQuery) -> Result<IndexHits, SearchIndexError> {
        let body = build_search_query(self.entity_type.schema(), query);

        let response = self
            .client
            .search(SearchParts::Index(&[&self.index_name]))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::query(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchIndexError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let hits = parse_hits(&response_body)?;
        debug!(
            estimated_total = hits.estimated_total,
            returned = hits.ids.len(),
            "Search completed"
        );
        Ok(hits)
    }

    /// Index a full document with external versioning.
    ///
    /// The document's version is derived from the record's update timestamp,
    /// so a delayed write never overwrites a newer one.
    async fn upsert_document(
        &self,
        document: &IndexDocument,
    ) -> Result<WriteOutcome, SearchIndexError> {
        let doc_id = document.id.to_string();
        let response = self
            .client
            .index(IndexParts::IndexId(&self.index_name, &doc_id))
            .version(document.version)
            .version_type(VersionType::ExternalGte)
            .body(build_document_body(document))
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == VERSION_CONFLICT {
            debug!(doc_id = %doc_id, version = document.version, "Skipped stale upsert");
            return Ok(WriteOutcome::Stale);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::index(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(doc_id = %doc_id, "Document indexed");
        Ok(WriteOutcome::Applied)
    }

    /// Index documents through the bulk API, in chunks of the configured size.
    async fn bulk_upsert(
        &self,
        documents: &[IndexDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut summary = BatchOperationSummary::default();
        if documents.is_empty() {
            return Ok(summary);
        }

        for chunk in documents.chunks(self.config.chunk_size(documents.len())) {
            summary.merge(self.send_bulk_chunk(chunk).await?);
        }

        debug!(
            index = %self.index_name,
            total = summary.total,
            failed = summary.failed,
            "Bulk upsert completed"
        );
        Ok(summary)
    }

    /// Delete a document from the search index.
    ///
    /// If the document doesn't exist, the operation is considered successful
    /// (no error is returned).
    async fn delete_document(
        &self,
        id: &Uuid,
        version: i64,
    ) -> Result<WriteOutcome, SearchIndexError> {
        let doc_id = id.to_string();
        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index_name, &doc_id))
            .version(version)
            .version_type(VersionType::ExternalGte)
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        let status = response.status_code();
        match status.as_u16() {
            VERSION_CONFLICT => {
                debug!(doc_id = %doc_id, version, "Skipped stale delete");
                Ok(WriteOutcome::Stale)
            }
            // 404 is acceptable - document may not exist
            NOT_FOUND => Ok(WriteOutcome::Applied),
            _ if status.is_success() => {
                debug!(doc_id = %doc_id, "Document deleted");
                Ok(WriteOutcome::Applied)
            }
            _ => {
                let error_body = response.text().await.unwrap_or_default();
                error!(status = %status, body = %error_body, "Delete request failed");
                Err(SearchIndexError::delete(format!(
                    "Delete failed with status {}: {}",
                    status, error_body
                )))
            }
        }
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;
        Ok(response.status_code().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_search_shared::{Field, FieldValue};

    fn docs(n: usize) -> Vec<IndexDocument> {
        (0..n)
            .map(|i| {
                IndexDocument::new(Uuid::new_v4(), EntityType::Organizer, i as i64)
                    .with(Field::Name, FieldValue::Text(format!("Organizer {}", i)))
            })
            .collect()
    }

    #[test]
    fn test_summarize_bulk_response_counts_conflicts_as_success() {
        let documents = docs(3);
        let response = json!({
            "errors": true,
            "items": [
                { "index": { "_id": documents[0].id.to_string(), "status": 201 } },
                { "index": { "_id": documents[1].id.to_string(), "status": 409,
                             "error": { "type": "version_conflict_engine_exception" } } },
                { "index": { "_id": documents[2].id.to_string(), "status": 400,
                             "error": { "type": "mapper_parsing_exception" } } }
            ]
        });

        let summary = summarize_bulk_response(&documents, &response);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.results[2].success);
        assert_eq!(summary.results[2].entity_id, documents[2].id);
    }

    #[test]
    fn test_summarize_bulk_response_missing_items() {
        let documents = docs(2);
        let summary = summarize_bulk_response(&documents, &json!({ "items": [] }));
        assert_eq!(summary.failed, 2);
    }

    #[test]
    fn test_client_index_name() {
        let config = SearchIndexConfig::default();
        let transport = build_client("http://localhost:9200", &config).unwrap();
        let client = OpenSearchClient::new(transport, EntityType::Venue, config);
        assert_eq!(client.index_name(), "catalog_venues");
        assert_eq!(client.entity_type(), EntityType::Venue);
    }

    #[test]
    fn test_build_client_rejects_invalid_url() {
        let result = build_client("not a url", &SearchIndexConfig::default());
        assert!(matches!(result, Err(SearchIndexError::ConnectionError(_))));
    }
}

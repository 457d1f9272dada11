//! OpenSearch backend implementation.
//!
//! This module provides the concrete implementation of `SearchBackend`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesRefreshParts},
    params::{Conflicts, Refresh},
    CountParts, DeleteParts, GetParts, IndexParts, MgetParts, OpenSearch, SearchParts,
    UpdateByQueryParts, UpdateParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::{ClientConfig, RefreshPolicy};
use crate::errors::SearchError;
use crate::interfaces::SearchBackend;
use crate::opensearch::responses;
use docsearch_shared::{
    Document, DocumentRecord, SearchResponse, UpdateByQuerySummary, VersionGuard, WriteAck,
};

/// OpenSearch backend.
///
/// Holds one connection handle for its lifetime; connection reuse is left to
/// the underlying HTTP transport.
///
/// # Example
///
/// ```ignore
/// let backend = OpenSearchBackend::new(&ClientConfig::default())?;
/// let healthy = backend.health_check().await?;
/// ```
pub struct OpenSearchBackend {
    client: OpenSearch,
    refresh: RefreshPolicy,
}

impl OpenSearchBackend {
    /// Create a new backend connected to the configured host and port.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchBackend)` - A new backend instance
    /// * `Err(SearchError)` - If the URL is invalid or the transport cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self, SearchError> {
        let url = config.url();
        let parsed_url = Url::parse(&url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            timeout_ms = config.timeout.map(|t| t.as_millis() as u64),
            refresh = ?config.refresh,
            "Created OpenSearch backend"
        );

        Ok(Self {
            client,
            refresh: config.refresh,
        })
    }

    /// Refresh parameter for single-document writes.
    fn refresh_param(&self) -> Option<Refresh> {
        match self.refresh {
            RefreshPolicy::None => None,
            RefreshPolicy::WaitFor => Some(Refresh::WaitFor),
            RefreshPolicy::Immediate => Some(Refresh::True),
        }
    }

    /// Read a successful JSON body or map the failure onto `SearchError`.
    async fn read_json(response: Response, operation: &str) -> Result<Value, SearchError> {
        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let err = SearchError::from_response(status.as_u16(), &error_body);
            // Not-found is an expected outcome for reads; keep it out of error logs
            if err.is_not_found() {
                debug!(operation, status = %status, "Resource not found");
            } else {
                error!(operation, status = %status, body = %error_body, "Request failed");
            }
            return Err(err);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(format!("{} response: {}", operation, e)))
    }
}

#[async_trait]
impl SearchBackend for OpenSearchBackend {
    #[instrument(skip(self, body))]
    async fn create_index(&self, index: &str, body: &Value) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body)
            .send()
            .await?;

        let body = Self::read_json(response, "create_index").await?;
        info!(index = %index, "Index created");
        Ok(responses::parse_acknowledged(&body))
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await?;

        let body = Self::read_json(response, "delete_index").await?;
        info!(index = %index, "Index deleted");
        Ok(responses::parse_acknowledged(&body))
    }

    #[instrument(skip(self))]
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchError::ServerError {
                status,
                reason: format!("unexpected status checking index '{}'", index),
            }),
        }
    }

    #[instrument(skip(self))]
    async fn refresh_index(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await?;

        Self::read_json(response, "refresh_index").await?;
        debug!(index = %index, "Index refreshed");
        Ok(())
    }

    #[instrument(skip(self, document))]
    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        document: &Document,
        guard: Option<VersionGuard>,
    ) -> Result<WriteAck, SearchError> {
        let parts = match id {
            Some(id) => IndexParts::IndexId(index, id),
            None => IndexParts::Index(index),
        };

        let mut request = self.client.index(parts).body(document);
        if let Some(guard) = guard {
            request = request
                .if_seq_no(guard.seq_no)
                .if_primary_term(guard.primary_term);
        }
        if let Some(refresh) = self.refresh_param() {
            request = request.refresh(refresh);
        }

        let response = request.send().await?;
        let ack = responses::parse_write_ack(Self::read_json(response, "index_document").await?)?;

        debug!(index = %index, id = %ack.id, result = ?ack.result, "Document indexed");
        Ok(ack)
    }

    #[instrument(skip(self))]
    async fn get_document(
        &self,
        index: &str,
        id: &str,
        fields: Option<&[String]>,
    ) -> Result<DocumentRecord, SearchError> {
        let includes: Vec<&str> = fields
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .collect();

        let mut request = self.client.get(GetParts::IndexId(index, id));
        if !includes.is_empty() {
            request = request._source_includes(&includes);
        }

        let response = request.send().await?;
        responses::parse_document(Self::read_json(response, "get_document").await?)
    }

    #[instrument(skip(self, body))]
    async fn update_document(
        &self,
        index: &str,
        id: &str,
        body: &Value,
    ) -> Result<WriteAck, SearchError> {
        let mut request = self.client.update(UpdateParts::IndexId(index, id)).body(body);
        if let Some(refresh) = self.refresh_param() {
            request = request.refresh(refresh);
        }

        let response = request.send().await?;
        let ack = responses::parse_write_ack(Self::read_json(response, "update_document").await?)?;

        debug!(index = %index, id = %id, result = ?ack.result, "Document updated");
        Ok(ack)
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, index: &str, id: &str) -> Result<WriteAck, SearchError> {
        let mut request = self.client.delete(DeleteParts::IndexId(index, id));
        if let Some(refresh) = self.refresh_param() {
            request = request.refresh(refresh);
        }

        let response = request.send().await?;
        let ack = responses::parse_write_ack(Self::read_json(response, "delete_document").await?)?;

        debug!(index = %index, id = %id, "Document deleted");
        Ok(ack)
    }

    #[instrument(skip(self, body))]
    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await?;

        let body = Self::read_json(response, "search").await?;
        let result = responses::parse_search_response(&body)?;

        debug!(index = %index, total = result.total, returned = result.hits.len(), "Search completed");
        Ok(result)
    }

    #[instrument(skip(self, body))]
    async fn count(&self, index: &str, body: &Value) -> Result<u64, SearchError> {
        let response = self
            .client
            .count(CountParts::Index(&[index]))
            .body(body)
            .send()
            .await?;

        responses::parse_count(&Self::read_json(response, "count").await?)
    }

    #[instrument(skip(self), fields(requested = ids.len()))]
    async fn multi_get(
        &self,
        index: &str,
        ids: &[String],
    ) -> Result<Vec<DocumentRecord>, SearchError> {
        let response = self
            .client
            .mget(MgetParts::Index(index))
            .body(json!({ "ids": ids }))
            .send()
            .await?;

        let records = responses::parse_multi_get(Self::read_json(response, "multi_get").await?)?;
        debug!(index = %index, found = records.len(), "Multi-get completed");
        Ok(records)
    }

    #[instrument(skip(self, body))]
    async fn update_by_query(
        &self,
        index: &str,
        body: &Value,
    ) -> Result<UpdateByQuerySummary, SearchError> {
        // Proceed past version conflicts so the response reports how far the
        // update got instead of aborting with a bare 409
        let mut request = self
            .client
            .update_by_query(UpdateByQueryParts::Index(&[index]))
            .conflicts(Conflicts::Proceed)
            .body(body);
        if self.refresh != RefreshPolicy::None {
            request = request.refresh(true);
        }

        // Per-document failures set a failure status but keep the counts, so
        // the body is read whatever the status
        let response = request.send().await?;
        let status = response.status_code();
        let text = response.text().await?;

        let result = responses::parse_update_by_query_response(status.as_u16(), &text);
        if let Err(err) = &result {
            if err.is_not_found() {
                debug!(status = %status, "Update by query target not found");
            } else {
                error!(status = %status, body = %text, "Update by query failed");
            }
        }
        result
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await?;

        let body = Self::read_json(response, "health_check").await?;
        let healthy = responses::parse_health(&body);
        debug!(status = %body["status"], healthy, "Cluster health checked");
        Ok(healthy)
    }
}

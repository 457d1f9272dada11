//! Search backend trait definition.
//!
//! This module defines the abstract interface to the remote search service,
//! allowing the facade to run against OpenSearch or a test double.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use docsearch_shared::{
    Document, DocumentRecord, SearchResponse, UpdateByQuerySummary, VersionGuard, WriteAck,
};

/// Abstracts the remote search service.
///
/// Each method is exactly one remote round trip. Request bodies arrive fully
/// shaped; implementations forward them and map the response. Non-success
/// responses must be mapped with [`SearchError::from_response`] so that every
/// backend reports the same error kinds.
///
/// Implementations must be `Send + Sync` so the facade can be shared across
/// tasks.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Create an index from a settings/mappings body.
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - The service's `acknowledged` flag
    /// * `Err(SearchError::Conflict)` - If the index already exists
    async fn create_index(&self, index: &str, body: &Value) -> Result<bool, SearchError>;

    /// Delete an index.
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - The service's `acknowledged` flag
    /// * `Err(SearchError::IndexNotFound)` - If the index does not exist
    async fn delete_index(&self, index: &str) -> Result<bool, SearchError>;

    /// Check whether an index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// Make all pending changes of an index visible to search.
    async fn refresh_index(&self, index: &str) -> Result<(), SearchError>;

    /// Write a whole document, creating or replacing it.
    ///
    /// When `id` is `None` the service assigns one. When `guard` is given the
    /// write only succeeds if the stored document still has that sequence
    /// number and primary term; otherwise `SearchError::Conflict` is returned.
    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        document: &Document,
        guard: Option<VersionGuard>,
    ) -> Result<WriteAck, SearchError>;

    /// Fetch a document, optionally restricted to the named top-level fields.
    async fn get_document(
        &self,
        index: &str,
        id: &str,
        fields: Option<&[String]>,
    ) -> Result<DocumentRecord, SearchError>;

    /// Apply an update body (`{"doc": ...}` or `{"script": ...}`) to one document.
    async fn update_document(
        &self,
        index: &str,
        id: &str,
        body: &Value,
    ) -> Result<WriteAck, SearchError>;

    /// Delete a document.
    async fn delete_document(&self, index: &str, id: &str) -> Result<WriteAck, SearchError>;

    /// Execute a search body.
    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, SearchError>;

    /// Count the documents matching a query body.
    async fn count(&self, index: &str, body: &Value) -> Result<u64, SearchError>;

    /// Fetch several documents in one round trip. Ids that are not found are
    /// omitted from the result.
    async fn multi_get(&self, index: &str, ids: &[String])
        -> Result<Vec<DocumentRecord>, SearchError>;

    /// Apply a script to every document matching a query.
    async fn update_by_query(
        &self,
        index: &str,
        body: &Value,
    ) -> Result<UpdateByQuerySummary, SearchError>;

    /// Check if the search service is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the cluster status is green or yellow
    /// * `Ok(false)` - If the cluster status is red
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}

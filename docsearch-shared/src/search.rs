//! Search results and bulk mutation summaries.

use serde::{Deserialize, Serialize};

use crate::Document;

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    /// Relevance score; absent when the query does not score (e.g. sorted or
    /// filter-only searches).
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Document,
}

/// The result of a search request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    /// Total number of matching documents (may exceed `hits.len()`).
    pub total: u64,
    pub max_score: Option<f64>,
    pub took_ms: u64,
    /// Matching documents, ordered by the service.
    pub hits: Vec<SearchHit>,
}

/// Outcome of an update-by-query request.
///
/// Update-by-query is not transactional: some matched documents may have been
/// updated before a failure. The counts below report exactly how far it got.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateByQuerySummary {
    /// Number of documents matched by the query.
    pub total: u64,
    /// Number of documents actually updated.
    pub updated: u64,
    /// Number of documents the script left unchanged.
    pub noops: u64,
    /// Number of documents skipped because of concurrent modification.
    pub version_conflicts: u64,
    /// Per-document or per-shard failure reasons.
    pub failures: Vec<String>,
}

impl UpdateByQuerySummary {
    /// True when every matched document was processed without failure.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
            && self.version_conflicts == 0
            && self.updated + self.noops == self.total
    }
}

//! Search client facade.
//!
//! This module provides the main client for working with a document-search
//! service. Application code uses it to administer indices, write and read
//! documents, mutate single fields and elements, and run searches.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::elements::{self, ElementOp};
use crate::errors::SearchError;
use crate::interfaces::SearchBackend;
use crate::opensearch::{queries, scripts, OpenSearchBackend};
use crate::types::{BoolQuery, ElementSelector};
use docsearch_shared::{
    Document, DocumentRecord, IndexSettings, Script, SearchResponse, UpdateByQuerySummary,
    WriteAck, WriteResult,
};

/// Characters the service refuses in index names.
const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ' ', ':'];

/// The main client for working with the search service.
///
/// The client holds no document or index state between calls; every
/// operation is an independent request to the backend. It is `Send + Sync`
/// and can be shared behind an `Arc`.
pub struct SearchClient {
    backend: Box<dyn SearchBackend>,
    config: ClientConfig,
}

impl SearchClient {
    /// Create a new SearchClient with default configuration.
    pub fn new(backend: Box<dyn SearchBackend>) -> Self {
        Self {
            backend,
            config: ClientConfig::default(),
        }
    }

    /// Create a new SearchClient with custom configuration.
    pub fn with_config(backend: Box<dyn SearchBackend>, config: ClientConfig) -> Self {
        Self { backend, config }
    }

    /// Create a SearchClient backed by OpenSearch at the configured address.
    pub fn connect(config: ClientConfig) -> Result<Self, SearchError> {
        let backend = OpenSearchBackend::new(&config)?;
        Ok(Self::with_config(Box::new(backend), config))
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create an index.
    /// Input: index name, optional settings (defaults: 3 shards, 2 replicas, no mappings)
    /// Output: Result<bool, SearchError> (the service's acknowledgement)
    pub async fn create_index(
        &self,
        index: &str,
        settings: Option<IndexSettings>,
    ) -> Result<bool, SearchError> {
        validate_index_name(index)?;

        let settings = settings.unwrap_or_default();
        self.backend.create_index(index, &settings.to_body()).await
    }

    /// Delete an index. A missing index is reported as `IndexNotFound`.
    pub async fn delete_index(&self, index: &str) -> Result<bool, SearchError> {
        validate_index_name(index)?;
        self.backend.delete_index(index).await
    }

    /// Check whether an index exists.
    pub async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        validate_index_name(index)?;
        self.backend.index_exists(index).await
    }

    /// Make all pending changes of an index visible to search.
    pub async fn refresh_index(&self, index: &str) -> Result<(), SearchError> {
        validate_index_name(index)?;
        self.backend.refresh_index(index).await
    }

    /// Create (or replace) a document.
    /// Input: index name, document payload, optional id (service-assigned when omitted)
    /// Output: Result<WriteAck, SearchError> (carries the assigned id)
    pub async fn create_document(
        &self,
        index: &str,
        document: &Document,
        id: Option<&str>,
    ) -> Result<WriteAck, SearchError> {
        validate_index_name(index)?;
        if let Some(id) = id {
            validate_id(id)?;
        }

        self.backend.index_document(index, id, document, None).await
    }

    /// Fetch a document, optionally restricted to the named top-level fields.
    pub async fn get_document(
        &self,
        index: &str,
        id: &str,
        fields: Option<&[String]>,
    ) -> Result<DocumentRecord, SearchError> {
        validate_index_name(index)?;
        validate_id(id)?;

        self.backend.get_document(index, id, fields).await
    }

    /// Merge a partial field mapping into an existing document.
    ///
    /// Fields not named in `partial` are preserved.
    pub async fn update_document(
        &self,
        index: &str,
        id: &str,
        partial: &Document,
    ) -> Result<WriteAck, SearchError> {
        validate_index_name(index)?;
        validate_id(id)?;
        if partial.is_empty() {
            return Err(SearchError::invalid_request("partial update has no fields"));
        }

        self.backend
            .update_document(index, id, &scripts::partial_update_body(partial))
            .await
    }

    /// Delete a document. A missing document is reported as `DocumentNotFound`.
    pub async fn delete_document(&self, index: &str, id: &str) -> Result<WriteAck, SearchError> {
        validate_index_name(index)?;
        validate_id(id)?;

        self.backend.delete_document(index, id).await
    }

    /// Set one top-level field with a server-side script.
    ///
    /// The field name and value are bound as script parameters.
    pub async fn set_field(
        &self,
        index: &str,
        id: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<WriteAck, SearchError> {
        validate_index_name(index)?;
        validate_id(id)?;
        scripts::validate_field_name(field)?;

        let script = scripts::set_field_script(field, value.into());
        self.backend
            .update_document(index, id, &scripts::script_update_body(&script)?)
            .await
    }

    /// Remove one top-level field with a server-side script.
    ///
    /// An absent field is reported as `FieldNotFound`.
    pub async fn delete_field(
        &self,
        index: &str,
        id: &str,
        field: &str,
    ) -> Result<WriteAck, SearchError> {
        validate_index_name(index)?;
        validate_id(id)?;
        scripts::validate_field_name(field)?;

        let script = scripts::delete_field_script(field);
        let ack = self
            .backend
            .update_document(index, id, &scripts::script_update_body(&script)?)
            .await?;

        if ack.result == WriteResult::Noop {
            return Err(SearchError::field_not_found(index, id, field));
        }
        Ok(ack)
    }

    /// Add an element to the object or array field at `path`.
    ///
    /// Arrays get the element appended unless an equal element is already
    /// present; objects get the members of `element` merged in. A missing
    /// field is created.
    pub async fn upsert_object_element(
        &self,
        index: &str,
        id: &str,
        path: &str,
        element: Value,
    ) -> Result<WriteAck, SearchError> {
        self.mutate_element(index, id, path, ElementOp::Upsert(element))
            .await
    }

    /// Remove the selected element of the object or array field at `path`.
    pub async fn remove_object_element(
        &self,
        index: &str,
        id: &str,
        path: &str,
        selector: ElementSelector,
    ) -> Result<WriteAck, SearchError> {
        self.mutate_element(index, id, path, ElementOp::Remove(selector))
            .await
    }

    /// Replace the selected element of the object or array field at `path`.
    pub async fn replace_object_element(
        &self,
        index: &str,
        id: &str,
        path: &str,
        selector: ElementSelector,
        element: Value,
    ) -> Result<WriteAck, SearchError> {
        self.mutate_element(index, id, path, ElementOp::Replace(selector, element))
            .await
    }

    /// Read-modify-write of one element, guarded by the version of the read.
    ///
    /// If another writer changes the document between the read and the
    /// write, the write fails with `Conflict` instead of overwriting it.
    async fn mutate_element(
        &self,
        index: &str,
        id: &str,
        path: &str,
        op: ElementOp,
    ) -> Result<WriteAck, SearchError> {
        validate_index_name(index)?;
        validate_id(id)?;
        if path.is_empty() {
            return Err(SearchError::invalid_request("element path is empty"));
        }

        let record = self.backend.get_document(index, id, None).await?;
        let guard = record.version_guard();
        if guard.is_none() {
            warn!(index = %index, id = %id, "Read returned no version token; write-back is unguarded");
        }

        let updated = elements::apply(record.source, path, op)?;
        let ack = self
            .backend
            .index_document(index, Some(id), &updated, guard)
            .await?;

        debug!(index = %index, id = %id, path = %path, "Element mutated");
        Ok(ack)
    }

    /// Run a caller-built search body. The body is sent unmodified.
    pub async fn search_by_query(
        &self,
        index: &str,
        body: &Value,
    ) -> Result<SearchResponse, SearchError> {
        validate_index_name(index)?;
        if !body.is_object() {
            return Err(SearchError::invalid_request("search body must be a JSON object"));
        }

        self.backend.search(index, body).await
    }

    /// Fetch every document of an index, capped at `max_result_size`.
    pub async fn get_all_documents(&self, index: &str) -> Result<SearchResponse, SearchError> {
        validate_index_name(index)?;

        let body = queries::build_match_all_query(self.config.max_result_size);
        self.backend.search(index, &body).await
    }

    /// Fetch documents whose `field` matches `value`.
    pub async fn get_documents_by_field(
        &self,
        index: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<SearchResponse, SearchError> {
        validate_index_name(index)?;
        validate_query_field(field)?;

        let body = queries::build_field_query(field, value, self.config.max_result_size);
        self.backend.search(index, &body).await
    }

    /// Fetch documents whose `field` lies within `[gte, lte]`, both bounds inclusive.
    pub async fn get_documents_in_range(
        &self,
        index: &str,
        field: &str,
        gte: impl Into<Value>,
        lte: impl Into<Value>,
    ) -> Result<SearchResponse, SearchError> {
        validate_index_name(index)?;
        validate_query_field(field)?;

        let body = queries::build_range_query(field, gte, lte, self.config.max_result_size);
        self.backend.search(index, &body).await
    }

    /// Fetch documents with an exact, non-scoring term filter.
    pub async fn filter_by_term(
        &self,
        index: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<SearchResponse, SearchError> {
        validate_index_name(index)?;
        validate_query_field(field)?;

        let body = queries::build_term_filter_query(field, value, self.config.max_result_size);
        self.backend.search(index, &body).await
    }

    /// Fetch documents matching a boolean combination of clauses.
    pub async fn combine_queries(
        &self,
        index: &str,
        query: &BoolQuery,
    ) -> Result<SearchResponse, SearchError> {
        validate_index_name(index)?;
        // An empty bool query would match every document
        if query.is_empty() {
            return Err(SearchError::invalid_request("bool query has no clauses"));
        }

        let body = queries::build_bool_query(query, self.config.max_result_size);
        self.backend.search(index, &body).await
    }

    /// Apply `script` to every document matching the query clause `query`.
    ///
    /// Not transactional. The summary reports how many documents matched and
    /// how many were actually updated; check `is_complete()`.
    pub async fn update_by_query(
        &self,
        index: &str,
        query: &Value,
        script: &Script,
    ) -> Result<UpdateByQuerySummary, SearchError> {
        validate_index_name(index)?;
        if !query.is_object() {
            return Err(SearchError::invalid_request("query must be a JSON object"));
        }
        if script.source.trim().is_empty() {
            return Err(SearchError::invalid_request("script source is empty"));
        }

        let body = scripts::update_by_query_body(query, script)?;
        self.backend.update_by_query(index, &body).await
    }

    /// Count documents whose `field` matches `value`.
    pub async fn count_by_query(
        &self,
        index: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<u64, SearchError> {
        validate_index_name(index)?;
        validate_query_field(field)?;

        self.backend
            .count(index, &queries::build_count_query(field, value))
            .await
    }

    /// Fetch several documents in one round trip; ids that are not found are
    /// left out of the result.
    pub async fn get_multiple(
        &self,
        index: &str,
        ids: &[String],
    ) -> Result<Vec<DocumentRecord>, SearchError> {
        validate_index_name(index)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        for id in ids {
            validate_id(id)?;
        }

        self.backend.multi_get(index, ids).await
    }

    /// Check if the search service is healthy and reachable.
    pub async fn health_check(&self) -> Result<bool, SearchError> {
        self.backend.health_check().await
    }
}

/// Check an index name against the service's naming rules.
fn validate_index_name(index: &str) -> Result<(), SearchError> {
    if index.is_empty() {
        return Err(SearchError::invalid_request("index name is required"));
    }
    if index == "." || index == ".." {
        return Err(SearchError::invalid_request(format!(
            "index name '{}' is reserved",
            index
        )));
    }
    if index.starts_with(['-', '_', '+']) {
        return Err(SearchError::invalid_request(format!(
            "index name '{}' must not start with '-', '_' or '+'",
            index
        )));
    }
    if index.chars().any(|c| c.is_uppercase() || FORBIDDEN_INDEX_CHARS.contains(&c)) {
        return Err(SearchError::invalid_request(format!(
            "index name '{}' must be lowercase without special characters",
            index
        )));
    }
    Ok(())
}

fn validate_id(id: &str) -> Result<(), SearchError> {
    if id.is_empty() {
        return Err(SearchError::invalid_request("document id is required"));
    }
    Ok(())
}

/// Query fields may be dotted paths into objects, unlike script fields.
fn validate_query_field(field: &str) -> Result<(), SearchError> {
    if field.is_empty() || field.split('.').any(str::is_empty) {
        return Err(SearchError::invalid_request(format!(
            "invalid field name '{}'",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docsearch_shared::{FieldType, SearchHit, VersionGuard};
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct StoredDocument {
        source: Document,
        seq_no: i64,
    }

    /// In-memory stand-in for the search service.
    ///
    /// Understands the query clauses and scripts the facade emits, and
    /// records every request body it receives.
    #[derive(Clone, Default)]
    struct MockBackend {
        indices: Arc<Mutex<HashMap<String, BTreeMap<String, StoredDocument>>>>,
        requests: Arc<Mutex<Vec<(&'static str, Value)>>>,
        remote_calls: Arc<AtomicI64>,
        next_seq_no: Arc<AtomicI64>,
        concurrent_write_after_get: Arc<AtomicBool>,
    }

    impl MockBackend {
        fn new() -> Self {
            Self::default()
        }

        async fn record(&self, operation: &'static str, body: Value) {
            self.remote_calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().await.push((operation, body));
        }

        async fn last_request(&self, operation: &str) -> Option<Value> {
            self.requests
                .lock()
                .await
                .iter()
                .rev()
                .find(|(op, _)| *op == operation)
                .map(|(_, body)| body.clone())
        }

        fn seq_no(&self) -> i64 {
            self.next_seq_no.fetch_add(1, Ordering::SeqCst)
        }

        fn ack(index: &str, id: &str, result: WriteResult, seq_no: i64) -> WriteAck {
            WriteAck {
                index: index.to_string(),
                id: id.to_string(),
                result,
                version: Some(seq_no + 1),
                seq_no: Some(seq_no),
                primary_term: Some(1),
            }
        }

        fn tokens(text: &str) -> Vec<String> {
            text.split_whitespace().map(str::to_lowercase).collect()
        }

        fn matches(source: &Document, clause: &Value) -> bool {
            let Some((kind, inner)) = clause.as_object().and_then(|c| c.iter().next()) else {
                return false;
            };
            let field_entry = inner.as_object().and_then(|s| s.iter().next());
            match kind.as_str() {
                "match_all" => true,
                // Analyzed text: any shared token matches
                "match" => field_entry.is_some_and(|(field, expected)| {
                    match (source.get(field), expected) {
                        (Some(Value::String(actual)), Value::String(wanted)) => {
                            let tokens = Self::tokens(actual);
                            Self::tokens(wanted).iter().any(|token| tokens.contains(token))
                        }
                        (Some(actual), wanted) => actual == wanted,
                        (None, _) => false,
                    }
                }),
                "match_phrase" => field_entry.is_some_and(|(field, expected)| {
                    match (source.get(field), expected) {
                        (Some(Value::String(actual)), Value::String(wanted)) => {
                            let phrase = Self::tokens(wanted);
                            !phrase.is_empty()
                                && Self::tokens(actual)
                                    .windows(phrase.len())
                                    .any(|window| window == phrase.as_slice())
                        }
                        (Some(actual), wanted) => actual == wanted,
                        (None, _) => false,
                    }
                }),
                "term" => field_entry
                    .is_some_and(|(field, expected)| source.get(field) == Some(expected)),
                "range" => field_entry.is_some_and(|(field, bounds)| {
                    let Some(actual) = source.get(field).and_then(Value::as_f64) else {
                        return false;
                    };
                    let above = bounds["gte"].as_f64().map_or(true, |gte| actual >= gte);
                    let below = bounds["lte"].as_f64().map_or(true, |lte| actual <= lte);
                    above && below
                }),
                "bool" => {
                    let list = |name: &str| -> Vec<Value> {
                        match &inner[name] {
                            Value::Array(items) => items.clone(),
                            Value::Null => Vec::new(),
                            single => vec![single.clone()],
                        }
                    };
                    let must = list("must");
                    let filter = list("filter");
                    let must_not = list("must_not");
                    let should = list("should");
                    let required_should = inner["minimum_should_match"].as_u64().unwrap_or(
                        if must.is_empty() && filter.is_empty() && !should.is_empty() {
                            1
                        } else {
                            0
                        },
                    );
                    must.iter().chain(filter.iter()).all(|c| Self::matches(source, c))
                        && !must_not.iter().any(|c| Self::matches(source, c))
                        && should.iter().filter(|c| Self::matches(source, c)).count() as u64
                            >= required_should
                }
                _ => false,
            }
        }

        fn apply_script(source: &mut Document, script: &Value) -> Result<WriteResult, SearchError> {
            let field = script["params"]["field"].as_str().unwrap_or_default().to_string();
            let code = script["source"].as_str().unwrap_or_default();
            if code.contains("remove(params.field)") {
                Ok(match source.remove(&field) {
                    Some(_) => WriteResult::Updated,
                    None => WriteResult::Noop,
                })
            } else if code.contains("ctx._source[params.field] = params.value") {
                source.insert(field, script["params"]["value"].clone());
                Ok(WriteResult::Updated)
            } else {
                Err(SearchError::invalid_request("unsupported script"))
            }
        }
    }

    #[async_trait]
    impl SearchBackend for MockBackend {
        async fn create_index(&self, index: &str, body: &Value) -> Result<bool, SearchError> {
            self.record("create_index", body.clone()).await;
            let mut indices = self.indices.lock().await;
            if indices.contains_key(index) {
                return Err(SearchError::conflict(format!("index [{}] already exists", index)));
            }
            indices.insert(index.to_string(), BTreeMap::new());
            Ok(true)
        }

        async fn delete_index(&self, index: &str) -> Result<bool, SearchError> {
            self.record("delete_index", json!({ "index": index })).await;
            match self.indices.lock().await.remove(index) {
                Some(_) => Ok(true),
                None => Err(SearchError::index_not_found(index)),
            }
        }

        async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
            self.record("index_exists", json!({ "index": index })).await;
            Ok(self.indices.lock().await.contains_key(index))
        }

        async fn refresh_index(&self, index: &str) -> Result<(), SearchError> {
            self.record("refresh_index", json!({ "index": index })).await;
            if !self.indices.lock().await.contains_key(index) {
                return Err(SearchError::index_not_found(index));
            }
            Ok(())
        }

        async fn index_document(
            &self,
            index: &str,
            id: Option<&str>,
            document: &Document,
            guard: Option<VersionGuard>,
        ) -> Result<WriteAck, SearchError> {
            self.record(
                "index_document",
                json!({ "id": id, "document": document, "guard": guard }),
            )
            .await;
            let seq_no = self.seq_no();
            let mut indices = self.indices.lock().await;
            let docs = indices
                .get_mut(index)
                .ok_or_else(|| SearchError::index_not_found(index))?;

            let id = id
                .map(str::to_string)
                .unwrap_or_else(|| format!("generated-{}", seq_no));
            if let Some(guard) = guard {
                let current = docs.get(&id).map(|d| d.seq_no);
                if current != Some(guard.seq_no) {
                    return Err(SearchError::conflict(format!(
                        "[{}]: version conflict, required seqNo [{}]",
                        id, guard.seq_no
                    )));
                }
            }

            let result = if docs.contains_key(&id) {
                WriteResult::Updated
            } else {
                WriteResult::Created
            };
            docs.insert(
                id.clone(),
                StoredDocument {
                    source: document.clone(),
                    seq_no,
                },
            );
            Ok(Self::ack(index, &id, result, seq_no))
        }

        async fn get_document(
            &self,
            index: &str,
            id: &str,
            fields: Option<&[String]>,
        ) -> Result<DocumentRecord, SearchError> {
            self.record("get_document", json!({ "id": id, "fields": fields }))
                .await;
            let mut indices = self.indices.lock().await;
            let docs = indices
                .get_mut(index)
                .ok_or_else(|| SearchError::index_not_found(index))?;
            let stored = docs
                .get_mut(id)
                .ok_or_else(|| SearchError::document_not_found(index, id))?;

            let source = match fields {
                Some(fields) if !fields.is_empty() => stored
                    .source
                    .iter()
                    .filter(|(name, _)| fields.contains(name))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
                _ => stored.source.clone(),
            };
            let record = DocumentRecord {
                index: index.to_string(),
                id: id.to_string(),
                version: Some(stored.seq_no + 1),
                seq_no: Some(stored.seq_no),
                primary_term: Some(1),
                source,
            };

            if self.concurrent_write_after_get.load(Ordering::SeqCst) {
                stored.seq_no = self.seq_no();
            }
            Ok(record)
        }

        async fn update_document(
            &self,
            index: &str,
            id: &str,
            body: &Value,
        ) -> Result<WriteAck, SearchError> {
            self.record("update_document", body.clone()).await;
            let seq_no = self.seq_no();
            let mut indices = self.indices.lock().await;
            let docs = indices
                .get_mut(index)
                .ok_or_else(|| SearchError::index_not_found(index))?;
            let stored = docs
                .get_mut(id)
                .ok_or_else(|| SearchError::document_not_found(index, id))?;

            let result = if let Some(partial) = body["doc"].as_object() {
                for (field, value) in partial {
                    stored.source.insert(field.clone(), value.clone());
                }
                WriteResult::Updated
            } else {
                Self::apply_script(&mut stored.source, &body["script"])?
            };
            if result == WriteResult::Updated {
                stored.seq_no = seq_no;
            }
            Ok(Self::ack(index, id, result, stored.seq_no))
        }

        async fn delete_document(&self, index: &str, id: &str) -> Result<WriteAck, SearchError> {
            self.record("delete_document", json!({ "id": id })).await;
            let seq_no = self.seq_no();
            let mut indices = self.indices.lock().await;
            let docs = indices
                .get_mut(index)
                .ok_or_else(|| SearchError::index_not_found(index))?;
            docs.remove(id)
                .ok_or_else(|| SearchError::document_not_found(index, id))?;
            Ok(Self::ack(index, id, WriteResult::Deleted, seq_no))
        }

        async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, SearchError> {
            self.record("search", body.clone()).await;
            let indices = self.indices.lock().await;
            let docs = indices
                .get(index)
                .ok_or_else(|| SearchError::index_not_found(index))?;

            let size = body["size"].as_u64().unwrap_or(10) as usize;
            let matching: Vec<SearchHit> = docs
                .iter()
                .filter(|(_, doc)| Self::matches(&doc.source, &body["query"]))
                .map(|(id, doc)| SearchHit {
                    index: index.to_string(),
                    id: id.clone(),
                    score: Some(1.0),
                    source: doc.source.clone(),
                })
                .collect();

            Ok(SearchResponse {
                total: matching.len() as u64,
                max_score: matching.first().map(|_| 1.0),
                took_ms: 1,
                hits: matching.into_iter().take(size).collect(),
            })
        }

        async fn count(&self, index: &str, body: &Value) -> Result<u64, SearchError> {
            self.record("count", body.clone()).await;
            let indices = self.indices.lock().await;
            let docs = indices
                .get(index)
                .ok_or_else(|| SearchError::index_not_found(index))?;
            Ok(docs
                .values()
                .filter(|doc| Self::matches(&doc.source, &body["query"]))
                .count() as u64)
        }

        async fn multi_get(
            &self,
            index: &str,
            ids: &[String],
        ) -> Result<Vec<DocumentRecord>, SearchError> {
            self.record("multi_get", json!({ "ids": ids })).await;
            let indices = self.indices.lock().await;
            let docs = indices
                .get(index)
                .ok_or_else(|| SearchError::index_not_found(index))?;
            Ok(ids
                .iter()
                .filter_map(|id| {
                    docs.get(id).map(|doc| DocumentRecord {
                        index: index.to_string(),
                        id: id.clone(),
                        version: Some(doc.seq_no + 1),
                        seq_no: Some(doc.seq_no),
                        primary_term: Some(1),
                        source: doc.source.clone(),
                    })
                })
                .collect())
        }

        async fn update_by_query(
            &self,
            index: &str,
            body: &Value,
        ) -> Result<UpdateByQuerySummary, SearchError> {
            self.record("update_by_query", body.clone()).await;
            let mut indices = self.indices.lock().await;
            let docs = indices
                .get_mut(index)
                .ok_or_else(|| SearchError::index_not_found(index))?;

            let mut summary = UpdateByQuerySummary::default();
            for (id, doc) in docs.iter_mut() {
                if !Self::matches(&doc.source, &body["query"]) {
                    continue;
                }
                summary.total += 1;
                match Self::apply_script(&mut doc.source, &body["script"]) {
                    Ok(WriteResult::Noop) => summary.noops += 1,
                    Ok(_) => summary.updated += 1,
                    Err(e) => summary.failures.push(format!("id={}: {}", id, e)),
                }
            }
            Ok(summary)
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    async fn client_with_index(index: &str) -> (SearchClient, MockBackend) {
        let backend = MockBackend::new();
        let client = SearchClient::new(Box::new(backend.clone()));
        client.create_index(index, None).await.unwrap();
        (client, backend)
    }

    #[tokio::test]
    async fn test_create_index_defaults() {
        let (_, backend) = client_with_index("t1").await;

        let body = backend.last_request("create_index").await.unwrap();
        assert_eq!(body["settings"]["number_of_shards"], 3);
        assert_eq!(body["settings"]["number_of_replicas"], 2);
    }

    #[tokio::test]
    async fn test_create_index_with_settings() {
        let backend = MockBackend::new();
        let client = SearchClient::new(Box::new(backend.clone()));

        let settings = IndexSettings::new(5, 1)
            .with_mapping("field1", FieldType::Text)
            .with_mapping("field3", FieldType::Integer);
        assert!(client.create_index("t2", Some(settings)).await.unwrap());

        let body = backend.last_request("create_index").await.unwrap();
        assert_eq!(body["settings"]["number_of_shards"], 5);
        assert_eq!(body["mappings"]["properties"]["field3"]["type"], "integer");
    }

    #[tokio::test]
    async fn test_create_existing_index_is_conflict() {
        let (client, _) = client_with_index("t1").await;

        let err = client.create_index("t1", None).await.unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_invalid_index_names_never_reach_backend() {
        let backend = MockBackend::new();
        let client = SearchClient::new(Box::new(backend.clone()));

        for name in ["", "Upper", "a/b", "with space", "_hidden", "..", "a,b"] {
            let err = client.create_index(name, None).await.unwrap_err();
            assert!(matches!(err, SearchError::InvalidRequest(_)), "{}", name);
        }
        assert_eq!(backend.remote_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_deleted_index_is_not_found_for_search() {
        let (client, _) = client_with_index("t1").await;

        client.delete_index("t1").await.unwrap();
        let err = client.get_all_documents("t1").await.unwrap_err();

        assert_eq!(err, SearchError::IndexNotFound("t1".to_string()));
        assert!(!client.index_exists("t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_index_is_surfaced() {
        let client = SearchClient::new(Box::new(MockBackend::new()));

        let err = client.delete_index("missing").await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_document_round_trip() {
        let (client, _) = client_with_index("t1").await;
        let document = doc(json!({"field1": "value1", "field2": "value2"}));

        let ack = client.create_document("t1", &document, Some("1")).await.unwrap();
        let record = client.get_document("t1", "1", None).await.unwrap();

        assert_eq!(ack.id, "1");
        assert_eq!(ack.result, WriteResult::Created);
        assert_eq!(record.source, document);
    }

    #[tokio::test]
    async fn test_create_document_without_id_gets_assigned_id() {
        let (client, _) = client_with_index("t1").await;

        let ack = client
            .create_document("t1", &doc(json!({"a": 1})), None)
            .await
            .unwrap();

        assert!(!ack.id.is_empty());
        let record = client.get_document("t1", &ack.id, None).await.unwrap();
        assert_eq!(record.source["a"], 1);
    }

    #[tokio::test]
    async fn test_get_document_field_subset() {
        let (client, backend) = client_with_index("t1").await;
        client
            .create_document("t1", &doc(json!({"field1": "a", "field2": "b"})), Some("1"))
            .await
            .unwrap();

        let fields = vec!["field1".to_string()];
        let record = client.get_document("t1", "1", Some(&fields)).await.unwrap();

        assert_eq!(record.source, doc(json!({"field1": "a"})));
        let request = backend.last_request("get_document").await.unwrap();
        assert_eq!(request["fields"], json!(["field1"]));
    }

    #[tokio::test]
    async fn test_get_missing_document() {
        let (client, _) = client_with_index("t1").await;

        let err = client.get_document("t1", "nope", None).await.unwrap_err();

        assert_eq!(err, SearchError::document_not_found("t1", "nope"));
    }

    #[tokio::test]
    async fn test_update_document_merges_fields() {
        let (client, backend) = client_with_index("t1").await;
        client
            .create_document("t1", &doc(json!({"a": 1, "b": 2})), Some("1"))
            .await
            .unwrap();

        client
            .update_document("t1", "1", &doc(json!({"b": 3})))
            .await
            .unwrap();

        let record = client.get_document("t1", "1", None).await.unwrap();
        assert_eq!(record.source, doc(json!({"a": 1, "b": 3})));
        let body = backend.last_request("update_document").await.unwrap();
        assert_eq!(body, json!({"doc": {"b": 3}}));
    }

    #[tokio::test]
    async fn test_update_document_rejects_empty_partial() {
        let (client, _) = client_with_index("t1").await;

        let err = client
            .update_document("t1", "1", &Document::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_delete_document() {
        let (client, _) = client_with_index("t1").await;
        client
            .create_document("t1", &doc(json!({"a": 1})), Some("1"))
            .await
            .unwrap();

        let ack = client.delete_document("t1", "1").await.unwrap();

        assert_eq!(ack.result, WriteResult::Deleted);
        assert!(client.get_document("t1", "1", None).await.unwrap_err().is_not_found());
        assert!(client.delete_document("t1", "1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_set_field_scenario() {
        let (client, backend) = client_with_index("t1").await;
        client
            .create_document(
                "t1",
                &doc(json!({"field1": "value1", "field2": "value2"})),
                Some("1"),
            )
            .await
            .unwrap();

        client
            .set_field("t1", "1", "field2", "new_value3")
            .await
            .unwrap();

        let record = client.get_document("t1", "1", None).await.unwrap();
        assert_eq!(
            record.source,
            doc(json!({"field1": "value1", "field2": "new_value3"}))
        );

        let body = backend.last_request("update_document").await.unwrap();
        let source = body["script"]["source"].as_str().unwrap();
        assert!(!source.contains("field2"));
        assert!(!source.contains("new_value3"));
        assert_eq!(body["script"]["params"]["field"], "field2");
    }

    #[tokio::test]
    async fn test_set_field_rejects_unsafe_field_name() {
        let (client, backend) = client_with_index("t1").await;
        let calls_before = backend.remote_calls.load(Ordering::SeqCst);

        let err = client
            .set_field("t1", "1", "a = 1; ctx.op", "x")
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::InvalidRequest(_)));
        assert_eq!(backend.remote_calls.load(Ordering::SeqCst), calls_before);
    }

    #[tokio::test]
    async fn test_delete_field() {
        let (client, _) = client_with_index("t1").await;
        client
            .create_document("t1", &doc(json!({"field1": "a", "field2": "b"})), Some("1"))
            .await
            .unwrap();

        client.delete_field("t1", "1", "field1").await.unwrap();

        let record = client.get_document("t1", "1", None).await.unwrap();
        assert_eq!(record.source, doc(json!({"field2": "b"})));
    }

    #[tokio::test]
    async fn test_delete_absent_field_is_not_found() {
        let (client, _) = client_with_index("t1").await;
        client
            .create_document("t1", &doc(json!({"field1": "a"})), Some("1"))
            .await
            .unwrap();

        let err = client.delete_field("t1", "1", "missing").await.unwrap_err();

        assert_eq!(err, SearchError::field_not_found("t1", "1", "missing"));
    }

    #[tokio::test]
    async fn test_element_mutations_are_guarded_writes() {
        let (client, backend) = client_with_index("t1").await;
        client
            .create_document("t1", &doc(json!({"tags": ["a", "b"]})), Some("1"))
            .await
            .unwrap();

        client
            .upsert_object_element("t1", "1", "tags", json!("c"))
            .await
            .unwrap();
        client
            .replace_object_element("t1", "1", "tags", ElementSelector::Equals(json!("a")), json!("A"))
            .await
            .unwrap();
        client
            .remove_object_element("t1", "1", "tags", ElementSelector::Position(1))
            .await
            .unwrap();

        let record = client.get_document("t1", "1", None).await.unwrap();
        assert_eq!(record.source["tags"], json!(["A", "c"]));

        let write = backend.last_request("index_document").await.unwrap();
        assert!(write["guard"]["seq_no"].is_i64());
        assert_eq!(write["guard"]["primary_term"], 1);
    }

    #[tokio::test]
    async fn test_element_mutation_conflicts_with_concurrent_writer() {
        let (client, backend) = client_with_index("t1").await;
        client
            .create_document("t1", &doc(json!({"tags": ["a"]})), Some("1"))
            .await
            .unwrap();
        backend
            .concurrent_write_after_get
            .store(true, Ordering::SeqCst);

        let err = client
            .upsert_object_element("t1", "1", "tags", json!("b"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        backend
            .concurrent_write_after_get
            .store(false, Ordering::SeqCst);
        let record = client.get_document("t1", "1", None).await.unwrap();
        assert_eq!(record.source["tags"], json!(["a"]));
    }

    #[tokio::test]
    async fn test_remove_missing_element() {
        let (client, _) = client_with_index("t1").await;
        client
            .create_document("t1", &doc(json!({"author": {"name": "x"}})), Some("1"))
            .await
            .unwrap();

        let err = client
            .remove_object_element("t1", "1", "author", ElementSelector::Key("age".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::ElementNotFound(_)));
    }

    #[tokio::test]
    async fn test_element_mutation_on_missing_document() {
        let (client, _) = client_with_index("t1").await;

        let err = client
            .upsert_object_element("t1", "404", "tags", json!("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::DocumentNotFound(_)));
    }

    async fn seed_articles(client: &SearchClient) {
        let articles = [
            ("1", json!({"category": "tech", "content": "content 1", "views": 5})),
            ("2", json!({"category": "tech", "content": "content 2", "views": 50})),
            ("3", json!({"category": "news", "content": "content 3", "views": 500})),
        ];
        for (id, body) in articles {
            client
                .create_document("articles", &doc(body), Some(id))
                .await
                .unwrap();
        }
        client.refresh_index("articles").await.unwrap();
    }

    #[tokio::test]
    async fn test_search_by_query_passes_body_through() {
        let (client, backend) = client_with_index("articles").await;
        seed_articles(&client).await;
        let body = json!({"query": {"match_all": {}}, "size": 3, "track_total_hits": true});

        let response = client.search_by_query("articles", &body).await.unwrap();

        assert_eq!(response.hits.len(), 3);
        assert_eq!(backend.last_request("search").await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_search_by_query_rejects_non_object_body() {
        let (client, _) = client_with_index("articles").await;

        let err = client
            .search_by_query("articles", &json!(["match_all"]))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_get_all_documents_is_capped() {
        let backend = MockBackend::new();
        let config = ClientConfig::default().with_max_result_size(2);
        let client = SearchClient::with_config(Box::new(backend.clone()), config);
        client.create_index("articles", None).await.unwrap();
        seed_articles(&client).await;

        let response = client.get_all_documents("articles").await.unwrap();

        assert_eq!(response.total, 3);
        assert_eq!(response.hits.len(), 2);
        let body = backend.last_request("search").await.unwrap();
        assert_eq!(body["size"], 2);
        assert!(body["query"]["match_all"].is_object());
    }

    #[tokio::test]
    async fn test_get_documents_by_field_and_range() {
        let (client, _) = client_with_index("articles").await;
        seed_articles(&client).await;

        let tech = client
            .get_documents_by_field("articles", "category", "tech")
            .await
            .unwrap();
        assert_eq!(tech.total, 2);

        let ranged = client
            .get_documents_in_range("articles", "views", 5, 50)
            .await
            .unwrap();
        let mut ids: Vec<&str> = ranged.hits.iter().map(|h| h.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_filter_by_term() {
        let (client, backend) = client_with_index("articles").await;
        seed_articles(&client).await;

        let response = client
            .filter_by_term("articles", "category", "news")
            .await
            .unwrap();

        assert_eq!(response.hits.len(), 1);
        let body = backend.last_request("search").await.unwrap();
        assert_eq!(body["query"]["bool"]["filter"]["term"]["category"], "news");
    }

    #[tokio::test]
    async fn test_combine_queries_excludes_must_not() {
        let (client, _) = client_with_index("articles").await;
        seed_articles(&client).await;

        let query = BoolQuery::new()
            .must(queries::match_clause("category", "tech"))
            .must_not(json!({"match_phrase": {"content": "content 2"}}));
        let response = client.combine_queries("articles", &query).await.unwrap();

        let ids: Vec<&str> = response.hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[tokio::test]
    async fn test_must_not_match_excludes_any_shared_token() {
        let (client, _) = client_with_index("articles").await;
        seed_articles(&client).await;

        // "content" is shared by every article, so an analyzed match excludes them all
        let query = BoolQuery::new()
            .must(queries::match_clause("category", "tech"))
            .must_not(queries::match_clause("content", "content 2"));
        let response = client.combine_queries("articles", &query).await.unwrap();

        assert!(response.hits.is_empty());
    }

    #[tokio::test]
    async fn test_combine_queries_rejects_empty_query() {
        let (client, backend) = client_with_index("articles").await;
        let calls_before = backend.remote_calls.load(Ordering::SeqCst);

        let err = client
            .combine_queries("articles", &BoolQuery::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::InvalidRequest(_)));
        assert_eq!(backend.remote_calls.load(Ordering::SeqCst), calls_before);
    }

    #[tokio::test]
    async fn test_count_equals_search_length() {
        let (client, backend) = client_with_index("articles").await;
        seed_articles(&client).await;

        let count = client
            .count_by_query("articles", "category", "tech")
            .await
            .unwrap();
        let search = client
            .get_documents_by_field("articles", "category", "tech")
            .await
            .unwrap();

        assert_eq!(count, search.hits.len() as u64);
        let body = backend.last_request("count").await.unwrap();
        assert_eq!(body, json!({"query": {"match": {"category": "tech"}}}));
    }

    #[tokio::test]
    async fn test_update_by_query_reports_counts() {
        let (client, backend) = client_with_index("articles").await;
        seed_articles(&client).await;
        let script = Script::new("ctx._source[params.field] = params.value")
            .param("field", "reviewed")
            .param("value", true);

        let summary = client
            .update_by_query("articles", &queries::match_clause("category", "tech"), &script)
            .await
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.updated, 2);
        assert!(summary.is_complete());
        let body = backend.last_request("update_by_query").await.unwrap();
        assert_eq!(body["query"]["match"]["category"], "tech");
        assert_eq!(body["script"]["params"]["field"], "reviewed");
    }

    #[tokio::test]
    async fn test_update_by_query_surfaces_partial_failure() {
        let (client, _) = client_with_index("articles").await;
        seed_articles(&client).await;

        let summary = client
            .update_by_query(
                "articles",
                &json!({"match_all": {}}),
                &Script::new("ctx._source.unknown()"),
            )
            .await
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.failures.len(), 3);
        assert!(!summary.is_complete());
    }

    #[tokio::test]
    async fn test_get_multiple_omits_missing() {
        let (client, _) = client_with_index("articles").await;
        seed_articles(&client).await;

        let ids = vec!["1".to_string(), "404".to_string(), "3".to_string()];
        let records = client.get_multiple("articles", &ids).await.unwrap();

        let found: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(found, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_get_multiple_empty_makes_no_call() {
        let backend = MockBackend::new();
        let client = SearchClient::new(Box::new(backend.clone()));

        let records = client.get_multiple("articles", &[]).await.unwrap();

        assert!(records.is_empty());
        assert_eq!(backend.remote_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_health_check() {
        let client = SearchClient::new(Box::new(MockBackend::new()));

        assert!(client.health_check().await.unwrap());
    }

    #[test]
    fn test_validate_index_name() {
        assert!(validate_index_name("t1").is_ok());
        assert!(validate_index_name("logs-2024.01").is_ok());
        assert!(validate_index_name("T1").is_err());
        assert!(validate_index_name("-t").is_err());
        assert!(validate_index_name("a*b").is_err());
    }

    #[test]
    fn test_validate_query_field() {
        assert!(validate_query_field("author.name").is_ok());
        assert!(validate_query_field("").is_err());
        assert!(validate_query_field("author.").is_err());
    }
}

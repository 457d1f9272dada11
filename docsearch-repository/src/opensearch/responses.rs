//! OpenSearch response parsing.
//!
//! Turns successful response bodies into the shared data model. Failed
//! responses are mapped by `SearchError::from_response`, except for
//! update-by-query, whose failure bodies still carry the counts.

use serde_json::Value;
use tracing::warn;

use crate::errors::SearchError;
use docsearch_shared::{DocumentRecord, SearchHit, SearchResponse, UpdateByQuerySummary, WriteAck};

/// Read the `acknowledged` flag of an index-level response.
pub fn parse_acknowledged(body: &Value) -> bool {
    body["acknowledged"].as_bool().unwrap_or(false)
}

/// Parse the acknowledgement of a single-document write.
pub fn parse_write_ack(body: Value) -> Result<WriteAck, SearchError> {
    serde_json::from_value(body)
        .map_err(|e| SearchError::parse(format!("Invalid write response: {}", e)))
}

/// Parse a get response, mapping `found: false` to `DocumentNotFound`.
pub fn parse_document(body: Value) -> Result<DocumentRecord, SearchError> {
    if body["found"] == Value::Bool(false) {
        return Err(SearchError::document_not_found(
            body["_index"].as_str().unwrap_or_default(),
            body["_id"].as_str().unwrap_or_default(),
        ));
    }

    serde_json::from_value(body)
        .map_err(|e| SearchError::parse(format!("Invalid get response: {}", e)))
}

/// Parse a search response.
///
/// `hits.total` is either an object (`{"value": n, "relation": ...}`) or, on
/// older clusters, a bare number.
pub fn parse_search_response(body: &Value) -> Result<SearchResponse, SearchError> {
    let hits = body
        .get("hits")
        .ok_or_else(|| SearchError::parse("Search response has no hits section"))?;

    let total = hits["total"]["value"]
        .as_u64()
        .or_else(|| hits["total"].as_u64())
        .unwrap_or(0);

    let parsed_hits = match hits["hits"].as_array() {
        Some(raw_hits) => raw_hits
            .iter()
            .map(|hit| serde_json::from_value::<SearchHit>(hit.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SearchError::parse(format!("Invalid search hit: {}", e)))?,
        None => Vec::new(),
    };

    Ok(SearchResponse {
        total,
        max_score: hits["max_score"].as_f64(),
        took_ms: body["took"].as_u64().unwrap_or(0),
        hits: parsed_hits,
    })
}

/// Parse a count response.
pub fn parse_count(body: &Value) -> Result<u64, SearchError> {
    body["count"]
        .as_u64()
        .ok_or_else(|| SearchError::parse("Count response has no count"))
}

/// Parse a multi-get response, dropping documents that were not found.
///
/// A per-document `error` entry (as opposed to `found: false`) is surfaced
/// as an error rather than dropped.
pub fn parse_multi_get(body: Value) -> Result<Vec<DocumentRecord>, SearchError> {
    let docs = match body {
        Value::Object(mut map) => match map.remove("docs") {
            Some(Value::Array(docs)) => docs,
            _ => return Err(SearchError::parse("Multi-get response has no docs")),
        },
        _ => return Err(SearchError::parse("Multi-get response is not an object")),
    };

    let mut records = Vec::with_capacity(docs.len());
    for doc in docs {
        if doc.get("error").is_some() {
            let status = if doc["error"]["type"] == "index_not_found_exception" {
                404
            } else {
                500
            };
            return Err(SearchError::from_response(status, &doc.to_string()));
        }
        if doc["found"].as_bool() != Some(true) {
            continue;
        }
        let record = serde_json::from_value(doc)
            .map_err(|e| SearchError::parse(format!("Invalid multi-get entry: {}", e)))?;
        records.push(record);
    }

    Ok(records)
}

/// Parse an update-by-query response into its counts and failures.
pub fn parse_update_by_query(body: &Value) -> UpdateByQuerySummary {
    let failures = body["failures"]
        .as_array()
        .map(|failures| {
            failures
                .iter()
                .map(|failure| {
                    let reason = failure["cause"]["reason"]
                        .as_str()
                        .or_else(|| failure["reason"]["reason"].as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| failure.to_string());
                    match failure["id"].as_str() {
                        Some(id) => format!("id={}: {}", id, reason),
                        None => reason,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let summary = UpdateByQuerySummary {
        total: body["total"].as_u64().unwrap_or(0),
        updated: body["updated"].as_u64().unwrap_or(0),
        noops: body["noops"].as_u64().unwrap_or(0),
        version_conflicts: body["version_conflicts"].as_u64().unwrap_or(0),
        failures,
    };

    if !summary.is_complete() {
        warn!(
            total = summary.total,
            updated = summary.updated,
            version_conflicts = summary.version_conflicts,
            failures = summary.failures.len(),
            "Update by query applied partially"
        );
    }

    summary
}

/// Parse an update-by-query response whatever its status.
///
/// When matched documents fail, the service answers with the status of the
/// worst failure but still reports the counts. Any body with counts and no
/// top-level `error` becomes a summary.
pub fn parse_update_by_query_response(
    status: u16,
    body: &str,
) -> Result<UpdateByQuerySummary, SearchError> {
    let parsed = serde_json::from_str::<Value>(body).ok();
    if let Some(value) = parsed.as_ref().filter(|value| carries_counts(value)) {
        return Ok(parse_update_by_query(value));
    }

    if (200..300).contains(&status) {
        return Err(SearchError::parse("Update by query response has no counts"));
    }
    Err(SearchError::from_response(status, body))
}

fn carries_counts(body: &Value) -> bool {
    body.get("error").is_none() && (body.get("total").is_some() || body.get("failures").is_some())
}

/// Read the cluster health status.
pub fn parse_health(body: &Value) -> bool {
    matches!(body["status"].as_str(), Some("green") | Some("yellow"))
}

//! OpenSearch query builders.
//!
//! This module provides functions that shape the query DSL bodies sent by the
//! convenience operations of the facade. Callers that need anything richer
//! send their own body through `search_by_query`, which is never rewritten.

use serde_json::{json, Map, Value};

use crate::types::BoolQuery;

/// A `match` leaf clause.
pub fn match_clause(field: &str, value: impl Into<Value>) -> Value {
    json!({ "match": { field: value.into() } })
}

/// A `term` leaf clause (exact, unanalyzed match).
pub fn term_clause(field: &str, value: impl Into<Value>) -> Value {
    json!({ "term": { field: value.into() } })
}

/// A `range` leaf clause with both bounds inclusive.
pub fn range_clause(field: &str, gte: impl Into<Value>, lte: impl Into<Value>) -> Value {
    json!({
        "range": {
            field: {
                "gte": gte.into(),
                "lte": lte.into()
            }
        }
    })
}

/// Wrap a query clause into a search body returning at most `size` hits.
pub fn search_body(query: Value, size: usize) -> Value {
    json!({
        "size": size,
        "query": query
    })
}

/// Build a search body matching every document.
pub fn build_match_all_query(size: usize) -> Value {
    search_body(json!({ "match_all": {} }), size)
}

/// Build a search body for documents whose `field` matches `value`.
pub fn build_field_query(field: &str, value: impl Into<Value>, size: usize) -> Value {
    search_body(match_clause(field, value), size)
}

/// Build a search body for documents whose `field` lies in `[gte, lte]`.
pub fn build_range_query(
    field: &str,
    gte: impl Into<Value>,
    lte: impl Into<Value>,
    size: usize,
) -> Value {
    search_body(range_clause(field, gte, lte), size)
}

/// Build a non-scoring exact-match search body.
pub fn build_term_filter_query(field: &str, value: impl Into<Value>, size: usize) -> Value {
    search_body(
        json!({
            "bool": {
                "filter": term_clause(field, value)
            }
        }),
        size,
    )
}

/// Render a `BoolQuery` into a `bool` clause.
///
/// Empty clause lists are left out of the body.
pub fn bool_clause(query: &BoolQuery) -> Value {
    let mut clauses = Map::new();
    let lists = [
        ("must", &query.must),
        ("must_not", &query.must_not),
        ("should", &query.should),
        ("filter", &query.filter),
    ];
    for (name, list) in lists {
        if !list.is_empty() {
            clauses.insert(name.to_string(), Value::Array(list.clone()));
        }
    }
    if let Some(minimum) = query.minimum_should_match {
        clauses.insert("minimum_should_match".to_string(), json!(minimum));
    }

    json!({ "bool": clauses })
}

/// Build a search body from a `BoolQuery`.
pub fn build_bool_query(query: &BoolQuery, size: usize) -> Value {
    search_body(bool_clause(query), size)
}

/// Build a count body for documents whose `field` matches `value`.
///
/// Count requests reject `size`, so only the query is sent.
pub fn build_count_query(field: &str, value: impl Into<Value>) -> Value {
    json!({ "query": match_clause(field, value) })
}

//! Search error types.
//!
//! This module defines the error taxonomy of the facade and the single helper
//! that maps a failed service response onto it.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during search service operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Failed to reach the search service (transport failure or timeout).
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The addressed index does not exist.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// The addressed document does not exist.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The addressed field is absent from the document.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// The addressed element of an object or array field is absent.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The write lost a concurrency race, or the resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The request was rejected as malformed, locally or by the service.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The service failed the request for any other reason.
    #[error("Server error (status {status}): {reason}")]
    ServerError { status: u16, reason: String },

    /// Failed to parse a response from the search service.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search service.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index not found error.
    pub fn index_not_found(index: impl Into<String>) -> Self {
        Self::IndexNotFound(index.into())
    }

    /// Create a document not found error.
    pub fn document_not_found(index: &str, id: &str) -> Self {
        Self::DocumentNotFound(format!("index={}, id={}", index, id))
    }

    /// Create a field not found error.
    pub fn field_not_found(index: &str, id: &str, field: &str) -> Self {
        Self::FieldNotFound(format!("index={}, id={}, field={}", index, id, field))
    }

    /// Create an element not found error.
    pub fn element_not_found(msg: impl Into<String>) -> Self {
        Self::ElementNotFound(msg.into())
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// True for every "does not exist" kind.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::IndexNotFound(_)
                | Self::DocumentNotFound(_)
                | Self::FieldNotFound(_)
                | Self::ElementNotFound(_)
        )
    }

    /// True when the request lost a concurrency race or hit an existing resource.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Map a non-success response onto the error taxonomy.
    ///
    /// `body` is the raw response text; the service reports failures as
    /// `{"error": {"type": ..., "reason": ...}, "status": ...}`, while a
    /// missing document on get/delete is reported as a 404 without an
    /// `error` object.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let (error_type, reason) = error_details(parsed.as_ref(), body);

        match (status, error_type.as_deref()) {
            (404, Some("index_not_found_exception")) => {
                let index = parsed
                    .as_ref()
                    .and_then(|v| v["error"]["index"].as_str())
                    .map(str::to_string)
                    .unwrap_or(reason);
                Self::IndexNotFound(index)
            }
            (404, None) => match parsed.as_ref() {
                Some(v) if v["_id"].is_string() => Self::document_not_found(
                    v["_index"].as_str().unwrap_or_default(),
                    v["_id"].as_str().unwrap_or_default(),
                ),
                _ => Self::DocumentNotFound(reason),
            },
            (404, Some(_)) => Self::DocumentNotFound(reason),
            (409, _) => Self::Conflict(reason),
            (400, Some("resource_already_exists_exception")) => Self::Conflict(reason),
            (400, _) => Self::InvalidRequest(reason),
            _ => Self::ServerError { status, reason },
        }
    }
}

impl From<opensearch::Error> for SearchError {
    fn from(err: opensearch::Error) -> Self {
        if err.is_timeout() {
            Self::ConnectionError(format!("request timed out: {}", err))
        } else if err.is_json() {
            Self::ParseError(err.to_string())
        } else {
            Self::ConnectionError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

/// Extract `error.type` and a human-readable reason from an error body.
fn error_details(parsed: Option<&Value>, raw: &str) -> (Option<String>, String) {
    let error = match parsed.and_then(|v| v.get("error")) {
        Some(error) => error,
        None => return (None, raw.to_string()),
    };

    match error {
        Value::String(reason) => (None, reason.clone()),
        Value::Object(_) => {
            let error_type = error["type"].as_str().map(str::to_string);
            // Script and mapping errors carry the useful detail in caused_by
            let reason = error["reason"]
                .as_str()
                .or_else(|| error["caused_by"]["reason"].as_str())
                .unwrap_or(raw)
                .to_string();
            (error_type, reason)
        }
        other => (None, other.to_string()),
    }
}

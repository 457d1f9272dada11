//! # Docsearch Repository
//!
//! This crate provides a typed facade over a document-search service. It
//! includes the error taxonomy, the backend trait, and a concrete
//! implementation for OpenSearch.

pub mod client;
pub mod config;
mod elements;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use client::SearchClient;
pub use config::{ClientConfig, RefreshPolicy};
pub use errors::SearchError;
pub use interfaces::SearchBackend;
pub use opensearch::OpenSearchBackend;
pub use types::{BoolQuery, ElementSelector};

//! OpenSearch implementation of the search backend.
//!
//! This module provides a concrete implementation of `SearchBackend` using
//! OpenSearch, plus the builders and parsers for its wire format.

mod client;
pub mod queries;
pub mod responses;
pub mod scripts;

pub use client::OpenSearchBackend;

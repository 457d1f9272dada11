//! # Docsearch Shared
//!
//! Data model shared between callers of the search facade and the repository
//! crate that talks to the search service. Nothing here performs I/O; these
//! are the request and response shapes exchanged with the facade.

mod document;
mod index;
mod script;
mod search;

pub use document::{Document, DocumentRecord, VersionGuard, WriteAck, WriteResult};
pub use index::{FieldMapping, FieldType, IndexSettings};
pub use script::Script;
pub use search::{SearchHit, SearchResponse, UpdateByQuerySummary};

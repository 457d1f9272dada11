//! Server-side scripts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default scripting language of the search service.
pub const DEFAULT_LANG: &str = "painless";

/// A server-executed mutation script.
///
/// Caller-supplied data belongs in `params` and is referenced from `source`
/// as `params.<name>`; it is never spliced into `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub source: String,
    pub lang: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl Script {
    /// Create a painless script with no parameters.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            lang: DEFAULT_LANG.to_string(),
            params: Map::new(),
        }
    }

    /// Bind a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

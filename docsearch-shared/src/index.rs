//! Index settings and field mappings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default number of primary shards for a new index.
pub const DEFAULT_SHARDS: u32 = 3;

/// Default number of replicas for a new index.
pub const DEFAULT_REPLICAS: u32 = 2;

/// Declared type of a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Keyword,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Date,
    Object,
    Nested,
}

/// Mapping of a single field.
///
/// `fields` holds multi-field variants (e.g. a `raw` keyword next to a text
/// field) and `properties` holds the children of `object`/`nested` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldMapping>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, FieldMapping>,
}

impl FieldMapping {
    /// Create a mapping of the given type with no sub-fields.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            fields: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Add a multi-field variant.
    pub fn with_field(mut self, name: impl Into<String>, mapping: FieldMapping) -> Self {
        self.fields.insert(name.into(), mapping);
        self
    }

    /// Add a child property (for `object` and `nested` fields).
    pub fn with_property(mut self, name: impl Into<String>, mapping: FieldMapping) -> Self {
        self.properties.insert(name.into(), mapping);
        self
    }
}

impl From<FieldType> for FieldMapping {
    fn from(field_type: FieldType) -> Self {
        Self::new(field_type)
    }
}

/// Settings and mappings used when creating an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSettings {
    /// Number of primary shards.
    pub number_of_shards: u32,
    /// Number of replica copies per shard.
    pub number_of_replicas: u32,
    /// Field name to declared mapping.
    pub mappings: BTreeMap<String, FieldMapping>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            number_of_shards: DEFAULT_SHARDS,
            number_of_replicas: DEFAULT_REPLICAS,
            mappings: BTreeMap::new(),
        }
    }
}

impl IndexSettings {
    /// Settings with explicit shard and replica counts and no mappings.
    pub fn new(number_of_shards: u32, number_of_replicas: u32) -> Self {
        Self {
            number_of_shards,
            number_of_replicas,
            mappings: BTreeMap::new(),
        }
    }

    /// Declare the mapping of a field.
    pub fn with_mapping(mut self, field: impl Into<String>, mapping: impl Into<FieldMapping>) -> Self {
        self.mappings.insert(field.into(), mapping.into());
        self
    }

    /// Render the create-index request body.
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "settings": {
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas
            }
        });
        if !self.mappings.is_empty() {
            body["mappings"] = json!({ "properties": self.mappings });
        }
        body
    }
}

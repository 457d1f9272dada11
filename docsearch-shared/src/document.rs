//! Document payloads and write acknowledgements.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An open-ended document payload: field name to value.
pub type Document = Map<String, Value>;

/// Optimistic-concurrency token taken from a read.
///
/// Passing it back on a write makes the service reject the write if the
/// document changed in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionGuard {
    pub seq_no: i64,
    pub primary_term: i64,
}

/// A document as returned by a get or multi-get request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(rename = "_seq_no", default, skip_serializing_if = "Option::is_none")]
    pub seq_no: Option<i64>,
    #[serde(rename = "_primary_term", default, skip_serializing_if = "Option::is_none")]
    pub primary_term: Option<i64>,
    #[serde(rename = "_source", default)]
    pub source: Document,
}

impl DocumentRecord {
    /// The concurrency token of this read, when the service returned one.
    pub fn version_guard(&self) -> Option<VersionGuard> {
        match (self.seq_no, self.primary_term) {
            (Some(seq_no), Some(primary_term)) => Some(VersionGuard {
                seq_no,
                primary_term,
            }),
            _ => None,
        }
    }
}

/// Outcome reported by the service for a single-document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteResult {
    Created,
    Updated,
    Deleted,
    Noop,
    NotFound,
}

/// Acknowledgement of a single-document write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteAck {
    #[serde(rename = "_index")]
    pub index: String,
    /// The document id, service-assigned when the caller omitted it.
    #[serde(rename = "_id")]
    pub id: String,
    pub result: WriteResult,
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(rename = "_seq_no", default, skip_serializing_if = "Option::is_none")]
    pub seq_no: Option<i64>,
    #[serde(rename = "_primary_term", default, skip_serializing_if = "Option::is_none")]
    pub primary_term: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_get_response() {
        let record: DocumentRecord = serde_json::from_value(json!({
            "_index": "t1",
            "_id": "1",
            "_version": 2,
            "_seq_no": 7,
            "_primary_term": 1,
            "found": true,
            "_source": {"field1": "value1"}
        }))
        .unwrap();

        assert_eq!(record.index, "t1");
        assert_eq!(record.id, "1");
        assert_eq!(record.source["field1"], "value1");
        assert_eq!(
            record.version_guard(),
            Some(VersionGuard {
                seq_no: 7,
                primary_term: 1
            })
        );
    }

    #[test]
    fn test_record_without_sequence_numbers() {
        let record: DocumentRecord = serde_json::from_value(json!({
            "_index": "t1",
            "_id": "1",
            "_source": {}
        }))
        .unwrap();

        assert!(record.version_guard().is_none());
    }

    #[test]
    fn test_write_ack_from_index_response() {
        let ack: WriteAck = serde_json::from_value(json!({
            "_index": "t1",
            "_id": "generated-id",
            "_version": 1,
            "result": "created",
            "_shards": {"total": 2, "successful": 1, "failed": 0},
            "_seq_no": 0,
            "_primary_term": 1
        }))
        .unwrap();

        assert_eq!(ack.id, "generated-id");
        assert_eq!(ack.result, WriteResult::Created);
        assert_eq!(ack.seq_no, Some(0));
    }
}

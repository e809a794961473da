//! Value types exchanged with the remote engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document body: field name to JSON value.
pub type Source = Map<String, Value>;

/// One logical write waiting in a bulk request.
///
/// Created per write call and consumed when the pending batch is flushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItem {
    /// Target index.
    pub index: String,
    /// Legacy mapping type; omitted from the request when `None`.
    pub doc_type: Option<String>,
    /// Document id; `None` lets the engine generate one.
    pub id: Option<String>,
    /// Document body.
    pub source: Source,
}

impl BulkItem {
    /// Creates an item targeting `index` with an engine-generated id.
    pub fn new(index: impl Into<String>, source: Source) -> Self {
        Self {
            index: index.into(),
            doc_type: None,
            id: None,
            source,
        }
    }

    /// Sets the legacy mapping type.
    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Sets an explicit document id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the bulk action line for this item.
    ///
    /// `_type` is included when a mapping type is set. Engines talking to
    /// clusters without mapping types drop it.
    pub fn action(&self) -> Value {
        let mut meta = Map::new();
        meta.insert("_index".to_string(), Value::String(self.index.clone()));
        if let Some(ref id) = self.id {
            meta.insert("_id".to_string(), Value::String(id.clone()));
        }
        if let Some(ref doc_type) = self.doc_type {
            meta.insert("_type".to_string(), Value::String(doc_type.clone()));
        }

        let mut action = Map::new();
        action.insert("index".to_string(), Value::Object(meta));
        Value::Object(action)
    }
}

/// The mapping (field schema) registered for an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    /// Index the mapping belongs to.
    pub index: String,
    /// Raw mapping definition as returned by the engine.
    pub mappings: Value,
}

impl Mapping {
    /// Creates a mapping entry.
    pub fn new(index: impl Into<String>, mappings: Value) -> Self {
        Self {
            index: index.into(),
            mappings,
        }
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Index the hit came from.
    #[serde(rename = "_index")]
    pub index: String,
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Relevance score, absent for sorted or filtered queries.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// Document body.
    #[serde(rename = "_source", default)]
    pub source: Source,
}

//! Bulk request bodies and response summaries.
//!
//! Elasticsearch 8 no longer has mapping types and rejects a whole bulk
//! request whose metadata carries `_type`. Action lines built here never
//! include it; an item's `doc_type` is ignored by this engine.

use elasticsearch::http::request::JsonBody;
use serde_json::Value;

use crate::types::BulkItem;

/// Builds the NDJSON body lines for a batch.
pub(crate) fn build_bulk_body(items: &[BulkItem]) -> Vec<JsonBody<Value>> {
    let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(items.len() * 2);
    for item in items {
        body.push(JsonBody::new(action_line(item)));
        body.push(JsonBody::new(Value::Object(item.source.clone())));
    }
    body
}

/// The `index` action line for an item, without `_type`.
pub(crate) fn action_line(item: &BulkItem) -> Value {
    let mut action = item.action();
    if let Some(meta) = action.get_mut("index").and_then(Value::as_object_mut) {
        meta.remove("_type");
    }
    action
}

/// Number of items carrying a legacy mapping type.
pub(crate) fn typed_items(items: &[BulkItem]) -> usize {
    items.iter().filter(|item| item.doc_type.is_some()).count()
}

/// Outcome of an accepted bulk request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSummary {
    /// Items acknowledged in the response.
    pub total: usize,
    /// Items the engine rejected.
    pub failed: usize,
    /// First rejection reason, if any.
    pub first_error: Option<String>,
}

impl BulkSummary {
    /// Parses the body of a `_bulk` response.
    pub fn from_response(body: &Value) -> Self {
        let items = body
            .get("items")
            .and_then(|i| i.as_array())
            .cloned()
            .unwrap_or_default();

        let mut summary = BulkSummary {
            total: items.len(),
            ..Default::default()
        };

        if !body.get("errors").and_then(|e| e.as_bool()).unwrap_or(false) {
            return summary;
        }

        for item in &items {
            // Each entry is keyed by its action name ("index", "create", ...).
            let error = item
                .as_object()
                .and_then(|obj| obj.values().next())
                .and_then(|result| result.get("error"));

            if let Some(error) = error {
                summary.failed += 1;
                if summary.first_error.is_none() {
                    let reason = error
                        .get("reason")
                        .and_then(|r| r.as_str())
                        .map(String::from)
                        .unwrap_or_else(|| error.to_string());
                    summary.first_error = Some(reason);
                }
            }
        }

        summary
    }

    /// Returns true if every item was accepted.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

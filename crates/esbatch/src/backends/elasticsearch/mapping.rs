//! Parsing of `GET /{index}/_mapping` responses.

use serde_json::Value;

use crate::types::Mapping;

/// Turns a mapping response into one [`Mapping`] per index, ordered by index name.
///
/// The response is keyed by index name: `{"orders": {"mappings": {...}}}`.
/// Entries without a `mappings` object get an empty one.
pub(crate) fn parse_mappings(body: &Value) -> Vec<Mapping> {
    body.as_object()
        .map(|indices| {
            indices
                .iter()
                .map(|(index, entry)| {
                    let mappings = entry
                        .get("mappings")
                        .cloned()
                        .unwrap_or_else(|| Value::Object(Default::default()));
                    Mapping::new(index.clone(), mappings)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_index() {
        let body = json!({
            "orders": {"mappings": {"properties": {"total": {"type": "long"}}}}
        });
        let mappings = parse_mappings(&body);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].index, "orders");
        assert_eq!(mappings[0].mappings["properties"]["total"]["type"], "long");
    }

    #[test]
    fn test_parse_missing_mappings_object() {
        let body = json!({"orders": {}});
        let mappings = parse_mappings(&body);
        assert_eq!(mappings[0].mappings, json!({}));
    }

    #[test]
    fn test_parse_non_object_body() {
        assert!(parse_mappings(&json!([])).is_empty());
    }
}

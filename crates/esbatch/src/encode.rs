//! Payload encoding for bulk request bodies.
//!
//! Payloads reach the engine as JSON text. The default [`SortedJsonEncoder`]
//! follows a fixed set of rules so that identical input always produces
//! identical request bodies:
//!
//! - field names are written verbatim (only serde `rename` attributes apply)
//! - fields marked `#[serde(skip)]` are left out
//! - enum variants are written by name
//! - object keys are emitted in sorted order, at every nesting level
//! - timestamps use [`utc_format`]: `2024-01-31T08:15:00.000Z`
//!
//! # Example
//!
//! ```
//! use chrono::{DateTime, TimeZone, Utc};
//! use esbatch::encode::{PayloadEncoder, SortedJsonEncoder, utc_format};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! enum Level { Warn }
//!
//! #[derive(Serialize)]
//! struct Event {
//!     zone: String,
//!     level: Level,
//!     #[serde(with = "utc_format")]
//!     at: DateTime<Utc>,
//!     #[serde(skip)]
//!     scratch: u32,
//! }
//!
//! let event = Event {
//!     zone: "eu".to_string(),
//!     level: Level::Warn,
//!     at: Utc.with_ymd_and_hms(2024, 1, 31, 8, 15, 0).unwrap(),
//!     scratch: 7,
//! };
//! let text = SortedJsonEncoder.encode_payload(&event).unwrap();
//! assert_eq!(text, r#"{"at":"2024-01-31T08:15:00.000Z","level":"Warn","zone":"eu"}"#);
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ClientError, ClientResult};
use crate::types::Source;

/// Converts payloads into the text sent to the engine.
///
/// Implementations must be deterministic: equal input, equal output.
pub trait PayloadEncoder: Send + Sync {
    /// Encodes an already-serialized JSON value.
    fn encode(&self, value: &Value) -> ClientResult<String>;

    /// Serializes and encodes any payload.
    fn encode_payload<T: Serialize + ?Sized>(&self, payload: &T) -> ClientResult<String>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(payload)?;
        self.encode(&value)
    }
}

/// Compact JSON with recursively sorted object keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedJsonEncoder;

impl PayloadEncoder for SortedJsonEncoder {
    fn encode(&self, value: &Value) -> ClientResult<String> {
        Ok(serde_json::to_string(&sort_keys(value.clone()))?)
    }
}

/// Serializes a payload into a bulk source document with sorted keys.
///
/// Fails with [`ClientError::Serialization`] unless the payload is a JSON object.
pub fn to_source<T: Serialize + ?Sized>(payload: &T) -> ClientResult<Source> {
    match sort_keys(serde_json::to_value(payload)?) {
        Value::Object(map) => Ok(map),
        other => Err(ClientError::Serialization {
            message: format!("bulk source must be a JSON object, got {}", kind_of(&other)),
        }),
    }
}

/// Rebuilds every object in `value` with its keys in sorted order.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, val) in entries {
                sorted.insert(key, sort_keys(val));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Serde helper rendering `DateTime<Utc>` as `yyyy-MM-dd'T'HH:mm:ss.SSS'Z'`.
///
/// Use with `#[serde(with = "esbatch::encode::utc_format")]`.
pub mod utc_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// The chrono format string for the wire representation.
    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    /// Serializes a timestamp in UTC with millisecond precision.
    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    /// Parses a timestamp written by [`serialize`].
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "utc_format")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_nested_keys_are_sorted() {
        let value = json!({"b": {"z": 1, "a": 2}, "a": [{"y": 1, "x": 2}]});
        let text = SortedJsonEncoder.encode(&value).unwrap();
        assert_eq!(text, r#"{"a":[{"x":2,"y":1}],"b":{"a":2,"z":1}}"#);
    }

    #[test]
    fn test_hash_map_encoding_is_deterministic() {
        let mut first = HashMap::new();
        let mut second = HashMap::new();
        for (i, key) in ["delta", "alpha", "charlie", "bravo"].iter().enumerate() {
            first.insert(key.to_string(), i);
        }
        for (i, key) in ["delta", "alpha", "charlie", "bravo"].iter().enumerate().rev() {
            second.insert(key.to_string(), i);
        }
        assert_eq!(
            SortedJsonEncoder.encode_payload(&first).unwrap(),
            SortedJsonEncoder.encode_payload(&second).unwrap()
        );
    }

    #[test]
    fn test_utc_format_round_trip() {
        let at = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        let text = serde_json::to_string(&Stamped { at }).unwrap();
        assert_eq!(text, r#"{"at":"2021-03-04T05:06:07.000Z"}"#);

        let back: Stamped = serde_json::from_str(&text).unwrap();
        assert_eq!(back.at, at);
    }

    #[test]
    fn test_to_source_rejects_non_objects() {
        let err = to_source(&vec![1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_to_source_of_struct() {
        #[derive(Serialize)]
        struct Order {
            id: u32,
            #[serde(rename = "customerName")]
            customer_name: String,
        }
        let source = to_source(&Order {
            id: 7,
            customer_name: "Ana".to_string(),
        })
        .unwrap();
        assert_eq!(source["customerName"], "Ana");
        assert_eq!(source["id"], 7);
    }
}

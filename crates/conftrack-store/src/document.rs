//! Loosely-typed document records
//!
//! The store holds schemaless payload maps; nothing guarantees that a
//! field exists or has the expected type. Typed accessors here return
//! `Option` so callers decide how to treat absent or malformed data.

use crate::filter::lookup_path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Well-known payload field holding the creation timestamp.
pub const CREATED_AT: &str = "createdAt";

/// Well-known payload field holding the last-update timestamp.
pub const UPDATED_AT: &str = "updatedAt";

/// A stored record: an opaque id plus a schemaless payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned record id
    pub id: Uuid,
    /// Schemaless payload
    pub fields: serde_json::Map<String, Value>,
}

impl Document {
    /// Wrap an existing payload under a fresh id.
    #[inline]
    #[must_use]
    pub fn new(fields: serde_json::Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
        }
    }

    /// Raw value at a dotted path.
    #[inline]
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.fields, path)
    }

    /// String value at a dotted path.
    #[inline]
    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Boolean value at a dotted path.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Integer value at a dotted path.
    #[inline]
    #[must_use]
    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    /// RFC 3339 timestamp at a dotted path.
    #[must_use]
    pub fn get_datetime(&self, path: &str) -> Option<DateTime<Utc>> {
        self.get_str(path)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Creation timestamp, when the payload carries one.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get_datetime(CREATED_AT)
    }

    /// Set a top-level payload field, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }
}

/// Convenience builder for payload maps.
///
/// `serde_json::json!` produces a `Value`; this narrows an object literal
/// to the payload map the store works with.
#[must_use]
pub fn payload(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_accessors() {
        let doc = Document::new(payload(json!({
            "email": "a@x.com",
            "isInternational": true,
            "inquiryNumber": 17,
            "createdAt": "2025-05-02T08:30:00Z",
            "primaryAuthor": {"email": "b@x.com"}
        })));

        assert_eq!(doc.get_str("email"), Some("a@x.com"));
        assert_eq!(doc.get_bool("isInternational"), Some(true));
        assert_eq!(doc.get_i64("inquiryNumber"), Some(17));
        assert_eq!(doc.get_str("primaryAuthor.email"), Some("b@x.com"));
        assert!(doc.created_at().is_some());
        assert_eq!(doc.get_str("missing"), None);
    }

    #[test]
    fn set_replaces_value() {
        let mut doc = Document::new(payload(json!({"status": "pending"})));
        doc.set("status", "confirmed");
        assert_eq!(doc.get_str("status"), Some("confirmed"));
    }

    #[test]
    fn malformed_timestamp_reads_as_none() {
        let doc = Document::new(payload(json!({"createdAt": "yesterday"})));
        assert!(doc.created_at().is_none());
    }
}

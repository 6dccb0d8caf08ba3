//! Raw telemetry rows
//!
//! One document per page view or interaction event. Rows are append
//! only; the aggregator never mutates them.

use crate::status::EventKind;
use chrono::{DateTime, Utc};
use conftrack_store::Document;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Wire field names on the telemetry-events collection.
pub mod fields {
    /// Raw event-type string as reported by the client
    pub const EVENT_TYPE: &str = "eventType";
    pub const PATH: &str = "path";
    pub const SESSION_ID: &str = "sessionId";
    /// Event time, RFC 3339
    pub const TIMESTAMP: &str = "timestamp";
}

/// A stored telemetry row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    /// Store id
    pub id: Uuid,
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    /// Map a stored row. Rows without a parseable timestamp are useless
    /// to the aggregator and read as `None` rather than erroring, so a
    /// single bad row cannot break a whole series.
    #[must_use]
    pub fn from_document(doc: &Document) -> Option<Self> {
        let timestamp = doc
            .get_datetime(fields::TIMESTAMP)
            .or_else(|| doc.created_at())?;

        Some(Self {
            id: doc.id,
            kind: EventKind::classify(doc.get_str(fields::EVENT_TYPE).unwrap_or_default()),
            path: doc.get_str(fields::PATH).map(str::to_string),
            session_id: doc.get_str(fields::SESSION_ID).map(str::to_string),
            timestamp,
        })
    }

    /// Build the storage payload for an incoming event.
    #[must_use]
    pub fn payload(
        event_type: &str,
        path: Option<&str>,
        session_id: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut doc = conftrack_store::payload(json!({
            (fields::EVENT_TYPE): event_type,
            (fields::TIMESTAMP): timestamp.to_rfc3339(),
        }));
        if let Some(path) = path {
            doc.insert(fields::PATH.to_string(), json!(path));
        }
        if let Some(session) = session_id {
            doc.insert(fields::SESSION_ID.to_string(), json!(session));
        }
        doc
    }
}

//! Volunteer applications

use crate::error::ModelError;
use crate::status::{parse_or_default, VolunteerStatus};
use chrono::{DateTime, Utc};
use conftrack_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire field names on the volunteer-applications collection.
pub mod fields {
    /// Public identifier (`VOL-…`)
    pub const APPLICATION_ID: &str = "applicationId";
    /// Anchor email, stored normalized
    pub const EMAIL: &str = "email";
    pub const FULL_NAME: &str = "fullName";
    pub const STATUS: &str = "status";
}

/// A stored volunteer application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerApplication {
    /// Store id
    pub id: Uuid,
    /// Public identifier token
    pub application_id: String,
    pub email: String,
    pub full_name: String,
    pub status: VolunteerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl VolunteerApplication {
    /// Map a stored document. Requires the public identifier and the
    /// anchor email.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let application_id = doc
            .get_str(fields::APPLICATION_ID)
            .ok_or_else(|| ModelError::missing("volunteer application", fields::APPLICATION_ID))?
            .to_string();
        let email = doc
            .get_str(fields::EMAIL)
            .ok_or_else(|| ModelError::missing("volunteer application", fields::EMAIL))?
            .to_string();

        Ok(Self {
            id: doc.id,
            application_id,
            email,
            full_name: doc.get_str(fields::FULL_NAME).unwrap_or_default().to_string(),
            status: parse_or_default(doc.get_str(fields::STATUS)),
            created_at: doc.created_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conftrack_store::payload;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn maps_stored_application() {
        let doc = Document::new(payload(json!({
            "applicationId": "VOL-2025-07",
            "email": "vol@example.com",
            "fullName": "Sam Okoth",
            "status": "shortlisted"
        })));
        let app = VolunteerApplication::from_document(&doc).unwrap();
        assert_eq!(app.application_id, "VOL-2025-07");
        assert_eq!(app.status, VolunteerStatus::Shortlisted);
    }

    #[test]
    fn defaults_to_pending() {
        let doc = Document::new(payload(json!({
            "applicationId": "VOL-1",
            "email": "v@x.com"
        })));
        let app = VolunteerApplication::from_document(&doc).unwrap();
        assert_eq!(app.status, VolunteerStatus::Pending);
    }
}

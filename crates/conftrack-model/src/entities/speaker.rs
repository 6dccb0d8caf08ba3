//! Speaker profiles
//!
//! Maintained by the programme team outside this subsystem; the account
//! linker reads them to backfill login accounts.

use crate::error::ModelError;
use chrono::{DateTime, Utc};
use conftrack_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire field names on the speakers collection.
pub mod fields {
    pub const FULL_NAME: &str = "fullName";
    pub const EMAIL: &str = "email";
    /// Back-reference set by the account linker
    pub const USER_ID: &str = "userId";
}

/// A stored speaker profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    /// Store id
    pub id: Uuid,
    pub full_name: String,
    /// May be absent or blank; the linker skips such profiles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Speaker {
    /// Map a stored document. Requires only a name; profiles without an
    /// email are valid, just not linkable.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let full_name = doc
            .get_str(fields::FULL_NAME)
            .ok_or_else(|| ModelError::missing("speaker", fields::FULL_NAME))?
            .to_string();

        Ok(Self {
            id: doc.id,
            full_name,
            email: doc
                .get_str(fields::EMAIL)
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
            user_id: doc.get_str(fields::USER_ID).and_then(|s| s.parse().ok()),
            created_at: doc.created_at(),
        })
    }

    /// Whether this profile already points at an account.
    #[inline]
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.user_id.is_some()
    }
}

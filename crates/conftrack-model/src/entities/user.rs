//! Login accounts
//!
//! Accounts are created either by normal signup (outside this
//! subsystem) or by the account linker backfilling speakers and
//! accepted authors. Credential material never serializes outward.

use crate::error::ModelError;
use crate::status::{parse_or_default, UserRole};
use chrono::{DateTime, Utc};
use conftrack_store::Document;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Wire field names on the users collection.
pub mod fields {
    /// Login email, stored normalized
    pub const EMAIL: &str = "email";
    pub const ROLE: &str = "role";
    pub const FULL_NAME: &str = "fullName";
    /// Sha-256 digest of the credential, hex encoded
    pub const PASSWORD_HASH: &str = "passwordHash";
    /// Back-reference set by the account linker
    pub const SPEAKER_ID: &str = "speakerId";
    /// Back-reference set by the account linker
    pub const ABSTRACT_ID: &str = "abstractId";
    pub const RESET_TOKEN: &str = "resetToken";
    pub const RESET_TOKEN_EXPIRY: &str = "resetTokenExpiry";
}

/// A stored account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store id
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Never serialized outward
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_id: Option<Uuid>,
    /// Never serialized outward
    #[serde(skip_serializing, default)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing, default)]
    pub reset_token_expiry: Option<DateTime<Utc>>,
}

impl User {
    /// Map a stored document. Only the email is a hard requirement; an
    /// unknown or absent role reads as the least-privileged one.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let email = doc
            .get_str(fields::EMAIL)
            .ok_or_else(|| ModelError::missing("user", fields::EMAIL))?
            .to_string();

        Ok(Self {
            id: doc.id,
            email,
            role: parse_or_default(doc.get_str(fields::ROLE)),
            full_name: doc.get_str(fields::FULL_NAME).map(str::to_string),
            password_hash: doc.get_str(fields::PASSWORD_HASH).map(str::to_string),
            speaker_id: doc.get_str(fields::SPEAKER_ID).and_then(|s| s.parse().ok()),
            abstract_id: doc.get_str(fields::ABSTRACT_ID).and_then(|s| s.parse().ok()),
            reset_token: doc.get_str(fields::RESET_TOKEN).map(str::to_string),
            reset_token_expiry: doc.get_datetime(fields::RESET_TOKEN_EXPIRY),
        })
    }
}

/// Payload for an account created by the backfill job.
#[must_use]
pub fn backfill_payload(
    email: &str,
    full_name: Option<&str>,
    password_hash: &str,
    reset_token: &str,
    reset_token_expiry: DateTime<Utc>,
) -> serde_json::Map<String, serde_json::Value> {
    let mut doc = conftrack_store::payload(json!({
        (fields::EMAIL): email,
        (fields::ROLE): UserRole::Applicant.as_str(),
        (fields::PASSWORD_HASH): password_hash,
        (fields::RESET_TOKEN): reset_token,
        (fields::RESET_TOKEN_EXPIRY): reset_token_expiry.to_rfc3339(),
    }));
    if let Some(name) = full_name {
        doc.insert(fields::FULL_NAME.to_string(), json!(name));
    }
    doc
}

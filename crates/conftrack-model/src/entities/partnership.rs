//! Partnership inquiries
//!
//! Addressed publicly either by sequential inquiry number or, for
//! legacy tokens, by an email fragment. Email is the anchor field.

use crate::error::ModelError;
use crate::status::{parse_or_default, PartnershipStatus};
use chrono::{DateTime, Utc};
use conftrack_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire field names on the partnership-inquiries collection.
pub mod fields {
    /// Sequential public number
    pub const INQUIRY_NUMBER: &str = "inquiryNumber";
    /// Anchor email, stored normalized
    pub const EMAIL: &str = "email";
    pub const ORGANIZATION_NAME: &str = "organizationName";
    /// Sponsorship tier label
    pub const TIER: &str = "tier";
    pub const STATUS: &str = "status";
}

/// A stored partnership inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnershipInquiry {
    /// Store id
    pub id: Uuid,
    /// Sequential public number
    pub inquiry_number: i64,
    pub email: String,
    pub organization_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    pub status: PartnershipStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PartnershipInquiry {
    /// Map a stored document. Requires the public number and the anchor
    /// email.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let inquiry_number = doc
            .get_i64(fields::INQUIRY_NUMBER)
            .ok_or_else(|| ModelError::missing("partnership inquiry", fields::INQUIRY_NUMBER))?;
        let email = doc
            .get_str(fields::EMAIL)
            .ok_or_else(|| ModelError::missing("partnership inquiry", fields::EMAIL))?
            .to_string();

        Ok(Self {
            id: doc.id,
            inquiry_number,
            email,
            organization_name: doc
                .get_str(fields::ORGANIZATION_NAME)
                .unwrap_or_default()
                .to_string(),
            tier: doc.get_str(fields::TIER).map(str::to_string),
            status: parse_or_default(doc.get_str(fields::STATUS)),
            created_at: doc.created_at(),
        })
    }
}

//! Conference registration records
//!
//! A registration is created once by public submission and carries the
//! identity fields the deduplication guard filters on. International
//! registrants identify by passport, domestic ones by national ID.

use crate::error::ModelError;
use crate::identifiers::{normalize_email, normalize_national_id, normalize_passport};
use crate::status::{parse_or_default, PaymentStatus, RegistrationStatus};
use chrono::{DateTime, Utc};
use conftrack_store::{payload, Document, CREATED_AT};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Wire field names on the registrations collection.
pub mod fields {
    /// Public identifier (`REG-…` or legacy `SARSYC-…`)
    pub const REGISTRATION_ID: &str = "registrationId";
    /// Registrant name
    pub const FULL_NAME: &str = "fullName";
    /// Anchor email, stored normalized
    pub const EMAIL: &str = "email";
    /// Passport vs. national ID selector
    pub const IS_INTERNATIONAL: &str = "isInternational";
    /// Present iff international
    pub const PASSPORT_NUMBER: &str = "passportNumber";
    /// Present iff domestic
    pub const NATIONAL_ID_NUMBER: &str = "nationalIdNumber";
    /// Lifecycle state
    pub const STATUS: &str = "status";
    /// Payment state
    pub const PAYMENT_STATUS: &str = "paymentStatus";
    /// Reference returned by the document sink for the passport scan
    pub const PASSPORT_SCAN_REF: &str = "passportScanRef";
}

/// A stored registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Store id
    pub id: Uuid,
    /// Public identifier token
    pub registration_id: String,
    pub full_name: String,
    pub email: String,
    pub is_international: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id_number: Option<String>,
    pub status: RegistrationStatus,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_scan_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// Map a stored document. Only the public identifier and the anchor
    /// email are hard requirements; everything else degrades to defaults.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let registration_id = doc
            .get_str(fields::REGISTRATION_ID)
            .ok_or_else(|| ModelError::missing("registration", fields::REGISTRATION_ID))?
            .to_string();
        let email = doc
            .get_str(fields::EMAIL)
            .ok_or_else(|| ModelError::missing("registration", fields::EMAIL))?
            .to_string();

        Ok(Self {
            id: doc.id,
            registration_id,
            full_name: doc.get_str(fields::FULL_NAME).unwrap_or_default().to_string(),
            email,
            is_international: doc.get_bool(fields::IS_INTERNATIONAL).unwrap_or(false),
            passport_number: doc.get_str(fields::PASSPORT_NUMBER).map(str::to_string),
            national_id_number: doc.get_str(fields::NATIONAL_ID_NUMBER).map(str::to_string),
            status: parse_or_default(doc.get_str(fields::STATUS)),
            payment_status: parse_or_default(doc.get_str(fields::PAYMENT_STATUS)),
            passport_scan_ref: doc.get_str(fields::PASSPORT_SCAN_REF).map(str::to_string),
            created_at: doc.created_at(),
        })
    }
}

/// A submission that has not passed the duplicate check yet.
///
/// Identity fields are normalized by [`normalize`](Self::normalize)
/// before any filter is built from them; blank optional fields (common
/// with form submissions) collapse to `None`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationCandidate {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub is_international: bool,
    #[serde(default)]
    pub passport_number: Option<String>,
    #[serde(default)]
    pub national_id_number: Option<String>,
}

impl RegistrationCandidate {
    /// Apply the ingest normalization rules in place.
    pub fn normalize(&mut self) {
        self.email = normalize_email(&self.email);
        self.full_name = self.full_name.trim().to_string();
        self.passport_number = self
            .passport_number
            .take()
            .map(|p| normalize_passport(&p))
            .filter(|p| !p.is_empty());
        self.national_id_number = self
            .national_id_number
            .take()
            .map(|n| normalize_national_id(&n))
            .filter(|n| !n.is_empty());
    }

    /// Build the storage payload for a freshly accepted submission.
    #[must_use]
    pub fn to_payload(
        &self,
        registration_id: &str,
        passport_scan_ref: Option<&str>,
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut doc = payload(json!({
            (fields::REGISTRATION_ID): registration_id,
            (fields::FULL_NAME): self.full_name,
            (fields::EMAIL): self.email,
            (fields::IS_INTERNATIONAL): self.is_international,
            (fields::STATUS): RegistrationStatus::Pending.as_str(),
            (fields::PAYMENT_STATUS): PaymentStatus::Unpaid.as_str(),
        }));
        if let Some(passport) = &self.passport_number {
            doc.insert(fields::PASSPORT_NUMBER.to_string(), json!(passport));
        }
        if let Some(national_id) = &self.national_id_number {
            doc.insert(fields::NATIONAL_ID_NUMBER.to_string(), json!(national_id));
        }
        if let Some(scan) = passport_scan_ref {
            doc.insert(fields::PASSPORT_SCAN_REF.to_string(), json!(scan));
        }
        doc
    }
}

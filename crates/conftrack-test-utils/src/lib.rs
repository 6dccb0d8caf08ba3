//! Testing utilities for the Conftrack workspace
//!
//! Shared fixtures: seeded stores, entity payload builders and a
//! recording mailer.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conftrack_core::{MailError, Mailer, OutboundEmail, SendReceipt};
use conftrack_model::{collections, AbstractStatus, Recommendation, UserRole};
use conftrack_store::{payload, Document, MemoryStore};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Mailer that records every message instead of delivering.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError> {
        self.sent.lock().push(email.clone());
        Ok(SendReceipt {
            success: true,
            mock: true,
        })
    }
}

pub fn fixture_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub fn seed_registration(
    store: &MemoryStore,
    registration_id: &str,
    email: &str,
    created_at: DateTime<Utc>,
) -> Uuid {
    let doc = Document::new(payload(json!({
        "registrationId": registration_id,
        "fullName": "Thandi Mokoena",
        "email": email,
        "isInternational": false,
        "nationalIdNumber": "9001015009087",
        "status": "pending",
        "paymentStatus": "unpaid",
        "createdAt": created_at.to_rfc3339(),
    })));
    let id = doc.id;
    store.seed(collections::REGISTRATIONS, doc);
    id
}

pub fn seed_abstract(
    store: &MemoryStore,
    submission_id: &str,
    author_email: &str,
    status: AbstractStatus,
    reviewers: &[Uuid],
) -> Uuid {
    let reviewer_ids: Vec<String> = reviewers.iter().map(Uuid::to_string).collect();
    let doc = Document::new(payload(json!({
        "submissionId": submission_id,
        "title": "Adolescent Health Outcomes in Urban Cohorts",
        "primaryAuthor": {
            "name": "Amara Okafor",
            "email": author_email,
            "affiliation": "University of the Witwatersrand"
        },
        "status": status.as_str(),
        "assignedReviewers": reviewer_ids,
        "createdAt": Utc::now().to_rfc3339(),
    })));
    let id = doc.id;
    store.seed(collections::ABSTRACTS, doc);
    id
}

pub fn seed_review(
    store: &MemoryStore,
    abstract_id: Uuid,
    reviewer_id: Uuid,
    score: i64,
    recommendation: Recommendation,
) -> Uuid {
    let now = Utc::now().to_rfc3339();
    let doc = Document::new(payload(json!({
        "abstractId": abstract_id.to_string(),
        "reviewerId": reviewer_id.to_string(),
        "score": score,
        "recommendation": recommendation.as_str(),
        "comments": "Solid methodology, sample size is thin.",
        "createdAt": now,
        "updatedAt": now,
    })));
    let id = doc.id;
    store.seed(collections::ABSTRACT_REVIEWS, doc);
    id
}

pub fn seed_partnership(
    store: &MemoryStore,
    inquiry_number: i64,
    email: &str,
    organization: &str,
) -> Uuid {
    let doc = Document::new(payload(json!({
        "inquiryNumber": inquiry_number,
        "email": email,
        "organizationName": organization,
        "tier": "gold",
        "status": "new",
        "createdAt": Utc::now().to_rfc3339(),
    })));
    let id = doc.id;
    store.seed(collections::PARTNERSHIP_INQUIRIES, doc);
    id
}

pub fn seed_volunteer(store: &MemoryStore, application_id: &str, email: &str) -> Uuid {
    let doc = Document::new(payload(json!({
        "applicationId": application_id,
        "email": email,
        "fullName": "Naledi Dlamini",
        "status": "pending",
        "createdAt": Utc::now().to_rfc3339(),
    })));
    let id = doc.id;
    store.seed(collections::VOLUNTEER_APPLICATIONS, doc);
    id
}

pub fn seed_user(store: &MemoryStore, email: &str, role: UserRole) -> Uuid {
    let doc = Document::new(payload(json!({
        "email": email,
        "fullName": "Sipho Ndlovu",
        "role": role.as_str(),
        "createdAt": Utc::now().to_rfc3339(),
    })));
    let id = doc.id;
    store.seed(collections::USERS, doc);
    id
}

pub fn seed_speaker(store: &MemoryStore, full_name: &str, email: Option<&str>) -> Uuid {
    let mut fields = payload(json!({
        "fullName": full_name,
        "createdAt": Utc::now().to_rfc3339(),
    }));
    if let Some(email) = email {
        fields.insert("email".to_string(), json!(email));
    }
    let doc = Document::new(fields);
    let id = doc.id;
    store.seed(collections::SPEAKERS, doc);
    id
}

pub fn seed_page_view(
    store: &MemoryStore,
    path: &str,
    session: &str,
    timestamp: DateTime<Utc>,
) -> Uuid {
    seed_telemetry(store, "page-view", Some(path), Some(session), timestamp)
}

pub fn seed_telemetry(
    store: &MemoryStore,
    event_type: &str,
    path: Option<&str>,
    session: Option<&str>,
    timestamp: DateTime<Utc>,
) -> Uuid {
    let doc = Document::new(conftrack_model::TelemetryEvent::payload(
        event_type, path, session, timestamp,
    ));
    let id = doc.id;
    store.seed(collections::TELEMETRY_EVENTS, doc);
    id
}

//! Abstract submissions
//!
//! The primary author's email is the anchor used by identity resolution;
//! `assignedReviewers` is the access-control list for the review
//! workflow. Reviewer ids are stored as uuid strings; entries that do
//! not parse are skipped rather than failing the whole record.

use crate::error::ModelError;
use crate::status::{parse_or_default, AbstractStatus};
use chrono::{DateTime, Utc};
use conftrack_store::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Wire field names on the abstracts collection.
pub mod fields {
    /// Public identifier (`ABS-…`)
    pub const SUBMISSION_ID: &str = "submissionId";
    pub const TITLE: &str = "title";
    /// Nested author object
    pub const PRIMARY_AUTHOR: &str = "primaryAuthor";
    /// Anchor email, dotted path into the author object
    pub const PRIMARY_AUTHOR_EMAIL: &str = "primaryAuthor.email";
    pub const STATUS: &str = "status";
    /// Uuid strings of the reviewers allowed to act on this abstract
    pub const ASSIGNED_REVIEWERS: &str = "assignedReviewers";
    pub const REVIEWER_COMMENTS: &str = "reviewerComments";
    pub const ADMIN_NOTES: &str = "adminNotes";
    /// Back-reference set by the account linker
    pub const USER_ID: &str = "userId";
}

/// The submitting author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

/// A stored abstract submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractSubmission {
    /// Store id
    pub id: Uuid,
    /// Public identifier token
    pub submission_id: String,
    pub title: String,
    pub primary_author: Author,
    pub status: AbstractStatus,
    pub assigned_reviewers: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AbstractSubmission {
    /// Map a stored document. The public identifier is the only hard
    /// requirement.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let submission_id = doc
            .get_str(fields::SUBMISSION_ID)
            .ok_or_else(|| ModelError::missing("abstract", fields::SUBMISSION_ID))?
            .to_string();

        let primary_author = Author {
            name: doc
                .get_str("primaryAuthor.name")
                .unwrap_or_default()
                .to_string(),
            email: doc
                .get_str(fields::PRIMARY_AUTHOR_EMAIL)
                .unwrap_or_default()
                .to_string(),
            affiliation: doc
                .get_str("primaryAuthor.affiliation")
                .map(str::to_string),
        };

        Ok(Self {
            id: doc.id,
            submission_id,
            title: doc.get_str(fields::TITLE).unwrap_or_default().to_string(),
            primary_author,
            status: parse_or_default(doc.get_str(fields::STATUS)),
            assigned_reviewers: parse_reviewer_ids(doc.get(fields::ASSIGNED_REVIEWERS)),
            reviewer_comments: doc.get_str(fields::REVIEWER_COMMENTS).map(str::to_string),
            admin_notes: doc.get_str(fields::ADMIN_NOTES).map(str::to_string),
            user_id: doc.get_str(fields::USER_ID).and_then(|s| s.parse().ok()),
            created_at: doc.created_at(),
        })
    }

    /// The anchor email, when the record has one.
    #[must_use]
    pub fn anchor_email(&self) -> Option<&str> {
        let email = self.primary_author.email.trim();
        (!email.is_empty()).then_some(email)
    }

    /// Whether a reviewer is on this abstract's access list.
    #[inline]
    #[must_use]
    pub fn is_assigned(&self, reviewer: Uuid) -> bool {
        self.assigned_reviewers.contains(&reviewer)
    }
}

fn parse_reviewer_ids(value: Option<&Value>) -> Vec<Uuid> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|s| s.parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

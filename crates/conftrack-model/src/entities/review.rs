//! Reviewer evaluations
//!
//! One row per (abstract, reviewer) pair, enforced by the review
//! workflow rather than the store. A reviewer edits their own row in
//! place; nothing here ever touches another reviewer's row.

use crate::error::ModelError;
use crate::status::Recommendation;
use chrono::{DateTime, Utc};
use conftrack_store::Document;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Wire field names on the abstract-reviews collection.
pub mod fields {
    /// Store id of the reviewed abstract, as a uuid string
    pub const ABSTRACT_ID: &str = "abstractId";
    /// Store id of the reviewing user, as a uuid string
    pub const REVIEWER_ID: &str = "reviewerId";
    pub const SCORE: &str = "score";
    pub const RECOMMENDATION: &str = "recommendation";
    pub const CONFIDENCE: &str = "confidence";
    pub const COMMENTS: &str = "comments";
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractReview {
    /// Store id
    pub id: Uuid,
    pub abstract_id: Uuid,
    pub reviewer_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AbstractReview {
    /// Map a stored document. The two references and the recommendation
    /// are hard requirements; a review without a verdict means nothing.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let abstract_id = doc
            .get_str(fields::ABSTRACT_ID)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ModelError::missing("review", fields::ABSTRACT_ID))?;
        let reviewer_id = doc
            .get_str(fields::REVIEWER_ID)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ModelError::missing("review", fields::REVIEWER_ID))?;
        let recommendation = doc
            .get_str(fields::RECOMMENDATION)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ModelError::missing("review", fields::RECOMMENDATION))?;

        Ok(Self {
            id: doc.id,
            abstract_id,
            reviewer_id,
            score: doc.get_i64(fields::SCORE),
            recommendation,
            confidence: doc.get_i64(fields::CONFIDENCE),
            comments: doc.get_str(fields::COMMENTS).map(str::to_string),
            updated_at: doc.get_datetime(conftrack_store::UPDATED_AT),
        })
    }
}

/// An incoming review body, before it is tied to an abstract and
/// reviewer by the workflow.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    #[serde(default)]
    pub score: Option<i64>,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub confidence: Option<i64>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl ReviewDraft {
    /// Build the storage payload for this draft.
    ///
    /// Absent optionals become explicit nulls so that an in-place
    /// update replaces the previous evaluation instead of leaving stale
    /// fields behind.
    #[must_use]
    pub fn to_payload(
        &self,
        abstract_id: Uuid,
        reviewer_id: Uuid,
    ) -> serde_json::Map<String, serde_json::Value> {
        conftrack_store::payload(json!({
            (fields::ABSTRACT_ID): abstract_id.to_string(),
            (fields::REVIEWER_ID): reviewer_id.to_string(),
            (fields::RECOMMENDATION): self.recommendation.as_str(),
            (fields::SCORE): self.score,
            (fields::CONFIDENCE): self.confidence,
            (fields::COMMENTS): self.comments,
        }))
    }
}

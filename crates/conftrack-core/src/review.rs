//! Abstract review workflow
//!
//! Three operations behind one access gate:
//! - Aggregate an abstract's reviews, newest-updated first, with the
//!   caller's own review picked out so the UI can offer edit-in-place
//! - Create-or-update the caller's review (never another reviewer's)
//! - Administrative status transitions with a declarative table
//!
//! The gate: reviewers must appear in the abstract's `assignedReviewers`
//! list; editors and admins bypass it. Status changes notify the
//! submitting author best-effort.
//!
//! The canonical flow is `received -> under-review -> {revisions,
//! accepted, rejected}` with `revisions -> under-review` resubmission.
//! Enforcement is off by default: non-canonical jumps are logged at
//! `warn`, and rejected only when `enforce_transitions` is set.

use crate::error::CoreError;
use crate::mail::{send_best_effort, Mailer, OutboundEmail};
use conftrack_model::collections::{ABSTRACTS, ABSTRACT_REVIEWS};
use conftrack_model::entities::{abstracts, review};
use conftrack_model::{AbstractReview, AbstractStatus, AbstractSubmission, ReviewDraft, UserRole};
use conftrack_store::{payload, Filter, Query, Sort, Store, UPDATED_AT};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Workflow tuning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewConfig {
    /// Reject non-canonical status jumps instead of logging them
    pub enforce_transitions: bool,
}

/// Authenticated caller identity, as injected by the auth layer.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Caller {
    #[inline]
    #[must_use]
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }
}

/// An abstract's reviews from one caller's point of view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSheet {
    /// All reviews, newest-updated first
    pub reviews: Vec<AbstractReview>,
    /// The caller's own review, when they have one
    pub own_review: Option<AbstractReview>,
}

/// Review operations over one abstracts collection.
pub struct ReviewWorkflow {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
    config: ReviewConfig,
}

impl ReviewWorkflow {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, config: ReviewConfig) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }

    /// All reviews for an abstract, gated.
    pub async fn reviews_for(
        &self,
        abstract_id: Uuid,
        caller: &Caller,
    ) -> Result<ReviewSheet, CoreError> {
        let submission = self.load_abstract(abstract_id).await?;
        gate(&submission, caller)?;

        let reviews = self.collect_reviews(abstract_id).await?;
        let own_review = reviews
            .iter()
            .find(|r| r.reviewer_id == caller.user_id)
            .cloned();
        Ok(ReviewSheet {
            reviews,
            own_review,
        })
    }

    /// Create or update the caller's review of an abstract, gated.
    ///
    /// An existing review by the same reviewer is replaced in place
    /// under its original id; other reviewers' rows are never touched.
    pub async fn submit_review(
        &self,
        abstract_id: Uuid,
        caller: &Caller,
        draft: ReviewDraft,
    ) -> Result<AbstractReview, CoreError> {
        let submission = self.load_abstract(abstract_id).await?;
        gate(&submission, caller)?;

        let own = Filter::and(vec![
            Filter::eq(review::fields::ABSTRACT_ID, abstract_id.to_string()),
            Filter::eq(review::fields::REVIEWER_ID, caller.user_id.to_string()),
        ]);
        let existing = self
            .store
            .find_first(ABSTRACT_REVIEWS, Query::filtered(own))
            .await?;

        let fields = draft.to_payload(abstract_id, caller.user_id);
        let document = match existing {
            Some(previous) => {
                tracing::debug!(review = %previous.id, "replacing reviewer's evaluation in place");
                self.store
                    .update(ABSTRACT_REVIEWS, previous.id, fields)
                    .await?
            }
            None => self.store.create(ABSTRACT_REVIEWS, fields).await?,
        };

        tracing::info!(
            submission = %submission.submission_id,
            reviewer = %caller.user_id,
            "review recorded"
        );
        Ok(AbstractReview::from_document(&document)?)
    }

    /// Administrative status transition. Elevated roles only.
    pub async fn change_status(
        &self,
        abstract_id: Uuid,
        caller: &Caller,
        next: AbstractStatus,
        admin_notes: Option<String>,
    ) -> Result<AbstractSubmission, CoreError> {
        if !caller.role.is_elevated() {
            return Err(CoreError::restricted(
                "only editors and admins may change abstract status",
            ));
        }
        let submission = self.load_abstract(abstract_id).await?;
        let current = submission.status;

        if current != next && !current.allows_transition_to(next) {
            if self.config.enforce_transitions {
                return Err(CoreError::validation(format!(
                    "status transition {current} -> {next} is not allowed"
                )));
            }
            tracing::warn!(
                submission = %submission.submission_id,
                from = %current,
                to = %next,
                "non-canonical status transition permitted"
            );
        }

        let mut changes = payload(json!({ (abstracts::fields::STATUS): next.as_str() }));
        if let Some(notes) = &admin_notes {
            changes.insert(abstracts::fields::ADMIN_NOTES.to_string(), json!(notes));
        }
        let document = self.store.update(ABSTRACTS, abstract_id, changes).await?;
        let updated = AbstractSubmission::from_document(&document)?;

        tracing::info!(
            submission = %updated.submission_id,
            status = %next,
            "abstract status changed"
        );
        if updated.anchor_email().is_some() {
            send_best_effort(self.mailer.as_ref(), status_email(&updated)).await;
        }
        Ok(updated)
    }

    async fn load_abstract(&self, abstract_id: Uuid) -> Result<AbstractSubmission, CoreError> {
        let document = self
            .store
            .find_by_id(ABSTRACTS, abstract_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("abstract {abstract_id}")))?;
        Ok(AbstractSubmission::from_document(&document)?)
    }

    async fn collect_reviews(&self, abstract_id: Uuid) -> Result<Vec<AbstractReview>, CoreError> {
        let query =
            Query::filtered(Filter::eq(review::fields::ABSTRACT_ID, abstract_id.to_string()))
                .with_sort(Sort::desc(UPDATED_AT));
        let documents = self.store.find(ABSTRACT_REVIEWS, query).await?;

        Ok(documents
            .iter()
            .filter_map(|doc| match AbstractReview::from_document(doc) {
                Ok(review) => Some(review),
                Err(err) => {
                    tracing::warn!(id = %doc.id, error = %err, "skipping unusable review row");
                    None
                }
            })
            .collect())
    }
}

fn gate(submission: &AbstractSubmission, caller: &Caller) -> Result<(), CoreError> {
    if caller.role.is_elevated() || submission.is_assigned(caller.user_id) {
        Ok(())
    } else {
        Err(CoreError::restricted(
            "reviewer is not assigned to this abstract",
        ))
    }
}

fn status_email(submission: &AbstractSubmission) -> OutboundEmail {
    let text = format!(
        "Dear {},\n\nThe status of your abstract \"{}\" ({}) is now: {}.\n",
        submission.primary_author.name,
        submission.title,
        submission.submission_id,
        submission.status
    );
    OutboundEmail::plain(
        submission.primary_author.email.clone(),
        format!("Abstract {} status update", submission.submission_id),
        text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingMailer;
    use conftrack_model::Recommendation;
    use conftrack_store::MemoryStore;
    use pretty_assertions::assert_eq;

    struct Fixture {
        store: Arc<MemoryStore>,
        mailer: Arc<RecordingMailer>,
        abstract_id: Uuid,
        assigned: Caller,
        outsider: Caller,
        editor: Caller,
    }

    async fn fixture(config: ReviewConfig) -> (Fixture, ReviewWorkflow) {
        let store = Arc::new(MemoryStore::new());
        let assigned = Caller::new(Uuid::new_v4(), UserRole::Reviewer);
        let outsider = Caller::new(Uuid::new_v4(), UserRole::Reviewer);
        let editor = Caller::new(Uuid::new_v4(), UserRole::Editor);

        let doc = store
            .create(
                ABSTRACTS,
                payload(json!({
                    "submissionId": "ABS-1042",
                    "title": "Outreach models",
                    "primaryAuthor": {"name": "Jane", "email": "jane@x.com"},
                    "status": "under-review",
                    "assignedReviewers": [assigned.user_id.to_string()]
                })),
            )
            .await
            .unwrap();

        let mailer = Arc::new(RecordingMailer::default());
        let workflow = ReviewWorkflow::new(
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::clone(&mailer) as Arc<dyn Mailer>,
            config,
        );
        (
            Fixture {
                store,
                mailer,
                abstract_id: doc.id,
                assigned,
                outsider,
                editor,
            },
            workflow,
        )
    }

    fn draft(recommendation: Recommendation, score: i64) -> ReviewDraft {
        ReviewDraft {
            score: Some(score),
            recommendation,
            confidence: Some(4),
            comments: Some("solid work".to_string()),
        }
    }

    #[tokio::test]
    async fn unassigned_reviewer_is_restricted() {
        let (fx, workflow) = fixture(ReviewConfig::default()).await;

        let view = workflow.reviews_for(fx.abstract_id, &fx.outsider).await;
        assert!(matches!(view, Err(CoreError::AccessRestricted(_))));

        let submit = workflow
            .submit_review(fx.abstract_id, &fx.outsider, draft(Recommendation::Accept, 7))
            .await;
        assert!(matches!(submit, Err(CoreError::AccessRestricted(_))));
    }

    #[tokio::test]
    async fn assigned_reviewer_submits_then_edits_in_place() {
        let (fx, workflow) = fixture(ReviewConfig::default()).await;

        let first = workflow
            .submit_review(fx.abstract_id, &fx.assigned, draft(Recommendation::Revise, 5))
            .await
            .unwrap();
        let second = workflow
            .submit_review(fx.abstract_id, &fx.assigned, draft(Recommendation::Accept, 8))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.recommendation, Recommendation::Accept);
        assert_eq!(second.score, Some(8));
        assert_eq!(fx.store.count(ABSTRACT_REVIEWS), 1);

        let sheet = workflow
            .reviews_for(fx.abstract_id, &fx.assigned)
            .await
            .unwrap();
        assert_eq!(sheet.reviews.len(), 1);
        assert_eq!(sheet.own_review.as_ref().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn elevated_caller_sees_all_reviews_without_own() {
        let (fx, workflow) = fixture(ReviewConfig::default()).await;
        workflow
            .submit_review(fx.abstract_id, &fx.assigned, draft(Recommendation::Accept, 8))
            .await
            .unwrap();

        let sheet = workflow
            .reviews_for(fx.abstract_id, &fx.editor)
            .await
            .unwrap();
        assert_eq!(sheet.reviews.len(), 1);
        assert!(sheet.own_review.is_none());
    }

    #[tokio::test]
    async fn two_reviewers_keep_separate_rows() {
        let (fx, workflow) = fixture(ReviewConfig::default()).await;
        // Second assigned reviewer added directly in the store.
        let other = Caller::new(Uuid::new_v4(), UserRole::Reviewer);
        fx.store
            .update(
                ABSTRACTS,
                fx.abstract_id,
                payload(json!({
                    "assignedReviewers": [
                        fx.assigned.user_id.to_string(),
                        other.user_id.to_string()
                    ]
                })),
            )
            .await
            .unwrap();

        workflow
            .submit_review(fx.abstract_id, &fx.assigned, draft(Recommendation::Accept, 8))
            .await
            .unwrap();
        workflow
            .submit_review(fx.abstract_id, &other, draft(Recommendation::Reject, 2))
            .await
            .unwrap();

        assert_eq!(fx.store.count(ABSTRACT_REVIEWS), 2);
    }

    #[tokio::test]
    async fn status_change_requires_elevated_role() {
        let (fx, workflow) = fixture(ReviewConfig::default()).await;
        let err = workflow
            .change_status(fx.abstract_id, &fx.assigned, AbstractStatus::Accepted, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AccessRestricted(_)));
    }

    #[tokio::test]
    async fn status_change_notifies_author() {
        let (fx, workflow) = fixture(ReviewConfig::default()).await;
        let updated = workflow
            .change_status(
                fx.abstract_id,
                &fx.editor,
                AbstractStatus::Accepted,
                Some("strong reviews".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, AbstractStatus::Accepted);
        assert_eq!(updated.admin_notes.as_deref(), Some("strong reviews"));

        let sent = fx.mailer.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@x.com");
        assert!(sent[0].text.contains("accepted"));
    }

    #[tokio::test]
    async fn non_canonical_jump_is_permitted_by_default() {
        let (fx, workflow) = fixture(ReviewConfig::default()).await;
        // under-review -> received is not in the table.
        let updated = workflow
            .change_status(fx.abstract_id, &fx.editor, AbstractStatus::Received, None)
            .await
            .unwrap();
        assert_eq!(updated.status, AbstractStatus::Received);
    }

    #[tokio::test]
    async fn non_canonical_jump_is_rejected_when_enforced() {
        let config = ReviewConfig {
            enforce_transitions: true,
        };
        let (fx, workflow) = fixture(config).await;

        let err = workflow
            .change_status(fx.abstract_id, &fx.editor, AbstractStatus::Received, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // Canonical steps still pass.
        let updated = workflow
            .change_status(fx.abstract_id, &fx.editor, AbstractStatus::Accepted, None)
            .await
            .unwrap();
        assert_eq!(updated.status, AbstractStatus::Accepted);
    }

    #[tokio::test]
    async fn same_state_write_is_idempotent() {
        let config = ReviewConfig {
            enforce_transitions: true,
        };
        let (fx, workflow) = fixture(config).await;
        let updated = workflow
            .change_status(fx.abstract_id, &fx.editor, AbstractStatus::UnderReview, None)
            .await
            .unwrap();
        assert_eq!(updated.status, AbstractStatus::UnderReview);
    }

    #[tokio::test]
    async fn unknown_abstract_is_not_found() {
        let (_fx, workflow) = fixture(ReviewConfig::default()).await;
        let err = workflow
            .reviews_for(Uuid::new_v4(), &Caller::new(Uuid::new_v4(), UserRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}

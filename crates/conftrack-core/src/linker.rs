//! Account linker backfill
//!
//! Speakers and accepted abstract authors predate login accounts; this
//! job walks both populations and gives every unlinked record a User,
//! creating one where none exists. Created accounts get a random
//! credential (stored only as a sha-256 digest) and a 24-hour password
//! reset token.
//!
//! The job is idempotent: existing links are skipped, existing accounts
//! are reused, and account creation itself goes through
//! `create_unique` keyed on email so re-runs and concurrent signups
//! cannot mint duplicates. One bad record never stops the batch.

use crate::error::CoreError;
use crate::validate::looks_like_email;
use chrono::{Duration, Utc};
use conftrack_model::collections::{ABSTRACTS, SPEAKERS, USERS};
use conftrack_model::entities::user::backfill_payload;
use conftrack_model::entities::{abstracts, speaker, user};
use conftrack_model::{normalize_email, AbstractStatus, AbstractSubmission, Speaker};
use conftrack_store::{payload, Filter, Query, Store, UniqueCreate};
use rand::RngCore;
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

/// Counters for one source population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTally {
    /// Records that got a link (account found or created)
    pub processed: u32,
    /// Records with nothing to do (already linked, no usable email)
    pub skipped: u32,
    /// Records that failed and were passed over
    pub errors: u32,
}

/// Outcome of one backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReport {
    pub speakers: SourceTally,
    pub abstracts: SourceTally,
}

/// Which record an account is being linked to.
#[derive(Debug, Clone, Copy)]
enum LinkTarget {
    Speaker(Uuid),
    Abstract(Uuid),
}

impl LinkTarget {
    /// (target collection, target id, user-side field, target-side field)
    fn wiring(self) -> (&'static str, Uuid, &'static str, &'static str) {
        match self {
            Self::Speaker(id) => (
                SPEAKERS,
                id,
                user::fields::SPEAKER_ID,
                speaker::fields::USER_ID,
            ),
            Self::Abstract(id) => (
                ABSTRACTS,
                id,
                user::fields::ABSTRACT_ID,
                abstracts::fields::USER_ID,
            ),
        }
    }
}

/// Idempotent account backfill over speakers and accepted abstracts.
pub struct AccountLinker {
    store: Arc<dyn Store>,
}

impl AccountLinker {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Run the full backfill.
    ///
    /// Failing to list a source population is fatal; failures on
    /// individual records are counted and skipped.
    pub async fn run(&self) -> Result<LinkReport, CoreError> {
        let speakers = self.link_speakers().await?;
        let abstracts = self.link_abstract_authors().await?;
        let report = LinkReport {
            speakers,
            abstracts,
        };
        tracing::info!(
            speakers_processed = report.speakers.processed,
            abstracts_processed = report.abstracts.processed,
            "account backfill complete"
        );
        Ok(report)
    }

    async fn link_speakers(&self) -> Result<SourceTally, CoreError> {
        let documents = self.store.find(SPEAKERS, Query::all()).await?;
        let mut tally = SourceTally::default();

        for doc in &documents {
            let speaker = match Speaker::from_document(doc) {
                Ok(speaker) => speaker,
                Err(err) => {
                    tracing::warn!(id = %doc.id, error = %err, "unusable speaker record");
                    tally.errors += 1;
                    continue;
                }
            };
            if speaker.is_linked() {
                tally.skipped += 1;
                continue;
            }
            let Some(email) = usable_email(speaker.email.as_deref()) else {
                tracing::debug!(speaker = %speaker.id, "no usable email, skipping");
                tally.skipped += 1;
                continue;
            };

            match self
                .link_one(
                    LinkTarget::Speaker(speaker.id),
                    &email,
                    Some(&speaker.full_name),
                )
                .await
            {
                Ok(()) => tally.processed += 1,
                Err(err) => {
                    tracing::warn!(speaker = %speaker.id, error = %err, "speaker link failed");
                    tally.errors += 1;
                }
            }
        }
        Ok(tally)
    }

    async fn link_abstract_authors(&self) -> Result<SourceTally, CoreError> {
        let accepted = Query::filtered(Filter::eq(
            abstracts::fields::STATUS,
            AbstractStatus::Accepted.as_str(),
        ));
        let documents = self.store.find(ABSTRACTS, accepted).await?;
        let mut tally = SourceTally::default();

        for doc in &documents {
            let submission = match AbstractSubmission::from_document(doc) {
                Ok(submission) => submission,
                Err(err) => {
                    tracing::warn!(id = %doc.id, error = %err, "unusable abstract record");
                    tally.errors += 1;
                    continue;
                }
            };
            if submission.user_id.is_some() {
                tally.skipped += 1;
                continue;
            }
            let Some(email) = usable_email(submission.anchor_email()) else {
                tracing::debug!(submission = %submission.submission_id, "no usable email, skipping");
                tally.skipped += 1;
                continue;
            };

            match self
                .link_one(
                    LinkTarget::Abstract(submission.id),
                    &email,
                    Some(&submission.primary_author.name),
                )
                .await
            {
                Ok(()) => tally.processed += 1,
                Err(err) => {
                    tracing::warn!(
                        submission = %submission.submission_id,
                        error = %err,
                        "author link failed"
                    );
                    tally.errors += 1;
                }
            }
        }
        Ok(tally)
    }

    /// Find or create the account for an email, then wire both
    /// directions of the link.
    async fn link_one(
        &self,
        target: LinkTarget,
        email: &str,
        full_name: Option<&str>,
    ) -> Result<(), CoreError> {
        let by_email = Filter::eq(user::fields::EMAIL, email);
        let existing = self
            .store
            .find_first(USERS, Query::filtered(by_email.clone()))
            .await?;

        let account = match existing {
            Some(doc) => doc,
            None => {
                let (password_hash, reset_token) = fresh_credentials();
                let expiry = Utc::now() + Duration::hours(24);
                let fields =
                    backfill_payload(email, full_name, &password_hash, &reset_token, expiry);
                match self.store.create_unique(USERS, by_email, fields).await? {
                    UniqueCreate::Created(doc) => {
                        tracing::info!(user = %doc.id, "account created by backfill");
                        doc
                    }
                    // Raced with a signup; use theirs.
                    UniqueCreate::Duplicate(doc) => doc,
                }
            }
        };

        let (target_collection, target_id, user_field, target_field) = target.wiring();
        let target_ref = target_id.to_string();

        match account.get_str(user_field) {
            Some(existing_ref) if existing_ref == target_ref => {}
            Some(other) => {
                tracing::debug!(
                    user = %account.id,
                    existing = other,
                    "account already references another record, leaving in place"
                );
            }
            None => {
                self.store
                    .update(USERS, account.id, payload(json!({ user_field: target_ref })))
                    .await?;
            }
        }

        self.store
            .update(
                target_collection,
                target_id,
                payload(json!({ target_field: account.id.to_string() })),
            )
            .await?;
        Ok(())
    }
}

fn usable_email(raw: Option<&str>) -> Option<String> {
    let normalized = normalize_email(raw?);
    looks_like_email(&normalized).then_some(normalized)
}

/// (credential digest, reset token), both random and hex encoded.
fn fresh_credentials() -> (String, String) {
    let mut rng = rand::thread_rng();
    let mut secret = [0u8; 32];
    rng.fill_bytes(&mut secret);
    let mut token = [0u8; 16];
    rng.fill_bytes(&mut token);
    (hex::encode(Sha256::digest(secret)), hex::encode(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use conftrack_model::User;
    use conftrack_store::{Document, MemoryStore};
    use pretty_assertions::assert_eq;

    fn seeded() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.seed(
            SPEAKERS,
            Document::new(payload(json!({
                "fullName": "Dr. Keynote",
                "email": "Keynote@Example.COM"
            }))),
        );
        store.seed(
            SPEAKERS,
            Document::new(payload(json!({
                "fullName": "No Email"
            }))),
        );
        store.seed(
            ABSTRACTS,
            Document::new(payload(json!({
                "submissionId": "ABS-1",
                "title": "Accepted work",
                "primaryAuthor": {"name": "Jane", "email": "jane@x.com"},
                "status": "accepted"
            }))),
        );
        store.seed(
            ABSTRACTS,
            Document::new(payload(json!({
                "submissionId": "ABS-2",
                "title": "Still under review",
                "primaryAuthor": {"name": "Sam", "email": "sam@x.com"},
                "status": "under-review"
            }))),
        );
        Arc::new(store)
    }

    async fn user_by_email(store: &MemoryStore, email: &str) -> Option<User> {
        let doc = store
            .find_first(
                USERS,
                Query::filtered(Filter::eq(user::fields::EMAIL, email)),
            )
            .await
            .unwrap()?;
        Some(User::from_document(&doc).unwrap())
    }

    #[tokio::test]
    async fn creates_accounts_and_links_both_directions() {
        let store = seeded();
        let linker = AccountLinker::new(Arc::clone(&store) as Arc<dyn Store>);

        let report = linker.run().await.unwrap();
        assert_eq!(report.speakers.processed, 1);
        assert_eq!(report.speakers.skipped, 1);
        assert_eq!(report.abstracts.processed, 1);
        assert_eq!(store.count(USERS), 2);

        let speaker_account = user_by_email(&store, "keynote@example.com")
            .await
            .expect("speaker account");
        assert!(speaker_account.speaker_id.is_some());
        assert!(speaker_account.password_hash.is_some());
        assert!(speaker_account.reset_token.is_some());
        let expiry = speaker_account.reset_token_expiry.expect("expiry");
        assert!(expiry > Utc::now() + Duration::hours(23));

        let linked_speaker = store
            .find_by_id(SPEAKERS, speaker_account.speaker_id.unwrap())
            .await
            .unwrap();
        // The back-reference must point at the account we found.
        assert_eq!(
            linked_speaker.unwrap().get_str("userId"),
            Some(speaker_account.id.to_string().as_str())
        );

        let author_account = user_by_email(&store, "jane@x.com")
            .await
            .expect("author account");
        assert!(author_account.abstract_id.is_some());
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let store = seeded();
        let linker = AccountLinker::new(Arc::clone(&store) as Arc<dyn Store>);

        linker.run().await.unwrap();
        let users_after_first = store.count(USERS);
        let second = linker.run().await.unwrap();

        assert_eq!(store.count(USERS), users_after_first);
        assert_eq!(second.speakers.processed, 0);
        assert_eq!(second.abstracts.processed, 0);
        // Everything previously linked now counts as skipped.
        assert_eq!(second.speakers.skipped, 2);
        assert_eq!(second.abstracts.skipped, 1);
    }

    #[tokio::test]
    async fn reuses_existing_account() {
        let store = seeded();
        store.seed(
            USERS,
            Document::new(payload(json!({
                "email": "jane@x.com",
                "role": "applicant",
                "passwordHash": "preexisting"
            }))),
        );
        let linker = AccountLinker::new(Arc::clone(&store) as Arc<dyn Store>);

        linker.run().await.unwrap();
        // Speaker account plus the pre-existing author account.
        assert_eq!(store.count(USERS), 2);

        let account = user_by_email(&store, "jane@x.com").await.unwrap();
        assert_eq!(account.password_hash.as_deref(), Some("preexisting"));
        assert!(account.abstract_id.is_some());
    }

    #[tokio::test]
    async fn malformed_speaker_row_counts_as_error() {
        let store = seeded();
        store.seed(
            SPEAKERS,
            Document::new(payload(json!({ "email": "nameless@x.com" }))),
        );
        let linker = AccountLinker::new(Arc::clone(&store) as Arc<dyn Store>);

        let report = linker.run().await.unwrap();
        assert_eq!(report.speakers.errors, 1);
        assert_eq!(report.speakers.processed, 1);
    }

    #[test]
    fn credentials_are_random_hex() {
        let (hash_a, token_a) = fresh_credentials();
        let (hash_b, token_b) = fresh_credentials();
        assert_eq!(hash_a.len(), 64);
        assert_eq!(token_a.len(), 32);
        assert_ne!(hash_a, hash_b);
        assert_ne!(token_a, token_b);
    }
}

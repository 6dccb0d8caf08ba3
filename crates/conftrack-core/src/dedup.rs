//! Deduplication guard
//!
//! One person, one registration per conference edition. Identity is
//! disjunctive: the same email, or the same passport number for
//! international registrants, or the same national ID for domestic
//! ones. Matches are scoped to the current cycle window so identifiers
//! may legitimately reappear across editions.
//!
//! The guard's pre-check produces a precise conflict reason; the
//! race-free backstop is the same filter passed to
//! [`Store::create_unique`] by the intake service.

use crate::error::{ConflictField, CoreError};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use conftrack_model::collections::REGISTRATIONS;
use conftrack_model::entities::registration::fields;
use conftrack_model::RegistrationCandidate;
use conftrack_store::{Document, Filter, Query, Store, CREATED_AT};
use serde_json::json;
use std::sync::Arc;

/// The date range that counts as "this edition".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleWindow {
    /// Edition label for logs (`"2026"`, `"6th-edition"`)
    label: String,
    /// Registrations created on/after this instant are in scope
    opens_at: DateTime<Utc>,
}

impl CycleWindow {
    /// Window for a configured edition with a fixed opening date.
    #[must_use]
    pub fn configured(label: impl Into<String>, opens_at: DateTime<Utc>) -> Self {
        Self {
            label: label.into(),
            opens_at,
        }
    }

    /// Unconfigured fallback: January 1st of the previous calendar
    /// year, a rolling approximation of "this edition".
    #[must_use]
    pub fn rolling(now: DateTime<Utc>) -> Self {
        let year = now.year() - 1;
        // Jan 1 exists in every year.
        let opens_at = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(now);
        Self {
            label: format!("rolling-{year}"),
            opens_at,
        }
    }

    /// Edition label.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Inclusive lower bound of the window.
    #[inline]
    #[must_use]
    pub fn opens_at(&self) -> DateTime<Utc> {
        self.opens_at
    }

    /// Whether an instant falls inside the window.
    #[inline]
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.opens_at
    }
}

/// Pre-write duplicate check over the registrations collection.
pub struct DedupGuard {
    store: Arc<dyn Store>,
    window: CycleWindow,
}

impl DedupGuard {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, window: CycleWindow) -> Self {
        Self { store, window }
    }

    /// The window this guard scopes matches to.
    #[inline]
    #[must_use]
    pub fn window(&self) -> &CycleWindow {
        &self.window
    }

    /// The composite duplicate filter for a candidate.
    ///
    /// Also used as the guard filter for the conditional insert, so the
    /// pre-check and the write backstop agree on what "duplicate" means.
    /// The candidate must already be normalized.
    #[must_use]
    pub fn duplicate_filter(&self, candidate: &RegistrationCandidate) -> Filter {
        let mut identities = vec![Filter::eq(fields::EMAIL, candidate.email.as_str())];

        if candidate.is_international {
            if let Some(passport) = &candidate.passport_number {
                identities.push(Filter::and(vec![
                    Filter::eq(fields::IS_INTERNATIONAL, true),
                    Filter::eq(fields::PASSPORT_NUMBER, passport.as_str()),
                ]));
            }
        } else if let Some(national_id) = &candidate.national_id_number {
            identities.push(Filter::and(vec![
                Filter::eq(fields::IS_INTERNATIONAL, false),
                Filter::eq(fields::NATIONAL_ID_NUMBER, national_id.as_str()),
            ]));
        }

        Filter::and(vec![
            Filter::or(identities),
            Filter::gte(CREATED_AT, json!(self.window.opens_at().to_rfc3339())),
        ])
    }

    /// Check a candidate against existing registrations.
    ///
    /// A store failure is fatal here: letting a duplicate through
    /// silently is worse than failing the submission.
    pub async fn check(&self, candidate: &RegistrationCandidate) -> Result<(), CoreError> {
        let filter = self.duplicate_filter(candidate);
        let existing = self
            .store
            .find_first(REGISTRATIONS, Query::filtered(filter))
            .await?;

        match existing {
            Some(doc) => {
                let conflict = self.conflict_for(candidate, &doc);
                tracing::info!(
                    edition = self.window.label(),
                    existing = doc.get_str(fields::REGISTRATION_ID).unwrap_or("?"),
                    "duplicate registration rejected"
                );
                Err(conflict)
            }
            None => Ok(()),
        }
    }

    /// Name the field that matched, identity documents first.
    pub(crate) fn conflict_for(
        &self,
        candidate: &RegistrationCandidate,
        existing: &Document,
    ) -> CoreError {
        let field = if field_matches(existing, fields::PASSPORT_NUMBER, &candidate.passport_number)
        {
            ConflictField::PassportNumber
        } else if field_matches(
            existing,
            fields::NATIONAL_ID_NUMBER,
            &candidate.national_id_number,
        ) {
            ConflictField::NationalIdNumber
        } else {
            ConflictField::Email
        };

        let existing_id = existing
            .get_str(fields::REGISTRATION_ID)
            .map_or_else(|| existing.id.to_string(), str::to_string);

        CoreError::Conflict { field, existing_id }
    }
}

fn field_matches(existing: &Document, field: &str, candidate_value: &Option<String>) -> bool {
    match candidate_value {
        Some(value) => existing.get_str(field) == Some(value.as_str()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conftrack_store::{payload, MemoryStore};
    use pretty_assertions::assert_eq;

    fn window() -> CycleWindow {
        CycleWindow::configured("2026", Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap())
    }

    fn candidate(email: &str, national_id: Option<&str>) -> RegistrationCandidate {
        let mut c = RegistrationCandidate {
            full_name: "Test Person".to_string(),
            email: email.to_string(),
            is_international: false,
            passport_number: None,
            national_id_number: national_id.map(str::to_string),
        };
        c.normalize();
        c
    }

    fn seeded(created_at: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(
            REGISTRATIONS,
            Document::new(payload(json!({
                "registrationId": "REG-2026-AA11BB",
                "email": "jane@x.com",
                "fullName": "Jane",
                "isInternational": false,
                "nationalIdNumber": "123456789",
                "createdAt": created_at
            }))),
        );
        store
    }

    #[tokio::test]
    async fn fresh_identity_passes() {
        let guard = DedupGuard::new(Arc::new(seeded("2025-10-01T00:00:00Z")), window());
        let ok = guard.check(&candidate("new@x.com", Some("999"))).await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn same_email_conflicts_on_email() {
        let guard = DedupGuard::new(Arc::new(seeded("2025-10-01T00:00:00Z")), window());
        let err = guard
            .check(&candidate("jane@x.com", None))
            .await
            .unwrap_err();
        match err {
            CoreError::Conflict { field, existing_id } => {
                assert_eq!(field, ConflictField::Email);
                assert_eq!(existing_id, "REG-2026-AA11BB");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn national_id_outranks_email() {
        let guard = DedupGuard::new(Arc::new(seeded("2025-10-01T00:00:00Z")), window());
        // Different email, same national ID: the document is the evidence.
        let err = guard
            .check(&candidate("other@x.com", Some("12 34 56 789")))
            .await
            .unwrap_err();
        match err {
            CoreError::Conflict { field, .. } => assert_eq!(field, ConflictField::NationalIdNumber),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn passport_match_requires_international_flag() {
        let store = MemoryStore::new();
        store.seed(
            REGISTRATIONS,
            Document::new(payload(json!({
                "registrationId": "REG-2026-CC22DD",
                "email": "intl@x.com",
                "isInternational": true,
                "passportNumber": "AB123456",
                "createdAt": "2025-10-01T00:00:00Z"
            }))),
        );
        let guard = DedupGuard::new(Arc::new(store), window());

        let mut c = RegistrationCandidate {
            full_name: "Other Person".to_string(),
            email: "different@x.com".to_string(),
            is_international: true,
            passport_number: Some("ab 123 456".to_string()),
            national_id_number: None,
        };
        c.normalize();
        let err = guard.check(&c).await.unwrap_err();
        match err {
            CoreError::Conflict { field, .. } => assert_eq!(field, ConflictField::PassportNumber),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn prior_edition_records_are_exempt() {
        // Same identity, but created before the window opened.
        let guard = DedupGuard::new(Arc::new(seeded("2024-06-01T00:00:00Z")), window());
        let ok = guard.check(&candidate("jane@x.com", Some("123456789"))).await;
        assert!(ok.is_ok());
    }

    #[test]
    fn rolling_window_opens_previous_january() {
        let now = Utc.with_ymd_and_hms(2026, 8, 22, 12, 0, 0).unwrap();
        let window = CycleWindow::rolling(now);
        assert_eq!(
            window.opens_at(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(window.contains(now));
        assert!(!window.contains(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()));
        assert_eq!(window.label(), "rolling-2025");
    }
}

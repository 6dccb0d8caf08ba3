//! Registration intake
//!
//! The full submission path: normalize, validate, duplicate-check,
//! store the passport scan, insert race-free, confirm by email. The
//! insert goes through [`Store::create_unique`] with the guard's own
//! duplicate filter, so two concurrent submissions of the same identity
//! cannot both land even though both may pass the pre-check.

use crate::dedup::{CycleWindow, DedupGuard};
use crate::error::CoreError;
use crate::mail::{send_best_effort, Mailer, OutboundEmail};
use crate::sink::{DocumentSink, UploadedDocument};
use crate::validate::looks_like_email;
use chrono::{Datelike, Utc};
use conftrack_model::collections::REGISTRATIONS;
use conftrack_model::identifiers::REGISTRATION_PREFIX;
use conftrack_model::{Registration, RegistrationCandidate};
use conftrack_store::{Store, UniqueCreate};
use std::sync::Arc;

/// Where the passport scan comes from.
#[derive(Debug, Clone)]
pub enum PassportScan {
    /// Raw upload to pass through the document sink
    Upload(UploadedDocument),
    /// Reference to a document already stored elsewhere
    Reference(String),
}

/// Registration submission service.
pub struct RegistrationIntake {
    store: Arc<dyn Store>,
    sink: Arc<dyn DocumentSink>,
    mailer: Arc<dyn Mailer>,
    guard: DedupGuard,
}

impl RegistrationIntake {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        sink: Arc<dyn DocumentSink>,
        mailer: Arc<dyn Mailer>,
        window: CycleWindow,
    ) -> Self {
        let guard = DedupGuard::new(Arc::clone(&store), window);
        Self {
            store,
            sink,
            mailer,
            guard,
        }
    }

    /// The duplicate guard this intake writes through.
    #[inline]
    #[must_use]
    pub fn guard(&self) -> &DedupGuard {
        &self.guard
    }

    /// Accept a public submission.
    ///
    /// Returns the stored registration, a validation error, or a
    /// conflict naming the matched field and the existing record's
    /// public identifier.
    pub async fn submit(
        &self,
        mut candidate: RegistrationCandidate,
        scan: Option<PassportScan>,
    ) -> Result<Registration, CoreError> {
        candidate.normalize();
        validate(&candidate, scan.as_ref())?;

        // Pre-check for a precise conflict reason; the conditional
        // insert below is the correctness backstop.
        self.guard.check(&candidate).await?;

        let scan_ref = match scan {
            Some(PassportScan::Upload(document)) => Some(self.sink.put(&document).await?),
            Some(PassportScan::Reference(reference)) => Some(reference),
            None => None,
        };

        let registration_id = issue_registration_id();
        let fields = candidate.to_payload(&registration_id, scan_ref.as_deref());
        let outcome = self
            .store
            .create_unique(REGISTRATIONS, self.guard.duplicate_filter(&candidate), fields)
            .await?;

        let created = match outcome {
            UniqueCreate::Created(document) => document,
            UniqueCreate::Duplicate(existing) => {
                // Lost a race with an identical submission.
                return Err(self.guard.conflict_for(&candidate, &existing));
            }
        };

        let registration = Registration::from_document(&created)?;
        tracing::info!(
            registration = %registration.registration_id,
            international = registration.is_international,
            "registration created"
        );

        send_best_effort(self.mailer.as_ref(), confirmation_email(&registration)).await;
        Ok(registration)
    }
}

fn validate(
    candidate: &RegistrationCandidate,
    scan: Option<&PassportScan>,
) -> Result<(), CoreError> {
    if candidate.full_name.is_empty() {
        return Err(CoreError::validation("full name is required"));
    }
    if !looks_like_email(&candidate.email) {
        return Err(CoreError::validation("a valid email address is required"));
    }
    if candidate.is_international && scan.is_none() {
        return Err(CoreError::validation(
            "international registrations require a passport scan document",
        ));
    }
    Ok(())
}

/// New public identifier: `REG-<year>-<6 hex chars>`.
fn issue_registration_id() -> String {
    let suffix: [u8; 3] = rand::random();
    format!(
        "{}{}-{}",
        REGISTRATION_PREFIX,
        Utc::now().year(),
        hex::encode(suffix).to_uppercase()
    )
}

fn confirmation_email(registration: &Registration) -> OutboundEmail {
    let text = format!(
        "Dear {},\n\nYour registration has been received.\n\
         Your registration number is {}.\n\
         You can check your status at any time using this number.\n",
        registration.full_name, registration.registration_id
    );
    OutboundEmail::plain(
        registration.email.clone(),
        format!("Registration received: {}", registration.registration_id),
        text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemoryDocumentSink;
    use crate::testing::RecordingMailer;
    use chrono::TimeZone;
    use conftrack_store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn window() -> CycleWindow {
        CycleWindow::configured("2026", Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap())
    }

    fn intake() -> (Arc<MemoryStore>, Arc<RecordingMailer>, RegistrationIntake) {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let intake = RegistrationIntake::new(
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::new(MemoryDocumentSink::new()),
            Arc::clone(&mailer) as Arc<dyn Mailer>,
            window(),
        );
        (store, mailer, intake)
    }

    fn domestic(email: &str, national_id: &str) -> RegistrationCandidate {
        RegistrationCandidate {
            full_name: "Jane Doe".to_string(),
            email: email.to_string(),
            is_international: false,
            passport_number: None,
            national_id_number: Some(national_id.to_string()),
        }
    }

    #[tokio::test]
    async fn accepts_and_confirms() {
        let (store, mailer, intake) = intake();
        let registration = intake
            .submit(domestic(" Jane.Doe@X.com ", "123456789"), None)
            .await
            .unwrap();

        assert!(registration.registration_id.starts_with("REG-"));
        assert_eq!(registration.email, "jane.doe@x.com");
        assert_eq!(store.count(REGISTRATIONS), 1);

        let sent = mailer.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane.doe@x.com");
        assert!(sent[0].text.contains(&registration.registration_id));
    }

    #[tokio::test]
    async fn second_submission_conflicts_with_first_id() {
        let (_store, _mailer, intake) = intake();
        let first = intake
            .submit(domestic("a@x.com", "123456789"), None)
            .await
            .unwrap();

        // Different email, same national ID.
        let err = intake
            .submit(domestic("b@x.com", "12 34 56 789"), None)
            .await
            .unwrap_err();
        match err {
            CoreError::Conflict { field, existing_id } => {
                assert_eq!(field.label(), "national ID number");
                assert_eq!(existing_id, first.registration_id);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn international_requires_scan() {
        let (_store, mailer, intake) = intake();
        let candidate = RegistrationCandidate {
            full_name: "Intl Person".to_string(),
            email: "intl@x.com".to_string(),
            is_international: true,
            passport_number: Some("AB123456".to_string()),
            national_id_number: None,
        };

        let err = intake.submit(candidate.clone(), None).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(mailer.sent.lock().is_empty());

        let upload = UploadedDocument::new("scan.pdf", "application/pdf", &b"%PDF"[..]);
        let registration = intake
            .submit(candidate, Some(PassportScan::Upload(upload)))
            .await
            .unwrap();
        assert!(registration.passport_scan_ref.is_some());
    }

    #[tokio::test]
    async fn scan_reference_is_stored_verbatim() {
        let (_store, _mailer, intake) = intake();
        let candidate = RegistrationCandidate {
            full_name: "Intl Person".to_string(),
            email: "ref@x.com".to_string(),
            is_international: true,
            passport_number: None,
            national_id_number: None,
        };
        let registration = intake
            .submit(
                candidate,
                Some(PassportScan::Reference("uploads/p.pdf".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(registration.passport_scan_ref.as_deref(), Some("uploads/p.pdf"));
    }

    #[tokio::test]
    async fn rejects_malformed_email() {
        let (_store, _mailer, intake) = intake();
        let err = intake
            .submit(domestic("not-an-email", "123"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_identical_submissions_create_once() {
        let (store, _mailer, intake) = intake();
        let intake = Arc::new(intake);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let intake = Arc::clone(&intake);
            handles.push(tokio::spawn(async move {
                intake.submit(domestic("race@x.com", "555"), None).await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(CoreError::Conflict { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.count(REGISTRATIONS), 1);
    }
}

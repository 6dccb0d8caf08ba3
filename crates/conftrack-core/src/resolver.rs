//! Identity resolver
//!
//! Public status lookup by prefixed token. The four entity kinds share
//! no foreign keys; email is the only cross-reference, so resolution is
//! two-phase: classify the token and hit its home collection directly,
//! then fan out by the hit's anchor email to the sibling collections.
//! Fan-out lookups touch disjoint collections and run concurrently.
//!
//! "Nothing found" is a valid result, never an error: a well-formed
//! token that matches no record resolves to an all-null bundle.

use crate::error::CoreError;
use conftrack_model::collections::{
    ABSTRACTS, PARTNERSHIP_INQUIRIES, REGISTRATIONS, VOLUNTEER_APPLICATIONS,
};
use conftrack_model::entities::{abstracts, partnership, registration, volunteer};
use conftrack_model::{
    normalize_email, AbstractSubmission, IdentifierKind, PartnershipInquiry, PartnershipRef,
    PublicToken, Registration, VolunteerApplication,
};
use conftrack_store::{Filter, Query, Sort, Store, CREATED_AT};
use serde::Serialize;
use std::sync::Arc;

/// Everything known about one person's interactions, by anchor email.
///
/// Every slot is independently nullable; empty slots serialize as
/// explicit nulls (or an empty list) so the tracking page can render
/// each section unconditionally.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingBundle {
    pub registration: Option<Registration>,
    pub abstracts: Vec<AbstractSubmission>,
    pub partnership: Option<PartnershipInquiry>,
    pub volunteer: Option<VolunteerApplication>,
}

impl TrackingBundle {
    /// Whether any slot is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registration.is_none()
            && self.abstracts.is_empty()
            && self.partnership.is_none()
            && self.volunteer.is_none()
    }
}

/// Cross-entity lookup by public identifier token.
pub struct IdentityResolver {
    store: Arc<dyn Store>,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Resolve a raw token into a tracking bundle.
    ///
    /// A store failure during the direct lookup is fatal; a failure in
    /// any single fan-out lookup degrades that slot to null with a
    /// warning.
    pub async fn resolve(&self, raw_token: &str) -> Result<TrackingBundle, CoreError> {
        let token = PublicToken::parse(raw_token)
            .map_err(|_| CoreError::validation("identifier token must not be empty"))?;

        let mut bundle = TrackingBundle::default();
        let anchor = self.direct_lookup(&token, &mut bundle).await?;

        if let Some(email) = anchor {
            let email = normalize_email(&email);
            tracing::debug!(kind = ?token.kind(), "fanning out by anchor email");

            let (registration, abstracts, partnership, volunteer) = tokio::join!(
                self.registration_by_email(&email, bundle.registration.is_none()),
                self.abstracts_by_email(&email, bundle.abstracts.is_empty()),
                self.partnership_by_email(&email, bundle.partnership.is_none()),
                self.volunteer_by_email(&email, bundle.volunteer.is_none()),
            );

            if let Some(found) = registration {
                bundle.registration = Some(found);
            }
            if !abstracts.is_empty() {
                bundle.abstracts = abstracts;
            }
            if let Some(found) = partnership {
                bundle.partnership = Some(found);
            }
            if let Some(found) = volunteer {
                bundle.volunteer = Some(found);
            }
        }

        Ok(bundle)
    }

    /// Phase one: hit the token's home collection and pull the anchor
    /// email out of the match.
    async fn direct_lookup(
        &self,
        token: &PublicToken,
        bundle: &mut TrackingBundle,
    ) -> Result<Option<String>, CoreError> {
        match token.kind() {
            IdentifierKind::Abstract => {
                let filter = Filter::eq(abstracts::fields::SUBMISSION_ID, token.as_str());
                let Some(doc) = self
                    .store
                    .find_first(ABSTRACTS, Query::filtered(filter))
                    .await?
                else {
                    return Ok(None);
                };
                match AbstractSubmission::from_document(&doc) {
                    Ok(submission) => {
                        let anchor = submission.anchor_email().map(str::to_string);
                        bundle.abstracts.push(submission);
                        Ok(anchor)
                    }
                    Err(err) => {
                        tracing::warn!(id = %doc.id, error = %err, "unusable abstract record");
                        Ok(None)
                    }
                }
            }

            IdentifierKind::Volunteer => {
                let filter = Filter::eq(volunteer::fields::APPLICATION_ID, token.as_str());
                let Some(doc) = self
                    .store
                    .find_first(VOLUNTEER_APPLICATIONS, Query::filtered(filter))
                    .await?
                else {
                    return Ok(None);
                };
                match VolunteerApplication::from_document(&doc) {
                    Ok(application) => {
                        let anchor = Some(application.email.clone());
                        bundle.volunteer = Some(application);
                        Ok(anchor)
                    }
                    Err(err) => {
                        tracing::warn!(id = %doc.id, error = %err, "unusable volunteer record");
                        Ok(None)
                    }
                }
            }

            IdentifierKind::Partnership => {
                let filter = match token.partnership_ref() {
                    PartnershipRef::Numeric(number) => {
                        Filter::eq(partnership::fields::INQUIRY_NUMBER, number)
                    }
                    // Legacy tokens embed an email fragment; emails are
                    // stored lowercase, contains matching is
                    // case-insensitive anyway.
                    PartnershipRef::LegacyFragment(fragment) => {
                        Filter::contains(partnership::fields::EMAIL, fragment.to_lowercase())
                    }
                };
                let query = Query::filtered(filter).with_sort(Sort::desc(CREATED_AT));
                let Some(doc) = self.store.find_first(PARTNERSHIP_INQUIRIES, query).await? else {
                    return Ok(None);
                };
                match PartnershipInquiry::from_document(&doc) {
                    Ok(inquiry) => {
                        let anchor = Some(inquiry.email.clone());
                        bundle.partnership = Some(inquiry);
                        Ok(anchor)
                    }
                    Err(err) => {
                        tracing::warn!(id = %doc.id, error = %err, "unusable partnership record");
                        Ok(None)
                    }
                }
            }

            IdentifierKind::Registration => {
                let filter = Filter::eq(registration::fields::REGISTRATION_ID, token.as_str());
                let Some(doc) = self
                    .store
                    .find_first(REGISTRATIONS, Query::filtered(filter))
                    .await?
                else {
                    return Ok(None);
                };
                match Registration::from_document(&doc) {
                    Ok(found) => {
                        let anchor = Some(found.email.clone());
                        bundle.registration = Some(found);
                        Ok(anchor)
                    }
                    Err(err) => {
                        tracing::warn!(id = %doc.id, error = %err, "unusable registration record");
                        Ok(None)
                    }
                }
            }
        }
    }

    async fn registration_by_email(&self, email: &str, needed: bool) -> Option<Registration> {
        if !needed {
            return None;
        }
        let query = Query::filtered(Filter::eq(registration::fields::EMAIL, email))
            .with_sort(Sort::desc(CREATED_AT));
        match self.store.find_first(REGISTRATIONS, query).await {
            Ok(doc) => doc.and_then(|d| mapped_or_warn(Registration::from_document(&d))),
            Err(err) => {
                tracing::warn!(error = %err, "registration fan-out failed, slot degraded");
                None
            }
        }
    }

    async fn abstracts_by_email(&self, email: &str, needed: bool) -> Vec<AbstractSubmission> {
        if !needed {
            return Vec::new();
        }
        let query = Query::filtered(Filter::eq(abstracts::fields::PRIMARY_AUTHOR_EMAIL, email))
            .with_sort(Sort::desc(CREATED_AT));
        match self.store.find(ABSTRACTS, query).await {
            Ok(docs) => docs
                .iter()
                .filter_map(|d| mapped_or_warn(AbstractSubmission::from_document(d)))
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, "abstracts fan-out failed, slot degraded");
                Vec::new()
            }
        }
    }

    async fn partnership_by_email(&self, email: &str, needed: bool) -> Option<PartnershipInquiry> {
        if !needed {
            return None;
        }
        let query = Query::filtered(Filter::eq(partnership::fields::EMAIL, email))
            .with_sort(Sort::desc(CREATED_AT));
        match self.store.find_first(PARTNERSHIP_INQUIRIES, query).await {
            Ok(doc) => doc.and_then(|d| mapped_or_warn(PartnershipInquiry::from_document(&d))),
            Err(err) => {
                tracing::warn!(error = %err, "partnership fan-out failed, slot degraded");
                None
            }
        }
    }

    async fn volunteer_by_email(&self, email: &str, needed: bool) -> Option<VolunteerApplication> {
        if !needed {
            return None;
        }
        let query = Query::filtered(Filter::eq(volunteer::fields::EMAIL, email))
            .with_sort(Sort::desc(CREATED_AT));
        match self.store.find_first(VOLUNTEER_APPLICATIONS, query).await {
            Ok(doc) => doc.and_then(|d| mapped_or_warn(VolunteerApplication::from_document(&d))),
            Err(err) => {
                tracing::warn!(error = %err, "volunteer fan-out failed, slot degraded");
                None
            }
        }
    }
}

fn mapped_or_warn<T>(mapped: Result<T, conftrack_model::ModelError>) -> Option<T> {
    match mapped {
        Ok(entity) => Some(entity),
        Err(err) => {
            tracing::warn!(error = %err, "skipping unusable record");
            None
        }
    }
}

//! Lifecycle states and review verdicts
//!
//! Wire values are kebab-case strings (`under-review`, `form-submit`).
//! Parsing is lenient: an unrecognized stored value falls back to the
//! entity's initial state rather than failing the whole lookup, and an
//! unrecognized role falls back to the least-privileged one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// The kebab-case wire representation.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Registration lifecycle.
    RegistrationStatus {
        /// Awaiting payment or manual confirmation
        Pending => "pending",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
    }
}

impl Default for RegistrationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

wire_enum! {
    /// Payment state attached to a registration.
    PaymentStatus {
        Unpaid => "unpaid",
        Paid => "paid",
        Waived => "waived",
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Unpaid
    }
}

wire_enum! {
    /// Abstract submission lifecycle.
    AbstractStatus {
        /// Just submitted, not yet assigned
        Received => "received",
        UnderReview => "under-review",
        /// Sent back to the author for changes
        Revisions => "revisions",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

impl Default for AbstractStatus {
    fn default() -> Self {
        Self::Received
    }
}

impl AbstractStatus {
    /// Whether `next` is a step the canonical review flow permits from
    /// this state. Terminal states permit nothing.
    #[must_use]
    pub fn allows_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Received, Self::UnderReview)
                | (Self::UnderReview, Self::Revisions)
                | (Self::UnderReview, Self::Accepted)
                | (Self::UnderReview, Self::Rejected)
                | (Self::Revisions, Self::UnderReview)
                | (Self::Revisions, Self::Accepted)
                | (Self::Revisions, Self::Rejected)
        )
    }

    /// Accepted and rejected are terminal.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

wire_enum! {
    /// Partnership inquiry lifecycle.
    PartnershipStatus {
        New => "new",
        InDiscussion => "in-discussion",
        Agreed => "agreed",
        Declined => "declined",
    }
}

impl Default for PartnershipStatus {
    fn default() -> Self {
        Self::New
    }
}

wire_enum! {
    /// Volunteer application lifecycle.
    VolunteerStatus {
        Pending => "pending",
        Shortlisted => "shortlisted",
        Accepted => "accepted",
        Declined => "declined",
    }
}

impl Default for VolunteerStatus {
    fn default() -> Self {
        Self::Pending
    }
}

wire_enum! {
    /// Reviewer verdict on an abstract.
    Recommendation {
        Accept => "accept",
        Reject => "reject",
        Revise => "revise",
    }
}

wire_enum! {
    /// Account role, ordered least to most privileged.
    UserRole {
        Applicant => "applicant",
        Reviewer => "reviewer",
        Editor => "editor",
        Admin => "admin",
    }
}

impl Default for UserRole {
    /// Unknown roles never grant privilege.
    fn default() -> Self {
        Self::Applicant
    }
}

impl UserRole {
    /// Editors and admins may change abstract status and see all reviews.
    #[inline]
    #[must_use]
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }
}

/// Telemetry event classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    PageView,
    Download,
    FormSubmit,
    /// Anything the classifier does not recognize
    Other,
}

impl EventKind {
    /// Classify a raw event-type string. Never fails; unknown types
    /// land in [`EventKind::Other`] so totals stay complete.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "page-view" | "pageview" => Self::PageView,
            "download" => Self::Download,
            "form-submit" | "formsubmit" => Self::FormSubmit,
            _ => Self::Other,
        }
    }

    /// The kebab-case wire representation.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PageView => "page-view",
            Self::Download => "download",
            Self::FormSubmit => "form-submit",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a stored status string, falling back to the type's default.
#[must_use]
pub fn parse_or_default<T: FromStr + Default>(raw: Option<&str>) -> T {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        assert_eq!(AbstractStatus::UnderReview.as_str(), "under-review");
        assert_eq!(
            "under-review".parse::<AbstractStatus>(),
            Ok(AbstractStatus::UnderReview)
        );
        assert_eq!(
            "in-discussion".parse::<PartnershipStatus>(),
            Ok(PartnershipStatus::InDiscussion)
        );
    }

    #[test]
    fn unknown_status_falls_back_to_initial() {
        let status: AbstractStatus = parse_or_default(Some("garbled"));
        assert_eq!(status, AbstractStatus::Received);
        let status: RegistrationStatus = parse_or_default(None);
        assert_eq!(status, RegistrationStatus::Pending);
    }

    #[test]
    fn unknown_role_gets_least_privilege() {
        let role: UserRole = parse_or_default(Some("superuser"));
        assert_eq!(role, UserRole::Applicant);
        assert!(!role.is_elevated());
        assert!(UserRole::Editor.is_elevated());
        assert!(UserRole::Admin.is_elevated());
        assert!(!UserRole::Reviewer.is_elevated());
    }

    #[test]
    fn canonical_review_transitions() {
        use AbstractStatus::*;
        assert!(Received.allows_transition_to(UnderReview));
        assert!(UnderReview.allows_transition_to(Accepted));
        assert!(Revisions.allows_transition_to(UnderReview));
        assert!(!Received.allows_transition_to(Accepted));
        assert!(!Accepted.allows_transition_to(UnderReview));
        assert!(Accepted.is_terminal());
        assert!(Rejected.is_terminal());
        assert!(!Revisions.is_terminal());
    }

    #[test]
    fn event_classification_is_total() {
        assert_eq!(EventKind::classify("page-view"), EventKind::PageView);
        assert_eq!(EventKind::classify("PageView"), EventKind::PageView);
        assert_eq!(EventKind::classify("download"), EventKind::Download);
        assert_eq!(EventKind::classify("form-submit"), EventKind::FormSubmit);
        assert_eq!(EventKind::classify("mystery"), EventKind::Other);
        assert_eq!(EventKind::classify(""), EventKind::Other);
    }
}

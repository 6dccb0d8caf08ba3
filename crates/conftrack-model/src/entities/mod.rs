//! Typed views over stored documents
//!
//! Every entity maps from a [`conftrack_store::Document`] with
//! `from_document`, requiring only the fields it cannot exist without
//! and degrading gracefully on the rest. Each module also exports its
//! wire field names for filter construction.

pub mod abstracts;
pub mod partnership;
pub mod registration;
pub mod review;
pub mod speaker;
pub mod telemetry;
pub mod user;
pub mod volunteer;

pub use abstracts::{AbstractSubmission, Author};
pub use partnership::PartnershipInquiry;
pub use registration::{Registration, RegistrationCandidate};
pub use review::{AbstractReview, ReviewDraft};
pub use speaker::Speaker;
pub use telemetry::TelemetryEvent;
pub use user::User;
pub use volunteer::VolunteerApplication;

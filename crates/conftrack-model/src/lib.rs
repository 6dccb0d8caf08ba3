//! Conftrack Model - domain entities and identifier classification
//!
//! Typed views over the schemaless store:
//! - [`PublicToken`]: one-place classification of prefixed identifiers
//! - Entity mappers for registrations, abstracts, reviews, inquiries,
//!   volunteers, users, speakers and telemetry rows
//! - Lifecycle enums with kebab-case wire values and lenient parsing
//! - Collection-name constants shared across the workspace
//!
//! # Example
//!
//! ```rust,ignore
//! use conftrack_model::{IdentifierKind, PublicToken};
//!
//! let token = PublicToken::parse("  abs-1042 ")?;
//! assert_eq!(token.kind(), IdentifierKind::Abstract);
//! assert_eq!(token.as_str(), "ABS-1042");
//! # Ok::<(), conftrack_model::ModelError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod collections;
pub mod entities;
pub mod error;
pub mod identifiers;
pub mod status;

// Re-exports for convenience
pub use entities::{
    AbstractReview, AbstractSubmission, Author, PartnershipInquiry, Registration,
    RegistrationCandidate, ReviewDraft, Speaker, TelemetryEvent, User, VolunteerApplication,
};
pub use error::ModelError;
pub use identifiers::{
    normalize_email, normalize_national_id, normalize_passport, IdentifierKind, PartnershipRef,
    PublicToken,
};
pub use status::{
    parse_or_default, AbstractStatus, EventKind, PartnershipStatus, PaymentStatus, Recommendation,
    RegistrationStatus, UserRole, VolunteerStatus,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Collection names shared across the workspace
//!
//! The store is schemaless; these constants are the only agreement on
//! where each entity kind lives.

/// Registration records
pub const REGISTRATIONS: &str = "registrations";

/// Abstract submissions
pub const ABSTRACTS: &str = "abstracts";

/// Reviewer evaluations of abstracts
pub const ABSTRACT_REVIEWS: &str = "abstract-reviews";

/// Partnership inquiries
pub const PARTNERSHIP_INQUIRIES: &str = "partnership-inquiries";

/// Volunteer applications
pub const VOLUNTEER_APPLICATIONS: &str = "volunteer-applications";

/// Login accounts
pub const USERS: &str = "users";

/// Speaker profiles
pub const SPEAKERS: &str = "speakers";

/// Raw telemetry rows (page views and interaction events)
pub const TELEMETRY_EVENTS: &str = "telemetry-events";

//! Error types for the core services
//!
//! Four request-surfaced categories:
//! - Validation failures (malformed input, missing required document)
//! - Identity conflicts from the deduplication guard
//! - Access restrictions from the review gate
//! - Upstream collaborator failures (store, mail, document sink)

use conftrack_model::ModelError;
use conftrack_store::StoreError;
use std::fmt;

/// Which identity field a duplicate matched on.
///
/// Identity documents outrank email when both match, so conflict
/// messages name the strongest evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Email,
    PassportNumber,
    NationalIdNumber,
}

impl ConflictField {
    /// Human-readable field name for conflict messages.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::PassportNumber => "passport number",
            Self::NationalIdNumber => "national ID number",
        }
    }
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Main core error type.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or incomplete caller input
    #[error("{0}")]
    Validation(String),

    /// A duplicate identity was detected within the cycle window
    #[error("a registration with this {field} already exists")]
    Conflict {
        /// Field the duplicate matched on
        field: ConflictField,
        /// Public identifier of the existing record
        existing_id: String,
    },

    /// Caller is not allowed to see or act on this record
    #[error("restricted: {0}")]
    AccessRestricted(String),

    /// The addressed record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// A collaborator (store, mail, document sink) failed
    #[error("upstream service failure: {0}")]
    Upstream(String),
}

impl CoreError {
    /// Validation-failure constructor.
    #[inline]
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Access-restriction constructor.
    #[inline]
    #[must_use]
    pub fn restricted(reason: impl Into<String>) -> Self {
        Self::AccessRestricted(reason.into())
    }

    /// Whether this error is the caller's fault rather than ours.
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Upstream(_))
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        Self::Upstream(format!("stored record unusable: {err}"))
    }
}

impl From<crate::sink::SinkError> for CoreError {
    fn from(err: crate::sink::SinkError) -> Self {
        Self::Upstream(err.to_string())
    }
}

//! Public identifier tokens and identity-field normalization
//!
//! Every record a person can ask about carries a prefixed public token
//! (`ABS-1042`, `VOL-2025-07`, `PART-…`, `REG-…`/`SARSYC-…`). The prefix
//! deterministically selects the entity type before any query is issued;
//! classification happens in exactly one place, [`PublicToken::parse`],
//! and downstream code matches exhaustively on [`IdentifierKind`].
//!
//! Identity fields are normalized on ingest so that equality filters
//! compare like with like: passports uppercase without spaces, national
//! IDs without spaces, emails lowercase and trimmed.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Prefix marking an abstract submission token.
pub const ABSTRACT_PREFIX: &str = "ABS-";

/// Prefix marking a volunteer application token.
pub const VOLUNTEER_PREFIX: &str = "VOL-";

/// Prefix marking a partnership inquiry token.
pub const PARTNERSHIP_PREFIX: &str = "PART-";

/// Prefix for registration identifiers issued by this system. Legacy
/// `SARSYC-` identifiers still circulate; both fall to the registration
/// catch-all during classification.
pub const REGISTRATION_PREFIX: &str = "REG-";

/// The entity type a public token refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierKind {
    /// Conference registration
    Registration,
    /// Abstract submission
    Abstract,
    /// Partnership inquiry
    Partnership,
    /// Volunteer application
    Volunteer,
}

/// How a partnership token addresses its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartnershipRef {
    /// Sequential inquiry number (`PART-1042` or bare `1042`)
    Numeric(i64),
    /// Legacy tokens embed a fragment of the inquirer's email
    LegacyFragment(String),
}

/// A normalized, classified public identifier token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicToken {
    normalized: String,
    kind: IdentifierKind,
}

impl PublicToken {
    /// Normalize (trim, uppercase) and classify a raw token.
    ///
    /// # Errors
    /// `ModelError::EmptyToken` when nothing remains after trimming.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ModelError::EmptyToken);
        }

        let kind = if normalized.starts_with(ABSTRACT_PREFIX) {
            IdentifierKind::Abstract
        } else if normalized.starts_with(VOLUNTEER_PREFIX) {
            IdentifierKind::Volunteer
        } else if normalized.starts_with(PARTNERSHIP_PREFIX) || is_numeric(&normalized) {
            IdentifierKind::Partnership
        } else {
            IdentifierKind::Registration
        };

        Ok(Self { normalized, kind })
    }

    /// Entity type this token addresses.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    /// The normalized token text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Partnership addressing mode for this token.
    ///
    /// Only meaningful when [`kind`](Self::kind) is
    /// [`IdentifierKind::Partnership`]: the `PART-` prefix is stripped and
    /// a fully numeric remainder addresses by inquiry number, anything
    /// else is a legacy email fragment.
    #[must_use]
    pub fn partnership_ref(&self) -> PartnershipRef {
        let remainder = self
            .normalized
            .strip_prefix(PARTNERSHIP_PREFIX)
            .unwrap_or(&self.normalized);
        match remainder.parse::<i64>() {
            Ok(number) if is_numeric(remainder) => PartnershipRef::Numeric(number),
            _ => PartnershipRef::LegacyFragment(remainder.to_string()),
        }
    }
}

impl std::fmt::Display for PublicToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Lowercase and trim an email address.
#[inline]
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Uppercase a passport number and strip all whitespace.
#[inline]
#[must_use]
pub fn normalize_passport(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Strip all whitespace from a national ID number.
#[inline]
#[must_use]
pub fn normalize_national_id(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

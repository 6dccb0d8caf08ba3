//! Input validation helpers

use once_cell::sync::Lazy;
use regex::Regex;

// Deliberately loose: one @, no whitespace, a dot somewhere after it.
// Real deliverability is the mail provider's problem.
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Whether a string is shaped like an email address.
#[must_use]
pub fn looks_like_email(candidate: &str) -> bool {
    EMAIL_SHAPE.is_match(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(looks_like_email("jane.doe@example.com"));
        assert!(looks_like_email("a+tag@sub.domain.org"));
    }

    #[test]
    fn rejects_obvious_garbage() {
        assert!(!looks_like_email(""));
        assert!(!looks_like_email("no-at-sign"));
        assert!(!looks_like_email("two@@x.com"));
        assert!(!looks_like_email("spaces in@x.com"));
        assert!(!looks_like_email("nodot@localhost"));
    }
}

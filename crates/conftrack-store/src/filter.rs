//! Filter trees for document queries
//!
//! Queries against the store are expressed as an AND/OR tree over three
//! predicate kinds:
//! - Equality on a field
//! - Case-insensitive substring (`contains`) on a string field
//! - Greater-than-or-equal on a comparable field
//!
//! Field names address nested objects with dots (`primaryAuthor.email`).
//! The tree is data: store backends translate it into their native query
//! language, and the in-memory store evaluates it directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A single query predicate or a boolean combination of predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Field equals value exactly.
    Eq {
        /// Dotted field path
        field: String,
        /// Expected value
        value: Value,
    },
    /// String field contains the needle (case-insensitive).
    Contains {
        /// Dotted field path
        field: String,
        /// Substring to look for
        needle: String,
    },
    /// Field is greater than or equal to the bound.
    Gte {
        /// Dotted field path
        field: String,
        /// Inclusive lower bound
        bound: Value,
    },
    /// All sub-filters must match.
    And(Vec<Filter>),
    /// At least one sub-filter must match.
    Or(Vec<Filter>),
}

impl Filter {
    /// Equality predicate.
    #[inline]
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive substring predicate.
    #[inline]
    #[must_use]
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    /// Inclusive lower-bound predicate.
    #[inline]
    #[must_use]
    pub fn gte(field: impl Into<String>, bound: impl Into<Value>) -> Self {
        Self::Gte {
            field: field.into(),
            bound: bound.into(),
        }
    }

    /// Conjunction of sub-filters.
    #[inline]
    #[must_use]
    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And(filters)
    }

    /// Disjunction of sub-filters.
    #[inline]
    #[must_use]
    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }

    /// Evaluate this filter against a document payload.
    ///
    /// Missing fields never match a predicate; empty `And` matches
    /// everything and empty `Or` matches nothing.
    #[must_use]
    pub fn matches(&self, fields: &serde_json::Map<String, Value>) -> bool {
        match self {
            Self::Eq { field, value } => {
                lookup_path(fields, field).is_some_and(|found| found == value)
            }
            Self::Contains { field, needle } => lookup_path(fields, field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
            Self::Gte { field, bound } => lookup_path(fields, field).is_some_and(|found| {
                compare_values(found, bound)
                    .is_some_and(|ord| ord != Ordering::Less)
            }),
            Self::And(filters) => filters.iter().all(|f| f.matches(fields)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(fields)),
        }
    }
}

/// Resolve a dotted path against a payload map.
#[must_use]
pub fn lookup_path<'a>(
    fields: &'a serde_json::Map<String, Value>,
    path: &str,
) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Order two JSON values for range predicates and sorting.
///
/// Numbers compare numerically; strings that both parse as RFC 3339
/// timestamps compare as instants, all other strings lexically. Mixed or
/// non-comparable kinds yield `None`, which range predicates treat as
/// "no match".
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => {
            let parsed = (
                chrono::DateTime::parse_from_rfc3339(x),
                chrono::DateTime::parse_from_rfc3339(y),
            );
            match parsed {
                (Ok(tx), Ok(ty)) => Some(tx.cmp(&ty)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().expect("object literal").clone()
    }

    #[test]
    fn eq_matches_exact_value() {
        let fields = payload(json!({"email": "a@x.com", "count": 3}));
        assert!(Filter::eq("email", "a@x.com").matches(&fields));
        assert!(Filter::eq("count", 3).matches(&fields));
        assert!(!Filter::eq("email", "b@x.com").matches(&fields));
    }

    #[test]
    fn eq_missing_field_never_matches() {
        let fields = payload(json!({"email": "a@x.com"}));
        assert!(!Filter::eq("phone", "123").matches(&fields));
    }

    #[test]
    fn nested_path_lookup() {
        let fields = payload(json!({"primaryAuthor": {"email": "a@x.com"}}));
        assert!(Filter::eq("primaryAuthor.email", "a@x.com").matches(&fields));
        assert!(!Filter::eq("primaryAuthor.name", "a@x.com").matches(&fields));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let fields = payload(json!({"email": "Jane.Doe@Example.COM"}));
        assert!(Filter::contains("email", "jane.doe").matches(&fields));
        assert!(Filter::contains("email", "EXAMPLE").matches(&fields));
        assert!(!Filter::contains("email", "smith").matches(&fields));
    }

    #[test]
    fn gte_compares_rfc3339_timestamps() {
        let fields = payload(json!({"createdAt": "2025-06-01T10:00:00Z"}));
        assert!(Filter::gte("createdAt", "2025-01-01T00:00:00Z").matches(&fields));
        assert!(Filter::gte("createdAt", "2025-06-01T10:00:00Z").matches(&fields));
        assert!(!Filter::gte("createdAt", "2025-07-01T00:00:00Z").matches(&fields));
    }

    #[test]
    fn gte_compares_numbers() {
        let fields = payload(json!({"score": 7}));
        assert!(Filter::gte("score", 7).matches(&fields));
        assert!(!Filter::gte("score", 8).matches(&fields));
    }

    #[test]
    fn and_or_combinations() {
        let fields = payload(json!({"isInternational": true, "passportNumber": "AB123"}));

        let composite = Filter::or(vec![
            Filter::eq("email", "nobody@x.com"),
            Filter::and(vec![
                Filter::eq("isInternational", true),
                Filter::eq("passportNumber", "AB123"),
            ]),
        ]);
        assert!(composite.matches(&fields));

        let miss = Filter::or(vec![
            Filter::eq("email", "nobody@x.com"),
            Filter::and(vec![
                Filter::eq("isInternational", false),
                Filter::eq("passportNumber", "AB123"),
            ]),
        ]);
        assert!(!miss.matches(&fields));
    }

    #[test]
    fn empty_combinators() {
        let fields = payload(json!({"a": 1}));
        assert!(Filter::and(vec![]).matches(&fields));
        assert!(!Filter::or(vec![]).matches(&fields));
    }

    #[test]
    fn mixed_kinds_do_not_compare() {
        let fields = payload(json!({"score": "high"}));
        assert!(!Filter::gte("score", 5).matches(&fields));
    }
}

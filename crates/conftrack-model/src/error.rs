//! Model error type

/// Failures mapping documents to typed entities.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A field the entity cannot exist without is absent or mistyped
    #[error("{entity} record is missing required field `{field}`")]
    MissingField {
        /// Entity kind being mapped
        entity: &'static str,
        /// Field that was required
        field: &'static str,
    },

    /// A public identifier token was empty after normalization
    #[error("empty identifier token")]
    EmptyToken,
}

impl ModelError {
    /// Missing-field constructor.
    #[inline]
    #[must_use]
    pub fn missing(entity: &'static str, field: &'static str) -> Self {
        Self::MissingField { entity, field }
    }
}

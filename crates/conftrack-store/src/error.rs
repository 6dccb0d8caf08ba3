//! Store error type

use uuid::Uuid;

/// Failures surfaced by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Record id does not exist in the collection
    #[error("record {id} not found in {collection}")]
    NotFound {
        /// Collection that was queried
        collection: String,
        /// Missing record id
        id: Uuid,
    },

    /// Backend-specific failure (connection, timeout, corrupt row)
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Not-found constructor with owned collection name.
    #[inline]
    #[must_use]
    pub fn not_found(collection: &str, id: Uuid) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id,
        }
    }
}

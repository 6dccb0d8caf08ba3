//! The persistence collaborator contract
//!
//! Every component in the workspace is orchestration over this interface.
//! The store guarantees nothing beyond it: no foreign keys, no uniqueness,
//! no schema. `create_unique` is the one concession to correctness: a
//! conditional insert evaluated under the backend's write exclusion, used
//! to keep check-then-insert sequences race-free.

use crate::document::Document;
use crate::error::StoreError;
use crate::filter::Filter;
use async_trait::async_trait;
use serde_json::Value;

/// Sort direction for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// Sort key: one field, one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// Dotted field path to order by
    pub field: String,
    /// Direction
    pub order: SortOrder,
}

impl Sort {
    /// Ascending sort on a field.
    #[inline]
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    /// Descending sort on a field.
    #[inline]
    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }
}

/// A read query: optional filter, optional sort, optional limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Predicate tree; `None` matches everything
    pub filter: Option<Filter>,
    /// Result ordering; `None` keeps the store's stable order
    pub sort: Option<Sort>,
    /// Maximum number of records to return
    pub limit: Option<usize>,
}

impl Query {
    /// Query matching every record.
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Query with a filter.
    #[inline]
    #[must_use]
    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// Attach a sort.
    #[inline]
    #[must_use]
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Attach a limit.
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Outcome of a conditional insert.
#[derive(Debug, Clone, PartialEq)]
pub enum UniqueCreate {
    /// No record matched the guard filter; the document was inserted
    Created(Document),
    /// The guard filter matched; nothing was inserted
    Duplicate(Document),
}

/// Async document-store contract.
///
/// Implementations must tolerate unknown collections on reads (empty
/// result, not an error) and must evaluate `create_unique` atomically with
/// respect to concurrent writers of the same collection.
#[async_trait]
pub trait Store: Send + Sync {
    /// Find records matching a query.
    async fn find(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError>;

    /// Look up a single record by store id.
    async fn find_by_id(
        &self,
        collection: &str,
        id: uuid::Uuid,
    ) -> Result<Option<Document>, StoreError>;

    /// Insert a new record, returning it with its assigned id.
    async fn create(
        &self,
        collection: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<Document, StoreError>;

    /// Merge changes into an existing record.
    async fn update(
        &self,
        collection: &str,
        id: uuid::Uuid,
        changes: serde_json::Map<String, Value>,
    ) -> Result<Document, StoreError>;

    /// Insert `fields` only if no record matches `absent`.
    ///
    /// The filter evaluation and the insert happen under the same write
    /// exclusion; two concurrent calls with the same guard cannot both
    /// insert.
    async fn create_unique(
        &self,
        collection: &str,
        absent: Filter,
        fields: serde_json::Map<String, Value>,
    ) -> Result<UniqueCreate, StoreError>;

    /// Find the single most relevant record for a query.
    ///
    /// Default implementation: run the query with limit 1.
    async fn find_first(
        &self,
        collection: &str,
        query: Query,
    ) -> Result<Option<Document>, StoreError> {
        let mut records = self.find(collection, query.with_limit(1)).await?;
        Ok(if records.is_empty() {
            None
        } else {
            Some(records.remove(0))
        })
    }
}

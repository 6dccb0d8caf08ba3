//! In-memory reference store
//!
//! Backs the test suites, the fixtures crate, and the demo server. Each
//! collection is an insertion-ordered vector guarded by one `RwLock`, so
//! the sort-tie guarantee ("the store's own stable order") is insertion
//! order, and `create_unique` gets its exclusion from the write lock.

use crate::document::{Document, CREATED_AT, UPDATED_AT};
use crate::error::StoreError;
use crate::filter::{compare_values, lookup_path, Filter};
use crate::store::{Query, Sort, SortOrder, Store, UniqueCreate};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

/// Thread-safe in-memory document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built document, keeping its id and timestamps.
    ///
    /// Fixture seam: lets tests backdate `createdAt` or pin ids. Regular
    /// writes go through [`Store::create`].
    pub fn seed(&self, collection: &str, document: Document) {
        let mut collections = self.collections.write();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Number of records in a collection.
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn stamp(fields: &mut serde_json::Map<String, Value>) {
        let now = Utc::now().to_rfc3339();
        fields
            .entry(CREATED_AT.to_string())
            .or_insert_with(|| Value::String(now.clone()));
        fields
            .entry(UPDATED_AT.to_string())
            .or_insert_with(|| Value::String(now));
    }

    fn run_query(records: &[Document], query: &Query) -> Vec<Document> {
        let mut matched: Vec<Document> = records
            .iter()
            .filter(|doc| {
                query
                    .filter
                    .as_ref()
                    .map_or(true, |f| f.matches(&doc.fields))
            })
            .cloned()
            .collect();

        if let Some(Sort { field, order }) = &query.sort {
            // Stable sort: ties keep insertion order.
            matched.sort_by(|a, b| {
                let ordering = match (lookup_path(&a.fields, field), lookup_path(&b.fields, field))
                {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                };
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        matched
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read();
        let records = collections.get(collection).map_or(&[][..], Vec::as_slice);
        Ok(Self::run_query(records, &query))
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|records| records.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn create(
        &self,
        collection: &str,
        mut fields: serde_json::Map<String, Value>,
    ) -> Result<Document, StoreError> {
        Self::stamp(&mut fields);
        let document = Document::new(fields);
        tracing::debug!(collection, id = %document.id, "create");

        let mut collections = self.collections.write();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        changes: serde_json::Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write();
        let records = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let document = records
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        for (key, value) in changes {
            document.fields.insert(key, value);
        }
        document
            .fields
            .insert(UPDATED_AT.to_string(), Value::String(Utc::now().to_rfc3339()));
        tracing::debug!(collection, id = %document.id, "update");
        Ok(document.clone())
    }

    async fn create_unique(
        &self,
        collection: &str,
        absent: Filter,
        mut fields: serde_json::Map<String, Value>,
    ) -> Result<UniqueCreate, StoreError> {
        // Check and insert under one write guard.
        let mut collections = self.collections.write();
        let records = collections.entry(collection.to_string()).or_default();

        if let Some(existing) = records.iter().find(|doc| absent.matches(&doc.fields)) {
            tracing::debug!(collection, id = %existing.id, "create_unique: guard matched");
            return Ok(UniqueCreate::Duplicate(existing.clone()));
        }

        Self::stamp(&mut fields);
        let document = Document::new(fields);
        tracing::debug!(collection, id = %document.id, "create_unique: inserted");
        records.push(document.clone());
        Ok(UniqueCreate::Created(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::payload;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn create_then_find_by_id() {
        let store = MemoryStore::new();
        let created = store
            .create("registrations", payload(json!({"email": "a@x.com"})))
            .await
            .unwrap();

        let found = store
            .find_by_id("registrations", created.id)
            .await
            .unwrap()
            .expect("created record");
        assert_eq!(found.get_str("email"), Some("a@x.com"));
        assert!(found.created_at().is_some());
    }

    #[tokio::test]
    async fn unknown_collection_reads_empty() {
        let store = MemoryStore::new();
        let records = store.find("nothing", Query::all()).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(
            store.find_by_id("nothing", Uuid::new_v4()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn find_filters_sorts_and_limits() {
        let store = MemoryStore::new();
        for (email, day) in [
            ("a@x.com", "2025-03-01T00:00:00Z"),
            ("a@x.com", "2025-03-03T00:00:00Z"),
            ("b@x.com", "2025-03-02T00:00:00Z"),
        ] {
            store
                .create(
                    "registrations",
                    payload(json!({"email": email, "createdAt": day})),
                )
                .await
                .unwrap();
        }

        let newest = store
            .find_first(
                "registrations",
                Query::filtered(Filter::eq("email", "a@x.com"))
                    .with_sort(Sort::desc(CREATED_AT)),
            )
            .await
            .unwrap()
            .expect("match");
        assert_eq!(newest.get_str(CREATED_AT), Some("2025-03-03T00:00:00Z"));
    }

    #[tokio::test]
    async fn sort_ties_keep_insertion_order() {
        let store = MemoryStore::new();
        let first = store
            .create("rows", payload(json!({"k": "same", "n": 1})))
            .await
            .unwrap();
        store
            .create("rows", payload(json!({"k": "same", "n": 2})))
            .await
            .unwrap();

        let sorted = store
            .find("rows", Query::all().with_sort(Sort::asc("k")))
            .await
            .unwrap();
        assert_eq!(sorted[0].id, first.id);
    }

    #[tokio::test]
    async fn update_merges_and_restamps() {
        let store = MemoryStore::new();
        let created = store
            .create("registrations", payload(json!({"status": "pending"})))
            .await
            .unwrap();

        let updated = store
            .update(
                "registrations",
                created.id,
                payload(json!({"status": "confirmed"})),
            )
            .await
            .unwrap();
        assert_eq!(updated.get_str("status"), Some("confirmed"));

        let missing = store
            .update("registrations", Uuid::new_v4(), payload(json!({})))
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn create_unique_rejects_existing_match() {
        let store = MemoryStore::new();
        store
            .create("registrations", payload(json!({"email": "a@x.com"})))
            .await
            .unwrap();

        let outcome = store
            .create_unique(
                "registrations",
                Filter::eq("email", "a@x.com"),
                payload(json!({"email": "a@x.com"})),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, UniqueCreate::Duplicate(_)));
        assert_eq!(store.count("registrations"), 1);
    }

    #[tokio::test]
    async fn concurrent_create_unique_inserts_once() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .create_unique(
                        "registrations",
                        Filter::eq("email", "race@x.com"),
                        payload(json!({"email": "race@x.com"})),
                    )
                    .await
                    .unwrap()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), UniqueCreate::Created(_)) {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.count("registrations"), 1);
    }
}

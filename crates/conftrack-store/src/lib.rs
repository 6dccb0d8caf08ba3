//! Conftrack Store - persistence collaborator contract
//!
//! The rest of the workspace is pure orchestration over this interface:
//! - [`Filter`]: AND/OR predicate tree (equality, contains, gte)
//! - [`Document`]: schemaless payload under a store id
//! - [`Store`]: async read/write contract with conditional insert
//! - [`MemoryStore`]: reference implementation for tests and demos
//!
//! # Example
//!
//! ```rust,ignore
//! use conftrack_store::{Filter, MemoryStore, Query, Sort, Store};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! let newest = store
//!     .find_first(
//!         "registrations",
//!         Query::filtered(Filter::eq("email", "a@x.com"))
//!             .with_sort(Sort::desc("createdAt")),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod document;
mod error;
mod filter;
mod memory;
mod store;

// Re-exports
pub use document::{payload, Document, CREATED_AT, UPDATED_AT};
pub use error::StoreError;
pub use filter::{compare_values, lookup_path, Filter};
pub use memory::MemoryStore;
pub use store::{Query, Sort, SortOrder, Store, UniqueCreate};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

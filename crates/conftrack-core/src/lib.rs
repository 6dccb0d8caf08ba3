//! Conftrack Core - identity and status orchestration
//!
//! The services behind the public tracking and review surfaces:
//! - [`DedupGuard`]: disjunctive duplicate check scoped to a cycle window
//! - [`RegistrationIntake`]: validate, guard, store, confirm
//! - [`IdentityResolver`]: token classification plus anchor-email fan-out
//! - [`ReviewWorkflow`]: gated review aggregation and status transitions
//! - [`AccountLinker`]: idempotent account backfill for speakers/authors
//!
//! Collaborators (store, mail, document sink) are traits; everything
//! here is orchestration over them.
//!
//! # Example
//!
//! ```rust,ignore
//! use conftrack_core::{IdentityResolver, TrackingBundle};
//! use conftrack_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = IdentityResolver::new(Arc::new(MemoryStore::new()));
//! let bundle = resolver.resolve("ABS-1042").await?;
//! if bundle.is_empty() {
//!     println!("nothing on file for that token");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod dedup;
pub mod error;
pub mod intake;
pub mod linker;
pub mod mail;
pub mod resolver;
pub mod review;
pub mod sink;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use dedup::{CycleWindow, DedupGuard};
pub use error::{ConflictField, CoreError};
pub use intake::{PassportScan, RegistrationIntake};
pub use linker::{AccountLinker, LinkReport, SourceTally};
pub use mail::{send_best_effort, LogMailer, MailError, Mailer, OutboundEmail, SendReceipt};
pub use resolver::{IdentityResolver, TrackingBundle};
pub use review::{Caller, ReviewConfig, ReviewSheet, ReviewWorkflow};
pub use sink::{DocumentSink, MemoryDocumentSink, SinkError, UploadedDocument};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Conftrack Server - HTTP surface and CLI
//!
//! Exposes the core services over warp:
//! - `GET /track?id=` public tracking lookup
//! - `POST /api/registrations` intake (JSON or multipart)
//! - `GET /api/analytics?range=` gap-free dashboard summary
//! - `GET|POST /api/abstracts/:id/reviews`, `PATCH .../status`
//! - `POST /api/maintenance/link-accounts` admin backfill
//!
//! # Example
//!
//! ```rust,ignore
//! use conftrack_server::{app, AppConfig, AppContext, LocalDocumentSink};
//! use conftrack_core::LogMailer;
//! use conftrack_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let config = AppConfig::default();
//! let ctx = AppContext::new(
//!     &config,
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(LocalDocumentSink::new(config.storage.document_dir.clone())),
//!     Arc::new(LogMailer),
//! );
//! warp::serve(app(ctx)).run(([127, 0, 0, 1], 3000)).await;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
mod context;
mod reject;
mod routes;
pub mod sink;

use warp::filters::BoxedFilter;
use warp::{Filter, Reply};

// Re-exports for convenience
pub use config::AppConfig;
pub use context::AppContext;
pub use sink::LocalDocumentSink;

/// The complete application filter: every route plus the error
/// contract and request tracing.
#[must_use]
pub fn app(ctx: AppContext) -> BoxedFilter<(impl Reply,)> {
    routes::api(ctx)
        .recover(reject::handle_rejection)
        .with(warp::trace::request())
        .boxed()
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Conftrack Analytics - gap-free time-series aggregation
//!
//! Turns raw telemetry rows into the dashboard summary:
//! - [`RangeSelector`]: the five supported reporting windows
//! - [`buckets`]: skeleton-first series synthesis, so sparse data never
//!   produces gaps in a chart
//! - [`Aggregator`]: one fetch feeding totals, visitor counts, page
//!   rankings and both series
//!
//! # Example
//!
//! ```rust,ignore
//! use conftrack_analytics::{Aggregator, AnalyticsConfig, RangeSelector};
//!
//! let aggregator = Aggregator::new(store, AnalyticsConfig::default());
//! let summary = aggregator
//!     .summary("30d".parse::<RangeSelector>()?, chrono::Utc::now())
//!     .await?;
//! println!("{} page views", summary.total_page_views);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod buckets;
pub mod error;
pub mod range;
pub mod summary;

// Re-exports for convenience
pub use buckets::{EventBucket, ViewBucket};
pub use error::AnalyticsError;
pub use range::{Granularity, RangeSelector};
pub use summary::{Aggregator, AnalyticsConfig, DashboardSummary, InteractionCounts, PageCount};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Analytics error types

use conftrack_store::StoreError;
use thiserror::Error;

/// Errors produced while building a dashboard summary.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The caller asked for a range outside the supported set.
    #[error("unknown range selector `{0}`, expected one of 7d, 14d, 30d, 3m, 1y")]
    InvalidRange(String),

    /// The telemetry store could not be read.
    #[error("upstream service failure: {0}")]
    Upstream(String),
}

impl From<StoreError> for AnalyticsError {
    fn from(err: StoreError) -> Self {
        Self::Upstream(err.to_string())
    }
}

//! Dashboard summary endpoint
//!
//! `GET /api/analytics?range=7d|14d|30d|3m|1y`. An omitted range means
//! the default dashboard view of the last thirty days.

use crate::context::AppContext;
use crate::reject;
use crate::routes::with_context;
use chrono::Utc;
use conftrack_analytics::RangeSelector;
use serde::Deserialize;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
struct AnalyticsQuery {
    #[serde(default)]
    range: Option<String>,
}

pub(super) fn route(
    ctx: AppContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::get()
        .and(warp::path!("api" / "analytics"))
        .and(warp::query::<AnalyticsQuery>())
        .and(with_context(ctx))
        .and_then(handle)
}

async fn handle(query: AnalyticsQuery, ctx: AppContext) -> Result<impl Reply, Rejection> {
    let range = query
        .range
        .as_deref()
        .unwrap_or("30d")
        .parse::<RangeSelector>()
        .map_err(reject::custom)?;
    let summary = ctx
        .aggregator
        .summary(range, Utc::now())
        .await
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&summary))
}

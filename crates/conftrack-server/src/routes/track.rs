//! Public tracking endpoint
//!
//! `GET /track?id=<token>` resolves any public identifier without
//! authentication. A token that matches nothing is still a success
//! with all-null slots, never a 404.

use crate::context::AppContext;
use crate::reject;
use crate::routes::with_context;
use conftrack_core::TrackingBundle;
use serde::{Deserialize, Serialize};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
struct TrackQuery {
    #[serde(default)]
    id: Option<String>,
}

/// Success envelope. Empty slots serialize as explicit nulls.
#[derive(Debug, Serialize)]
struct TrackResponse {
    success: bool,
    #[serde(flatten)]
    bundle: TrackingBundle,
}

pub(super) fn route(
    ctx: AppContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::get()
        .and(warp::path("track"))
        .and(warp::path::end())
        .and(warp::query::<TrackQuery>())
        .and(with_context(ctx))
        .and_then(handle)
}

async fn handle(query: TrackQuery, ctx: AppContext) -> Result<impl Reply, Rejection> {
    let token = query.id.unwrap_or_default();
    let bundle = ctx
        .resolver
        .resolve(&token)
        .await
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&TrackResponse {
        success: true,
        bundle,
    }))
}

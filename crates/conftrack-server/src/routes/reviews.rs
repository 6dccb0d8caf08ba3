//! Abstract review surface
//!
//! All three endpoints are gated on the caller: assigned reviewers and
//! elevated roles may read and write reviews, only elevated roles may
//! change an abstract's status.

use crate::context::AppContext;
use crate::reject;
use crate::routes::{caller, with_context};
use conftrack_core::{Caller, CoreError};
use conftrack_model::{AbstractStatus, ReviewDraft};
use serde::Deserialize;
use uuid::Uuid;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusChange {
    status: String,
    #[serde(default)]
    admin_notes: Option<String>,
}

pub(super) fn routes(
    ctx: AppContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let sheet = warp::get()
        .and(warp::path!("api" / "abstracts" / Uuid / "reviews"))
        .and(caller())
        .and(with_context(ctx.clone()))
        .and_then(review_sheet);

    let submit = warp::post()
        .and(warp::path!("api" / "abstracts" / Uuid / "reviews"))
        .and(caller())
        .and(warp::body::json())
        .and(with_context(ctx.clone()))
        .and_then(submit_review);

    let status = warp::patch()
        .and(warp::path!("api" / "abstracts" / Uuid / "status"))
        .and(caller())
        .and(warp::body::json())
        .and(with_context(ctx))
        .and_then(change_status);

    sheet.or(submit).or(status)
}

async fn review_sheet(
    abstract_id: Uuid,
    caller: Caller,
    ctx: AppContext,
) -> Result<impl Reply, Rejection> {
    let sheet = ctx
        .reviews
        .reviews_for(abstract_id, &caller)
        .await
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&sheet))
}

async fn submit_review(
    abstract_id: Uuid,
    caller: Caller,
    draft: ReviewDraft,
    ctx: AppContext,
) -> Result<impl Reply, Rejection> {
    let review = ctx
        .reviews
        .submit_review(abstract_id, &caller, draft)
        .await
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&review))
}

async fn change_status(
    abstract_id: Uuid,
    caller: Caller,
    request: StatusChange,
    ctx: AppContext,
) -> Result<impl Reply, Rejection> {
    let next = request.status.trim().parse::<AbstractStatus>().map_err(|_| {
        reject::custom(CoreError::validation(format!(
            "unknown abstract status `{}`",
            request.status
        )))
    })?;
    let submission = ctx
        .reviews
        .change_status(abstract_id, &caller, next, request.admin_notes)
        .await
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&submission))
}

//! Route composition
//!
//! Each endpoint lives in its own module and exposes a filter; this
//! module wires them together. Caller identity arrives as
//! `x-user-id` / `x-user-role` headers injected by the auth layer in
//! front of this service.

mod analytics;
mod maintenance;
mod registrations;
mod reviews;
mod track;

use crate::context::AppContext;
use crate::reject;
use conftrack_core::{Caller, CoreError};
use conftrack_model::parse_or_default;
use std::convert::Infallible;
use uuid::Uuid;
use warp::{Filter, Rejection, Reply};

/// All endpoints, before rejection recovery.
pub(crate) fn api(
    ctx: AppContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    track::route(ctx.clone())
        .or(registrations::route(ctx.clone()))
        .or(analytics::route(ctx.clone()))
        .or(reviews::routes(ctx.clone()))
        .or(maintenance::route(ctx))
}

fn with_context(
    ctx: AppContext,
) -> impl Filter<Extract = (AppContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

/// Extract the authenticated caller from the identity headers.
///
/// A missing or malformed user id is a restricted-access failure, not
/// a validation one: the gated endpoints require an identity before
/// they reveal whether the record exists.
fn caller() -> impl Filter<Extract = (Caller,), Error = Rejection> + Clone {
    warp::header::optional::<String>("x-user-id")
        .and(warp::header::optional::<String>("x-user-role"))
        .and_then(extract_caller)
}

async fn extract_caller(
    id: Option<String>,
    role: Option<String>,
) -> Result<Caller, Rejection> {
    match id.as_deref().and_then(|raw| Uuid::parse_str(raw.trim()).ok()) {
        Some(user_id) => Ok(Caller::new(user_id, parse_or_default(role.as_deref()))),
        None => Err(reject::custom(CoreError::restricted(
            "caller identity missing or malformed",
        ))),
    }
}

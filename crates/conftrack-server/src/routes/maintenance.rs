//! Maintenance endpoints
//!
//! `POST /api/maintenance/link-accounts` runs the account backfill
//! job. Admins only; the job also exists as a CLI subcommand.

use crate::context::AppContext;
use crate::reject;
use crate::routes::{caller, with_context};
use conftrack_core::{Caller, CoreError};
use conftrack_model::UserRole;
use warp::{Filter, Rejection, Reply};

pub(super) fn route(
    ctx: AppContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::post()
        .and(warp::path!("api" / "maintenance" / "link-accounts"))
        .and(caller())
        .and(with_context(ctx))
        .and_then(link_accounts)
}

async fn link_accounts(caller: Caller, ctx: AppContext) -> Result<impl Reply, Rejection> {
    if caller.role != UserRole::Admin {
        return Err(reject::custom(CoreError::restricted(
            "only admins may run account maintenance",
        )));
    }
    let report = ctx.linker.run().await.map_err(reject::custom)?;
    Ok(warp::reply::json(&report))
}

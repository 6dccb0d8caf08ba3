//! Error-to-response mapping
//!
//! One rejection type wraps every service error; [`handle_rejection`]
//! turns it into the documented JSON body and status code. Handlers
//! never build error responses themselves.

use conftrack_analytics::AnalyticsError;
use conftrack_core::CoreError;
use serde_json::{json, Value};
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

/// Service failure carried through warp's rejection machinery.
#[derive(Debug)]
pub(crate) enum ApiError {
    Core(CoreError),
    Analytics(AnalyticsError),
}

impl warp::reject::Reject for ApiError {}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        Self::Analytics(err)
    }
}

/// Wrap a service error as a warp rejection.
pub(crate) fn custom(err: impl Into<ApiError>) -> Rejection {
    warp::reject::custom(err.into())
}

/// Map rejections to the wire error contract.
pub(crate) async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, body) = if let Some(api) = err.find::<ApiError>() {
        reply_for(api)
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, json!({ "error": "no such route" }))
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (
            StatusCode::BAD_REQUEST,
            json!({ "error": "malformed request body" }),
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            json!({ "error": "unsupported content type" }),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            json!({ "error": "method not allowed" }),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            json!({ "error": "payload too large" }),
        )
    } else {
        tracing::error!(?err, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "internal error" }),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

fn reply_for(err: &ApiError) -> (StatusCode, Value) {
    match err {
        ApiError::Core(core) => match core {
            CoreError::Validation(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            CoreError::Conflict { field, existing_id } => (
                StatusCode::CONFLICT,
                json!({
                    "error": core.to_string(),
                    "field": field.label(),
                    "existingRegistrationId": existing_id,
                }),
            ),
            CoreError::AccessRestricted(reason) => (
                StatusCode::FORBIDDEN,
                json!({ "error": "restricted", "reason": reason }),
            ),
            CoreError::NotFound(_) => {
                (StatusCode::NOT_FOUND, json!({ "error": core.to_string() }))
            }
            CoreError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": core.to_string() }),
            ),
        },
        ApiError::Analytics(analytics) => match analytics {
            AnalyticsError::InvalidRange(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": analytics.to_string() }),
            ),
            AnalyticsError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": analytics.to_string() }),
            ),
        },
    }
}

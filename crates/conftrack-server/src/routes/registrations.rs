//! Registration intake endpoint
//!
//! `POST /api/registrations` accepts either a JSON body or a multipart
//! form carrying a passport scan file part. Both funnel into the same
//! intake service; a duplicate identity inside the active cycle window
//! comes back as `409 {error, field, existingRegistrationId}`.

use crate::context::AppContext;
use crate::reject;
use crate::routes::with_context;
use bytes::{BufMut, Bytes};
use conftrack_core::{CoreError, PassportScan, UploadedDocument};
use conftrack_model::RegistrationCandidate;
use futures::TryStreamExt;
use serde::Deserialize;
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::{Filter, Rejection, Reply};

const MAX_JSON_BYTES: u64 = 64 * 1024;
const MAX_UPLOAD_BYTES: u64 = 8 * 1024 * 1024;

/// JSON body: candidate fields plus an optional pre-stored scan
/// reference for international registrants.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationRequest {
    #[serde(flatten)]
    candidate: RegistrationCandidate,
    #[serde(default)]
    passport_scan_ref: Option<String>,
}

pub(super) fn route(
    ctx: AppContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    // Both body filters check the content type before touching the
    // body, so the `or` dispatches cleanly on it.
    let json = warp::post()
        .and(warp::path!("api" / "registrations"))
        .and(warp::body::content_length_limit(MAX_JSON_BYTES))
        .and(warp::body::json())
        .and(with_context(ctx.clone()))
        .and_then(submit_json);

    let multipart = warp::post()
        .and(warp::path!("api" / "registrations"))
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(with_context(ctx))
        .and_then(submit_multipart);

    json.or(multipart)
}

async fn submit_json(
    request: RegistrationRequest,
    ctx: AppContext,
) -> Result<impl Reply, Rejection> {
    let scan = request.passport_scan_ref.map(PassportScan::Reference);
    let registration = ctx
        .intake
        .submit(request.candidate, scan)
        .await
        .map_err(reject::custom)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&registration),
        StatusCode::CREATED,
    ))
}

async fn submit_multipart(form: FormData, ctx: AppContext) -> Result<impl Reply, Rejection> {
    let (candidate, scan) = read_form(form).await.map_err(reject::custom)?;
    let registration = ctx
        .intake
        .submit(candidate, scan)
        .await
        .map_err(reject::custom)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&registration),
        StatusCode::CREATED,
    ))
}

/// Fold the multipart parts into a candidate and an optional upload.
async fn read_form(
    form: FormData,
) -> Result<(RegistrationCandidate, Option<PassportScan>), CoreError> {
    let parts: Vec<Part> = form
        .try_collect()
        .await
        .map_err(|err| CoreError::validation(format!("malformed multipart body: {err}")))?;

    let mut full_name = String::new();
    let mut email = String::new();
    let mut is_international = false;
    let mut passport_number = None;
    let mut national_id_number = None;
    let mut scan = None;

    for part in parts {
        let name = part.name().to_string();
        match name.as_str() {
            "fullName" => full_name = text_field(part).await?,
            "email" => email = text_field(part).await?,
            "isInternational" => {
                let raw = text_field(part).await?;
                is_international = matches!(raw.trim(), "true" | "1" | "yes");
            }
            "passportNumber" => passport_number = Some(text_field(part).await?),
            "nationalIdNumber" => national_id_number = Some(text_field(part).await?),
            "passportScan" => {
                let filename = part.filename().unwrap_or("passport-scan").to_string();
                let content_type = part
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = part_bytes(part).await?;
                scan = Some(PassportScan::Upload(UploadedDocument::new(
                    filename,
                    content_type,
                    bytes,
                )));
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown form field");
            }
        }
    }

    let candidate = RegistrationCandidate {
        full_name,
        email,
        is_international,
        passport_number,
        national_id_number,
    };
    Ok((candidate, scan))
}

async fn text_field(part: Part) -> Result<String, CoreError> {
    let bytes = part_bytes(part).await?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| CoreError::validation("form fields must be valid UTF-8"))
}

async fn part_bytes(part: Part) -> Result<Bytes, CoreError> {
    let buf = part
        .stream()
        .try_fold(Vec::new(), |mut acc, data| {
            acc.put(data);
            async move { Ok(acc) }
        })
        .await
        .map_err(|err| CoreError::validation(format!("unreadable upload: {err}")))?;
    Ok(Bytes::from(buf))
}

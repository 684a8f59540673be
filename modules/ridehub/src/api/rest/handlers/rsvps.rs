use std::sync::Arc;

use axum::Extension;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{RsvpDto, RsvpReq};
use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::api::rest::response::{ApiResult, JsonBody, no_content};
use crate::module::Services;

#[tracing::instrument(skip(svc))]
pub async fn list_rsvps(
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(ride_id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<Vec<RsvpDto>>> {
    let rsvps = svc.rides.list_rsvps(ride_id).await?;
    Ok(axum::Json(rsvps.into_iter().map(RsvpDto::from).collect()))
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn set_rsvp(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(ride_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<RsvpReq>,
) -> ApiResult<JsonBody<RsvpDto>> {
    let rsvp = svc
        .rides
        .set_rsvp(caller.user_id, ride_id, &req.status)
        .await?;
    Ok(axum::Json(rsvp.into()))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn remove_rsvp(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(ride_id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    svc.rides.remove_rsvp(caller.user_id, ride_id).await?;
    Ok(no_content().into_response())
}

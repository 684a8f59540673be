use std::sync::Arc;

use axum::Extension;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{CreateSponsorReq, SponsorDto, UpdateSponsorReq};
use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::api::rest::response::{ApiResult, JsonBody, created_at, no_content};
use crate::module::Services;

#[tracing::instrument(skip(svc))]
pub async fn list_sponsors(
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<Vec<SponsorDto>>> {
    let sponsors = svc.sponsors.list_sponsors(chapter_id).await?;
    Ok(axum::Json(sponsors.into_iter().map(SponsorDto::from).collect()))
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn add_sponsor(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(chapter_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateSponsorReq>,
) -> ApiResult<Response> {
    let sponsor = svc
        .sponsors
        .add_sponsor(caller.user_id, chapter_id, req.into())
        .await?;
    let location = format!("/api/sponsors/{}", sponsor.id);
    Ok(created_at(SponsorDto::from(sponsor), location).into_response())
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn update_sponsor(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateSponsorReq>,
) -> ApiResult<JsonBody<SponsorDto>> {
    let sponsor = svc
        .sponsors
        .update_sponsor(caller.user_id, id, req.into())
        .await?;
    Ok(axum::Json(sponsor.into()))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn delete_sponsor(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    svc.sponsors.delete_sponsor(caller.user_id, id).await?;
    Ok(no_content().into_response())
}

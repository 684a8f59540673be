use std::sync::Arc;

use axum::Extension;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{
    ChapterDto, ConnectUrlDto, LinkClubReq, StravaCallbackQuery, StravaClubDto,
    StravaConnectionDto, SyncReportDto,
};
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::rest::response::{ApiResult, JsonBody, no_content};
use crate::domain::error::DomainError;
use crate::module::Services;

#[tracing::instrument(skip_all, fields(user.id = %caller.user_id))]
pub async fn connect(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
) -> ApiResult<JsonBody<ConnectUrlDto>> {
    let url = svc.strava.authorize_url(caller.user_id)?;
    Ok(axum::Json(ConnectUrlDto { url }))
}

/// OAuth redirect target. Unauthenticated: the signed `state` names the user.
#[tracing::instrument(skip_all)]
pub async fn callback(
    Extension(svc): Extension<Arc<Services>>,
    ApiQuery(query): ApiQuery<StravaCallbackQuery>,
) -> ApiResult<JsonBody<StravaConnectionDto>> {
    if let Some(error) = query.error {
        return Err(DomainError::validation("strava", format!("authorization was not granted: {error}")).into());
    }
    let (Some(code), Some(state)) = (query.code, query.state) else {
        return Err(DomainError::validation("code", "code and state are required").into());
    };
    let connection = svc
        .strava
        .complete_authorization(&code, &state, query.scope.as_deref())
        .await?;
    Ok(axum::Json(connection.into()))
}

#[tracing::instrument(skip_all, fields(user.id = %caller.user_id))]
pub async fn get_connection(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
) -> ApiResult<JsonBody<StravaConnectionDto>> {
    let connection = svc.strava.connection(caller.user_id).await?;
    Ok(axum::Json(connection.into()))
}

#[tracing::instrument(skip_all, fields(user.id = %caller.user_id))]
pub async fn disconnect(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
) -> ApiResult<Response> {
    svc.strava.disconnect(caller.user_id).await?;
    Ok(no_content().into_response())
}

#[tracing::instrument(skip_all, fields(user.id = %caller.user_id))]
pub async fn clubs(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
) -> ApiResult<JsonBody<Vec<StravaClubDto>>> {
    let clubs = svc.strava.clubs(caller.user_id).await?;
    Ok(axum::Json(clubs.into_iter().map(StravaClubDto::from).collect()))
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn link_club(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(chapter_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<LinkClubReq>,
) -> ApiResult<JsonBody<ChapterDto>> {
    let chapter = svc
        .strava
        .link_club(caller.user_id, chapter_id, req.club_id)
        .await?;
    Ok(axum::Json(chapter.into()))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn unlink_club(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<ChapterDto>> {
    let chapter = svc.strava.unlink_club(caller.user_id, chapter_id).await?;
    Ok(axum::Json(chapter.into()))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn sync_chapter(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<SyncReportDto>> {
    let report = svc.strava.sync_chapter(caller.user_id, chapter_id).await?;
    Ok(axum::Json(report.into()))
}

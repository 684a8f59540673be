use std::sync::Arc;

use axum::Extension;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{ChapterDto, CreateChapterReq, UpdateChapterReq};
use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::api::rest::response::{ApiResult, JsonBody, created_at, no_content};
use crate::module::Services;

#[tracing::instrument(skip(svc))]
pub async fn list_chapters(
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(community_id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<Vec<ChapterDto>>> {
    let chapters = svc.chapters.list_chapters(community_id).await?;
    Ok(axum::Json(chapters.into_iter().map(ChapterDto::from).collect()))
}

#[tracing::instrument(skip(svc))]
pub async fn get_chapter(
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<ChapterDto>> {
    let details = svc.chapters.get_chapter(id).await?;
    Ok(axum::Json(details.into()))
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn create_chapter(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(community_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateChapterReq>,
) -> ApiResult<Response> {
    let chapter = svc
        .chapters
        .create_chapter(caller.user_id, community_id, req.into())
        .await?;
    let location = format!("/api/chapters/{}", chapter.id);
    Ok(created_at(ChapterDto::from(chapter), location).into_response())
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn update_chapter(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateChapterReq>,
) -> ApiResult<JsonBody<ChapterDto>> {
    let chapter = svc
        .chapters
        .update_chapter(caller.user_id, id, req.into())
        .await?;
    Ok(axum::Json(chapter.into()))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn delete_chapter(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    svc.chapters.delete_chapter(caller.user_id, id).await?;
    Ok(no_content().into_response())
}

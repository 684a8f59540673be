use std::sync::Arc;

use axum::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{AddMemberReq, ChangeRoleReq, MemberDto};
use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::api::rest::response::{ApiResult, JsonBody, no_content};
use crate::module::Services;

#[tracing::instrument(skip(svc))]
pub async fn list_members(
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<Vec<MemberDto>>> {
    let members = svc.chapters.list_members(chapter_id).await?;
    Ok(axum::Json(members.into_iter().map(MemberDto::from).collect()))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn join(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    let member = svc.chapters.join(caller.user_id, chapter_id).await?;
    Ok((StatusCode::CREATED, axum::Json(MemberDto::from(member))).into_response())
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn leave(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    svc.chapters.leave(caller.user_id, chapter_id).await?;
    Ok(no_content().into_response())
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn add_member(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(chapter_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AddMemberReq>,
) -> ApiResult<Response> {
    let member = svc
        .chapters
        .add_member(caller.user_id, chapter_id, req.user_id, &req.role)
        .await?;
    Ok((StatusCode::CREATED, axum::Json(MemberDto::from(member))).into_response())
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn change_role(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath((chapter_id, user_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<ChangeRoleReq>,
) -> ApiResult<JsonBody<MemberDto>> {
    let member = svc
        .chapters
        .change_role(caller.user_id, chapter_id, user_id, &req.role)
        .await?;
    Ok(axum::Json(member.into()))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn remove_member(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath((chapter_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Response> {
    svc.chapters
        .remove_member(caller.user_id, chapter_id, user_id)
        .await?;
    Ok(no_content().into_response())
}

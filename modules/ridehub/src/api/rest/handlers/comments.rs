use std::sync::Arc;

use axum::Extension;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{CommentDto, CommentReq};
use crate::api::rest::extract::{ApiJson, ApiPath};
use crate::api::rest::response::{ApiResult, JsonBody, created_at, no_content};
use crate::module::Services;

#[tracing::instrument(skip(svc))]
pub async fn list_comments(
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(ride_id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<Vec<CommentDto>>> {
    let comments = svc.comments.list_comments(ride_id).await?;
    Ok(axum::Json(comments.into_iter().map(CommentDto::from).collect()))
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn add_comment(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(ride_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CommentReq>,
) -> ApiResult<Response> {
    let comment = svc
        .comments
        .add_comment(caller.user_id, ride_id, &req.body)
        .await?;
    let location = format!("/api/comments/{}", comment.id);
    Ok(created_at(CommentDto::from(comment), location).into_response())
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn edit_comment(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CommentReq>,
) -> ApiResult<JsonBody<CommentDto>> {
    let comment = svc
        .comments
        .edit_comment(caller.user_id, id, &req.body)
        .await?;
    Ok(axum::Json(comment.into()))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn delete_comment(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    svc.comments.delete_comment(caller.user_id, id).await?;
    Ok(no_content().into_response())
}

use std::sync::Arc;

use axum::Extension;
use tracing::field::Empty;
use uuid::Uuid;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{PageDto, UpsertProfileReq, UserDto, UserSearchQuery};
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::rest::response::{ApiResult, JsonBody};
use crate::domain::models::PageRequest;
use crate::module::Services;

#[tracing::instrument(skip_all, fields(user.id = %caller.user_id))]
pub async fn get_me(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
) -> ApiResult<JsonBody<UserDto>> {
    let user = svc.users.get_user(caller.user_id).await?;
    Ok(axum::Json(user.into()))
}

#[tracing::instrument(skip_all, fields(user.id = %caller.user_id))]
pub async fn upsert_me(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiJson(req): ApiJson<UpsertProfileReq>,
) -> ApiResult<JsonBody<UserDto>> {
    let user = svc.users.upsert_profile(caller.user_id, req.into()).await?;
    Ok(axum::Json(user.into()))
}

#[tracing::instrument(skip(svc, caller), fields(requester.id = %caller.user_id, request_id = Empty))]
pub async fn get_user(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<UserDto>> {
    let user = svc.users.get_user(id).await?;
    Ok(axum::Json(user.into()))
}

#[tracing::instrument(skip_all, fields(requester.id = %caller.user_id))]
pub async fn search_users(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiQuery(query): ApiQuery<UserSearchQuery>,
) -> ApiResult<JsonBody<PageDto<UserDto>>> {
    let page = svc
        .users
        .search_users(
            query.q.as_deref(),
            PageRequest {
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(axum::Json(PageDto::from_page(page, UserDto::from)))
}

use std::sync::Arc;

use axum::Extension;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{CommunityDto, CommunityQuery, CreateCommunityReq, PageDto, UpdateCommunityReq};
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::rest::response::{ApiResult, JsonBody, created_json, no_content};
use crate::module::Services;

#[tracing::instrument(skip_all)]
pub async fn list_communities(
    Extension(svc): Extension<Arc<Services>>,
    ApiQuery(query): ApiQuery<CommunityQuery>,
) -> ApiResult<JsonBody<PageDto<CommunityDto>>> {
    let (filter, page) = query.split()?;
    let page = svc.communities.list_communities(&filter, page).await?;
    Ok(axum::Json(PageDto::from_page(page, CommunityDto::from)))
}

#[tracing::instrument(skip(svc))]
pub async fn get_community(
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<CommunityDto>> {
    let community = svc.communities.get_community(id).await?;
    Ok(axum::Json(community.into()))
}

#[tracing::instrument(skip_all, fields(user.id = %caller.user_id))]
pub async fn create_community(
    uri: Uri,
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiJson(req): ApiJson<CreateCommunityReq>,
) -> ApiResult<Response> {
    let community = svc
        .communities
        .create_community(caller.user_id, req.try_into()?)
        .await?;
    let id = community.id.to_string();
    Ok(created_json(CommunityDto::from(community), &uri, &id).into_response())
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn update_community(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateCommunityReq>,
) -> ApiResult<JsonBody<CommunityDto>> {
    let community = svc
        .communities
        .update_community(caller.user_id, id, req.try_into()?)
        .await?;
    Ok(axum::Json(community.into()))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn delete_community(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    svc.communities.delete_community(caller.user_id, id).await?;
    Ok(no_content().into_response())
}

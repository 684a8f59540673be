use std::sync::Arc;

use axum::Extension;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{
    CreateRideReq, CreatedRidesDto, DeletedDto, PageDto, RideDetailsDto, RideDto, RideListQuery,
    ScopeQuery, UpdateRideReq,
};
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::rest::response::{ApiResult, JsonBody, created_at};
use crate::module::Services;

#[tracing::instrument(skip_all)]
pub async fn list_rides(
    Extension(svc): Extension<Arc<Services>>,
    ApiQuery(query): ApiQuery<RideListQuery>,
) -> ApiResult<JsonBody<PageDto<RideDto>>> {
    let (filter, page) = query.split()?;
    let page = svc.rides.list_rides(filter, page).await?;
    Ok(axum::Json(PageDto::from_page(page, RideDto::from)))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn get_ride(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<JsonBody<RideDetailsDto>> {
    let details = svc.rides.get_ride(Some(caller.user_id), id).await?;
    Ok(axum::Json(details.into()))
}

/// Create a ride, or a whole series when a recurrence is given.
#[tracing::instrument(skip_all, fields(user.id = %caller.user_id))]
pub async fn create_ride(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiJson(req): ApiJson<CreateRideReq>,
) -> ApiResult<Response> {
    let created = svc
        .rides
        .create_ride(caller.user_id, req.try_into()?)
        .await?;
    let location = created
        .rides
        .first()
        .map(|ride| format!("/api/rides/{}", ride.id))
        .unwrap_or_default();
    Ok(created_at(CreatedRidesDto::from(created), location).into_response())
}

#[tracing::instrument(skip(svc, caller, req), fields(user.id = %caller.user_id))]
pub async fn update_ride(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(scope): ApiQuery<ScopeQuery>,
    ApiJson(req): ApiJson<UpdateRideReq>,
) -> ApiResult<JsonBody<Vec<RideDto>>> {
    let rides = svc
        .rides
        .update_ride(caller.user_id, id, req.try_into()?, scope.parse()?)
        .await?;
    Ok(axum::Json(rides.into_iter().map(RideDto::from).collect()))
}

#[tracing::instrument(skip(svc, caller), fields(user.id = %caller.user_id))]
pub async fn delete_ride(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(scope): ApiQuery<ScopeQuery>,
) -> ApiResult<JsonBody<DeletedDto>> {
    let deleted = svc
        .rides
        .delete_ride(caller.user_id, id, scope.parse()?)
        .await?;
    Ok(axum::Json(DeletedDto { deleted }))
}

use std::sync::Arc;

use axum::Extension;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{BrandDto, BrandQuery, UploadImageReq, UploadedImageDto};
use crate::api::rest::extract::{ApiJson, ApiQuery};
use crate::api::rest::response::{ApiResult, JsonBody};
use crate::module::Services;

#[tracing::instrument(skip_all, fields(user.id = %caller.user_id))]
pub async fn upload_image(
    Extension(caller): Extension<Caller>,
    Extension(svc): Extension<Arc<Services>>,
    ApiJson(req): ApiJson<UploadImageReq>,
) -> ApiResult<JsonBody<UploadedImageDto>> {
    let image = svc
        .assets
        .upload_image(&req.file, req.folder.as_deref())
        .await?;
    Ok(axum::Json(image.into()))
}

#[tracing::instrument(skip(svc))]
pub async fn lookup_brand(
    Extension(svc): Extension<Arc<Services>>,
    ApiQuery(query): ApiQuery<BrandQuery>,
) -> ApiResult<JsonBody<BrandDto>> {
    let brand = svc.assets.lookup_brand(&query.domain).await?;
    Ok(axum::Json(brand.into()))
}

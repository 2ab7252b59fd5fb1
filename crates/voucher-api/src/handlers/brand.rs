//! 品牌 API 处理器

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use validator::Validate;
use voucher_core::Brand;

use crate::{
    dto::{ApiResponse, CreateBrandRequest},
    error::ApiError,
    state::AppState,
};

/// 创建品牌
///
/// POST /brand
pub async fn create_brand(
    State(state): State<AppState>,
    payload: Result<Json<CreateBrandRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Brand>>), ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let brand = state.catalog_service.create_brand(req.into()).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(brand))))
}

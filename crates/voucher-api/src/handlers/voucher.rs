//! 券 API 处理器

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    http::StatusCode,
};
use validator::Validate;
use voucher_core::Voucher;

use crate::{
    dto::{ApiResponse, CreateVoucherRequest, IdQuery},
    error::ApiError,
    state::AppState,
};

/// 创建券
///
/// POST /voucher
pub async fn create_voucher(
    State(state): State<AppState>,
    payload: Result<Json<CreateVoucherRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Voucher>>), ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let voucher = state.catalog_service.create_voucher(req.into()).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(voucher))))
}

/// 按 ID 查询券
///
/// GET /voucher?id=
pub async fn get_voucher(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Voucher>>, ApiError> {
    let Query(IdQuery { id }) = query?;

    let voucher = state.catalog_service.get_voucher(id).await?;

    Ok(Json(ApiResponse::success(voucher)))
}

/// 列出品牌下的券
///
/// GET /voucher/brand?id=
pub async fn list_vouchers_by_brand(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Voucher>>>, ApiError> {
    let Query(IdQuery { id }) = query?;

    let vouchers = state.catalog_service.list_vouchers_by_brand(id).await?;

    Ok(Json(ApiResponse::success(vouchers)))
}

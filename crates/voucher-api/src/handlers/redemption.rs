//! 兑换 API 处理器

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    http::StatusCode,
};
use tracing::info;
use validator::Validate;
use voucher_core::{RedemptionRequest, RedemptionResult};

use crate::{
    dto::{ApiResponse, CreateRedemptionRequest, TransactionQuery},
    error::ApiError,
    state::AppState,
};

/// 执行兑换
///
/// POST /transaction/redemption
pub async fn create_redemption(
    State(state): State<AppState>,
    payload: Result<Json<CreateRedemptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RedemptionResult>>), ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let request: RedemptionRequest = req.into();
    let result = state
        .redemption_service
        .execute_redemption(&request)
        .await?;

    info!(
        redemption_id = result.id,
        customer_id = result.customer_id,
        "Redemption created"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(result))))
}

/// 查询兑换单
///
/// GET /transaction/redemption?transactionId=
pub async fn get_redemption(
    State(state): State<AppState>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<RedemptionResult>>, ApiError> {
    let Query(TransactionQuery { transaction_id }) = query?;

    let result = state
        .redemption_service
        .get_redemption(transaction_id)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

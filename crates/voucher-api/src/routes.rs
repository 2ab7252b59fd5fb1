//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// 品牌路由
fn brand_routes() -> Router<AppState> {
    Router::new().route("/brand", post(handlers::brand::create_brand))
}

/// 券路由
fn voucher_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/voucher",
            post(handlers::voucher::create_voucher).get(handlers::voucher::get_voucher),
        )
        .route(
            "/voucher/brand",
            get(handlers::voucher::list_vouchers_by_brand),
        )
}

/// 兑换路由
fn transaction_routes() -> Router<AppState> {
    Router::new().route(
        "/transaction/redemption",
        post(handlers::redemption::create_redemption).get(handlers::redemption::get_redemption),
    )
}

/// 构建所有业务路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(brand_routes())
        .merge(voucher_routes())
        .merge(transaction_routes())
}

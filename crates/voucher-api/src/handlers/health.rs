//! 存活与就绪探针

use axum::{Json, extract::State, http::StatusCode};

use crate::{dto::HealthResponse, state::AppState};

const SERVICE_NAME: &str = "voucher-api";

/// 存活探针：服务进程正常即返回 ok
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        database: None,
    })
}

/// 就绪探针：检查数据库连接是否可用
///
/// 内存存储模式下没有数据库，直接视为就绪
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.database {
        Some(db) => Some(if db.health_check().await.is_ok() {
            "ok"
        } else {
            "fail"
        }),
        None => None,
    };
    let ready = database != Some("fail");

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if ready { "ok" } else { "degraded" }.to_string(),
            service: SERVICE_NAME.to_string(),
            database: database.map(str::to_string),
        }),
    )
}

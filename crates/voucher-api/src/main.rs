//! 券兑换服务
//!
//! 提供品牌、券管理与积分兑换的 REST API。

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use voucher_api::{AppState, build_app};
use voucher_shared::{config::AppConfig, database::Database, observability};

const SERVICE_NAME: &str = "voucher-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 配置：config/*.toml + VOUCHER_ 环境变量 + DATABASE_URL / PORT
    let config = AppConfig::load(SERVICE_NAME).context("加载配置失败")?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting {} on {}", config.service_name, config.server_addr());

    let db = Database::connect(&config.database)
        .await
        .context("连接数据库失败")?;
    if config.database.run_migrations {
        db.run_migrations().await.context("执行数据库迁移失败")?;
    }

    let state = AppState::with_postgres(db.clone());
    let app = build_app(
        state,
        Duration::from_secs(config.server.request_timeout_seconds),
    );

    let listener = TcpListener::bind(config.server_addr())
        .await
        .with_context(|| format!("监听 {} 失败", config.server_addr()))?;
    info!("Listening on {}", config.server_addr());

    // 停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// 收到 Ctrl+C 或 SIGTERM 后返回，触发 axum 的优雅关闭流程。
/// 信号处理器注册失败时只记录日志，该信号源不再触发关闭。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
